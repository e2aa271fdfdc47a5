//! Scoring module - line-clear score, level, bomb grants and fall speed
//!
//! A clear scores `lines × 100 × level`; the level goes up and a bomb is
//! granted every ten cumulative lines.

use crate::types::{
    BASE_FALL_MS, BOMB_LINES_REQUIRED, FALL_STEP_MS, LINE_SCORE_BASE, MIN_FALL_MS, SPEED_STEP,
};

/// Bookkeeping for one line-clear event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClearOutcome {
    /// Cumulative lines after this clear
    pub lines_total: u32,
    /// Level after this clear
    pub level: u32,
    /// Points awarded for this clear
    pub score: u32,
    /// Bombs granted by thresholds crossed in this clear
    pub bombs_granted: u32,
    /// Level-driven gravity interval after this clear
    pub base_fall_ms: u32,
}

/// Level for a cumulative line count (starts at 1)
pub fn level_for_lines(lines: u32) -> u32 {
    lines / BOMB_LINES_REQUIRED + 1
}

/// Bombs earned going from `before` to `after` cumulative lines
///
/// One per multiple of ten crossed, so a single clear can grant several.
pub fn bombs_granted(before: u32, after: u32) -> u32 {
    (after / BOMB_LINES_REQUIRED).saturating_sub(before / BOMB_LINES_REQUIRED)
}

/// Points for clearing `lines` rows at `level`
pub fn line_clear_score(lines: u32, level: u32) -> u32 {
    lines
        .saturating_mul(LINE_SCORE_BASE)
        .saturating_mul(level)
}

/// Gravity interval for a level: 375ms at level 1, 37ms faster per level, floored at 50ms
pub fn base_fall_interval_ms(level: u32) -> u32 {
    let speedup = level.saturating_sub(1).saturating_mul(FALL_STEP_MS);
    BASE_FALL_MS.saturating_sub(speedup).max(MIN_FALL_MS)
}

/// Score/level/bomb bookkeeping for clearing `cleared` rows with `lines_before` already cleared
///
/// The level is recomputed from the new line total before the score is
/// multiplied, so a clear that crosses a level threshold scores at the new
/// level.
pub fn apply_line_clear(lines_before: u32, cleared: u32) -> LineClearOutcome {
    let lines_total = lines_before.saturating_add(cleared);
    let level = level_for_lines(lines_total);
    LineClearOutcome {
        lines_total,
        level,
        score: line_clear_score(cleared, level),
        bombs_granted: bombs_granted(lines_before, lines_total),
        base_fall_ms: base_fall_interval_ms(level),
    }
}

/// Fraction of the board height, from the top, that contains filled cells
pub fn stack_ratio(leading_empty_rows: usize, height: usize) -> f64 {
    if height == 0 {
        return 0.0;
    }
    1.0 - leading_empty_rows as f64 / height as f64
}

/// Speed multiplier value for a step count (`steps × 0.25`)
pub fn speed_multiplier(steps: u8) -> f32 {
    steps as f32 * SPEED_STEP
}

/// Effective gravity interval after stack-height slowdown and the player multiplier
///
/// Above half height the interval is stretched by `1 + (ratio − 0.5)`. The
/// result is truncated to whole milliseconds and never drops below 50ms.
pub fn effective_fall_interval_ms(base_ms: u32, ratio: f64, multiplier: f32) -> u32 {
    let multiplier = multiplier as f64;
    let stretch = if ratio > 0.5 { 1.0 + (ratio - 0.5) } else { 1.0 };
    let interval = (base_ms as f64 * stretch / multiplier) as u32;
    interval.max(MIN_FALL_MS)
}
