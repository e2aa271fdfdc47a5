//! RNG module - shape sources for piece spawning
//!
//! The engine draws every normal piece from a [`ShapeSource`]. The default
//! source is a seeded LCG picking uniformly over the seven kinds (never the
//! bomb piece, which only enters through the bomb inventory). [`CycleShapes`]
//! replays a fixed sequence for deterministic scenarios.

use crate::types::PieceKind;

/// Supplier of the kinds for newly spawned pieces
pub trait ShapeSource {
    fn next_kind(&mut self) -> PieceKind;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of a power-of-two LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Uniform random kinds from a seeded [`SimpleRng`]
#[derive(Debug, Clone)]
pub struct ShapeRng {
    rng: SimpleRng,
}

impl ShapeRng {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl Default for ShapeRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ShapeSource for ShapeRng {
    fn next_kind(&mut self) -> PieceKind {
        let i = self.rng.next_range(PieceKind::ALL.len() as u32);
        PieceKind::from_index(i as usize)
    }
}

/// Repeats a fixed, non-empty sequence of kinds forever
#[derive(Debug, Clone)]
pub struct CycleShapes {
    kinds: Vec<PieceKind>,
    pos: usize,
}

impl CycleShapes {
    /// Panics if `kinds` is empty.
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        let kinds = kinds.into();
        assert!(!kinds.is_empty(), "CycleShapes needs at least one kind");
        Self { kinds, pos: 0 }
    }

    /// A source that only ever yields `kind`
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl ShapeSource for CycleShapes {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.pos % self.kinds.len()];
        self.pos = self.pos.wrapping_add(1);
        kind
    }
}

impl<S: ShapeSource + ?Sized> ShapeSource for Box<S> {
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
    }

    #[test]
    fn test_shape_rng_covers_all_kinds() {
        let mut source = ShapeRng::new(42);
        let mut seen = [0u32; 7];
        for _ in 0..7000 {
            seen[source.next_kind().index()] += 1;
        }
        // Roughly uniform: every kind within ±30% of the mean.
        for (i, &n) in seen.iter().enumerate() {
            assert!((700..=1300).contains(&n), "kind {} drawn {} times", i, n);
        }
    }

    #[test]
    fn test_shape_rng_same_seed_same_sequence() {
        let mut a = ShapeRng::new(99);
        let mut b = ShapeRng::new(99);
        for _ in 0..50 {
            assert_eq!(a.next_kind(), b.next_kind());
        }
    }

    #[test]
    fn test_cycle_shapes_repeats() {
        let mut source = CycleShapes::new(vec![PieceKind::O, PieceKind::I]);
        let drawn: Vec<_> = (0..5).map(|_| source.next_kind()).collect();
        assert_eq!(
            drawn,
            vec![
                PieceKind::O,
                PieceKind::I,
                PieceKind::O,
                PieceKind::I,
                PieceKind::O
            ]
        );
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn ShapeSource + Send> = Box::new(CycleShapes::repeat(PieceKind::T));
        assert_eq!(source.next_kind(), PieceKind::T);
    }
}
