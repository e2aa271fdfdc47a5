use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bomb_tetris::core::{Board, Bomb, CycleShapes, GameState};
use bomb_tetris::types::{GameAction, PieceKind};

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    let mut now = 0u64;

    c.bench_function("game_update_100ms", |b| {
        b.iter(|| {
            now += 100;
            state.update(black_box(now));
            if state.is_game_over() {
                state.reset();
                now = 0;
            }
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            // Fill bottom 4 rows
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, Some(PieceKind::I));
                }
            }
            black_box(board.clear_full_rows());
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut state = GameState::with_source(CycleShapes::new(PieceKind::ALL));

    c.bench_function("hard_drop", |b| {
        b.iter(|| {
            if !state.apply_action(GameAction::HardDrop) {
                state.reset();
            }
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut state = GameState::with_source(CycleShapes::repeat(PieceKind::T));

    c.bench_function("rotate", |b| {
        b.iter(|| {
            black_box(state.apply_action(GameAction::Rotate));
        })
    });
}

fn bench_rotate_with_kicks(c: &mut Criterion) {
    let mut state = GameState::with_source(CycleShapes::repeat(PieceKind::I));
    state.apply_action(GameAction::Rotate);
    while state.apply_action(GameAction::MoveRight) {}

    // A vertical I against the wall tries every kick and fails.
    c.bench_function("rotate_all_kicks_fail", |b| {
        b.iter(|| {
            black_box(state.apply_action(GameAction::Rotate));
        })
    });
}

fn bench_bomb_explosion(c: &mut Criterion) {
    let mut full = Board::new();
    for y in 0..20 {
        for x in 0..10 {
            full.set(x, y, Some(PieceKind::J));
        }
    }

    c.bench_function("bomb_explode_7x7", |b| {
        b.iter(|| {
            let mut board = full.clone();
            let mut bomb = Bomb::new(black_box(5), black_box(10));
            black_box(bomb.explode(&mut board));
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let state = GameState::new(12345);

    c.bench_function("snapshot", |b| {
        b.iter(|| {
            black_box(state.snapshot());
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_hard_drop,
    bench_rotate,
    bench_rotate_with_kicks,
    bench_bomb_explosion,
    bench_snapshot
);
criterion_main!(benches);
