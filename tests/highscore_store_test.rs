use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bomb_tetris::adapter::store::{JsonFileHighScore, SharedHighScore};
use bomb_tetris::adapter::Session;
use bomb_tetris::core::{CycleShapes, GameState, HighScoreStore};
use bomb_tetris::types::PieceKind;

fn temp_path(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "bomb-tetris-it-{}-{}-{}.json",
        name,
        std::process::id(),
        nanos
    ))
}

/// Clear two rows with five O pieces, then top out the spawn columns
fn play_to_game_over(session: &mut Session<CycleShapes>) {
    for (dir, steps) in [("left", 4), ("left", 2), ("left", 0), ("right", 2), ("right", 4)] {
        for _ in 0..steps {
            let line = format!(r#"{{"action":"{}"}}"#, dir);
            assert!(session.handle_line(&line).unwrap().success);
        }
        session.handle_line(r#"{"action":"hard_drop"}"#).unwrap();
    }
    session.tick(100);
    session.tick(350);

    for _ in 0..20 {
        if session.game().is_game_over() {
            break;
        }
        session.handle_line(r#"{"action":"hard_drop"}"#).unwrap();
    }
}

#[test]
fn game_over_score_is_persisted() {
    let path = temp_path("session");
    let store: SharedHighScore = Arc::new(Mutex::new(JsonFileHighScore::load(&path).unwrap()));

    let game = GameState::with_source(CycleShapes::repeat(PieceKind::O));
    let mut session = Session::with_game(1, game, store.clone());
    play_to_game_over(&mut session);

    assert!(session.game().is_game_over());
    assert_eq!(session.game().score(), 200);
    assert_eq!(store.lock().unwrap().get(), 200);
    assert_eq!(session.state_message().high_score, 200);

    let reopened = JsonFileHighScore::load(&path).unwrap();
    assert_eq!(reopened.get(), 200);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn lower_score_does_not_replace_best() {
    let path = temp_path("lower");
    std::fs::write(&path, r#"{"high_score":5000}"#).unwrap();
    let store: SharedHighScore = Arc::new(Mutex::new(JsonFileHighScore::load(&path).unwrap()));

    let game = GameState::with_source(CycleShapes::repeat(PieceKind::O));
    let mut session = Session::with_game(2, game, store.clone());
    play_to_game_over(&mut session);

    assert!(session.game().is_game_over());
    assert_eq!(store.lock().unwrap().get(), 5000);
    assert_eq!(JsonFileHighScore::load(&path).unwrap().get(), 5000);

    let _ = std::fs::remove_file(&path);
}
