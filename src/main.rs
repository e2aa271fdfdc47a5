//! Bomb Tetris session server (default binary).
//!
//! Serves one independent game per TCP connection. Configure with the
//! `BOMB_TETRIS_*` environment variables.

use anyhow::Result;

use bomb_tetris::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    println!(
        "[Server] Tick {}ms, seed {}",
        config.tick_ms,
        config
            .seed
            .map_or_else(|| "from clock".to_string(), |s| s.to_string())
    );

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("[Server] Shutting down");
            Ok(())
        }
    }
}
