use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use bomb_tetris::adapter::store::memory_store;
use bomb_tetris::adapter::{run_server_with, ServerConfig, SessionRegistry};

async fn start_server(tick_ms: u64) -> (SocketAddr, SessionRegistry) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tick_ms,
        seed: Some(7),
        high_score_path: None,
    };
    let registry = SessionRegistry::new();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_registry = registry.clone();
    tokio::spawn(async move {
        let _ = run_server_with(config, server_registry, memory_store(), Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");
    (addr, registry)
}

async fn connect(addr: SocketAddr) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn send(writer: &mut OwnedWriteHalf, line: &str) {
    writer.write_all(line.as_bytes()).await.unwrap();
    writer.write_all(b"\n").await.unwrap();
    writer.flush().await.unwrap();
}

/// Read lines until one has the given `type`, skipping tick states
async fn next_of_type(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    msg_type: &str,
) -> serde_json::Value {
    loop {
        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        if v["type"] == msg_type {
            return v;
        }
    }
}

#[tokio::test]
async fn session_sends_state_on_connect_and_acks_actions() {
    let (addr, registry) = start_server(1000).await;
    let (mut lines, mut writer) = connect(addr).await;

    let first = next_of_type(&mut lines, "state").await;
    assert_eq!(first["session_id"], 1);
    assert_eq!(first["score"], 0);
    assert_eq!(first["level"], 1);
    assert_eq!(first["board"].as_array().unwrap().len(), 20);
    assert_eq!(first["current_piece"]["x"], 4);
    assert_eq!(registry.len().await, 1);

    send(&mut writer, r#"{"action":"left","seq":1}"#).await;
    let ack = next_of_type(&mut lines, "ack").await;
    assert_eq!(ack["seq"], 1);
    assert_eq!(ack["action"], "left");
    assert_eq!(ack["success"], true);
    let state = next_of_type(&mut lines, "state").await;
    assert_eq!(state["current_piece"]["x"], 3);

    send(&mut writer, r#"{"action":"spawn_bomb","seq":2}"#).await;
    let ack = next_of_type(&mut lines, "ack").await;
    assert_eq!(ack["success"], false);

    send(&mut writer, r#"{"action":"place_bomb","seq":3}"#).await;
    let err = next_of_type(&mut lines, "error").await;
    assert_eq!(err["seq"], 3);
    assert_eq!(err["code"], "missing_coordinates");

    send(&mut writer, "this is not json").await;
    let err = next_of_type(&mut lines, "error").await;
    assert_eq!(err["code"], "invalid_json");

    send(&mut writer, r#"{"action":"hold","seq":5}"#).await;
    let err = next_of_type(&mut lines, "error").await;
    assert_eq!(err["code"], "invalid_action");

    send(&mut writer, r#"{"action":"hard_drop","seq":6}"#).await;
    let ack = next_of_type(&mut lines, "ack").await;
    assert_eq!(ack["action"], "hard_drop");
    let state = next_of_type(&mut lines, "state").await;
    let filled = state["board"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .filter(|cell| !cell.is_null())
        .count();
    assert_eq!(filled, 4);
}

#[tokio::test]
async fn ticks_advance_gravity() {
    let (addr, _registry) = start_server(20).await;
    let (mut lines, _writer) = connect(addr).await;

    let first = next_of_type(&mut lines, "state").await;
    assert_eq!(first["current_piece"]["y"], 0);

    // 375ms gravity at level 1; give it a second of 20ms ticks.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let state = next_of_type(&mut lines, "state").await;
        if state["current_piece"]["y"].as_i64().unwrap_or(0) > 0 {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "piece never fell");
    }
}

#[tokio::test]
async fn sessions_are_independent() {
    let (addr, registry) = start_server(1000).await;
    let (mut lines_a, mut writer_a) = connect(addr).await;
    let first_a = next_of_type(&mut lines_a, "state").await;
    let (mut lines_b, _writer_b) = connect(addr).await;
    let first_b = next_of_type(&mut lines_b, "state").await;

    assert_ne!(first_a["session_id"], first_b["session_id"]);
    assert_eq!(registry.len().await, 2);

    send(&mut writer_a, r#"{"action":"pause","seq":1}"#).await;
    next_of_type(&mut lines_a, "ack").await;
    let state_a = next_of_type(&mut lines_a, "state").await;
    assert_eq!(state_a["paused"], true);

    // B keeps its own, unpaused engine.
    let state_b = next_of_type(&mut lines_b, "state").await;
    assert_eq!(state_b["paused"], false);
}

#[tokio::test]
async fn disconnect_removes_session() {
    let (addr, registry) = start_server(20).await;
    {
        let (mut lines, _writer) = connect(addr).await;
        next_of_type(&mut lines, "state").await;
        assert_eq!(registry.len().await, 1);
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !registry.is_empty().await {
        assert!(tokio::time::Instant::now() < deadline, "session never removed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
