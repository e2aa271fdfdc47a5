//! TCP server for game sessions
//!
//! Every connection gets its own session and its own engine. A per-connection
//! task reads client lines and drives the tick clock; a writer task serializes
//! outbound messages. Uses tokio for async networking.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::MissedTickBehavior;

use crate::protocol::{AckMessage, ErrorMessage, StateMessage};
use crate::session::Session;
use crate::store::{open_store, SharedHighScore};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Period of the per-session engine tick
    pub tick_ms: u64,
    /// Base RNG seed; each session adds its id. `None` derives one from the clock.
    pub seed: Option<u32>,
    /// JSON file for the persistent high score; `None` keeps it in memory
    pub high_score_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            tick_ms: 100,
            seed: None,
            high_score_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `BOMB_TETRIS_*` environment variables
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("BOMB_TETRIS_HOST").unwrap_or(defaults.host);
        let port = env::var("BOMB_TETRIS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let tick_ms = env::var("BOMB_TETRIS_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(defaults.tick_ms);

        let seed = env::var("BOMB_TETRIS_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        let high_score_path = env::var("BOMB_TETRIS_HIGH_SCORE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port,
            tick_ms,
            seed,
            high_score_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// Registry entry for a live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub peer: SocketAddr,
    pub score: u32,
    pub level: u32,
    pub game_over: bool,
}

/// Live sessions keyed by session id
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<u64, SessionSummary>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a session's summary
    pub async fn upsert(&self, id: u64, summary: SessionSummary) {
        self.sessions.write().await.insert(id, summary);
    }

    pub async fn remove(&self, id: u64) -> Option<SessionSummary> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn get(&self, id: u64) -> Option<SessionSummary> {
        self.sessions.read().await.get(&id).copied()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Summaries sorted by session id
    pub async fn list(&self) -> Vec<(u64, SessionSummary)> {
        let sessions = self.sessions.read().await;
        let mut out: Vec<_> = sessions.iter().map(|(&id, &s)| (id, s)).collect();
        out.sort_by_key(|&(id, _)| id);
        out
    }
}

/// Outbound messages queued per client before states start being dropped
const OUTBOUND_QUEUE: usize = 64;

#[derive(Debug, Clone)]
enum ClientOutbound {
    State(StateMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
}

/// Queue a state without waiting. A full queue drops it, since a newer state
/// follows on the next tick. Returns false once the writer is gone.
fn offer_state(tx: &mpsc::Sender<ClientOutbound>, state: StateMessage) -> bool {
    match tx.try_send(ClientOutbound::State(state)) {
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Closed(_)) => false,
    }
}

/// Seed for a session: the configured base plus the session id
pub fn session_seed(base: u32, session_id: u64) -> u32 {
    base.wrapping_add(session_id as u32)
}

fn clock_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Start the TCP server with the configured high-score store
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let high_scores = open_store(config.high_score_path.as_deref())?;
    run_server_with(config, SessionRegistry::new(), high_scores, ready_tx).await
}

/// Start the TCP server with a caller-provided registry and high-score store
pub async fn run_server_with(
    config: ServerConfig,
    registry: SessionRegistry,
    high_scores: SharedHighScore,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Server] Listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let base_seed = config.seed.unwrap_or_else(clock_seed);
    let tick = Duration::from_millis(config.tick_ms.max(1));
    let mut session_id_counter = 0u64;

    // Accept incoming connections
    loop {
        let (socket, peer) = listener.accept().await?;
        session_id_counter += 1;
        let session_id = session_id_counter;

        println!("[Server] Session {} connected from {}", session_id, peer);

        let session = Session::new(
            session_id,
            session_seed(base_seed, session_id),
            Arc::clone(&high_scores),
        );
        let registry = registry.clone();

        // Spawn task to handle this client
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, peer, session, tick, &registry).await {
                eprintln!("[Server] Session {} error: {:#}", session_id, e);
            }
            registry.remove(session_id).await;
            println!("[Server] Session {} disconnected", session_id);
        });
    }
}

/// Drive one connection until the peer hangs up
async fn handle_client(
    socket: TcpStream,
    peer: SocketAddr,
    mut session: Session,
    tick: Duration,
    registry: &SessionRegistry,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut lines = BufReader::new(reader).lines();

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::channel::<ClientOutbound>(OUTBOUND_QUEUE);

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::State(state) => serde_json::to_writer(&mut buf, state),
                ClientOutbound::Ack(ack) => serde_json::to_writer(&mut buf, ack),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, err),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let id = session.id();
    registry.upsert(id, session.summary(peer)).await;

    let started = Instant::now();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial state goes out instead.
    ticker.tick().await;

    let mut result = Ok(());
    if offer_state(&tx, session.state_message()) {
        result = session_loop(&mut session, peer, &mut lines, &mut ticker, started, &tx, registry).await;
    }

    drop(tx);
    let _ = write_task.await;
    result
}

async fn session_loop<R>(
    session: &mut Session,
    peer: SocketAddr,
    lines: &mut tokio::io::Lines<R>,
    ticker: &mut tokio::time::Interval,
    started: Instant,
    tx: &mpsc::Sender<ClientOutbound>,
    registry: &SessionRegistry,
) -> anyhow::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Client disconnected
                    return Ok(());
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                // Acks and errors wait for room; states may be dropped.
                let sent = match session.handle_line(trimmed) {
                    Ok(ack) => {
                        tx.send(ClientOutbound::Ack(ack)).await.is_ok()
                            && offer_state(tx, session.state_message())
                    }
                    Err(err) => tx.send(ClientOutbound::Error(err)).await.is_ok(),
                };
                if !sent {
                    return Ok(());
                }
            }

            _ = ticker.tick() => {
                let now_ms = started.elapsed().as_millis() as u64;
                session.tick(now_ms);
                registry.upsert(session.id(), session.summary(peer)).await;
                if !offer_state(tx, session.state_message()) {
                    return Ok(());
                }
            }
        }
    }
}
