//! Real-time trip dispatch gateway.
//!
//! One WebSocket endpoint per client (`/ws?role=driver|passenger`), a
//! `POST /global-emit` relay for arbitrary named events, and a health probe.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dispatch_core::connection::{ClientId, Role};
use dispatch_gateway::core_loop::{self, Command};
use dispatch_gateway::session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time trip dispatch gateway")]
struct Args {
    /// Address to bind (ip or host)
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 8090)]
    port: u16,
}

#[derive(Clone)]
struct AppState {
    commands: mpsc::Sender<Command>,
    // Id 0 is reserved for the core's internal scheduler origin.
    next_client_id: Arc<AtomicU64>,
}

#[derive(Debug, Deserialize)]
struct WsParams {
    role: Role,
}

#[derive(Debug, Deserialize)]
struct GlobalEvent {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let (commands, command_rx) = mpsc::channel(256);
    let core = tokio::spawn(core_loop::run_core(command_rx));

    let state = AppState {
        commands,
        next_client_id: Arc::new(AtomicU64::new(1)),
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/global-emit", post(global_emit))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("failed to parse bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    info!("dispatch gateway listening on http://{addr}");

    let server = axum::serve(listener, app.into_make_service());

    tokio::select! {
        result = server => result.context("server exited with error")?,
        _ = signal::ctrl_c() => {
            warn!("received Ctrl+C, shutting down");
        }
    }

    core.abort();
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt().with_env_filter(env_filter).try_init();
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let id = ClientId(state.next_client_id.fetch_add(1, Ordering::Relaxed));
    let commands = state.commands.clone();
    ws.on_upgrade(move |socket| session::serve_socket(socket, id, params.role, commands))
}

async fn global_emit(
    State(state): State<AppState>,
    Json(body): Json<GlobalEvent>,
) -> StatusCode {
    if body.event.trim().is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }
    match state
        .commands
        .send(Command::EmitNamed {
            event: body.event,
            data: body.data,
        })
        .await
    {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn healthz() -> &'static str {
    "ok"
}
