//! Deploy-mode HTTP/WebSocket transport: a single `/ws` upgrade moves
//! inbound and outbound events in both directions, fanned out through
//! the `Mailbox`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use warecore_sim::{InboundEvent, Warehouse};

use crate::mailbox::Mailbox;

/// Transport configuration. Deliberately just a port - there is no
/// session bookkeeping or static asset serving here, only the `/ws`
/// mailbox bridge.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Clone)]
struct AppState {
    mailbox: Mailbox,
}

async fn health() -> &'static str {
    "ok"
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut outbound = state.mailbox.subscribe_outbound();

    let send_task = tokio::spawn(async move {
        while let Ok(event) = outbound.recv().await {
            let Ok(json) = serde_json::to_string(&event) else { continue };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let inbound_tx = state.mailbox.inbound_sender();
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            if let Ok(event) = serde_json::from_str::<InboundEvent>(&text) {
                if inbound_tx.send(event).await.is_err() {
                    break;
                }
            }
        }
    }

    send_task.abort();
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    Router::new().route("/healthz", get(health)).route("/ws", get(websocket_handler)).layer(cors).with_state(state)
}

/// Serves the deploy-mode transport until the mailbox's engine task
/// exits (on a `Stop`/`Exit` event, or once every inbound sender is
/// dropped).
pub async fn run_server(config: ServerConfig, world: Arc<Mutex<Warehouse>>) -> anyhow::Result<()> {
    let (mailbox, inbound_rx) = Mailbox::new();
    let engine = tokio::spawn(crate::engine::run(world, inbound_rx, mailbox.outbound_sender()));

    let state = Arc::new(AppState { mailbox });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("warecore deploy transport listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = engine.await;
        })
        .await?;

    Ok(())
}
