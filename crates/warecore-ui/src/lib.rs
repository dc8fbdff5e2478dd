//! Warecore UI - the deploy-mode external transport (§5/§6). Moves the
//! core's abstract inbound/outbound message contract over a WebSocket,
//! behind a single `Mutex<Warehouse>` world lock. Intentionally a thin
//! sketch, not the generalised workspace's embedded dashboard: message
//! decoding for a frontend UI and the hardware robot link are out of
//! scope (§1 Non-goals).

pub mod engine;
pub mod mailbox;
pub mod server;

pub use mailbox::Mailbox;
pub use server::{run_server, ServerConfig};
