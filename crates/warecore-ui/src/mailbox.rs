//! The bounded MPSC mailbox external collaborators use to hand events
//! to the core (§5), plus the broadcast channel the core uses to fan
//! outbound events back out to every connected collaborator.

use tokio::sync::{broadcast, mpsc};
use warecore_sim::{InboundEvent, OutboundEvent};

const INBOUND_CAPACITY: usize = 256;
const OUTBOUND_CAPACITY: usize = 1024;

/// Cheaply `Clone`-able handle to the mailbox's send sides, shared
/// across every WebSocket connection's axum handler task.
#[derive(Clone)]
pub struct Mailbox {
    inbound_tx: mpsc::Sender<InboundEvent>,
    outbound_tx: broadcast::Sender<OutboundEvent>,
}

impl Mailbox {
    /// Builds a mailbox and hands back the inbound receiver separately -
    /// there is exactly one reader (the engine task), so it isn't part
    /// of the cloneable handle.
    pub fn new() -> (Self, mpsc::Receiver<InboundEvent>) {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let (outbound_tx, _) = broadcast::channel(OUTBOUND_CAPACITY);
        (Self { inbound_tx, outbound_tx }, inbound_rx)
    }

    pub fn inbound_sender(&self) -> mpsc::Sender<InboundEvent> {
        self.inbound_tx.clone()
    }

    pub fn outbound_sender(&self) -> broadcast::Sender<OutboundEvent> {
        self.outbound_tx.clone()
    }

    pub fn subscribe_outbound(&self) -> broadcast::Receiver<OutboundEvent> {
        self.outbound_tx.subscribe()
    }
}
