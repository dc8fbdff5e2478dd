//! The core's side of the mailbox (§5): drains inbound events, applies
//! them under the single world lock, steps the `Warehouse`, and
//! broadcasts what happened. Runs until the mailbox is closed or a
//! `Stop`/`Exit` event arrives.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex};
use warecore_sim::{submit_order_ack, InboundEvent, OutboundEvent, Warehouse};

pub async fn run(
    world: Arc<Mutex<Warehouse>>,
    mut inbound: mpsc::Receiver<InboundEvent>,
    outbound: broadcast::Sender<OutboundEvent>,
) {
    let mut paused = false;

    loop {
        let Some(event) = inbound.recv().await else {
            break; // every sender dropped - no collaborator can reach us anymore
        };

        let submit_request = event.clone().into_submit_request();

        match event {
            InboundEvent::Pause => {
                paused = true;
                continue;
            }
            InboundEvent::Resume => paused = false,
            InboundEvent::Stop | InboundEvent::Exit => break,
            InboundEvent::RobotEvent { .. } => {
                // A full hardware link would clear the named agent's
                // outstanding-action slot here (§5's at-most-one
                // outstanding action per robot); out of scope for this
                // sketch.
            }
            InboundEvent::SubmitOrder { .. } => {
                if let Some(request) = submit_request {
                    let result = {
                        let mut warehouse = world.lock().await;
                        warehouse.submit_order(request)
                    };
                    let _ = outbound.send(submit_order_ack(&result));
                }
            }
        }

        if paused {
            continue;
        }

        let actions = {
            let mut warehouse = world.lock().await;
            warehouse.tick();
            actions_for_in_flight_agents(&warehouse)
        };
        for action in actions {
            let _ = outbound.send(action);
        }
    }
}

/// §5: at most one outstanding action per robot, so the head of each
/// agent's committed plan is exactly what gets emitted this tick.
fn actions_for_in_flight_agents(warehouse: &Warehouse) -> Vec<OutboundEvent> {
    warehouse
        .agents
        .values()
        .filter_map(|agent| agent.plan.front().map(|action| OutboundEvent::ActionFor { agent_id: agent.id, action: *action }))
        .collect()
}
