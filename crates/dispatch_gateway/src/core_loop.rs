//! The core-owning task.
//!
//! Exactly one task owns the dispatch `World`; connections and the HTTP
//! relay talk to it through a command channel, and the offer-expiry timer is
//! this task's own `select!` arm. That single ownership is the concurrency
//! story: no mutation of trip state ever races another.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use dispatch_core::connection::{ClientId, Role};
use dispatch_core::event::InboundKind;
use dispatch_core::outbox::{OutboundEvent, Target};
use dispatch_core::runner::{
    build_dispatch_world, dispatch_schedule, emit_named, expire_due_offers, handle_event,
    next_deadline_ms,
};

use crate::protocol;

/// Frames queued per connection before the gateway starts dropping.
const OUTBOUND_BUFFER: usize = 64;

pub fn outbound_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOUND_BUFFER)
}

#[derive(Debug)]
pub enum Command {
    Attach {
        id: ClientId,
        role: Role,
        sender: mpsc::Sender<String>,
    },
    Detach {
        id: ClientId,
    },
    Inbound {
        origin: ClientId,
        kind: InboundKind,
    },
    EmitNamed {
        event: String,
        data: serde_json::Value,
    },
}

/// Wall clock as epoch milliseconds; the core itself never reads time.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Runs until the command channel closes.
pub async fn run_core(mut commands: mpsc::Receiver<Command>) {
    let mut world = build_dispatch_world();
    let mut schedule = dispatch_schedule();
    let mut registry: HashMap<ClientId, mpsc::Sender<String>> = HashMap::new();

    loop {
        let deadline = next_deadline_ms(&mut world);
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Attach { id, role, sender } => {
                        registry.insert(id, sender);
                        info!(client = %id, ?role, "client attached");
                        let out = handle_event(
                            &mut world,
                            &mut schedule,
                            id,
                            InboundKind::Connected { role },
                            now_ms(),
                        );
                        fan_out(&registry, out);
                    }
                    Command::Detach { id } => {
                        // The core sees the disconnect before the sender is
                        // dropped so in-flight emissions still resolve ids.
                        let out = handle_event(
                            &mut world,
                            &mut schedule,
                            id,
                            InboundKind::Disconnected,
                            now_ms(),
                        );
                        fan_out(&registry, out);
                        registry.remove(&id);
                        info!(client = %id, "client detached");
                    }
                    Command::Inbound { origin, kind } => {
                        let out = handle_event(&mut world, &mut schedule, origin, kind, now_ms());
                        fan_out(&registry, out);
                    }
                    Command::EmitNamed { event, data } => {
                        debug!(%event, "relaying global event");
                        let out = emit_named(&mut world, event, data);
                        fan_out(&registry, out);
                    }
                }
            }
            _ = sleep_until(deadline) => {
                let out = expire_due_offers(&mut world, &mut schedule, now_ms());
                fan_out(&registry, out);
            }
        }
    }
}

async fn sleep_until(deadline_ms: Option<u64>) {
    match deadline_ms {
        Some(at) => {
            tokio::time::sleep(Duration::from_millis(at.saturating_sub(now_ms()))).await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn fan_out(registry: &HashMap<ClientId, mpsc::Sender<String>>, events: Vec<OutboundEvent>) {
    for event in events {
        let envelope = match protocol::encode(&event.payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%err, "failed to encode outbound event");
                continue;
            }
        };
        let text = match serde_json::to_string(&envelope) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "failed to serialize outbound envelope");
                continue;
            }
        };
        match event.target {
            Target::All => {
                for (id, sender) in registry {
                    send_one(id, sender, &text);
                }
            }
            Target::Client(id) => {
                if let Some(sender) = registry.get(&id) {
                    send_one(&id, sender, &text);
                }
            }
            Target::Clients(ids) => {
                for id in ids {
                    if let Some(sender) = registry.get(&id) {
                        send_one(&id, sender, &text);
                    }
                }
            }
        }
    }
}

fn send_one(id: &ClientId, sender: &mpsc::Sender<String>, text: &str) {
    // A full buffer means a slow or gone client; dropping its frame must not
    // stall the core.
    if sender.try_send(text.to_string()).is_err() {
        warn!(client = %id, "dropping outbound frame for slow client");
    }
}
