//! Per-connection socket handling.
//!
//! Each WebSocket gets a reader (this function) and a writer task. The
//! writer drains the per-connection channel the core fans out into; the
//! reader decodes frames into commands. Malformed frames are answered on
//! this socket only and never reach the core.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use dispatch_core::connection::{ClientId, Role};

use crate::core_loop::{outbound_channel, Command};
use crate::protocol;

pub async fn serve_socket(
    socket: WebSocket,
    id: ClientId,
    role: Role,
    commands: mpsc::Sender<Command>,
) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = outbound_channel();

    if commands
        .send(Command::Attach {
            id,
            role,
            sender: out_tx.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match protocol::decode(&text) {
                Ok(kind) => {
                    if commands
                        .send(Command::Inbound { origin: id, kind })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(err) => {
                    debug!(client = %id, %err, "rejecting malformed frame");
                    if out_tx.send(protocol::error_frame(&err)).await.is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum; binary frames are not part of the
            // protocol.
            Ok(_) => {}
            Err(err) => {
                debug!(client = %id, %err, "socket read failed");
                break;
            }
        }
    }

    let _ = commands.send(Command::Detach { id }).await;
    writer.abort();
}
