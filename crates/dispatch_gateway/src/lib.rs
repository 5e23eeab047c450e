//! WebSocket fan-out boundary for the dispatch core.
//!
//! The binary in `main.rs` wires an axum server around these modules: every
//! client holds one duplex connection, every inbound frame becomes a command
//! for the single core-owning task, and every outbound event is fanned out
//! through per-connection channels.

pub mod core_loop;
pub mod protocol;
pub mod session;
