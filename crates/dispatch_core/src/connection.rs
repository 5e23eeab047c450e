//! Connected clients as ECS entities.
//!
//! The transport registers one entity per live connection; nothing on the
//! entity is authoritative trip state, so despawning on disconnect rolls
//! back nothing.

use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Transport-assigned connection identity.
///
/// Id 0 is reserved for the internal scheduler origin (offer deadlines);
/// transports hand out ids from 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ClientId(pub u64);

impl ClientId {
    pub const SCHEDULER: ClientId = ClientId(0);
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Which side of the trip a connection (or a log entry's author) is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Passenger,
    Driver,
}

/// One connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct ClientConn {
    pub id: ClientId,
    pub role: Role,
}
