//! Inbound events routed into the dispatch schedule.
//!
//! Event routing mirrors the runner: the transport (or the deadline queue)
//! hands one [Inbound] at a time to [crate::runner::handle_event], which
//! inserts it as [CurrentEvent] and runs the schedule. Systems are gated on
//! the event kind, so exactly the handlers for this kind run.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::connection::{ClientId, Role};
use crate::trip::{PassengerProfile, Stop, TripStatus};

/// A raw position report. Not persisted beyond the aggregate's car location;
/// a missing timestamp is filled with the clock before rebroadcast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

/// Payload of a passenger's trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub pickup: Stop,
    pub dropoff: Stop,
    #[serde(default)]
    pub passenger: PassengerProfile,
}

/// Partial trip-change override; only the fields present are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripChangePatch {
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(default)]
    pub passenger_boarded: Option<bool>,
    #[serde(default)]
    pub payment_confirmed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Connected { role: Role },
    Disconnected,
    RequestTrip(TripRequest),
    AcceptTrip { trip_id: String },
    RejectTrip { trip_id: String, reason: Option<String> },
    /// Internal: an offer's expiry deadline fired.
    OfferDeadline { trip_id: String },
    DriverLocation(LocationUpdate),
    PassengerLocation(LocationUpdate),
    ChangeTrip(TripChangePatch),
    CancelTrip { by: Role },
    SendIncident { actor: Role, text: String },
    SendMessage { actor: Role, text: String },
    GetTripPassenger,
    GetTripDriver,
    GetMessagesIncidents,
}

/// One inbound event with its originating connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub origin: ClientId,
    pub kind: InboundKind,
}

/// The event currently being routed through the schedule.
#[derive(Debug, Clone, Resource)]
pub struct CurrentEvent(pub Inbound);
