//! Outbound events collected during a dispatch step.
//!
//! Systems never talk to the transport; they push here and the runner hands
//! the drained batch back to the caller. Emission order within a step is
//! preserved, which is what gives a single connection in-order delivery of
//! the events it triggered.

use bevy_ecs::prelude::Resource;

use crate::connection::ClientId;
use crate::event::LocationUpdate;
use crate::log::{Incident, Message, TripFeed};
use crate::matching::TripOffer;
use crate::payload::{SendTripDriver, SendTripPassenger};
use crate::trip::TripChange;

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Every connected client.
    All,
    /// Exactly one connection.
    Client(ClientId),
    /// An explicit set of connections (role fan-out is expanded to ids
    /// inside the core, so the transport only maps id to sender).
    Clients(Vec<ClientId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    TripForPassenger(SendTripPassenger),
    TripForDriver(SendTripDriver),
    TripChanged(TripChange),
    DriverLocation(LocationUpdate),
    PassengerLocation(LocationUpdate),
    OfferAvailable(TripOffer),
    IncidentRecorded(Incident),
    MessageRecorded(Message),
    Feed(TripFeed),
    /// Validation failure, reported to the originating connection only.
    RequestError { message: String },
    /// Generic relay: both the event name and the payload are
    /// caller-supplied.
    Named {
        event: String,
        data: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub target: Target,
    pub payload: OutboundPayload,
}

#[derive(Debug, Default, Resource)]
pub struct Outbox {
    events: Vec<OutboundEvent>,
}

impl Outbox {
    pub fn broadcast(&mut self, payload: OutboundPayload) {
        self.events.push(OutboundEvent {
            target: Target::All,
            payload,
        });
    }

    pub fn unicast(&mut self, to: ClientId, payload: OutboundPayload) {
        self.events.push(OutboundEvent {
            target: Target::Client(to),
            payload,
        });
    }

    pub fn multicast(&mut self, to: Vec<ClientId>, payload: OutboundPayload) {
        self.events.push(OutboundEvent {
            target: Target::Clients(to),
            payload,
        });
    }

    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
