//! Wire protocol: event names and the `{event, data}` envelope.
//!
//! Inbound frames are JSON envelopes whose `event` selects the handler and
//! whose `data` carries the payload. Outbound events reuse the inbound name
//! where the reply answers a query (`get-trip-passenger` and friends) and
//! dedicated names for broadcasts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use dispatch_core::connection::Role;
use dispatch_core::event::{InboundKind, LocationUpdate, TripChangePatch, TripRequest};
use dispatch_core::outbox::OutboundPayload;

// Inbound events
pub const REQUEST_TRIP: &str = "request-trip";
pub const ACCEPT_TRIP: &str = "accept-trip";
pub const REJECT_TRIP: &str = "reject-trip";
pub const GET_TRIP_PASSENGER: &str = "get-trip-passenger";
pub const GET_TRIP_DRIVER: &str = "get-trip-driver";
pub const GET_MESSAGES_INCIDENTS: &str = "get-messages-incidents";
pub const DRIVER_LOCATION: &str = "driver-location";
pub const LOCATION_DRIVER_SEND: &str = "location-driver-send";
pub const LOCATION_PASSENGER_SEND: &str = "location-passenger-send";
pub const SEND_CHANGE_TRIP: &str = "send-change-trip";
pub const CANCEL_TRIP_PASSENGER: &str = "cancel-trip-passenger";
pub const CANCEL_TRIP_DRIVER: &str = "cancel-trip-driver";
pub const INCIDENT_SEND_PASSENGER: &str = "incident-send-passenger";
pub const INCIDENT_SEND_DRIVER: &str = "incident-send-driver";
pub const MESSAGE_SEND_PASSENGER: &str = "message-send-passenger";
pub const MESSAGE_SEND_DRIVER: &str = "message-send-driver";

// Outbound-only events
pub const DRIVER_LOCATION_UPDATE: &str = "driver-location-update";
pub const PASSENGER_LOCATION_UPDATE: &str = "passenger-location-update";
pub const TRIP_AVAILABLE: &str = "trip-available";
pub const TRIP_INCIDENT: &str = "trip-incident";
pub const TRIP_MESSAGE: &str = "trip-message";
pub const ALL_MESSAGES: &str = "all-messages";
pub const REQUEST_ERROR: &str = "request-error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a valid envelope: {0}")]
    BadFrame(serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("bad payload for '{event}': {source}")]
    BadPayload {
        event: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct TripIdPayload {
    trip_id: String,
}

#[derive(Debug, Deserialize)]
struct RejectPayload {
    trip_id: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    text: String,
}

fn payload<T: serde::de::DeserializeOwned>(event: &str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::BadPayload {
        event: event.to_string(),
        source,
    })
}

/// Parses one inbound text frame into the core's event type.
pub fn decode(text: &str) -> Result<InboundKind, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(ProtocolError::BadFrame)?;
    let Envelope { event, data } = envelope;
    let kind = match event.as_str() {
        REQUEST_TRIP => InboundKind::RequestTrip(payload::<TripRequest>(&event, data)?),
        ACCEPT_TRIP => {
            let p: TripIdPayload = payload(&event, data)?;
            InboundKind::AcceptTrip { trip_id: p.trip_id }
        }
        REJECT_TRIP => {
            let p: RejectPayload = payload(&event, data)?;
            InboundKind::RejectTrip {
                trip_id: p.trip_id,
                reason: p.reason,
            }
        }
        GET_TRIP_PASSENGER => InboundKind::GetTripPassenger,
        GET_TRIP_DRIVER => InboundKind::GetTripDriver,
        GET_MESSAGES_INCIDENTS => InboundKind::GetMessagesIncidents,
        DRIVER_LOCATION | LOCATION_DRIVER_SEND => {
            InboundKind::DriverLocation(payload::<LocationUpdate>(&event, data)?)
        }
        LOCATION_PASSENGER_SEND => {
            InboundKind::PassengerLocation(payload::<LocationUpdate>(&event, data)?)
        }
        SEND_CHANGE_TRIP => InboundKind::ChangeTrip(payload::<TripChangePatch>(&event, data)?),
        CANCEL_TRIP_PASSENGER => InboundKind::CancelTrip {
            by: Role::Passenger,
        },
        CANCEL_TRIP_DRIVER => InboundKind::CancelTrip { by: Role::Driver },
        INCIDENT_SEND_PASSENGER => InboundKind::SendIncident {
            actor: Role::Passenger,
            text: payload::<TextPayload>(&event, data)?.text,
        },
        INCIDENT_SEND_DRIVER => InboundKind::SendIncident {
            actor: Role::Driver,
            text: payload::<TextPayload>(&event, data)?.text,
        },
        MESSAGE_SEND_PASSENGER => InboundKind::SendMessage {
            actor: Role::Passenger,
            text: payload::<TextPayload>(&event, data)?.text,
        },
        MESSAGE_SEND_DRIVER => InboundKind::SendMessage {
            actor: Role::Driver,
            text: payload::<TextPayload>(&event, data)?.text,
        },
        _ => return Err(ProtocolError::UnknownEvent(event)),
    };
    Ok(kind)
}

/// Maps one core emission to its wire envelope.
pub fn encode(payload: &OutboundPayload) -> Result<Envelope, serde_json::Error> {
    let (event, data) = match payload {
        OutboundPayload::TripForPassenger(snapshot) => {
            (GET_TRIP_PASSENGER, serde_json::to_value(snapshot)?)
        }
        OutboundPayload::TripForDriver(snapshot) => {
            (GET_TRIP_DRIVER, serde_json::to_value(snapshot)?)
        }
        OutboundPayload::TripChanged(change) => (SEND_CHANGE_TRIP, serde_json::to_value(change)?),
        OutboundPayload::DriverLocation(update) => {
            (DRIVER_LOCATION_UPDATE, serde_json::to_value(update)?)
        }
        OutboundPayload::PassengerLocation(update) => {
            (PASSENGER_LOCATION_UPDATE, serde_json::to_value(update)?)
        }
        OutboundPayload::OfferAvailable(offer) => (TRIP_AVAILABLE, serde_json::to_value(offer)?),
        OutboundPayload::IncidentRecorded(incident) => {
            (TRIP_INCIDENT, serde_json::to_value(incident)?)
        }
        OutboundPayload::MessageRecorded(message) => {
            (TRIP_MESSAGE, serde_json::to_value(message)?)
        }
        OutboundPayload::Feed(feed) => (ALL_MESSAGES, serde_json::to_value(feed)?),
        OutboundPayload::RequestError { message } => (
            REQUEST_ERROR,
            serde_json::json!({ "message": message }),
        ),
        OutboundPayload::Named { event, data } => {
            return Ok(Envelope {
                event: event.clone(),
                data: data.clone(),
            })
        }
    };
    Ok(Envelope {
        event: event.to_string(),
        data,
    })
}

/// A `request-error` envelope for frames rejected before reaching the core.
pub fn error_frame(error: &ProtocolError) -> String {
    let envelope = Envelope {
        event: REQUEST_ERROR.to_string(),
        data: serde_json::json!({ "message": error.to_string() }),
    };
    // Serializing a string-keyed object cannot fail.
    serde_json::to_string(&envelope).unwrap_or_default()
}
