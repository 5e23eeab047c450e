//! Append-only incident and message logs for the active trip.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::connection::Role;
use crate::trip::TripChange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: u64,
    pub actor: Role,
    pub text: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub actor: Role,
    pub text: String,
    pub timestamp_ms: u64,
}

/// Both logs in insertion order. Entries are never mutated or removed while
/// the trip lives; the whole log is cleared when a new trip begins.
#[derive(Debug, Default, Resource)]
pub struct TripLog {
    messages: Vec<Message>,
    incidents: Vec<Incident>,
    next_message_id: u64,
    next_incident_id: u64,
}

impl TripLog {
    pub fn record_incident(&mut self, actor: Role, text: String, timestamp_ms: u64) -> Incident {
        self.next_incident_id += 1;
        let incident = Incident {
            id: self.next_incident_id,
            actor,
            text,
            timestamp_ms,
        };
        self.incidents.push(incident.clone());
        incident
    }

    pub fn record_message(&mut self, actor: Role, text: String, timestamp_ms: u64) -> Message {
        self.next_message_id += 1;
        let message = Message {
            id: self.next_message_id,
            actor,
            text,
            timestamp_ms,
        };
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn message_count(&self) -> u32 {
        self.messages.len() as u32
    }

    pub fn incident_count(&self) -> u32 {
        self.incidents.len() as u32
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.incidents.clear();
        self.next_message_id = 0;
        self.next_incident_id = 0;
    }
}

/// Read-only snapshot returned to the requesting connection only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripFeed {
    pub messages: Vec<Message>,
    pub incidents: Vec<Incident>,
    pub message_count: u32,
    pub incident_count: u32,
    pub change: TripChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order_across_actors() {
        let mut log = TripLog::default();
        log.record_message(Role::Passenger, "on my way down".into(), 1_000);
        log.record_message(Role::Driver, "waiting outside".into(), 2_000);
        log.record_message(Role::Passenger, "two minutes".into(), 3_000);

        let ids: Vec<u64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(log.messages()[1].actor, Role::Driver);
    }

    #[test]
    fn incident_and_message_counters_are_independent() {
        let mut log = TripLog::default();
        log.record_incident(Role::Driver, "flat tire".into(), 1_000);
        log.record_message(Role::Passenger, "everything ok?".into(), 2_000);

        assert_eq!(log.incident_count(), 1);
        assert_eq!(log.message_count(), 1);
        assert_eq!(log.incidents()[0].id, 1);
        assert_eq!(log.messages()[0].id, 1);
    }

    #[test]
    fn clear_resets_ids_for_the_next_trip() {
        let mut log = TripLog::default();
        log.record_incident(Role::Passenger, "wrong pickup point".into(), 1_000);
        log.clear();

        assert!(log.incidents().is_empty());
        let incident = log.record_incident(Role::Passenger, "again".into(), 2_000);
        assert_eq!(incident.id, 1);
    }
}
