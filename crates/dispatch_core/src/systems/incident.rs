use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind};
use crate::log::TripLog;
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::TripAggregate;

/// Appends an incident and broadcasts it together with the updated trip
/// change as one logical unit, incident first.
pub fn incident_system(
    event: Res<CurrentEvent>,
    clock: Res<DispatchClock>,
    mut log: ResMut<TripLog>,
    mut trip: ResMut<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::SendIncident { actor, text } = &event.0.kind else {
        return;
    };
    if text.trim().is_empty() {
        outbox.unicast(
            event.0.origin,
            OutboundPayload::RequestError {
                message: "incident text must not be empty".to_string(),
            },
        );
        return;
    }

    let incident = log.record_incident(*actor, text.clone(), clock.now());
    trip.change.incident_count = log.incident_count();

    outbox.broadcast(OutboundPayload::IncidentRecorded(incident));
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}
