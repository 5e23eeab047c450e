use bevy_ecs::prelude::{Res, ResMut};

use crate::event::{CurrentEvent, InboundKind};
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::TripAggregate;

/// Manual override: applies exactly the fields present in the patch, with no
/// validation against the transition graph. Any status is reachable from any
/// other; this is deliberate (test/ops control).
pub fn change_trip_system(
    event: Res<CurrentEvent>,
    mut trip: ResMut<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::ChangeTrip(patch) = &event.0.kind else {
        return;
    };
    if let Some(status) = patch.status {
        trip.change.set_status(status);
    }
    if let Some(boarded) = patch.passenger_boarded {
        trip.change.passenger_boarded = boarded;
    }
    if let Some(confirmed) = patch.payment_confirmed {
        trip.change.payment_confirmed = confirmed;
    }
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}
