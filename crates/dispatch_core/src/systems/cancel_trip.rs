use bevy_ecs::prelude::{Res, ResMut};

use crate::connection::Role;
use crate::event::{CurrentEvent, InboundKind};
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::{CancelBehavior, TripAggregate, TripStatus};

/// Cancels the active trip from any non-terminal state; in a terminal state
/// the event is ignored. Marking the passenger as boarded on cancellation
/// is kept for client compatibility (see [CancelBehavior]).
pub fn cancel_trip_system(
    event: Res<CurrentEvent>,
    behavior: Res<CancelBehavior>,
    mut trip: ResMut<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::CancelTrip { by } = &event.0.kind else {
        return;
    };
    if trip.change.status.is_terminal() {
        return;
    }

    let status = match by {
        Role::Passenger => TripStatus::TripCancelled,
        Role::Driver => TripStatus::TripCancelledByDriver,
    };
    trip.change.set_status(status);
    if !behavior.preserve_boarded {
        trip.change.passenger_boarded = true;
    }
    trip.change.payment_confirmed = false;
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}
