use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind};
use crate::matching::PendingOffers;
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::{TripAggregate, TripStatus};

/// First accept wins. Accepting an unknown or already-resolved offer is a
/// no-op: nothing mutates, nothing is emitted.
pub fn accept_trip_system(
    event: Res<CurrentEvent>,
    mut trip: ResMut<TripAggregate>,
    mut offers: ResMut<PendingOffers>,
    mut clock: ResMut<DispatchClock>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::AcceptTrip { trip_id } = &event.0.kind else {
        return;
    };
    if offers.accept(trip_id).is_none() {
        return;
    }
    clock.cancel(trip_id);

    trip.change.set_status(TripStatus::DriverAccepted);
    trip.assigned_driver = Some(event.0.origin);
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}
