use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind, LocationUpdate};
use crate::geo;
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::TripAggregate;

/// Passenger positions are rebroadcast but never advance the trip; the
/// sender gets the current trip change echoed back.
pub fn passenger_location_system(
    event: Res<CurrentEvent>,
    clock: Res<DispatchClock>,
    trip: Res<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::PassengerLocation(update) = &event.0.kind else {
        return;
    };
    if !geo::is_valid_coords(update.lat, update.lon) {
        outbox.unicast(
            event.0.origin,
            OutboundPayload::RequestError {
                message: "passenger location coordinates out of range".to_string(),
            },
        );
        return;
    }

    let stamped = LocationUpdate {
        timestamp_ms: Some(update.timestamp_ms.unwrap_or_else(|| clock.now())),
        ..*update
    };
    outbox.broadcast(OutboundPayload::PassengerLocation(stamped));
    outbox.unicast(
        event.0.origin,
        OutboundPayload::TripChanged(trip.change.clone()),
    );
}
