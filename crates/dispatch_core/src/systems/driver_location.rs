use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind, LocationUpdate};
use crate::geo;
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::{CarLocation, TripAggregate};

/// Every driver position report rebroadcasts the location and advances the
/// simulated progress sequence by one step. Simulated progress: the actual
/// distance to pickup is never inspected.
pub fn driver_location_system(
    event: Res<CurrentEvent>,
    clock: Res<DispatchClock>,
    mut trip: ResMut<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::DriverLocation(update) = &event.0.kind else {
        return;
    };
    if !geo::is_valid_coords(update.lat, update.lon) {
        outbox.unicast(
            event.0.origin,
            OutboundPayload::RequestError {
                message: "driver location coordinates out of range".to_string(),
            },
        );
        return;
    }

    trip.car_location = CarLocation {
        lat: update.lat,
        lon: update.lon,
    };
    trip.advance_from_location();

    let stamped = LocationUpdate {
        timestamp_ms: Some(update.timestamp_ms.unwrap_or_else(|| clock.now())),
        ..*update
    };
    outbox.broadcast(OutboundPayload::DriverLocation(stamped));
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}
