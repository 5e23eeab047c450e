use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::DispatchClock;
use crate::connection::{ClientConn, ClientId, Role};
use crate::error::DispatchError;
use crate::event::{CurrentEvent, InboundKind, TripRequest};
use crate::geo;
use crate::log::TripLog;
use crate::matching::{
    DriverSelectorResource, OfferRouting, OfferStatus, PendingOffers, TripIdSource, TripOffer,
    OFFER_TTL_MS,
};
use crate::outbox::{Outbox, OutboundPayload};
use crate::pricing;
use crate::trip::TripAggregate;

fn validate_request(request: &TripRequest) -> Result<(), DispatchError> {
    if !geo::is_valid_coords(request.pickup.lat, request.pickup.lon) {
        return Err(DispatchError::InvalidInput(
            "pickup coordinates out of range".to_string(),
        ));
    }
    if !geo::is_valid_coords(request.dropoff.lat, request.dropoff.lon) {
        return Err(DispatchError::InvalidInput(
            "dropoff coordinates out of range".to_string(),
        ));
    }
    Ok(())
}

/// Starts a new trip: resets the aggregate and logs, prices the route and
/// routes a 30-second offer to drivers. A request is honored from any state;
/// the previous trip is simply replaced.
#[allow(clippy::too_many_arguments)]
pub fn request_trip_system(
    event: Res<CurrentEvent>,
    mut trip: ResMut<TripAggregate>,
    mut log: ResMut<TripLog>,
    mut offers: ResMut<PendingOffers>,
    mut clock: ResMut<DispatchClock>,
    mut ids: ResMut<TripIdSource>,
    selector: Res<DriverSelectorResource>,
    mut outbox: ResMut<Outbox>,
    conns: Query<&ClientConn>,
) {
    let InboundKind::RequestTrip(request) = &event.0.kind else {
        return;
    };
    let origin = event.0.origin;

    if let Err(err) = validate_request(request) {
        outbox.unicast(
            origin,
            OutboundPayload::RequestError {
                message: err.to_string(),
            },
        );
        return;
    }

    trip.start_new(
        request.pickup.clone(),
        request.dropoff.clone(),
        request.passenger.clone(),
    );
    log.clear();

    let distance_km = geo::distance_km(
        request.pickup.lat,
        request.pickup.lon,
        request.dropoff.lat,
        request.dropoff.lon,
    );
    let fare = pricing::estimate_fare(distance_km);
    trip.payment.amount_passenger = fare;
    trip.payment.amount_driver = fare;

    let drivers: Vec<ClientId> = conns
        .iter()
        .filter(|conn| conn.role == Role::Driver)
        .map(|conn| conn.id)
        .collect();
    let routing = selector.route(&drivers);

    let now = clock.now();
    let offer = TripOffer {
        trip_id: ids.next_trip_id(),
        requester: origin,
        passenger_name: request.passenger.full_name.clone(),
        passenger_rating: request.passenger.rating,
        pickup: request.pickup.clone(),
        dropoff: request.dropoff.clone(),
        estimated_distance_km: distance_km,
        estimated_duration_min: pricing::estimate_duration_min(distance_km),
        estimated_fare: fare,
        requested_at_ms: now,
        expires_at_ms: now + OFFER_TTL_MS,
        status: OfferStatus::Pending,
        target: match &routing {
            OfferRouting::Unicast(driver) => Some(*driver),
            OfferRouting::Broadcast(_) => None,
        },
        reject_reason: None,
    };
    clock.schedule_expiry(&offer.trip_id, offer.expires_at_ms);
    offers.insert(offer.clone());

    outbox.unicast(origin, OutboundPayload::TripChanged(trip.change.clone()));
    match routing {
        OfferRouting::Unicast(driver) => {
            outbox.unicast(driver, OutboundPayload::OfferAvailable(offer));
        }
        OfferRouting::Broadcast(drivers) => {
            outbox.multicast(drivers, OutboundPayload::OfferAvailable(offer));
        }
    }
}
