//! Shared fixtures for dispatch tests.

use bevy_ecs::prelude::{Schedule, World};

use crate::connection::{ClientId, Role};
use crate::event::{InboundKind, LocationUpdate, TripRequest};
use crate::matching::{OfferStatus, TripIdSource, TripOffer, OFFER_TTL_MS};
use crate::runner::{build_dispatch_world, handle_event};
use crate::trip::{PassengerProfile, Stop};

/// Microcentro, Buenos Aires.
pub const PICKUP_LAT: f64 = -34.6037;
pub const PICKUP_LON: f64 = -58.3816;

/// Caballito, Buenos Aires.
pub const DROPOFF_LAT: f64 = -34.6157;
pub const DROPOFF_LON: f64 = -58.4333;

/// A dispatch world with a seeded trip-id source so ids are reproducible.
pub fn test_world() -> World {
    let mut world = build_dispatch_world();
    world.insert_resource(TripIdSource::from_seed(42));
    world
}

/// Registers a connection by driving the `Connected` event through the
/// schedule, exactly as a transport would.
pub fn connect(world: &mut World, schedule: &mut Schedule, id: ClientId, role: Role) {
    handle_event(world, schedule, id, InboundKind::Connected { role }, 0);
}

/// Canonical trip request between the two test coordinates.
pub fn request_trip_kind() -> InboundKind {
    InboundKind::RequestTrip(TripRequest {
        pickup: Stop::new("Test Origin", PICKUP_LAT, PICKUP_LON, 0),
        dropoff: Stop::new("Test Destination", DROPOFF_LAT, DROPOFF_LON, 1),
        passenger: PassengerProfile::default(),
    })
}

/// A driver position report at the pickup point, with no client timestamp.
pub fn driver_location_kind() -> InboundKind {
    InboundKind::DriverLocation(LocationUpdate {
        lat: PICKUP_LAT,
        lon: PICKUP_LON,
        timestamp_ms: None,
    })
}

/// The trip id of the single pending offer in the world.
///
/// # Panics
///
/// Panics unless exactly one offer is pending.
pub fn pending_trip_id(world: &World) -> String {
    let offers = world.resource::<crate::matching::PendingOffers>();
    assert_eq!(offers.pending_count(), 1, "expected exactly one pending offer");
    offers
        .iter_pending()
        .next()
        .map(|offer| offer.trip_id.clone())
        .expect("pending offer")
}

/// A minimal pending offer for table-level tests.
pub fn pending_offer(trip_id: &str, requester: ClientId, now_ms: u64) -> TripOffer {
    TripOffer {
        trip_id: trip_id.to_string(),
        requester,
        passenger_name: "Demo Passenger".to_string(),
        passenger_rating: 4.5,
        pickup: Stop::new("Test Origin", PICKUP_LAT, PICKUP_LON, 0),
        dropoff: Stop::new("Test Destination", DROPOFF_LAT, DROPOFF_LON, 1),
        estimated_distance_km: 4.9,
        estimated_duration_min: 15,
        estimated_fare: 1715,
        requested_at_ms: now_ms,
        expires_at_ms: now_ms + OFFER_TTL_MS,
        status: OfferStatus::Pending,
        target: None,
        reject_reason: None,
    }
}
