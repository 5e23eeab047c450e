//! Role-shaped trip snapshots.
//!
//! Pure reshaping of the aggregate and logs into what each side of the trip
//! is allowed to see: passengers get the driver's profile and car position,
//! drivers get the passenger's profile.

use serde::{Deserialize, Serialize};

use crate::log::{Incident, Message, TripFeed, TripLog};
use crate::trip::{
    CarLocation, DriverProfile, PassengerProfile, Payment, TripAggregate, TripChange,
    TripFilters, TripStops,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTripPassenger {
    pub service_id: String,
    pub stops: TripStops,
    pub driver_profile: DriverProfile,
    pub car_location: CarLocation,
    pub change: TripChange,
    pub filters: TripFilters,
    pub payment: Payment,
    pub incidents: Vec<Incident>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTripDriver {
    pub service_id: String,
    pub stops: TripStops,
    pub passenger_profile: PassengerProfile,
    pub change: TripChange,
    pub filters: TripFilters,
    pub payment: Payment,
    pub incidents: Vec<Incident>,
    pub messages: Vec<Message>,
}

pub fn passenger_snapshot(trip: &TripAggregate, log: &TripLog) -> SendTripPassenger {
    SendTripPassenger {
        service_id: trip.service_id.clone(),
        stops: trip.stops.clone(),
        driver_profile: trip.driver_profile.clone(),
        car_location: trip.car_location,
        change: trip.change.clone(),
        filters: trip.filters,
        payment: trip.payment.clone(),
        incidents: log.incidents().to_vec(),
        messages: log.messages().to_vec(),
    }
}

pub fn driver_snapshot(trip: &TripAggregate, log: &TripLog) -> SendTripDriver {
    SendTripDriver {
        service_id: trip.service_id.clone(),
        stops: trip.stops.clone(),
        passenger_profile: trip.passenger_profile.clone(),
        change: trip.change.clone(),
        filters: trip.filters,
        payment: trip.payment.clone(),
        incidents: log.incidents().to_vec(),
        messages: log.messages().to_vec(),
    }
}

pub fn feed_snapshot(trip: &TripAggregate, log: &TripLog) -> TripFeed {
    TripFeed {
        messages: log.messages().to_vec(),
        incidents: log.incidents().to_vec(),
        message_count: log.message_count(),
        incident_count: log.incident_count(),
        change: trip.change.clone(),
    }
}
