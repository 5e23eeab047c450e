//! The trip aggregate: the single authoritative record of the active trip.
//!
//! One process tracks exactly one trip at a time. The aggregate, the offer
//! table and the logs are resources owned by the dispatch `World`; starting a
//! new trip resets all of them.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::connection::ClientId;

/// Trip lifecycle states, in lifecycle order. Ordinal comparison is
/// meaningful: the location-driven progression rule relies on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TripStatus {
    Idle,
    Searching,
    DriverNotFound,
    DriverFound,
    DriverAccepted,
    DriverOnWay,
    DriverArrived,
    TripStarted,
    TripInProgress,
    TripCompleted,
    TripCancelled,
    TripCancelledByDriver,
    Error,
}

impl TripStatus {
    /// Human-readable mirror of the status, kept in
    /// [TripChange::status_text].
    pub fn text(self) -> &'static str {
        match self {
            TripStatus::Idle => "idle",
            TripStatus::Searching => "searching",
            TripStatus::DriverNotFound => "driverNotFound",
            TripStatus::DriverFound => "driverFound",
            TripStatus::DriverAccepted => "driverAccepted",
            TripStatus::DriverOnWay => "driverOnWay",
            TripStatus::DriverArrived => "driverArrived",
            TripStatus::TripStarted => "tripStarted",
            TripStatus::TripInProgress => "tripInProgress",
            TripStatus::TripCompleted => "tripCompleted",
            TripStatus::TripCancelled => "tripCancelled",
            TripStatus::TripCancelledByDriver => "tripCancelledByDriver",
            TripStatus::Error => "error",
        }
    }

    /// Terminal states are exited only by starting a brand-new trip.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TripStatus::TripCompleted
                | TripStatus::TripCancelled
                | TripStatus::TripCancelledByDriver
                | TripStatus::Error
        )
    }
}

/// The simulated progress sequence a driver location update advances through.
pub const PROGRESSION: [TripStatus; 5] = [
    TripStatus::DriverOnWay,
    TripStatus::DriverArrived,
    TripStatus::TripStarted,
    TripStatus::TripInProgress,
    TripStatus::TripCompleted,
];

/// Snapshot of trip progress, broadcast on every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripChange {
    pub status: TripStatus,
    pub status_text: String,
    pub passenger_boarded: bool,
    pub payment_confirmed: bool,
    pub message_count: u32,
    pub incident_count: u32,
}

impl TripChange {
    pub fn new(status: TripStatus) -> Self {
        Self {
            status,
            status_text: status.text().to_string(),
            passenger_boarded: false,
            payment_confirmed: false,
            message_count: 0,
            incident_count: 0,
        }
    }

    /// Every status write goes through here so `status_text` never drifts.
    pub fn set_status(&mut self, status: TripStatus) {
        self.status = status;
        self.status_text = status.text().to_string();
    }
}

impl Default for TripChange {
    fn default() -> Self {
        Self::new(TripStatus::Idle)
    }
}

/// One stop on the trip route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub reached: bool,
    #[serde(default)]
    pub index: u32,
}

impl Stop {
    pub fn new(address: impl Into<String>, lat: f64, lon: f64, index: u32) -> Self {
        Self {
            address: address.into(),
            lat,
            lon,
            reached: false,
            index,
        }
    }
}

/// Pickup, dropoff and any intermediate stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStops {
    pub start: Stop,
    pub end: Stop,
    pub vias: Vec<Stop>,
}

impl Default for TripStops {
    fn default() -> Self {
        Self {
            start: Stop::new("Demo Origin", -34.6037, -58.3816, 0),
            end: Stop::new("Demo Destination", -34.6157, -58.4333, 1),
            vias: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub driver_id: String,
    pub full_name: String,
    pub rating: f64,
    pub selfie: String,
    pub total_trips: u32,
    pub car_model: String,
    pub car_color: String,
    pub car_plate: String,
    pub phone: String,
}

impl Default for DriverProfile {
    fn default() -> Self {
        Self {
            driver_id: "driver-demo".to_string(),
            full_name: "Demo Driver".to_string(),
            rating: 4.5,
            selfie: "https://i.imgur.com/driver-demo.jpg".to_string(),
            total_trips: 100,
            car_model: "Toyota Corolla".to_string(),
            car_color: "White".to_string(),
            car_plate: "ABC-123".to_string(),
            phone: "+54 9 11 0000-0000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerProfile {
    pub passenger_id: String,
    pub full_name: String,
    pub rating: f64,
    pub selfie: String,
    pub total_trips: u32,
    pub phone: String,
}

impl Default for PassengerProfile {
    fn default() -> Self {
        Self {
            passenger_id: "passenger-demo".to_string(),
            full_name: "Demo Passenger".to_string(),
            rating: 4.5,
            selfie: "https://i.imgur.com/passenger-demo.jpg".to_string(),
            total_trips: 50,
            phone: "+54 9 11 0000-0000".to_string(),
        }
    }
}

/// Ride preference filters carried with the trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripFilters {
    pub luggage: bool,
    pub pets: bool,
    pub packages: bool,
    pub wheelchair: bool,
}

/// Payment terms; no processing logic beyond carrying the amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_type: String,
    pub amount_passenger: u32,
    pub amount_driver: u32,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            payment_type: "card".to_string(),
            amount_passenger: 0,
            amount_driver: 0,
        }
    }
}

/// Live driver position shared with passengers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarLocation {
    pub lat: f64,
    pub lon: f64,
}

impl Default for CarLocation {
    fn default() -> Self {
        Self {
            lat: -34.6037,
            lon: -58.3816,
        }
    }
}

/// Whether a passenger/driver cancellation marks the passenger as boarded.
///
/// The default sets `passenger_boarded = true` on every cancellation, even
/// before boarding. Existing clients depend on the quirk, which looks
/// inherited from the completion path rather than intended; the corrected
/// variant leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct CancelBehavior {
    pub preserve_boarded: bool,
}

/// The authoritative mutable record of the active trip.
#[derive(Debug, Clone, Resource)]
pub struct TripAggregate {
    pub service_id: String,
    pub stops: TripStops,
    pub driver_profile: DriverProfile,
    pub passenger_profile: PassengerProfile,
    pub car_location: CarLocation,
    pub change: TripChange,
    pub filters: TripFilters,
    pub payment: Payment,
    /// Driver connection that accepted the current offer, if any.
    pub assigned_driver: Option<ClientId>,
    /// Progression counter: selects the next simulated status on each driver
    /// location update. Reset on new trip and when the sequence completes.
    pub location_updates: u32,
}

impl Default for TripAggregate {
    fn default() -> Self {
        Self {
            service_id: "service-demo".to_string(),
            stops: TripStops::default(),
            driver_profile: DriverProfile::default(),
            passenger_profile: PassengerProfile::default(),
            car_location: CarLocation::default(),
            change: TripChange::default(),
            filters: TripFilters::default(),
            payment: Payment::default(),
            assigned_driver: None,
            location_updates: 0,
        }
    }
}

impl TripAggregate {
    /// Begins a brand-new trip in `Searching`: replaces the stops and
    /// requester profile and resets progress, counters and assignment.
    /// Message/incident logs are owned by [crate::log::TripLog] and are
    /// cleared by the request handler alongside this call.
    pub fn start_new(&mut self, pickup: Stop, dropoff: Stop, passenger: PassengerProfile) {
        self.stops = TripStops {
            start: pickup,
            end: dropoff,
            vias: Vec::new(),
        };
        self.passenger_profile = passenger;
        self.change = TripChange::new(TripStatus::Searching);
        self.payment = Payment::default();
        self.assigned_driver = None;
        self.location_updates = 0;
    }

    /// Advances the simulated progress sequence by one driver location
    /// update and returns the newly selected status.
    ///
    /// `passenger_boarded` holds exactly for statuses at or past
    /// `TripStarted`; `payment_confirmed` exactly at `TripCompleted`.
    /// Reaching the end of the sequence resets the counter so the next
    /// update begins a fresh cycle.
    pub fn advance_from_location(&mut self) -> TripStatus {
        let idx = (self.location_updates as usize).min(PROGRESSION.len() - 1);
        let next = PROGRESSION[idx];
        self.change.set_status(next);
        self.change.passenger_boarded = next >= TripStatus::TripStarted;
        self.change.payment_confirmed = next == TripStatus::TripCompleted;
        self.location_updates += 1;
        if idx == PROGRESSION.len() - 1 {
            self.location_updates = 0;
        }
        next
    }
}
