pub mod accept_trip;
pub mod cancel_trip;
pub mod change_trip;
pub mod driver_location;
pub mod incident;
pub mod message;
pub mod offer_expiry;
pub mod passenger_location;
pub mod register;
pub mod reject_trip;
pub mod request_trip;
pub mod snapshot;
