//! Driver-targeting policy for new trip offers.
//!
//! The default flow shows every offer to every connected driver. The trait
//! is the seam where a geographic index would slot in; the core only ever
//! sees connection ids.

use crate::connection::ClientId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferRouting {
    /// Deliver the offer to this set of driver connections.
    Broadcast(Vec<ClientId>),
    /// Deliver the offer to exactly one driver connection.
    Unicast(ClientId),
}

pub trait DriverSelector: Send + Sync {
    /// Decides how a new offer is routed given the currently connected
    /// driver connections, in connection order.
    fn route(&self, drivers: &[ClientId]) -> OfferRouting;
}

/// Default policy: every connected driver sees the offer.
#[derive(Debug, Default)]
pub struct BroadcastAll;

impl DriverSelector for BroadcastAll {
    fn route(&self, drivers: &[ClientId]) -> OfferRouting {
        OfferRouting::Broadcast(drivers.to_vec())
    }
}

/// Unicast to the first connected driver; falls back to an empty broadcast
/// when no driver is connected (the offer then waits out its expiry window).
#[derive(Debug, Default)]
pub struct FirstAvailable;

impl DriverSelector for FirstAvailable {
    fn route(&self, drivers: &[ClientId]) -> OfferRouting {
        match drivers.first() {
            Some(driver) => OfferRouting::Unicast(*driver),
            None => OfferRouting::Broadcast(Vec::new()),
        }
    }
}
