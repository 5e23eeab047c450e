//! Offer lifecycle and driver targeting.

pub mod offer;
pub mod selector;

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use offer::{OfferStatus, TripOffer, OFFER_TTL_MS};
pub use selector::{BroadcastAll, DriverSelector, FirstAvailable, OfferRouting};

/// Offers awaiting a driver decision, keyed by trip id.
///
/// Only pending offers live in the table; resolution moves them to the audit
/// trail, so "present" and "pending" are the same check and exactly one of
/// accept, reject or expiry can win a given offer.
#[derive(Debug, Default, Resource)]
pub struct PendingOffers {
    pending: HashMap<String, TripOffer>,
    resolved: Vec<TripOffer>,
}

impl PendingOffers {
    pub fn insert(&mut self, offer: TripOffer) {
        self.pending.insert(offer.trip_id.clone(), offer);
    }

    /// Pending offers only; resolved offers are absent from lookups.
    pub fn get(&self, trip_id: &str) -> Option<&TripOffer> {
        self.pending.get(trip_id)
    }

    pub fn accept(&mut self, trip_id: &str) -> Option<TripOffer> {
        self.resolve(trip_id, OfferStatus::Accepted, None)
    }

    pub fn reject(&mut self, trip_id: &str, reason: Option<String>) -> Option<TripOffer> {
        self.resolve(trip_id, OfferStatus::Rejected, reason)
    }

    pub fn expire(&mut self, trip_id: &str) -> Option<TripOffer> {
        self.resolve(trip_id, OfferStatus::Expired, None)
    }

    fn resolve(
        &mut self,
        trip_id: &str,
        status: OfferStatus,
        reject_reason: Option<String>,
    ) -> Option<TripOffer> {
        let mut offer = self.pending.remove(trip_id)?;
        offer.status = status;
        offer.reject_reason = reject_reason;
        self.resolved.push(offer.clone());
        Some(offer)
    }

    /// Terminal offers, retained for audit. They no longer block matching.
    pub fn resolved(&self) -> &[TripOffer] {
        &self.resolved
    }

    pub fn iter_pending(&self) -> impl Iterator<Item = &TripOffer> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Source of unique trip ids. Seedable for reproducible tests.
#[derive(Debug, Resource)]
pub struct TripIdSource {
    rng: StdRng,
}

impl TripIdSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_trip_id(&mut self) -> String {
        format!("trip-{:08x}", self.rng.gen::<u32>())
    }
}

impl Default for TripIdSource {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

/// Resource wrapper for the driver-targeting trait object.
#[derive(Resource)]
pub struct DriverSelectorResource(pub Box<dyn DriverSelector>);

impl DriverSelectorResource {
    pub fn new(selector: Box<dyn DriverSelector>) -> Self {
        Self(selector)
    }
}

impl Default for DriverSelectorResource {
    fn default() -> Self {
        Self(Box::new(BroadcastAll))
    }
}

impl std::ops::Deref for DriverSelectorResource {
    type Target = dyn DriverSelector;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ClientId;
    use crate::test_helpers::pending_offer;

    #[test]
    fn accept_wins_exactly_once() {
        let mut offers = PendingOffers::default();
        offers.insert(pending_offer("trip-1", ClientId(1), 1_000));

        let first = offers.accept("trip-1");
        assert_eq!(first.map(|o| o.status), Some(OfferStatus::Accepted));

        assert!(offers.accept("trip-1").is_none());
        assert!(offers.reject("trip-1", None).is_none());
        assert!(offers.expire("trip-1").is_none());
    }

    #[test]
    fn resolved_offers_are_absent_from_lookups() {
        let mut offers = PendingOffers::default();
        offers.insert(pending_offer("trip-1", ClientId(1), 1_000));
        offers.expire("trip-1");

        assert!(offers.get("trip-1").is_none());
        assert_eq!(offers.pending_count(), 0);
        assert_eq!(offers.resolved().len(), 1);
        assert_eq!(offers.resolved()[0].status, OfferStatus::Expired);
    }

    #[test]
    fn reject_keeps_the_reason_for_audit() {
        let mut offers = PendingOffers::default();
        offers.insert(pending_offer("trip-1", ClientId(1), 1_000));
        offers.reject("trip-1", Some("too far".to_string()));

        assert_eq!(
            offers.resolved()[0].reject_reason.as_deref(),
            Some("too far")
        );
    }

    #[test]
    fn trip_ids_are_reproducible_with_a_seed() {
        let mut a = TripIdSource::from_seed(7);
        let mut b = TripIdSource::from_seed(7);
        assert_eq!(a.next_trip_id(), b.next_trip_id());
        assert_ne!(a.next_trip_id(), a.next_trip_id());
    }
}
