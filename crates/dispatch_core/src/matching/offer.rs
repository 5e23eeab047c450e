//! The trip offer: a proposed trip with a bounded acceptance window.

use serde::{Deserialize, Serialize};

use crate::connection::ClientId;
use crate::trip::Stop;

/// How long a driver has to respond before the offer expires.
pub const OFFER_TTL_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

/// One dispatch attempt, sent to one driver or to all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripOffer {
    pub trip_id: String,
    pub requester: ClientId,
    pub passenger_name: String,
    pub passenger_rating: f64,
    pub pickup: Stop,
    pub dropoff: Stop,
    pub estimated_distance_km: f64,
    pub estimated_duration_min: u32,
    pub estimated_fare: u32,
    pub requested_at_ms: u64,
    pub expires_at_ms: u64,
    pub status: OfferStatus,
    /// Set when the offer was unicast to one driver connection; `None` for a
    /// broadcast offer.
    pub target: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}
