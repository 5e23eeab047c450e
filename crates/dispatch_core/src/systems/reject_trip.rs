use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind};
use crate::matching::PendingOffers;

/// Records the rejection and releases the deadline. The aggregate is left
/// untouched; re-matching to another driver is the requester's concern.
pub fn reject_trip_system(
    event: Res<CurrentEvent>,
    mut offers: ResMut<PendingOffers>,
    mut clock: ResMut<DispatchClock>,
) {
    let InboundKind::RejectTrip { trip_id, reason } = &event.0.kind else {
        return;
    };
    if offers.reject(trip_id, reason.clone()).is_some() {
        clock.cancel(trip_id);
    }
}
