use bevy_ecs::prelude::{Res, ResMut};

use crate::event::{CurrentEvent, InboundKind};
use crate::matching::PendingOffers;

/// Fires when an offer's 30-second deadline comes due. If the offer is still
/// pending it becomes `Expired` and leaves the table; nobody is notified
/// (the requester can observe the terminal status via the audit trail).
pub fn offer_expiry_system(event: Res<CurrentEvent>, mut offers: ResMut<PendingOffers>) {
    let InboundKind::OfferDeadline { trip_id } = &event.0.kind else {
        return;
    };
    offers.expire(trip_id);
}

#[cfg(test)]
mod tests {
    use crate::connection::{ClientId, Role};
    use crate::event::InboundKind;
    use crate::matching::{OfferStatus, PendingOffers};
    use crate::runner::{dispatch_schedule, expire_due_offers, handle_event, next_deadline_ms};
    use crate::test_helpers::{connect, pending_trip_id, request_trip_kind, test_world};
    use crate::trip::{TripAggregate, TripStatus};

    #[test]
    fn an_unanswered_offer_expires_silently_after_thirty_seconds() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);
        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            request_trip_kind(),
            10_000,
        );
        let trip_id = pending_trip_id(&world);

        // Not yet due.
        let out = expire_due_offers(&mut world, &mut schedule, 39_999);
        assert!(out.is_empty());
        assert_eq!(world.resource::<PendingOffers>().pending_count(), 1);

        let out = expire_due_offers(&mut world, &mut schedule, 40_000);
        assert!(out.is_empty(), "expiry is silent");

        let offers = world.resource::<PendingOffers>();
        assert!(offers.get(&trip_id).is_none());
        assert_eq!(offers.resolved()[0].status, OfferStatus::Expired);
        assert_eq!(next_deadline_ms(&mut world), None);
    }

    #[test]
    fn exactly_one_of_accept_and_expiry_wins_at_the_boundary() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);
        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            request_trip_kind(),
            10_000,
        );
        let trip_id = pending_trip_id(&world);

        // The expiry fires first; an accept arriving at the same instant
        // loses and mutates nothing.
        expire_due_offers(&mut world, &mut schedule, 40_000);
        let out = handle_event(
            &mut world,
            &mut schedule,
            ClientId(2),
            InboundKind::AcceptTrip { trip_id },
            40_000,
        );
        assert!(out.is_empty());
        assert_eq!(
            world.resource::<TripAggregate>().change.status,
            TripStatus::Searching
        );
    }

    #[test]
    fn an_accepted_offer_never_expires() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);
        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            request_trip_kind(),
            10_000,
        );
        let trip_id = pending_trip_id(&world);

        handle_event(
            &mut world,
            &mut schedule,
            ClientId(2),
            InboundKind::AcceptTrip { trip_id },
            20_000,
        );
        let out = expire_due_offers(&mut world, &mut schedule, 50_000);
        assert!(out.is_empty());

        let offers = world.resource::<PendingOffers>();
        assert_eq!(offers.resolved().len(), 1);
        assert_eq!(offers.resolved()[0].status, OfferStatus::Accepted);
    }
}
