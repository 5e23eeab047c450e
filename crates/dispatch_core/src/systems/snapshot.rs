use bevy_ecs::prelude::{Res, ResMut};

use crate::event::{CurrentEvent, InboundKind};
use crate::log::TripLog;
use crate::outbox::{Outbox, OutboundPayload};
use crate::payload::{driver_snapshot, feed_snapshot, passenger_snapshot};
use crate::trip::TripAggregate;

/// Read-only snapshot queries. The response goes to the requesting
/// connection only and is shaped for its role.
pub fn snapshot_system(
    event: Res<CurrentEvent>,
    trip: Res<TripAggregate>,
    log: Res<TripLog>,
    mut outbox: ResMut<Outbox>,
) {
    let origin = event.0.origin;
    match &event.0.kind {
        InboundKind::GetTripPassenger => outbox.unicast(
            origin,
            OutboundPayload::TripForPassenger(passenger_snapshot(&trip, &log)),
        ),
        InboundKind::GetTripDriver => outbox.unicast(
            origin,
            OutboundPayload::TripForDriver(driver_snapshot(&trip, &log)),
        ),
        InboundKind::GetMessagesIncidents => {
            outbox.unicast(origin, OutboundPayload::Feed(feed_snapshot(&trip, &log)))
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ClientId, Role};
    use crate::outbox::Target;
    use crate::runner::{dispatch_schedule, handle_event};
    use crate::test_helpers::{connect, test_world};

    #[test]
    fn snapshots_go_to_the_requester_only() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);

        let out = handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::GetTripPassenger,
            10_000,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, Target::Client(ClientId(1)));
        assert!(matches!(
            out[0].payload,
            OutboundPayload::TripForPassenger(_)
        ));

        let out = handle_event(
            &mut world,
            &mut schedule,
            ClientId(2),
            InboundKind::GetTripDriver,
            10_000,
        );
        assert_eq!(out[0].target, Target::Client(ClientId(2)));
        assert!(matches!(out[0].payload, OutboundPayload::TripForDriver(_)));
    }

    #[test]
    fn feed_reflects_recorded_entries() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);

        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::SendIncident {
                actor: Role::Passenger,
                text: "left my bag".to_string(),
            },
            10_000,
        );
        let out = handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::GetMessagesIncidents,
            11_000,
        );

        let OutboundPayload::Feed(feed) = &out[0].payload else {
            panic!("expected feed, got {:?}", out[0].payload);
        };
        assert_eq!(feed.incident_count, 1);
        assert_eq!(feed.incidents[0].text, "left my bag");
        assert_eq!(feed.change.incident_count, 1);
    }
}
