use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::DispatchClock;
use crate::event::{CurrentEvent, InboundKind};
use crate::log::TripLog;
use crate::outbox::{Outbox, OutboundPayload};
use crate::trip::TripAggregate;

/// Chat counterpart of [crate::systems::incident::incident_system].
pub fn message_system(
    event: Res<CurrentEvent>,
    clock: Res<DispatchClock>,
    mut log: ResMut<TripLog>,
    mut trip: ResMut<TripAggregate>,
    mut outbox: ResMut<Outbox>,
) {
    let InboundKind::SendMessage { actor, text } = &event.0.kind else {
        return;
    };
    if text.trim().is_empty() {
        outbox.unicast(
            event.0.origin,
            OutboundPayload::RequestError {
                message: "message text must not be empty".to_string(),
            },
        );
        return;
    }

    let message = log.record_message(*actor, text.clone(), clock.now());
    trip.change.message_count = log.message_count();

    outbox.broadcast(OutboundPayload::MessageRecorded(message));
    outbox.broadcast(OutboundPayload::TripChanged(trip.change.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ClientId, Role};
    use crate::runner::{dispatch_schedule, handle_event};
    use crate::test_helpers::{connect, test_world};

    #[test]
    fn incident_then_message_counts_one_each() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);

        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::SendIncident {
                actor: Role::Passenger,
                text: "wrong route".to_string(),
            },
            10_000,
        );
        handle_event(
            &mut world,
            &mut schedule,
            ClientId(2),
            InboundKind::SendMessage {
                actor: Role::Driver,
                text: "correcting now".to_string(),
            },
            11_000,
        );

        let trip = world.resource::<TripAggregate>();
        assert_eq!(trip.change.incident_count, 1);
        assert_eq!(trip.change.message_count, 1);

        let log = world.resource::<TripLog>();
        assert_eq!(log.incidents()[0].actor, Role::Passenger);
        assert_eq!(log.messages()[0].actor, Role::Driver);
    }

    #[test]
    fn interleaved_actors_keep_insertion_order() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();
        connect(&mut world, &mut schedule, ClientId(1), Role::Passenger);
        connect(&mut world, &mut schedule, ClientId(2), Role::Driver);

        for (origin, actor, text) in [
            (ClientId(1), Role::Passenger, "where are you?"),
            (ClientId(2), Role::Driver, "around the corner"),
            (ClientId(1), Role::Passenger, "ok"),
        ] {
            handle_event(
                &mut world,
                &mut schedule,
                origin,
                InboundKind::SendMessage {
                    actor,
                    text: text.to_string(),
                },
                10_000,
            );
        }

        let log = world.resource::<TripLog>();
        let texts: Vec<&str> = log.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["where are you?", "around the corner", "ok"]);
        let ids: Vec<u64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
