use bevy_ecs::prelude::{Commands, Entity, Query, Res};

use crate::connection::ClientConn;
use crate::event::{CurrentEvent, InboundKind};

pub fn client_connected_system(mut commands: Commands, event: Res<CurrentEvent>) {
    let InboundKind::Connected { role } = &event.0.kind else {
        return;
    };
    commands.spawn(ClientConn {
        id: event.0.origin,
        role: *role,
    });
}

pub fn client_disconnected_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    conns: Query<(Entity, &ClientConn)>,
) {
    if event.0.kind != InboundKind::Disconnected {
        return;
    }
    for (entity, conn) in &conns {
        if conn.id == event.0.origin {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ClientId, Role};
    use crate::runner::{dispatch_schedule, handle_event};
    use crate::test_helpers::test_world;

    #[test]
    fn connect_and_disconnect_track_entities() {
        let mut world = test_world();
        let mut schedule = dispatch_schedule();

        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::Connected {
                role: Role::Passenger,
            },
            1_000,
        );
        handle_event(
            &mut world,
            &mut schedule,
            ClientId(2),
            InboundKind::Connected { role: Role::Driver },
            1_000,
        );
        assert_eq!(world.query::<&ClientConn>().iter(&world).count(), 2);

        handle_event(
            &mut world,
            &mut schedule,
            ClientId(1),
            InboundKind::Disconnected,
            2_000,
        );
        let remaining: Vec<ClientConn> =
            world.query::<&ClientConn>().iter(&world).copied().collect();
        assert_eq!(remaining, vec![ClientConn { id: ClientId(2), role: Role::Driver }]);
    }
}
