//! Dispatch runner: routes inbound events into the ECS.
//!
//! The transport owns exactly one [World] and one [Schedule] and calls these
//! entry points from a single task; that ownership is what serializes every
//! read-modify-write on the shared trip state. Each call sets the clock,
//! inserts the event as [CurrentEvent], runs the schedule and hands back the
//! drained outbox.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::DispatchClock;
use crate::connection::ClientId;
use crate::event::{CurrentEvent, Inbound, InboundKind};
use crate::log::TripLog;
use crate::matching::{DriverSelectorResource, PendingOffers, TripIdSource};
use crate::outbox::{Outbox, OutboundEvent};
use crate::systems::{
    accept_trip::accept_trip_system,
    cancel_trip::cancel_trip_system,
    change_trip::change_trip_system,
    driver_location::driver_location_system,
    incident::incident_system,
    message::message_system,
    offer_expiry::offer_expiry_system,
    passenger_location::passenger_location_system,
    register::{client_connected_system, client_disconnected_system},
    reject_trip::reject_trip_system,
    request_trip::request_trip_system,
    snapshot::snapshot_system,
};
use crate::trip::{CancelBehavior, TripAggregate};

// Condition functions for each event kind
fn is_connected(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::Connected { .. }))
        .unwrap_or(false)
}

fn is_disconnected(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == InboundKind::Disconnected)
        .unwrap_or(false)
}

fn is_request_trip(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::RequestTrip(_)))
        .unwrap_or(false)
}

fn is_accept_trip(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::AcceptTrip { .. }))
        .unwrap_or(false)
}

fn is_reject_trip(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::RejectTrip { .. }))
        .unwrap_or(false)
}

fn is_offer_deadline(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::OfferDeadline { .. }))
        .unwrap_or(false)
}

fn is_driver_location(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::DriverLocation(_)))
        .unwrap_or(false)
}

fn is_passenger_location(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::PassengerLocation(_)))
        .unwrap_or(false)
}

fn is_change_trip(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::ChangeTrip(_)))
        .unwrap_or(false)
}

fn is_cancel_trip(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::CancelTrip { .. }))
        .unwrap_or(false)
}

fn is_send_incident(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::SendIncident { .. }))
        .unwrap_or(false)
}

fn is_send_message(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, InboundKind::SendMessage { .. }))
        .unwrap_or(false)
}

fn is_snapshot_request(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| {
            matches!(
                e.0.kind,
                InboundKind::GetTripPassenger
                    | InboundKind::GetTripDriver
                    | InboundKind::GetMessagesIncidents
            )
        })
        .unwrap_or(false)
}

/// Builds the dispatch schedule: one handler per event kind behind a
/// condition, plus [apply_deferred] so connection entities spawned this step
/// are visible to the next one.
pub fn dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        client_connected_system.run_if(is_connected),
        client_disconnected_system.run_if(is_disconnected),
        request_trip_system.run_if(is_request_trip),
        accept_trip_system.run_if(is_accept_trip),
        reject_trip_system.run_if(is_reject_trip),
        offer_expiry_system.run_if(is_offer_deadline),
        driver_location_system.run_if(is_driver_location),
        passenger_location_system.run_if(is_passenger_location),
        change_trip_system.run_if(is_change_trip),
        cancel_trip_system.run_if(is_cancel_trip),
        incident_system.run_if(is_send_incident),
        message_system.run_if(is_send_message),
        snapshot_system.run_if(is_snapshot_request),
        apply_deferred,
    ));
    schedule
}

/// Builds a world with every resource the schedule needs, in its initial
/// (idle, empty) state.
pub fn build_dispatch_world() -> World {
    let mut world = World::new();
    world.insert_resource(DispatchClock::default());
    world.insert_resource(TripAggregate::default());
    world.insert_resource(TripLog::default());
    world.insert_resource(PendingOffers::default());
    world.insert_resource(TripIdSource::default());
    world.insert_resource(DriverSelectorResource::default());
    world.insert_resource(CancelBehavior::default());
    world.insert_resource(Outbox::default());
    world
}

/// Routes one inbound event and returns everything the core emitted for it.
pub fn handle_event(
    world: &mut World,
    schedule: &mut Schedule,
    origin: ClientId,
    kind: InboundKind,
    now_ms: u64,
) -> Vec<OutboundEvent> {
    world.resource_mut::<DispatchClock>().advance_to(now_ms);
    world.insert_resource(CurrentEvent(Inbound { origin, kind }));
    schedule.run(world);
    world.resource_mut::<Outbox>().drain()
}

/// Fires every offer deadline due at `now_ms`. Deadlines cancelled by an
/// earlier accept/reject never surface here.
pub fn expire_due_offers(
    world: &mut World,
    schedule: &mut Schedule,
    now_ms: u64,
) -> Vec<OutboundEvent> {
    let mut emitted = Vec::new();
    loop {
        let due = world.resource_mut::<DispatchClock>().pop_due(now_ms);
        let Some(trip_id) = due else {
            break;
        };
        emitted.extend(handle_event(
            world,
            schedule,
            ClientId::SCHEDULER,
            InboundKind::OfferDeadline { trip_id },
            now_ms,
        ));
    }
    emitted
}

/// Earliest live offer deadline, for the transport's timer sleep.
pub fn next_deadline_ms(world: &mut World) -> Option<u64> {
    world.resource_mut::<DispatchClock>().next_deadline()
}

/// Relay primitive for the global-event collaborator: fans one arbitrary
/// named event to every connected client. The name and payload are both
/// caller-supplied and opaque to the core.
pub fn emit_named(
    world: &mut World,
    event: String,
    data: serde_json::Value,
) -> Vec<OutboundEvent> {
    let mut outbox = world.resource_mut::<Outbox>();
    outbox.broadcast(crate::outbox::OutboundPayload::Named { event, data });
    outbox.drain()
}
