//! Drives the core-owning task through its command channel, the same way
//! sessions do, without opening sockets.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use dispatch_core::connection::{ClientId, Role};
use dispatch_core::event::{InboundKind, TripRequest};
use dispatch_core::trip::{PassengerProfile, Stop};
use dispatch_gateway::core_loop::{outbound_channel, run_core, Command};
use dispatch_gateway::protocol::Envelope;

const PASSENGER: ClientId = ClientId(1);
const DRIVER: ClientId = ClientId(2);

async fn next_envelope(rx: &mut mpsc::Receiver<String>) -> Envelope {
    let text = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("channel closed");
    serde_json::from_str(&text).expect("frame is a valid envelope")
}

fn request_trip_command() -> Command {
    Command::Inbound {
        origin: PASSENGER,
        kind: InboundKind::RequestTrip(TripRequest {
            pickup: Stop::new("Obelisco", -34.6037, -58.3816, 0),
            dropoff: Stop::new("Parque Rivadavia", -34.6157, -58.4333, 1),
            passenger: PassengerProfile::default(),
        }),
    }
}

#[tokio::test]
async fn request_flows_to_driver_and_relay_reaches_everyone() {
    let (commands, command_rx) = mpsc::channel(16);
    let core = tokio::spawn(run_core(command_rx));

    let (passenger_tx, mut passenger_rx) = outbound_channel();
    let (driver_tx, mut driver_rx) = outbound_channel();
    commands
        .send(Command::Attach {
            id: PASSENGER,
            role: Role::Passenger,
            sender: passenger_tx,
        })
        .await
        .expect("attach passenger");
    commands
        .send(Command::Attach {
            id: DRIVER,
            role: Role::Driver,
            sender: driver_tx,
        })
        .await
        .expect("attach driver");

    commands.send(request_trip_command()).await.expect("request");

    let to_passenger = next_envelope(&mut passenger_rx).await;
    assert_eq!(to_passenger.event, "send-change-trip");
    assert_eq!(to_passenger.data["status"], "searching");

    let to_driver = next_envelope(&mut driver_rx).await;
    assert_eq!(to_driver.event, "trip-available");
    assert_eq!(to_driver.data["estimated_fare"], 1715);
    let trip_id = to_driver.data["trip_id"]
        .as_str()
        .expect("offer carries a trip id")
        .to_string();

    // Driver accepts; everyone sees the state change.
    commands
        .send(Command::Inbound {
            origin: DRIVER,
            kind: InboundKind::AcceptTrip { trip_id },
        })
        .await
        .expect("accept");
    let to_passenger = next_envelope(&mut passenger_rx).await;
    assert_eq!(to_passenger.data["status"], "driverAccepted");
    let to_driver = next_envelope(&mut driver_rx).await;
    assert_eq!(to_driver.data["status"], "driverAccepted");

    // The relay fans an arbitrary named event to every connection.
    commands
        .send(Command::EmitNamed {
            event: "ops.banner".to_string(),
            data: serde_json::json!({"text": "maintenance at midnight"}),
        })
        .await
        .expect("relay");
    assert_eq!(next_envelope(&mut passenger_rx).await.event, "ops.banner");
    assert_eq!(next_envelope(&mut driver_rx).await.event, "ops.banner");

    drop(commands);
    core.await.expect("core task exits cleanly");
}

#[tokio::test]
async fn detached_clients_receive_nothing_further() {
    let (commands, command_rx) = mpsc::channel(16);
    let core = tokio::spawn(run_core(command_rx));

    let (passenger_tx, mut passenger_rx) = outbound_channel();
    let (driver_tx, mut driver_rx) = outbound_channel();
    commands
        .send(Command::Attach {
            id: PASSENGER,
            role: Role::Passenger,
            sender: passenger_tx,
        })
        .await
        .expect("attach passenger");
    commands
        .send(Command::Attach {
            id: DRIVER,
            role: Role::Driver,
            sender: driver_tx,
        })
        .await
        .expect("attach driver");
    commands
        .send(Command::Detach { id: DRIVER })
        .await
        .expect("detach driver");

    commands.send(request_trip_command()).await.expect("request");

    // The passenger still gets its trip change; the driver's channel closes
    // without ever seeing the offer.
    let to_passenger = next_envelope(&mut passenger_rx).await;
    assert_eq!(to_passenger.event, "send-change-trip");

    drop(commands);
    core.await.expect("core task exits cleanly");
    assert_eq!(driver_rx.recv().await, None);
}
