mod common;

use common::{FixedPredictor, RecordingEmitter, camera_frame_base64};
use drive_com::{ComError, Inbound, RealtimeChannel, SessionId, SioClient, SioServer};
use drive_pilot::{Autopilot, PilotError, STEER_EVENT, TelemetryListener, dispatch};
use serde_json::{Value, json};
use std::collections::VecDeque;
use tokio::time::{Duration, timeout};

/// Channel that replays a fixed list of events, then reports closed.
struct ScriptedChannel {
    events: VecDeque<Inbound>,
    emitter: RecordingEmitter,
}

impl RealtimeChannel for ScriptedChannel {
    type Emitter = RecordingEmitter;

    fn emitter(&self) -> RecordingEmitter {
        self.emitter.clone()
    }

    async fn recv(&mut self) -> Result<Inbound, ComError> {
        self.events.pop_front().ok_or(ComError::ConnectionClosed)
    }
}

/// Listener that records which callbacks ran.
#[derive(Default)]
struct CallLog {
    calls: Vec<String>,
}

impl TelemetryListener for CallLog {
    async fn on_connect(&mut self, session: SessionId) -> Result<(), PilotError> {
        self.calls.push(format!("connect {session}"));
        Ok(())
    }

    async fn on_telemetry(&mut self, session: SessionId, data: &Value) -> Result<(), PilotError> {
        self.calls.push(format!("telemetry {session} {data}"));
        if data.is_null() {
            return Err(PilotError::MissingField("image"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_dispatch_routes_events() {
    let session = SessionId(7);
    let mut channel = ScriptedChannel {
        events: VecDeque::from([
            Inbound::Connect { session },
            Inbound::Event {
                session,
                name: "telemetry".to_string(),
                data: json!(null),
            },
            Inbound::Event {
                session,
                name: "manual".to_string(),
                data: json!({}),
            },
            Inbound::Event {
                session,
                name: "telemetry".to_string(),
                data: json!(1),
            },
            Inbound::Disconnect { session },
        ]),
        emitter: RecordingEmitter::default(),
    };
    let mut listener = CallLog::default();

    // the failing telemetry event does not stop the loop
    dispatch::run(&mut channel, &mut listener).await.unwrap();

    assert_eq!(
        listener.calls,
        vec!["connect 7", "telemetry 7 null", "telemetry 7 1"]
    );
}

#[tokio::test]
async fn test_dispatch_autopilot_over_scripted_channel() {
    let session = SessionId(1);
    let emitter = RecordingEmitter::default();
    let mut channel = ScriptedChannel {
        events: VecDeque::from([
            Inbound::Connect { session },
            Inbound::Event {
                session,
                name: "telemetry".to_string(),
                data: json!({"speed": "5"}),
            },
            Inbound::Event {
                session,
                name: "telemetry".to_string(),
                data: json!({"speed": "5", "image": camera_frame_base64()}),
            },
        ]),
        emitter: emitter.clone(),
    };
    let mut autopilot = Autopilot::new(FixedPredictor::new(0.3), channel.emitter());

    dispatch::run(&mut channel, &mut autopilot).await.unwrap();

    let payloads: Vec<Value> = emitter.sent().into_iter().map(|(_, data)| data).collect();
    assert_eq!(
        payloads,
        vec![
            json!({"steering_angle": "0", "throttle": "0"}),
            json!({"steering_angle": "0.3", "throttle": "0.5"}),
        ]
    );
}

#[tokio::test]
async fn test_bridge_over_socketio() {
    let mut server = SioServer::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    let mut autopilot = Autopilot::new(FixedPredictor::new(0.3), server.emitter());

    let simulator = tokio::spawn(async move {
        let mut client = SioClient::connect(addr).await.unwrap();
        let greeting = client.recv().await.unwrap();
        client
            .emit(
                "telemetry",
                json!({"steering_angle": "0", "throttle": "0", "speed": "5", "image": camera_frame_base64()}),
            )
            .await
            .unwrap();
        let reply = client.recv().await.unwrap();
        (greeting, reply)
    });

    let bridge = dispatch::run(&mut server, &mut autopilot);
    let (greeting, reply) = timeout(Duration::from_secs(10), async {
        tokio::select! {
            result = simulator => result.unwrap(),
            _ = bridge => panic!("dispatch loop ended early"),
        }
    })
    .await
    .expect("bridge timed out");

    assert_eq!(
        greeting,
        (
            STEER_EVENT.to_string(),
            json!({"steering_angle": "0", "throttle": "0"})
        )
    );
    assert_eq!(
        reply,
        (
            STEER_EVENT.to_string(),
            json!({"steering_angle": "0.3", "throttle": "0.5"})
        )
    );
}
