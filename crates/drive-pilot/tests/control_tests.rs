mod common;

use common::RecordingEmitter;
use drive_pilot::{ControlResponse, STEER_EVENT, SteerPayload, send_control, send_payload, throttle};
use serde_json::json;

#[test]
fn test_throttle_falls_with_speed() {
    assert_eq!(throttle(0.0, 10.0), 1.0);
    assert_eq!(throttle(5.0, 10.0), 0.5);
    assert_eq!(throttle(10.0, 10.0), 0.0);
}

#[test]
fn test_throttle_goes_negative_above_limit() {
    assert_eq!(throttle(20.0, 10.0), -1.0);
}

#[test]
fn test_payload_uses_plain_number_text() {
    let payload = ControlResponse::new(0.3, 0.5).to_payload();
    assert_eq!(
        payload,
        SteerPayload {
            steering_angle: "0.3".to_string(),
            throttle: "0.5".to_string(),
        }
    );

    let payload = ControlResponse::new(-0.0725, 1.0).to_payload();
    assert_eq!(payload.steering_angle, "-0.0725");
    assert_eq!(payload.throttle, "1.0");
}

#[test]
fn test_whole_numbers_keep_decimal_point() {
    let payload = ControlResponse::new(0.0, -1.0).to_payload();
    assert_eq!(payload.steering_angle, "0.0");
    assert_eq!(payload.throttle, "-1.0");

    let payload = ControlResponse::new(-2.019, 20.0).to_payload();
    assert_eq!(payload.steering_angle, "-2.019");
    assert_eq!(payload.throttle, "20.0");
}

#[test]
fn test_idle_payload() {
    let payload = SteerPayload::idle();
    assert_eq!(payload.steering_angle, "0");
    assert_eq!(payload.throttle, "0");
}

#[tokio::test]
async fn test_send_payload_emits_idle_as_is() {
    let emitter = RecordingEmitter::default();
    send_payload(&emitter, SteerPayload::idle()).await.unwrap();

    assert_eq!(
        emitter.sent(),
        vec![(
            STEER_EVENT.to_string(),
            json!({"steering_angle": "0", "throttle": "0"})
        )]
    );
}

#[tokio::test]
async fn test_send_control_emits_steer_event() {
    let emitter = RecordingEmitter::default();
    send_control(&emitter, ControlResponse::new(0.25, -1.0))
        .await
        .unwrap();

    assert_eq!(
        emitter.sent(),
        vec![(
            STEER_EVENT.to_string(),
            json!({"steering_angle": "0.25", "throttle": "-1.0"})
        )]
    );
}
