use drive_com::{ComError, Emitter};
use serde::{Deserialize, Serialize};

/// Event name the simulator listens on for driving commands.
pub const STEER_EVENT: &str = "steer";

/// One driving command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlResponse {
    pub steering_angle: f32,
    pub throttle: f32,
}

impl ControlResponse {
    pub fn new(steering_angle: f32, throttle: f32) -> Self {
        Self {
            steering_angle,
            throttle,
        }
    }

    /// Wire form with float text that always keeps a decimal point (`1.0`, `-0.25`).
    pub fn to_payload(&self) -> SteerPayload {
        SteerPayload {
            steering_angle: format!("{:?}", self.steering_angle),
            throttle: format!("{:?}", self.throttle),
        }
    }
}

/// Wire form of a [`ControlResponse`]: both numbers as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteerPayload {
    pub steering_angle: String,
    pub throttle: String,
}

impl SteerPayload {
    /// Wheels straight, no throttle, sent as integer text (`"0"`).
    pub fn idle() -> Self {
        Self {
            steering_angle: "0".to_string(),
            throttle: "0".to_string(),
        }
    }
}

/// Throttle that falls linearly from 1 at standstill to 0 at `speed_limit`.
///
/// Not clamped: above the limit the result is negative.
pub fn throttle(speed: f32, speed_limit: f32) -> f32 {
    1.0 - speed / speed_limit
}

/// Emit `control` as a `steer` event.
pub async fn send_control<E: Emitter>(emitter: &E, control: ControlResponse) -> Result<(), ComError> {
    send_payload(emitter, control.to_payload()).await
}

/// Emit an already formatted `steer` event.
pub async fn send_payload<E: Emitter>(emitter: &E, payload: SteerPayload) -> Result<(), ComError> {
    let data = serde_json::to_value(payload)?;
    emitter.emit(STEER_EVENT, data).await
}
