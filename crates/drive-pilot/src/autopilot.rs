use crate::{
    ControlResponse, PilotError, SteerPayload, Telemetry, TelemetryListener,
    config::DEFAULT_SPEED_LIMIT,
    control::{send_control, send_payload, throttle},
};
use drive_com::{Emitter, SessionId};
use drive_infer::{InferError, SteeringPredictor, preprocess};
use serde_json::Value;

/// Steers the simulated car from its camera.
///
/// Owns the steering predictor and the emitter it answers through. Each
/// telemetry frame is decoded, preprocessed and fed to the predictor, and
/// the result goes back out as one `steer` event.
pub struct Autopilot<P, E> {
    predictor: P,
    emitter: E,
    speed_limit: f32,
}

impl<P: SteeringPredictor, E: Emitter> Autopilot<P, E> {
    pub fn new(predictor: P, emitter: E) -> Self {
        Self {
            predictor,
            emitter,
            speed_limit: DEFAULT_SPEED_LIMIT,
        }
    }

    pub fn with_speed_limit(mut self, speed_limit: f32) -> Self {
        self.speed_limit = speed_limit;
        self
    }

    pub fn speed_limit(&self) -> f32 {
        self.speed_limit
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Compute the driving command for one telemetry reading.
    pub async fn drive(&mut self, telemetry: &Telemetry) -> Result<ControlResponse, PilotError> {
        let frame = drive_image::decode_frame_base64(&telemetry.image).await?;
        let batch = preprocess(&frame)?.into_batch();

        let angles = self.predictor.predict(&batch)?;
        let steering_angle = angles.first().copied().ok_or_else(|| InferError::ShapeMismatch {
            expected: "1 steering value".to_string(),
            got: "none".to_string(),
        })?;

        Ok(ControlResponse::new(
            steering_angle,
            throttle(telemetry.speed, self.speed_limit),
        ))
    }
}

impl<P: SteeringPredictor, E: Emitter> TelemetryListener for Autopilot<P, E> {
    async fn on_connect(&mut self, session: SessionId) -> Result<(), PilotError> {
        log::info!("Connected (session {})", session);
        send_payload(&self.emitter, SteerPayload::idle()).await?;
        Ok(())
    }

    async fn on_telemetry(&mut self, _session: SessionId, data: &Value) -> Result<(), PilotError> {
        let telemetry = Telemetry::from_value(data)?;
        let control = self.drive(&telemetry).await?;
        log::info!(
            "{} {} {}",
            control.steering_angle,
            control.throttle,
            telemetry.speed
        );
        send_control(&self.emitter, control).await?;
        Ok(())
    }

    async fn on_disconnect(&mut self, session: SessionId) -> Result<(), PilotError> {
        log::info!("Disconnected (session {})", session);
        Ok(())
    }
}
