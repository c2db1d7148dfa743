use crate::PilotError;
use serde_json::Value;

/// Event name the simulator sends its sensor readings on.
pub const TELEMETRY_EVENT: &str = "telemetry";

/// The parts of a telemetry payload the autopilot uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub speed: f32,
    /// Base64 text of the encoded camera frame.
    pub image: String,
}

impl Telemetry {
    /// Extract speed and image from a payload like
    /// `{"speed": "12.3", "image": "<base64>", ...}`.
    ///
    /// Other keys are ignored. Speed may be text or a JSON number.
    pub fn from_value(data: &Value) -> Result<Self, PilotError> {
        let Value::Object(fields) = data else {
            return Err(PilotError::Payload(format!("expected an object, got {data}")));
        };

        let speed = match fields.get("speed") {
            None | Some(Value::Null) => return Err(PilotError::MissingField("speed")),
            Some(value) => parse_speed(value)?,
        };
        let image = match fields.get("image") {
            None | Some(Value::Null) => return Err(PilotError::MissingField("image")),
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                return Err(PilotError::Payload(format!("image is not text: {other}")));
            }
        };

        Ok(Self { speed, image })
    }
}

fn parse_speed(value: &Value) -> Result<f32, PilotError> {
    match value {
        Value::String(text) => text
            .trim()
            .parse::<f32>()
            .map_err(|_| PilotError::Speed(text.clone())),
        Value::Number(number) => number
            .as_f64()
            .map(|speed| speed as f32)
            .ok_or_else(|| PilotError::Speed(number.to_string())),
        other => Err(PilotError::Speed(other.to_string())),
    }
}
