//! The simulator bridge: telemetry in, steering out.

pub mod autopilot;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod telemetry;

pub use autopilot::Autopilot;
pub use config::DriveConfig;
pub use control::{ControlResponse, STEER_EVENT, SteerPayload, send_control, send_payload, throttle};
pub use error::PilotError;
pub use listener::TelemetryListener;
pub use telemetry::{TELEMETRY_EVENT, Telemetry};
