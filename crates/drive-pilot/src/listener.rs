use crate::PilotError;
use drive_com::SessionId;
use serde_json::Value;

/// Reacts to simulator sessions and their telemetry.
///
/// Calls arrive one at a time from the dispatch loop; an error only fails
/// the event that caused it.
#[allow(async_fn_in_trait)]
pub trait TelemetryListener {
    async fn on_connect(&mut self, session: SessionId) -> Result<(), PilotError>;

    async fn on_telemetry(&mut self, session: SessionId, data: &Value) -> Result<(), PilotError>;

    async fn on_disconnect(&mut self, session: SessionId) -> Result<(), PilotError> {
        let _ = session;
        Ok(())
    }
}
