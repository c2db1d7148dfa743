use crate::{PilotError, TelemetryListener, telemetry::TELEMETRY_EVENT};
use drive_com::{ComError, Inbound, RealtimeChannel};

/// Feed every inbound event of `channel` to `listener`, one at a time.
///
/// A failing event is logged and skipped. Returns when the channel closes,
/// or with the error if receiving itself fails.
pub async fn run<C, L>(channel: &mut C, listener: &mut L) -> Result<(), PilotError>
where
    C: RealtimeChannel,
    L: TelemetryListener,
{
    loop {
        let inbound = match channel.recv().await {
            Ok(inbound) => inbound,
            Err(ComError::ConnectionClosed) => {
                log::info!("Channel closed");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = dispatch(listener, inbound).await {
            log::error!("Failed to handle event: {}", e);
        }
    }
}

/// Route one inbound event to the matching listener callback.
pub async fn dispatch<L: TelemetryListener>(
    listener: &mut L,
    inbound: Inbound,
) -> Result<(), PilotError> {
    match inbound {
        Inbound::Connect { session } => listener.on_connect(session).await,
        Inbound::Event {
            session,
            name,
            data,
        } if name == TELEMETRY_EVENT => listener.on_telemetry(session, &data).await,
        Inbound::Event { session, name, .. } => {
            log::debug!("Ignoring '{}' from session {}", name, session);
            Ok(())
        }
        Inbound::Disconnect { session } => listener.on_disconnect(session).await,
    }
}
