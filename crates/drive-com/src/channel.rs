use crate::ComError;
use serde_json::Value;
use std::fmt;

/// Identifies one connected peer for as long as its connection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Connect { session: SessionId },
    Event {
        session: SessionId,
        name: String,
        data: Value,
    },
    Disconnect { session: SessionId },
}

/// Outbound half of a channel.
#[allow(async_fn_in_trait)]
pub trait Emitter {
    /// Send a named event with a JSON payload to the connected peers.
    async fn emit(&self, event: &str, data: Value) -> Result<(), ComError>;
}

/// Bidirectional event channel between the bridge and its peers.
///
/// Inbound events from every peer are multiplexed into a single stream, so a
/// consumer sees them in arrival order and handles one at a time.
#[allow(async_fn_in_trait)]
pub trait RealtimeChannel {
    type Emitter: Emitter;

    fn emitter(&self) -> Self::Emitter;

    /// Wait for the next inbound event.
    ///
    /// Returns `ComError::ConnectionClosed` once the channel has shut down.
    async fn recv(&mut self) -> Result<Inbound, ComError>;
}
