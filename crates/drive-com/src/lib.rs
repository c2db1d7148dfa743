//! Realtime event transport for the drive bridge.
//!
//! The driving simulator talks Socket.IO over an Engine.IO WebSocket. This
//! crate exposes that conversation as a [`RealtimeChannel`]: a stream of
//! [`Inbound`] connect/event/disconnect notifications plus an [`Emitter`]
//! for named outbound events.

pub mod channel;
pub mod error;
pub mod packet;
pub mod sio;

pub use channel::{Emitter, Inbound, RealtimeChannel, SessionId};
pub use error::ComError;
pub use packet::{EnginePacket, MAX_MESSAGE_SIZE, SocketPacket};
pub use sio::{SioClient, SioEmitter, SioServer};
