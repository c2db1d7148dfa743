pub mod client;
pub mod server;

pub use client::SioClient;
pub use server::{Heartbeat, OUTBOUND_QUEUE, SioEmitter, SioServer};
