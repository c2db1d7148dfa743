use crate::ComError;
use crate::packet::{EnginePacket, MAX_MESSAGE_SIZE, SocketPacket};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use tokio_websockets::{ClientBuilder, MaybeTlsStream, Message, WebSocketStream};

/// Socket.IO client speaking Engine.IO v4 over WebSocket.
///
/// This is the simulator's side of the conversation, used to drive the
/// bridge without the simulator.
pub struct SioClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    sid: String,
}

impl SioClient {
    /// Connect to a Socket.IO server and join the default namespace.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ComError> {
        let uri = format!("ws://{}/socket.io/?EIO=4&transport=websocket", addr);

        let parsed_uri: http::Uri = uri.parse().map_err(|e| {
            ComError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid WebSocket URI: {e}"),
            ))
        })?;
        let (stream, _response) = ClientBuilder::from_uri(parsed_uri).connect().await?;

        let mut client = Self {
            stream,
            sid: String::new(),
        };

        match client.next_engine_packet().await? {
            EnginePacket::Open(handshake) => {
                client.sid = handshake["sid"].as_str().unwrap_or_default().to_string();
            }
            other => {
                return Err(ComError::Protocol(format!(
                    "expected open packet, got {:?}",
                    other
                )));
            }
        }

        client
            .send_socket(&SocketPacket::Connect {
                namespace: "/".to_string(),
                data: None,
            })
            .await?;
        match client.next_socket_packet().await? {
            SocketPacket::Connect { .. } => Ok(client),
            SocketPacket::ConnectError { data, .. } => {
                Err(ComError::Protocol(format!("connect refused: {data}")))
            }
            other => Err(ComError::Protocol(format!(
                "expected connect reply, got {:?}",
                other
            ))),
        }
    }

    /// Engine.IO session id assigned by the server.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Send a named event to the server.
    pub async fn emit(&mut self, event: &str, data: Value) -> Result<(), ComError> {
        self.send_socket(&SocketPacket::event(event, data)).await
    }

    /// Receive the next event from the server as `(name, data)`.
    ///
    /// Pings are answered and acks skipped along the way.
    /// Returns `ComError::ConnectionClosed` if the server ends the session.
    pub async fn recv(&mut self) -> Result<(String, Value), ComError> {
        loop {
            match self.next_socket_packet().await? {
                SocketPacket::Event { name, data, .. } => return Ok((name, data)),
                SocketPacket::Disconnect { .. } => return Err(ComError::ConnectionClosed),
                _ => {}
            }
        }
    }

    /// Leave the namespace and close the WebSocket.
    pub async fn close(mut self) -> Result<(), ComError> {
        self.send_socket(&SocketPacket::Disconnect {
            namespace: "/".to_string(),
        })
        .await?;
        self.stream.close().await?;
        Ok(())
    }

    async fn next_socket_packet(&mut self) -> Result<SocketPacket, ComError> {
        loop {
            match self.next_engine_packet().await? {
                EnginePacket::Message(payload) => return SocketPacket::parse(&payload),
                EnginePacket::Ping(data) => self.send(&EnginePacket::Pong(data)).await?,
                EnginePacket::Close => return Err(ComError::ConnectionClosed),
                _ => {}
            }
        }
    }

    async fn next_engine_packet(&mut self) -> Result<EnginePacket, ComError> {
        loop {
            match self.stream.next().await {
                Some(Ok(msg)) => {
                    // ignore binary and control frames
                    if let Some(text) = msg.as_text() {
                        if text.len() > MAX_MESSAGE_SIZE as usize {
                            return Err(ComError::MessageTooLarge(text.len() as u32));
                        }
                        return EnginePacket::parse(text);
                    }
                }
                Some(Err(e)) => return Err(ComError::from(e)),
                None => return Err(ComError::ConnectionClosed),
            }
        }
    }

    async fn send_socket(&mut self, packet: &SocketPacket) -> Result<(), ComError> {
        self.send(&EnginePacket::Message(packet.encode())).await
    }

    async fn send(&mut self, packet: &EnginePacket) -> Result<(), ComError> {
        self.stream.send(Message::text(packet.encode())).await?;
        Ok(())
    }
}
