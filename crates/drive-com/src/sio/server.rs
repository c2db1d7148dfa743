use {
    crate::{
        ComError, Emitter, Inbound, RealtimeChannel, SessionId,
        packet::{EnginePacket, MAX_MESSAGE_SIZE, SocketPacket},
    },
    futures_util::{SinkExt, StreamExt},
    serde_json::{Value, json},
    std::{
        collections::HashMap,
        net::SocketAddr,
        sync::Arc,
        time::Duration,
    },
    tokio::{
        net::{TcpListener, TcpStream, ToSocketAddrs},
        sync::{
            RwLock,
            mpsc::{self, error::TrySendError},
            oneshot,
        },
        task::JoinHandle,
        time::Instant,
    },
    tokio_websockets::{Message, ServerBuilder, WebSocketStream},
};

type WsSink = futures_util::stream::SplitSink<WebSocketStream<TcpStream>, Message>;
type WsReader = futures_util::stream::SplitStream<WebSocketStream<TcpStream>>;
type Peers = Arc<RwLock<HashMap<SessionId, Peer>>>;

/// Outbound messages buffered per peer before it counts as stalled.
pub const OUTBOUND_QUEUE: usize = 32;

struct Peer {
    outbox: mpsc::Sender<Message>,
    // only joined peers receive emitted events
    joined: bool,
    // dropped with the entry, which wakes the peer task
    _kick: oneshot::Sender<()>,
}

/// Engine.IO liveness settings announced in the open handshake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(25_000),
            timeout: Duration::from_millis(20_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Revision {
    /// The client sends pings.
    V3,
    /// The server sends pings.
    V4,
}

impl Revision {
    fn from_query(query: Option<&str>) -> Self {
        let eio = query
            .unwrap_or("")
            .split('&')
            .find_map(|pair| pair.strip_prefix("EIO="));
        match eio {
            Some("3") => Revision::V3,
            _ => Revision::V4,
        }
    }
}

/// Socket.IO server over the Engine.IO WebSocket transport.
pub struct SioServer {
    peers: Peers,
    rx: mpsc::Receiver<Inbound>,
    _accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl SioServer {
    /// Bind a TCP listener and start accepting Socket.IO connections.
    ///
    /// Each connection gets its own task that performs the WebSocket and
    /// Engine.IO handshakes and then forwards connect, event and disconnect
    /// notifications into the channel read by `recv`.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        Self::bind_with_heartbeat(addr, Heartbeat::default()).await
    }

    pub async fn bind_with_heartbeat(
        addr: impl ToSocketAddrs,
        heartbeat: Heartbeat,
    ) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let peers: Peers = Arc::new(RwLock::new(HashMap::new()));
        let peers_clone = peers.clone();

        let (tx, rx) = mpsc::channel(256);
        let mut next_session = 1;

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((tcp_stream, addr)) => {
                        let session = SessionId(next_session);
                        next_session += 1;
                        tokio::spawn(PeerTask::serve(
                            session,
                            addr,
                            tcp_stream,
                            peers_clone.clone(),
                            tx.clone(),
                            heartbeat,
                        ));
                    }
                    Err(e) => {
                        log::warn!("Accept error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        });

        Ok(Self {
            peers,
            rx,
            _accept_task: accept_task,
            local_addr,
        })
    }

    /// Return the number of sessions that completed the Socket.IO connect.
    pub async fn client_count(&self) -> usize {
        self.peers.read().await.values().filter(|p| p.joined).count()
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl RealtimeChannel for SioServer {
    type Emitter = SioEmitter;

    fn emitter(&self) -> SioEmitter {
        SioEmitter {
            peers: self.peers.clone(),
        }
    }

    /// Receive the next notification from any connected client.
    ///
    /// Each client has a dedicated reader task, so no single client blocks others.
    async fn recv(&mut self) -> Result<Inbound, ComError> {
        self.rx.recv().await.ok_or(ComError::ConnectionClosed)
    }
}

impl Drop for SioServer {
    fn drop(&mut self) {
        self._accept_task.abort();
    }
}

/// Broadcasts events to every joined session of a [`SioServer`].
#[derive(Clone)]
pub struct SioEmitter {
    peers: Peers,
}

impl Emitter for SioEmitter {
    /// Queues the event for every joined client without waiting on any socket.
    ///
    /// Clients whose queue is full or closed are removed and logged as
    /// warnings. Returns `Ok(())` regardless of individual client failures.
    async fn emit(&self, event: &str, data: Value) -> Result<(), ComError> {
        let text = EnginePacket::Message(SocketPacket::event(event, data).encode()).encode();
        let len = u32::try_from(text.len()).map_err(|_| ComError::MessageTooLarge(u32::MAX))?;
        if len > MAX_MESSAGE_SIZE {
            return Err(ComError::MessageTooLarge(len));
        }
        let msg = Message::text(text);

        let mut failed = Vec::new();
        for (session, peer) in self.peers.read().await.iter().filter(|(_, peer)| peer.joined) {
            match peer.outbox.try_send(msg.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("Session {} is not reading, dropping it on '{}'", session, event);
                    failed.push(*session);
                }
                Err(TrySendError::Closed(_)) => {
                    log::warn!("Failed to send '{}' to session {}: connection closed", event, session);
                    failed.push(*session);
                }
            }
        }

        if !failed.is_empty() {
            let mut lock = self.peers.write().await;
            for session in failed {
                lock.remove(&session);
            }
        }

        Ok(())
    }
}

struct PeerTask {
    session: SessionId,
    addr: SocketAddr,
    revision: Revision,
    joined: bool,
    outbox: mpsc::Sender<Message>,
    peers: Peers,
    tx: mpsc::Sender<Inbound>,
}

impl PeerTask {
    async fn serve(
        session: SessionId,
        addr: SocketAddr,
        tcp_stream: TcpStream,
        peers: Peers,
        tx: mpsc::Sender<Inbound>,
        heartbeat: Heartbeat,
    ) {
        let (request, ws_stream) = match ServerBuilder::new().accept(tcp_stream).await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("WebSocket handshake failed for {}: {}", addr, e);
                return;
            }
        };
        let revision = Revision::from_query(request.uri().query());

        let (sink, reader) = ws_stream.split();
        let (outbox, queue) = mpsc::channel(OUTBOUND_QUEUE);
        let (kick, kicked) = oneshot::channel();
        peers.write().await.insert(
            session,
            Peer {
                outbox: outbox.clone(),
                joined: false,
                _kick: kick,
            },
        );
        let writer = tokio::spawn(write_queue(session, sink, queue));
        log::debug!("Session {} opened from {} ({:?})", session, addr, revision);

        let mut peer = PeerTask {
            session,
            addr,
            revision,
            joined: false,
            outbox,
            peers,
            tx,
        };
        peer.run(reader, kicked, writer, heartbeat).await;
    }

    async fn run(
        &mut self,
        mut reader: WsReader,
        mut kicked: oneshot::Receiver<()>,
        mut writer: JoinHandle<()>,
        heartbeat: Heartbeat,
    ) {
        if let Err(e) = self.open(heartbeat).await {
            log::warn!("Engine.IO handshake failed for {}: {}", self.addr, e);
            self.close(writer).await;
            return;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
        let mut last_seen = Instant::now();
        loop {
            tokio::select! {
                next = reader.next() => match next {
                    Some(Ok(msg)) => {
                        last_seen = Instant::now();
                        if msg.is_close() {
                            break;
                        }
                        let Some(text) = msg.as_text() else {
                            // binary attachments are not supported
                            continue;
                        };
                        if text.len() > MAX_MESSAGE_SIZE as usize {
                            log::warn!("Message from session {} too large: {} bytes", self.session, text.len());
                            continue;
                        }
                        match self.on_text(text).await {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(ComError::Protocol(msg)) => {
                                log::warn!("Protocol error from session {}: {}", self.session, msg);
                            }
                            Err(ComError::Json(e)) => {
                                log::warn!("Malformed packet from session {}: {}", self.session, e);
                            }
                            Err(e) => {
                                log::warn!("Session {} error: {}", self.session, e);
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        log::warn!("Session {} error: {}", self.session, e);
                        break;
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    if last_seen.elapsed() > heartbeat.interval + heartbeat.timeout {
                        log::warn!("Session {} timed out", self.session);
                        break;
                    }
                    if self.revision == Revision::V4 && self.send(&EnginePacket::Ping(String::new())).is_err() {
                        break;
                    }
                }
                _ = &mut kicked => {
                    log::debug!("Session {} removed by emitter", self.session);
                    break;
                }
                _ = &mut writer => {
                    log::debug!("Session {} writer stopped", self.session);
                    break;
                }
            }
        }

        self.close(writer).await;
    }

    async fn open(&mut self, heartbeat: Heartbeat) -> Result<(), ComError> {
        let handshake = json!({
            "sid": self.sid(),
            "upgrades": [],
            "pingInterval": heartbeat.interval.as_millis() as u64,
            "pingTimeout": heartbeat.timeout.as_millis() as u64,
            "maxPayload": MAX_MESSAGE_SIZE,
        });
        self.send(&EnginePacket::Open(handshake))?;

        // every client joins "/" right away, whether or not it asks
        self.send_socket(&self.connect_reply())?;
        self.join().await
    }

    fn connect_reply(&self) -> SocketPacket {
        let data = match self.revision {
            Revision::V3 => None,
            Revision::V4 => Some(json!({ "sid": self.sid() })),
        };
        SocketPacket::Connect {
            namespace: "/".to_string(),
            data,
        }
    }

    /// Handle one Engine.IO packet. Returns `Ok(false)` when the peer is done.
    async fn on_text(&mut self, text: &str) -> Result<bool, ComError> {
        match EnginePacket::parse(text)? {
            EnginePacket::Ping(data) => self.send(&EnginePacket::Pong(data))?,
            EnginePacket::Pong(_) | EnginePacket::Noop | EnginePacket::Upgrade => {}
            EnginePacket::Close => return Ok(false),
            EnginePacket::Open(_) => {
                return Err(ComError::Protocol("unexpected open packet".to_string()));
            }
            EnginePacket::Message(payload) => return self.on_socket(SocketPacket::parse(&payload)?).await,
        }
        Ok(true)
    }

    async fn on_socket(&mut self, packet: SocketPacket) -> Result<bool, ComError> {
        if packet.namespace() != "/" {
            return Err(ComError::Protocol(format!(
                "unsupported namespace '{}'",
                packet.namespace()
            )));
        }

        match packet {
            SocketPacket::Connect { .. } => {
                // already joined at open, answer without a second Connect
                self.send_socket(&self.connect_reply())?;
            }
            SocketPacket::Event { id, name, data, .. } => {
                if let Some(id) = id {
                    self.send_socket(&SocketPacket::Ack {
                        namespace: "/".to_string(),
                        id,
                        data: Value::Array(Vec::new()),
                    })?;
                }
                self.forward(Inbound::Event {
                    session: self.session,
                    name,
                    data,
                })
                .await?;
            }
            SocketPacket::Disconnect { .. } => return Ok(false),
            SocketPacket::Ack { .. } | SocketPacket::ConnectError { .. } => {}
        }
        Ok(true)
    }

    async fn join(&mut self) -> Result<(), ComError> {
        if let Some(peer) = self.peers.write().await.get_mut(&self.session) {
            peer.joined = true;
        }
        self.joined = true;
        self.forward(Inbound::Connect {
            session: self.session,
        })
        .await
    }

    async fn close(&mut self, writer: JoinHandle<()>) {
        writer.abort();
        self.peers.write().await.remove(&self.session);
        if self.joined {
            self.joined = false;
            let _ = self
                .forward(Inbound::Disconnect {
                    session: self.session,
                })
                .await;
        }
        log::debug!("Session {} closed", self.session);
    }

    async fn forward(&self, inbound: Inbound) -> Result<(), ComError> {
        self.tx
            .send(inbound)
            .await
            .map_err(|_| ComError::ConnectionClosed)
    }

    fn send_socket(&self, packet: &SocketPacket) -> Result<(), ComError> {
        self.send(&EnginePacket::Message(packet.encode()))
    }

    /// Queue a packet for this peer. A full queue means the peer stopped reading.
    fn send(&self, packet: &EnginePacket) -> Result<(), ComError> {
        self.outbox
            .try_send(Message::text(packet.encode()))
            .map_err(|_| ComError::ConnectionClosed)
    }

    fn sid(&self) -> String {
        format!("{:016x}", self.session.0)
    }
}

/// Drain a peer's outbound queue into its socket until either side closes.
async fn write_queue(session: SessionId, mut sink: WsSink, mut queue: mpsc::Receiver<Message>) {
    while let Some(msg) = queue.recv().await {
        if let Err(e) = sink.send(msg).await {
            log::debug!("Session {} write failed: {}", session, e);
            return;
        }
    }
    let _ = sink.close().await;
}
