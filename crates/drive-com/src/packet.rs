//! Engine.IO and Socket.IO text packet codec.
//!
//! Every WebSocket text frame carries one Engine.IO packet: a type digit
//! followed by its payload. Socket.IO packets travel inside Engine.IO
//! `message` packets and have the layout
//! `<type>[<namespace>,][<ack id>][<json>]`.

use crate::ComError;
use serde_json::Value;

pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024 * 1024; // 64 MB

const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// Handshake sent by the server right after the WebSocket opens.
    Open(Value),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn parse(text: &str) -> Result<Self, ComError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ComError::Protocol("empty engine packet".to_string()))?;
        let payload = chars.as_str();
        match kind {
            '0' => Ok(EnginePacket::Open(serde_json::from_str(payload)?)),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(payload.to_string())),
            '3' => Ok(EnginePacket::Pong(payload.to_string())),
            '4' => Ok(EnginePacket::Message(payload.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(ComError::Protocol(format!(
                "unknown engine packet type '{other}'"
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => format!("0{handshake}"),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    /// Named event. `data` is the single argument after the name; several
    /// arguments arrive as an array and none as `null`.
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        data: Value,
    },
    Ack {
        namespace: String,
        id: u64,
        data: Value,
    },
    ConnectError {
        namespace: String,
        data: Value,
    },
}

impl SocketPacket {
    /// Event on the default namespace without an ack id.
    pub fn event(name: &str, data: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            name: name.to_string(),
            data,
        }
    }

    pub fn parse(text: &str) -> Result<Self, ComError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ComError::Protocol("empty socket packet".to_string()))?;
        if matches!(kind, '5' | '6') {
            return Err(ComError::Protocol(
                "binary attachments are not supported".to_string(),
            ));
        }
        let mut rest = chars.as_str();

        let mut namespace = DEFAULT_NAMESPACE;
        if rest.starts_with('/') {
            match rest.find(',') {
                Some(comma) => {
                    namespace = &rest[..comma];
                    rest = &rest[comma + 1..];
                }
                None => {
                    namespace = rest;
                    rest = "";
                }
            }
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let id = if digits > 0 {
            Some(
                rest[..digits]
                    .parse::<u64>()
                    .map_err(|e| ComError::Protocol(format!("bad ack id: {e}")))?,
            )
        } else {
            None
        };
        rest = &rest[digits..];

        let json: Option<Value> = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };
        let namespace = namespace.to_string();

        match kind {
            '0' => Ok(SocketPacket::Connect {
                namespace,
                data: json,
            }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let Some(Value::Array(mut args)) = json else {
                    return Err(ComError::Protocol("event payload is not an array".to_string()));
                };
                if args.is_empty() {
                    return Err(ComError::Protocol("event without a name".to_string()));
                }
                let Value::String(name) = args.remove(0) else {
                    return Err(ComError::Protocol("event name is not a string".to_string()));
                };
                let data = match args.len() {
                    0 => Value::Null,
                    1 => args.remove(0),
                    _ => Value::Array(args),
                };
                Ok(SocketPacket::Event {
                    namespace,
                    id,
                    name,
                    data,
                })
            }
            '3' => {
                let id = id.ok_or_else(|| ComError::Protocol("ack without id".to_string()))?;
                Ok(SocketPacket::Ack {
                    namespace,
                    id,
                    data: json.unwrap_or(Value::Array(Vec::new())),
                })
            }
            '4' => Ok(SocketPacket::ConnectError {
                namespace,
                data: json.unwrap_or(Value::Null),
            }),
            other => Err(ComError::Protocol(format!(
                "unknown socket packet type '{other}'"
            ))),
        }
    }

    pub fn encode(&self) -> String {
        let (kind, namespace, id, json) = match self {
            SocketPacket::Connect { namespace, data } => ('0', namespace, None, data.clone()),
            SocketPacket::Disconnect { namespace } => ('1', namespace, None, None),
            SocketPacket::Event {
                namespace,
                id,
                name,
                data,
            } => (
                '2',
                namespace,
                *id,
                Some(Value::Array(vec![Value::String(name.clone()), data.clone()])),
            ),
            SocketPacket::Ack {
                namespace,
                id,
                data,
            } => ('3', namespace, Some(*id), Some(data.clone())),
            SocketPacket::ConnectError { namespace, data } => {
                ('4', namespace, None, Some(data.clone()))
            }
        };

        let mut out = String::new();
        out.push(kind);
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(json) = json {
            out.push_str(&json.to_string());
        }
        out
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }
}
