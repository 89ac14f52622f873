//! Wire types for the realtime channel

use crate::runtime::OutboundEvent;
use crate::session::Session;
use crate::state_machine::TicketContext;
use serde::{Deserialize, Serialize};

/// Inbound frame on the realtime channel
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub message: String,
}

/// Response for session creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Outbound events on the realtime channel
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Full session snapshot, sent once on connect
    History { data: Session },
    /// Transient progress notice; advisory only
    Status { message: String },
    /// Result of a successfully processed turn
    Message { data: TurnReply },
    /// A failed turn; the client may resend
    Error { data: TurnFailure },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub reply: String,
    pub context: TicketContext,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnFailure {
    pub error: String,
    pub retry_after_ms: u64,
}

impl From<OutboundEvent> for ServerEvent {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::Status { message } => ServerEvent::Status { message },
            OutboundEvent::Message {
                reply,
                context,
                latency_ms,
            } => ServerEvent::Message {
                data: TurnReply {
                    reply,
                    context,
                    latency_ms,
                },
            },
            OutboundEvent::Error {
                error,
                retry_after_ms,
            } => ServerEvent::Error {
                data: TurnFailure {
                    error,
                    retry_after_ms,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GREETING;

    #[test]
    fn history_event_wire_shape() {
        let event = ServerEvent::History {
            data: Session::new("s-1"),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "history");
        assert_eq!(json["data"]["sessionId"], "s-1");
        let messages = json["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "assistant");
        assert_eq!(messages[0]["text"], GREETING);
        assert_eq!(json["data"]["context"]["state"], "greeting");
        assert_eq!(json["data"]["context"]["ticketId"], serde_json::Value::Null);
        // The store version is internal, never on the wire.
        assert!(json["data"].get("version").is_none());
    }

    #[test]
    fn message_event_wire_shape() {
        let event = ServerEvent::Message {
            data: TurnReply {
                reply: "Which model?".to_string(),
                context: TicketContext::default(),
                latency_ms: 42,
            },
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "message");
        assert_eq!(json["data"]["reply"], "Which model?");
        assert_eq!(json["data"]["latencyMs"], 42);
    }

    #[test]
    fn error_event_wire_shape() {
        let event = ServerEvent::Error {
            data: TurnFailure {
                error: "Upstream LLM error: timed out".to_string(),
                retry_after_ms: 1000,
            },
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["retryAfterMs"], 1000);
    }

    #[test]
    fn inbound_frame_parses() {
        let inbound: ClientMessage =
            serde_json::from_str(r#"{"message":"my printer is jammed"}"#).unwrap();
        assert_eq!(inbound.message, "my printer is jammed");
    }
}
