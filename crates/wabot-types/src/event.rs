//! Events emitted by the session provider.

use serde::{Deserialize, Serialize};

use crate::chat::{GroupJoin, InboundMessage};

/// A lifecycle or inbound event from the messaging session.
///
/// Serialized adjacently tagged so the bridge can emit
/// `{"kind":"message","payload":{...}}` and `{"kind":"ready"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A pairing string the operator must scan with their phone.
    Qr(String),
    /// The session was authenticated (pairing or restored credentials).
    Authenticated,
    /// The session is ready to send and receive.
    Ready,
    /// The session was disconnected, with a provider-supplied reason.
    Disconnected(String),
    /// A new inbound message.
    Message(InboundMessage),
    /// A contact joined a group the bot is in.
    GroupJoin(GroupJoin),
}

impl SessionEvent {
    /// Short event name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Qr(_) => "qr",
            SessionEvent::Authenticated => "authenticated",
            SessionEvent::Ready => "ready",
            SessionEvent::Disconnected(_) => "disconnected",
            SessionEvent::Message(_) => "message",
            SessionEvent::GroupJoin(_) => "group_join",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_event_without_payload() {
        let event: SessionEvent = serde_json::from_str(r#"{"kind":"ready"}"#).unwrap();
        assert_eq!(event, SessionEvent::Ready);
    }

    #[test]
    fn test_qr_event() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"kind":"qr","payload":"2@abc,def"}"#).unwrap();
        assert_eq!(event, SessionEvent::Qr("2@abc,def".to_string()));
        assert_eq!(event.kind(), "qr");
    }

    #[test]
    fn test_message_event() {
        let json = r#"{
            "kind": "message",
            "payload": {"id": "m1", "chat_id": "1@c.us", "from": "1@c.us", "body": "hi"}
        }"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        match event {
            SessionEvent::Message(msg) => assert_eq!(msg.body, "hi"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_disconnected_event_serializes_reason() {
        let json = serde_json::to_string(&SessionEvent::Disconnected("LOGOUT".into())).unwrap();
        assert_eq!(json, r#"{"kind":"disconnected","payload":"LOGOUT"}"#);
    }
}
