//! BridgeSession: a [`SessionProvider`] backed by a JSON Lines subprocess.
//!
//! Requests are written to the bridge's stdin one line at a time and
//! correlated with responses through a concurrent pending map keyed by
//! request id. A background reader task parses stdout and resolves pending
//! requests. Session events go through an unbounded queue to a forwarder
//! task, so a slow event consumer never holds up responses.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wabot_core::session::SessionProvider;
use wabot_types::chat::{Chat, ChatId, Contact, ContactId, InboundMessage, Membership};
use wabot_types::config::BridgeConfig;
use wabot_types::error::SessionError;
use wabot_types::event::SessionEvent;
use wabot_types::reaction::Reaction;

use super::protocol::{BridgeCommand, BridgeFrame, BridgeRequest};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

type PendingMap = DashMap<Uuid, oneshot::Sender<Result<Value, SessionError>>>;
type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Session provider speaking JSON Lines to a bridge process.
pub struct BridgeSession {
    writer: Mutex<BoxWriter>,
    pending: Arc<PendingMap>,
    closed: Arc<AtomicBool>,
    request_timeout: Duration,
    child: std::sync::Mutex<Option<Child>>,
}

impl BridgeSession {
    /// Launch the bridge program from `config` and connect to its stdio.
    ///
    /// The child's stderr is inherited so its own logs reach the console.
    /// The child is killed when the session is dropped.
    pub fn spawn(
        config: &BridgeConfig,
    ) -> Result<(Self, mpsc::Receiver<SessionEvent>), SessionError> {
        let program = config
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SessionError::Io("no bridge command configured".to_string()))?;

        let mut child = Command::new(program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SessionError::Io(format!("failed to start bridge '{program}': {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Io("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Io("bridge stdout unavailable".to_string()))?;

        info!(program, pid = child.id(), "Bridge process started");

        let timeout = Duration::from_millis(config.request_timeout_ms);
        let (session, events) = Self::connect(stdout, stdin, timeout);
        *session.lock_child() = Some(child);
        Ok((session, events))
    }

    /// Connect over an arbitrary reader/writer pair.
    ///
    /// Must be called inside a Tokio runtime: it spawns the reader task.
    pub fn connect<R, W>(
        reader: R,
        writer: W,
        request_timeout: Duration,
    ) -> (Self, mpsc::Receiver<SessionEvent>)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: Arc<PendingMap> = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(read_frames(
            reader,
            Arc::clone(&pending),
            Arc::clone(&closed),
            queue_tx,
        ));
        tokio::spawn(forward_events(queue_rx, events_tx));

        let session = Self {
            writer: Mutex::new(Box::new(writer)),
            pending,
            closed,
            request_timeout,
            child: std::sync::Mutex::new(None),
        };
        (session, events_rx)
    }

    /// Ask the bridge process to exit now instead of waiting for drop.
    pub fn kill(&self) {
        if let Some(child) = self.lock_child().as_mut() {
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "Failed to kill bridge process");
            }
        }
    }

    fn lock_child(&self) -> std::sync::MutexGuard<'_, Option<Child>> {
        // A poisoned lock only means another thread panicked mid-kill.
        self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Send one request and wait for its raw result.
    async fn request(&self, command: BridgeCommand) -> Result<Value, SessionError> {
        let op = command.op();
        let request = BridgeRequest::new(command);
        let id = request.id;
        let line = request
            .to_line()
            .map_err(|e| SessionError::Protocol(format!("failed to encode {op} request: {e}")))?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        let _registration = PendingGuard {
            pending: &self.pending,
            id,
        };

        // The reader clears the map after setting `closed`, so a request
        // registered after that point must notice the flag itself.
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }

        debug!(%id, op, "Sending bridge request");
        self.write_line(&line).await?;

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SessionError::Closed),
            Err(_) => Err(SessionError::Timeout(self.request_timeout.as_millis() as u64)),
        }
    }

    /// Send a request and decode its result as `T`.
    async fn query<T: DeserializeOwned>(&self, command: BridgeCommand) -> Result<T, SessionError> {
        let op = command.op();
        let value = self.request(command).await?;
        serde_json::from_value(value)
            .map_err(|e| SessionError::Protocol(format!("invalid {op} result: {e}")))
    }

    /// Send a request whose result carries no data.
    async fn command(&self, command: BridgeCommand) -> Result<(), SessionError> {
        self.request(command).await.map(|_| ())
    }

    async fn write_line(&self, line: &str) -> Result<(), SessionError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Removes a request's pending entry however its future ends.
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

/// Reader task: runs until the bridge's stdout closes or fails.
async fn read_frames<R>(
    reader: R,
    pending: Arc<PendingMap>,
    closed: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<SessionEvent>,
) where
    R: AsyncRead + Send + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read from bridge");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match BridgeFrame::parse(&line) {
            Ok(BridgeFrame::Response { id, result, error }) => {
                let Some((_, tx)) = pending.remove(&id) else {
                    debug!(%id, "Response for unknown or expired request, dropping");
                    continue;
                };
                let outcome = match error {
                    Some(message) => Err(SessionError::Remote(message)),
                    None => Ok(result.unwrap_or(Value::Null)),
                };
                // The requester may have timed out in the meantime.
                let _ = tx.send(outcome);
            }
            Ok(BridgeFrame::Event { event }) => {
                debug!(kind = event.kind(), "Bridge event");
                if events.send(event).is_err() {
                    debug!("Event forwarder gone, discarding bridge event");
                }
            }
            Err(e) => {
                warn!(error = %e, line = %truncate(&line, 200), "Unparseable bridge frame, skipping");
            }
        }
    }

    closed.store(true, Ordering::SeqCst);
    // Dropping the senders fails every waiting request with `Closed`.
    pending.clear();
    info!("Bridge output closed");
    let _ = events.send(SessionEvent::Disconnected("bridge closed".to_string()));
}

/// Forwarder task: moves queued events into the bounded consumer channel.
///
/// Ends once the reader has finished and the queue is drained, or when the
/// consumer goes away.
async fn forward_events(
    mut queue: mpsc::UnboundedReceiver<SessionEvent>,
    events: mpsc::Sender<SessionEvent>,
) {
    while let Some(event) = queue.recv().await {
        if events.send(event).await.is_err() {
            debug!("Event receiver dropped, stopping event forwarder");
            break;
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

impl SessionProvider for BridgeSession {
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), SessionError> {
        self.command(BridgeCommand::Reply {
            chat_id: message.chat_id.clone(),
            message_id: message.id.clone(),
            text: text.to_string(),
        })
        .await
    }

    async fn react(&self, message: &InboundMessage, reaction: Reaction) -> Result<(), SessionError> {
        self.command(BridgeCommand::React {
            chat_id: message.chat_id.clone(),
            message_id: message.id.clone(),
            emoji: reaction.emoji().to_string(),
        })
        .await
    }

    async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        mentions: &[Contact],
    ) -> Result<(), SessionError> {
        self.command(BridgeCommand::SendMessage {
            chat_id: chat_id.clone(),
            text: text.to_string(),
            mentions: mentions.iter().map(|c| c.id.clone()).collect(),
        })
        .await
    }

    async fn set_typing(&self, chat_id: &ChatId) -> Result<(), SessionError> {
        self.command(BridgeCommand::SetTyping {
            chat_id: chat_id.clone(),
        })
        .await
    }

    async fn remove_participants(
        &self,
        chat_id: &ChatId,
        participants: &[ContactId],
    ) -> Result<(), SessionError> {
        self.command(BridgeCommand::RemoveParticipants {
            chat_id: chat_id.clone(),
            participants: participants.to_vec(),
        })
        .await
    }

    async fn get_chat(&self, chat_id: &ChatId) -> Result<Chat, SessionError> {
        self.query(BridgeCommand::GetChat {
            chat_id: chat_id.clone(),
        })
        .await
    }

    async fn get_contact(&self, contact_id: &ContactId) -> Result<Contact, SessionError> {
        self.query(BridgeCommand::GetContact {
            contact_id: contact_id.clone(),
        })
        .await
    }

    async fn get_own_membership(&self, chat_id: &ChatId) -> Result<Membership, SessionError> {
        self.query(BridgeCommand::GetOwnMembership {
            chat_id: chat_id.clone(),
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

    /// The far end of the duplex pipe, playing the bridge.
    struct FakeBridge {
        lines: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl FakeBridge {
        async fn next_request(&mut self) -> Value {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }

        async fn send(&mut self, frame: Value) {
            let mut line = frame.to_string();
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }

        async fn send_raw(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }
    }

    fn connect(timeout: Duration) -> (BridgeSession, mpsc::Receiver<SessionEvent>, FakeBridge) {
        let (bot_side, bridge_side) = tokio::io::duplex(64 * 1024);
        let (bot_read, bot_write) = tokio::io::split(bot_side);
        let (bridge_read, bridge_write) = tokio::io::split(bridge_side);

        let (session, events) = BridgeSession::connect(bot_read, bot_write, timeout);
        let fake = FakeBridge {
            lines: BufReader::new(bridge_read).lines(),
            writer: bridge_write,
        };
        (session, events, fake)
    }

    fn message() -> InboundMessage {
        InboundMessage {
            id: "msg-1".to_string(),
            chat_id: ChatId::new("15550000001@c.us"),
            from: ContactId::new("15550000001@c.us"),
            author: None,
            body: "hi".to_string(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_get_chat_round_trip() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));

        let call = tokio::spawn(async move {
            let chat = session.get_chat(&ChatId::new("120363000000@g.us")).await;
            (session, chat)
        });

        let request = bridge.next_request().await;
        assert_eq!(request["op"], "get_chat");
        assert_eq!(request["chat_id"], "120363000000@g.us");
        bridge
            .send(json!({
                "type": "response",
                "id": request["id"],
                "result": {
                    "id": "120363000000@g.us",
                    "name": "Weekend Plans",
                    "is_group": true,
                    "participants": [{"id": "1@c.us", "is_admin": true}, {"id": "2@c.us"}]
                }
            }))
            .await;

        let (_session, chat) = call.await.unwrap();
        let chat = chat.unwrap();
        assert!(chat.is_group);
        assert_eq!(chat.name.as_deref(), Some("Weekend Plans"));
        assert_eq!(chat.participants.len(), 2);
        assert!(chat.participants[0].is_admin);
        assert!(!chat.participants[1].is_admin);
    }

    #[tokio::test]
    async fn test_react_sends_emoji_and_accepts_null_result() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));

        let call = tokio::spawn(async move { session.react(&message(), Reaction::Heart).await });

        let request = bridge.next_request().await;
        assert_eq!(request["op"], "react");
        assert_eq!(request["message_id"], "msg-1");
        assert_eq!(request["emoji"], "❤️");
        bridge
            .send(json!({"type": "response", "id": request["id"], "result": null}))
            .await;

        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_error_response_maps_to_remote() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));

        let call = tokio::spawn(async move {
            session
                .remove_participants(
                    &ChatId::new("120363000000@g.us"),
                    &[ContactId::new("1@c.us")],
                )
                .await
        });

        let request = bridge.next_request().await;
        assert_eq!(request["op"], "remove_participants");
        assert_eq!(request["participants"], json!(["1@c.us"]));
        bridge
            .send(json!({"type": "response", "id": request["id"], "error": "not an admin"}))
            .await;

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Remote(ref m) if m == "not an admin"));
    }

    #[tokio::test]
    async fn test_invalid_result_maps_to_protocol_error() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));

        let call = tokio::spawn(async move {
            session
                .get_own_membership(&ChatId::new("120363000000@g.us"))
                .await
        });

        let request = bridge.next_request().await;
        bridge
            .send(json!({"type": "response", "id": request["id"], "result": "yes"}))
            .await;

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_request_times_out_without_response() {
        let (session, _events, mut bridge) = connect(Duration::from_millis(50));

        let call = tokio::spawn(async move {
            let result = session.set_typing(&ChatId::new("15550000001@c.us")).await;
            (session, result)
        });

        let request = bridge.next_request().await;
        assert_eq!(request["op"], "set_typing");

        let (session, result) = call.await.unwrap();
        assert!(matches!(result, Err(SessionError::Timeout(50))));
        assert!(session.pending.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_request_releases_pending_entry() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));
        let session = Arc::new(session);

        let waiting = Arc::clone(&session);
        let call = tokio::spawn(async move {
            waiting.get_chat(&ChatId::new("120363000000@g.us")).await
        });

        bridge.next_request().await;
        assert_eq!(session.pending.len(), 1);

        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());
        assert!(session.pending.is_empty());
    }

    #[tokio::test]
    async fn test_unread_events_do_not_stall_responses() {
        let (session, _events, mut bridge) = connect(Duration::from_millis(300));

        let call = tokio::spawn(async move {
            session.set_typing(&ChatId::new("15550000001@c.us")).await
        });

        let request = bridge.next_request().await;
        for _ in 0..EVENT_CHANNEL_CAPACITY + 1 {
            bridge
                .send(json!({"type": "event", "event": {"kind": "ready"}}))
                .await;
        }
        bridge
            .send(json!({"type": "response", "id": request["id"], "result": null}))
            .await;

        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_queued_events_keep_order_after_backlog() {
        let (_session, mut events, mut bridge) = connect(Duration::from_secs(5));

        for i in 0..EVENT_CHANNEL_CAPACITY + 8 {
            bridge
                .send(json!({"type": "event", "event": {"kind": "qr", "payload": format!("code-{i}")}}))
                .await;
        }
        drop(bridge);

        for i in 0..EVENT_CHANNEL_CAPACITY + 8 {
            assert_eq!(events.recv().await, Some(SessionEvent::Qr(format!("code-{i}"))));
        }
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::Disconnected("bridge closed".to_string()))
        );
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_events_forwarded_and_garbage_skipped() {
        let (_session, mut events, mut bridge) = connect(Duration::from_secs(5));

        bridge.send_raw("this is not json\n").await;
        bridge.send_raw("\n").await;
        bridge
            .send(json!({"type": "event", "event": {"kind": "qr", "payload": "2@abc"}}))
            .await;
        bridge
            .send(json!({
                "type": "event",
                "event": {
                    "kind": "message",
                    "payload": {
                        "id": "msg-9",
                        "chat_id": "120363000000@g.us",
                        "from": "120363000000@g.us",
                        "author": "1@c.us",
                        "body": "!ping"
                    }
                }
            }))
            .await;

        assert_eq!(events.recv().await, Some(SessionEvent::Qr("2@abc".to_string())));
        match events.recv().await {
            Some(SessionEvent::Message(msg)) => {
                assert_eq!(msg.body, "!ping");
                assert_eq!(msg.sender().as_str(), "1@c.us");
            }
            other => panic!("expected message event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_ends_stream() {
        let (session, mut events, mut bridge) = connect(Duration::from_secs(5));
        let session = Arc::new(session);

        let waiting = Arc::clone(&session);
        let call =
            tokio::spawn(async move { waiting.get_contact(&ContactId::new("1@c.us")).await });

        let request = bridge.next_request().await;
        assert_eq!(request["op"], "get_contact");
        drop(bridge);

        assert!(matches!(call.await.unwrap(), Err(SessionError::Closed)));
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::Disconnected("bridge closed".to_string()))
        );
        assert_eq!(events.recv().await, None);

        // Requests after close fail fast.
        let err = session
            .set_typing(&ChatId::new("15550000001@c.us"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Closed | SessionError::Io(_)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_resolve_out_of_order() {
        let (session, _events, mut bridge) = connect(Duration::from_secs(5));
        let session = Arc::new(session);

        let a = {
            let s = Arc::clone(&session);
            tokio::spawn(async move { s.get_contact(&ContactId::new("1@c.us")).await })
        };
        let first = bridge.next_request().await;
        let b = {
            let s = Arc::clone(&session);
            tokio::spawn(async move { s.get_contact(&ContactId::new("2@c.us")).await })
        };
        let second = bridge.next_request().await;

        bridge
            .send(json!({"type": "response", "id": second["id"], "result": {"id": "2@c.us"}}))
            .await;
        bridge
            .send(json!({"type": "response", "id": first["id"], "result": {"id": "1@c.us", "display_name": "Ann"}}))
            .await;

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_eq!(a.id.as_str(), "1@c.us");
        assert_eq!(a.display_name.as_deref(), Some("Ann"));
        assert_eq!(b.id.as_str(), "2@c.us");
    }

    #[test]
    fn test_spawn_without_command_fails() {
        let err = BridgeSession::spawn(&BridgeConfig::default()).err().unwrap();
        assert!(matches!(err, SessionError::Io(ref m) if m.contains("no bridge command")));
    }

    #[test]
    fn test_truncate_long_line() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
