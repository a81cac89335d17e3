//! EventRunner: drives the dispatcher from the session event stream.
//!
//! Lifecycle events are logged (and `qr` is handed to the pairing surface).
//! Each message and group-join is handled in its own task inside a `JoinSet`,
//! so handlers for different messages may overlap and a failing or panicking
//! handler never takes the loop down with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use wabot_types::error::SessionError;
use wabot_types::event::SessionEvent;

use crate::dispatch::Dispatcher;
use crate::llm::LlmProvider;
use crate::session::SessionProvider;

use super::pairing::PairingSurface;

/// How long in-flight handlers get to finish once the loop stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Counters reported when the runner stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub messages: usize,
    pub group_joins: usize,
    pub failures: usize,
}

type HandlerOutcome = (&'static str, Result<(), SessionError>);

/// Consumes session events until the stream closes or shutdown is requested.
pub struct EventRunner<S, P, Q> {
    dispatcher: Arc<Dispatcher<S, P>>,
    pairing: Q,
}

impl<S, P, Q> EventRunner<S, P, Q>
where
    S: SessionProvider + 'static,
    P: LlmProvider + 'static,
    Q: PairingSurface,
{
    pub fn new(dispatcher: Arc<Dispatcher<S, P>>, pairing: Q) -> Self {
        Self {
            dispatcher,
            pairing,
        }
    }

    /// Run the event loop.
    ///
    /// A `Disconnected` event is logged but does not stop the loop; only the
    /// channel closing or `shutdown` being cancelled does.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<SessionEvent>,
        shutdown: CancellationToken,
    ) -> RunStats {
        let mut stats = RunStats::default();
        let mut tasks: JoinSet<HandlerOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping event loop");
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    Self::reap(joined, &mut stats);
                }
                event = events.recv() => match event {
                    Some(event) => self.on_event(event, &mut tasks, &mut stats),
                    None => {
                        info!("Session event stream closed");
                        break;
                    }
                },
            }
        }

        // Unblocks a producer waiting on a full channel.
        drop(events);
        Self::drain(tasks, &mut stats).await;
        info!(
            messages = stats.messages,
            group_joins = stats.group_joins,
            failures = stats.failures,
            "Event loop stopped"
        );
        stats
    }

    fn on_event(
        &self,
        event: SessionEvent,
        tasks: &mut JoinSet<HandlerOutcome>,
        stats: &mut RunStats,
    ) {
        match event {
            SessionEvent::Qr(code) => {
                info!("QR code received. Please scan it with your phone.");
                if let Err(err) = self.pairing.present(&code) {
                    error!(error = %err, "Failed to present pairing code");
                }
            }
            SessionEvent::Authenticated => info!("Session authenticated"),
            SessionEvent::Ready => info!("Client is ready!"),
            SessionEvent::Disconnected(reason) => {
                error!(%reason, "Client was disconnected");
            }
            SessionEvent::Message(message) => {
                stats.messages += 1;
                let dispatcher = Arc::clone(&self.dispatcher);
                tasks.spawn(async move { ("message", dispatcher.handle_message(&message).await) });
            }
            SessionEvent::GroupJoin(join) => {
                stats.group_joins += 1;
                let dispatcher = Arc::clone(&self.dispatcher);
                tasks.spawn(async move { ("group_join", dispatcher.handle_group_join(&join).await) });
            }
        }
    }

    fn reap(joined: Result<HandlerOutcome, JoinError>, stats: &mut RunStats) {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((kind, Err(err))) => {
                stats.failures += 1;
                error!(handler = kind, error = %err, "Event handler failed");
            }
            Err(join_err) => {
                stats.failures += 1;
                error!(error = %join_err, "Event handler task panicked or was cancelled");
            }
        }
    }

    async fn drain(mut tasks: JoinSet<HandlerOutcome>, stats: &mut RunStats) {
        if tasks.is_empty() {
            return;
        }

        let pending = tasks.len();
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while let Some(joined) = tasks.join_next().await {
                Self::reap(joined, stats);
            }
        })
        .await;

        if drained.is_err() {
            warn!(pending, "In-flight handlers did not finish in time, aborting");
            tasks.abort_all();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
