use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::classifier::classify;
use crate::github::ReleaseSource;
use crate::model::{Action, InboundEvent, OutboundMessage};
use crate::telegram::MessageSink;

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// How a single `/releases` invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Replied,
    Failed,
    TimedOut,
}

/// Routes classified events to the sink, racing each release fetch against
/// the reply window.
#[derive(Clone)]
pub struct Dispatcher {
    releases: Arc<dyn ReleaseSource>,
    sink: Arc<dyn MessageSink>,
    reply_timeout: Duration,
}

impl Dispatcher {
    pub fn new(releases: Arc<dyn ReleaseSource>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            releases,
            sink,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Drain `events` until every sender is dropped, then wait for sends and
    /// replies still in flight.
    #[instrument(skip_all)]
    pub async fn run(&self, mut events: mpsc::Receiver<InboundEvent>) {
        let mut pending = JoinSet::new();
        while let Some(event) = events.recv().await {
            self.handle_event(&event, &mut pending);
            while let Some(done) = pending.try_join_next() {
                log_join(done);
            }
        }
        info!(pending = pending.len(), "event stream closed; draining outbound tasks");
        while let Some(done) = pending.join_next().await {
            log_join(done);
        }
    }

    fn handle_event(&self, event: &InboundEvent, pending: &mut JoinSet<()>) {
        match classify(event) {
            Some(Action::SendWelcome { chat_id, text }) => {
                info!(chat_id, "welcoming new members");
                let this = self.clone();
                pending.spawn(async move {
                    this.deliver(OutboundMessage::plain(chat_id, text)).await;
                });
            }
            Some(Action::FetchAndReply {
                chat_id,
                message_id,
            }) => {
                info!(chat_id, message_id, "releases requested");
                let this = self.clone();
                pending.spawn(async move {
                    let outcome = this.reply_with_releases(chat_id, message_id).await;
                    debug!(?outcome, chat_id, message_id, "reply finished");
                });
            }
            None => debug!(?event, "ignoring event"),
        }
    }

    /// Fetch releases and reply if the fetch wins the race against the
    /// window. A fetch that loses keeps running; its result is dropped.
    pub async fn reply_with_releases(&self, chat_id: i64, message_id: i32) -> ReplyOutcome {
        let releases = Arc::clone(&self.releases);
        let fetch = tokio::spawn(async move { releases.fetch_releases().await });

        match tokio::time::timeout(self.reply_timeout, fetch).await {
            Ok(Ok(Ok(text))) if text.is_empty() => {
                warn!(chat_id, message_id, "no releases to report; not replying");
                ReplyOutcome::Failed
            }
            Ok(Ok(Ok(text))) => {
                let delivered = self
                    .deliver(OutboundMessage::markdown_reply(chat_id, message_id, text))
                    .await;
                if delivered {
                    ReplyOutcome::Replied
                } else {
                    ReplyOutcome::Failed
                }
            }
            Ok(Ok(Err(err))) => {
                warn!(?err, chat_id, message_id, "failed to fetch releases");
                ReplyOutcome::Failed
            }
            Ok(Err(err)) => {
                error!(?err, chat_id, message_id, "release fetch task failed");
                ReplyOutcome::Failed
            }
            Err(_) => {
                info!(
                    chat_id,
                    message_id,
                    timeout_secs = self.reply_timeout.as_secs_f64(),
                    "release fetch timed out; not replying"
                );
                ReplyOutcome::TimedOut
            }
        }
    }

    async fn deliver(&self, msg: OutboundMessage) -> bool {
        match self.sink.deliver(&msg).await {
            Ok(()) => true,
            Err(err) => {
                warn!(?err, chat_id = msg.chat_id, "failed to send message");
                false
            }
        }
    }
}

fn log_join(done: Result<(), tokio::task::JoinError>) {
    if let Err(err) = done {
        error!(?err, "outbound task failed");
    }
}
