// Periodic refresh of the open conversation and the unread counter.
//
// Each poll runs in its own spawned task and reports over an mpsc channel.
// Chat results carry the generation they were started under; opening a
// different conversation bumps the generation and aborts the old task, so
// anything still in flight for the previous conversation is discarded by
// `Poller::is_current`. There is no retry: a failed fetch is reported and
// the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::config::PollingConfig;
use crate::error::ApiError;
use crate::model::Message;

pub const MIN_INTERVAL_SECS: u64 = 2;
pub const MAX_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_CHAT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_NOTIFICATION_INTERVAL_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// What the poll tasks fetch. Implemented by [`ApiClient`].
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    async fn chat_messages(&self, job_id: &str) -> Result<Vec<Message>, ApiError>;
    async fn unread_notifications(&self) -> Result<u32, ApiError>;
}

#[async_trait]
impl PollSource for ApiClient {
    async fn chat_messages(&self, job_id: &str) -> Result<Vec<Message>, ApiError> {
        self.messages(job_id).await
    }

    async fn unread_notifications(&self) -> Result<u32, ApiError> {
        self.unread_notification_count().await
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Chat,
    Notifications,
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Messages {
        job_id: String,
        generation: u64,
        messages: Vec<Message>,
    },
    UnreadCount(u32),
    Failed {
        kind: PollKind,
        message: String,
        unauthorized: bool,
    },
}

impl PollEvent {
    fn failed(kind: PollKind, err: &ApiError) -> Self {
        PollEvent::Failed {
            kind,
            message: err.detail(),
            unauthorized: err.is_unauthorized(),
        }
    }
}

// ---------------------------------------------------------------------------
// Intervals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub chat: Duration,
    pub notifications: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            chat: Duration::from_secs(DEFAULT_CHAT_INTERVAL_SECS),
            notifications: Duration::from_secs(DEFAULT_NOTIFICATION_INTERVAL_SECS),
        }
    }
}

impl From<&PollingConfig> for PollIntervals {
    fn from(cfg: &PollingConfig) -> Self {
        Self {
            chat: Duration::from_secs(cfg.chat_interval_secs),
            notifications: Duration::from_secs(cfg.notification_interval_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

pub struct Poller<S: PollSource> {
    source: Arc<S>,
    tx: mpsc::Sender<PollEvent>,
    intervals: PollIntervals,
    generation: u64,
    open_job: Option<String>,
    chat_task: Option<JoinHandle<()>>,
    notification_task: Option<JoinHandle<()>>,
}

impl<S: PollSource> Poller<S> {
    pub fn new(source: Arc<S>, tx: mpsc::Sender<PollEvent>, intervals: PollIntervals) -> Self {
        Self {
            source,
            tx,
            intervals,
            generation: 0,
            open_job: None,
            chat_task: None,
            notification_task: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn open_job(&self) -> Option<&str> {
        self.open_job.as_deref()
    }

    /// Whether a chat result still belongs to the open conversation.
    pub fn is_current(&self, job_id: &str, generation: u64) -> bool {
        generation == self.generation && self.open_job.as_deref() == Some(job_id)
    }

    /// Start polling `job_id`, replacing any previous conversation. The
    /// first fetch happens immediately. Returns the new generation.
    pub fn open_chat(&mut self, job_id: &str) -> u64 {
        self.close_chat();
        self.generation += 1;
        self.open_job = Some(job_id.to_string());

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let period = self.intervals.chat;
        let generation = self.generation;
        let job_id = job_id.to_string();
        debug!(%job_id, generation, "chat polling started");

        self.chat_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let event = match source.chat_messages(&job_id).await {
                    Ok(messages) => PollEvent::Messages {
                        job_id: job_id.clone(),
                        generation,
                        messages,
                    },
                    Err(e) => {
                        warn!(%job_id, error = %e, "chat poll failed");
                        PollEvent::failed(PollKind::Chat, &e)
                    }
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }));
        self.generation
    }

    /// Stop polling the open conversation.
    pub fn close_chat(&mut self) {
        if let Some(task) = self.chat_task.take() {
            task.abort();
        }
        if self.open_job.take().is_some() {
            self.generation += 1;
        }
    }

    /// Start the unread-counter poll if it is not already running.
    pub fn start_notifications(&mut self) {
        if self
            .notification_task
            .as_ref()
            .is_some_and(|t| !t.is_finished())
        {
            return;
        }
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let period = self.intervals.notifications;

        self.notification_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let event = match source.unread_notifications().await {
                    Ok(count) => PollEvent::UnreadCount(count),
                    Err(e) => {
                        warn!(error = %e, "notification poll failed");
                        PollEvent::failed(PollKind::Notifications, &e)
                    }
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Abort every poll task, e.g. on logout.
    pub fn stop_all(&mut self) {
        self.close_chat();
        if let Some(task) = self.notification_task.take() {
            task.abort();
        }
    }
}

impl<S: PollSource> Drop for Poller<S> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;

    #[derive(Default)]
    struct FakeSource {
        chat_calls: Mutex<Vec<String>>,
        unread: AtomicU32,
        fail_chat: std::sync::atomic::AtomicBool,
    }

    fn message(job_id: &str, id: &str) -> Message {
        Message {
            id: id.to_string(),
            job_id: job_id.to_string(),
            sender_id: "u".to_string(),
            receiver_id: None,
            sender_name: None,
            message: format!("hello from {job_id}"),
            file_attachments: vec![],
            created_at: None,
        }
    }

    #[async_trait]
    impl PollSource for FakeSource {
        async fn chat_messages(&self, job_id: &str) -> Result<Vec<Message>, ApiError> {
            self.chat_calls.lock().unwrap().push(job_id.to_string());
            if self.fail_chat.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: StatusCode::UNAUTHORIZED,
                    detail: "Could not validate credentials".into(),
                });
            }
            Ok(vec![message(job_id, "m1")])
        }

        async fn unread_notifications(&self) -> Result<u32, ApiError> {
            Ok(self.unread.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn intervals() -> PollIntervals {
        PollIntervals {
            chat: Duration::from_secs(5),
            notifications: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn opening_a_chat_fetches_immediately_then_on_each_tick() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel(16);
        let mut poller = Poller::new(Arc::clone(&source), tx, intervals());

        let generation = poller.open_chat("j1");
        match rx.recv().await.unwrap() {
            PollEvent::Messages {
                job_id,
                generation: g,
                messages,
            } => {
                assert_eq!(job_id, "j1");
                assert_eq!(g, generation);
                assert_eq!(messages.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(matches!(rx.recv().await.unwrap(), PollEvent::Messages { .. }));
        assert_eq!(source.chat_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_conversations_invalidates_old_results() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel(16);
        let mut poller = Poller::new(source, tx, intervals());

        let first = poller.open_chat("j1");
        let _ = rx.recv().await.unwrap();
        let second = poller.open_chat("j2");

        assert!(second > first);
        assert!(!poller.is_current("j1", first));
        assert!(poller.is_current("j2", second));
        assert_eq!(poller.open_job(), Some("j2"));

        match rx.recv().await.unwrap() {
            PollEvent::Messages { job_id, generation, .. } => {
                assert_eq!(job_id, "j2");
                assert!(poller.is_current(&job_id, generation));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn close_chat_stops_polling() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel(16);
        let mut poller = Poller::new(Arc::clone(&source), tx, intervals());

        let generation = poller.open_chat("j1");
        let _ = rx.recv().await.unwrap();
        poller.close_chat();
        assert!(!poller.is_current("j1", generation));

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(source.chat_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_with_unauthorized_flag() {
        let source = Arc::new(FakeSource::default());
        source.fail_chat.store(true, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::channel(16);
        let mut poller = Poller::new(source, tx, intervals());

        poller.open_chat("j1");
        match rx.recv().await.unwrap() {
            PollEvent::Failed {
                kind,
                unauthorized,
                message,
            } => {
                assert_eq!(kind, PollKind::Chat);
                assert!(unauthorized);
                assert_eq!(message, "Could not validate credentials");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn notification_counter_polls_until_stopped() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel(16);
        let mut poller = Poller::new(source, tx, intervals());

        poller.start_notifications();
        poller.start_notifications();
        assert!(matches!(rx.recv().await.unwrap(), PollEvent::UnreadCount(0)));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(matches!(rx.recv().await.unwrap(), PollEvent::UnreadCount(1)));

        poller.stop_all();
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
