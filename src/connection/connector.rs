//! Async driver for [`ConnectionSession`]
//!
//! After a connect request the connector subscribes the chat source and spawns a
//! poll task. Every `poll_interval` the task asks the source which channels it
//! has joined and feeds the answer to the session. The task ends on the first
//! connected or failed outcome, and is cancelled by disconnecting or dropping the
//! connector. A new attempt or a disconnect waits for the previous task to finish
//! before touching the chat source again.

use super::session::{ConnectionSession, ConnectionStatus, TickOutcome};
use super::{ConnectionConfig, ConnectionError, ConnectionEvent, normalize_channel};
use crate::chat::ChatSource;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

type SharedSession = Arc<Mutex<ConnectionSession>>;

fn lock(session: &Mutex<ConnectionSession>) -> MutexGuard<'_, ConnectionSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running poll task; dropping it cancels the task
struct PollHandle {
    guard: DropGuard,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Cancel the task and wait until it has stopped touching the source
    async fn stop(self) {
        drop(self.guard);
        if let Err(e) = self.task.await {
            debug!("Poll task ended abnormally: {e}");
        }
    }
}

/// Connects a [`ChatSource`] to a channel and watches for membership
pub struct Connector<S: ChatSource + ?Sized + 'static> {
    source: Arc<S>,
    config: ConnectionConfig,
    session: SharedSession,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    poll: Option<PollHandle>,
}

impl<S: ChatSource + ?Sized + 'static> Connector<S> {
    /// Create an idle connector
    ///
    /// Returns the connector and the receiver its [`ConnectionEvent`]s arrive on.
    #[must_use]
    pub fn new(
        source: Arc<S>,
        config: ConnectionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            source,
            config,
            session: Arc::default(),
            events: tx,
            poll: None,
        };
        (connector, rx)
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        lock(&self.session).status()
    }

    /// Snapshot of the session
    #[must_use]
    pub fn session(&self) -> ConnectionSession {
        lock(&self.session).clone()
    }

    /// Start connecting to the channel the user typed
    ///
    /// Returns once the chat source has accepted the subscription. Whether the
    /// channel was actually joined is reported later as
    /// [`ConnectionEvent::Connected`] or [`ConnectionEvent::Failed`].
    ///
    /// # Errors
    /// - [`ConnectionError::InvalidChannel`] if `input` is not a channel name
    /// - [`ConnectionError::AlreadyActive`] while connecting or connected
    /// - [`ConnectionError::Subscribe`] if the chat source could not start
    pub async fn request_connect(&mut self, input: &str) -> Result<(), ConnectionError> {
        let channel = normalize_channel(input)?;
        lock(&self.session).request_connect(&channel)?;

        // A previous failed attempt may still be unsubscribing
        if let Some(poll) = self.poll.take() {
            poll.stop().await;
        }

        if let Err(e) = self.source.subscribe(&channel).await {
            warn!("Could not subscribe to #{channel}: {e}");
            // Back to idle so the user can try again
            lock(&self.session).disconnect().ok();
            return Err(ConnectionError::Subscribe {
                channel,
                reason: e.to_string(),
            });
        }

        info!("Connecting to #{channel}");
        emit(&self.events, ConnectionEvent::Connecting { channel });

        let token = CancellationToken::new();
        let task = PollTask {
            source: Arc::clone(&self.source),
            session: Arc::clone(&self.session),
            events: self.events.clone(),
            config: self.config,
        };
        let task = tokio::spawn(task.run(token.clone()));
        self.poll = Some(PollHandle {
            guard: token.drop_guard(),
            task,
        });
        Ok(())
    }

    /// Leave the current channel or abandon the pending attempt
    ///
    /// # Errors
    /// Returns [`ConnectionError::NotActive`] when there is nothing to disconnect.
    pub async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        let channel = lock(&self.session).disconnect()?;
        if let Some(poll) = self.poll.take() {
            poll.stop().await;
        }
        self.source.unsubscribe().await;

        info!("Disconnected from #{}", channel.unwrap_or_default());
        emit(&self.events, ConnectionEvent::Disconnected);
        Ok(())
    }
}

fn emit(events: &mpsc::UnboundedSender<ConnectionEvent>, event: ConnectionEvent) {
    if events.send(event).is_err() {
        debug!("Connection event dropped, no listener");
    }
}

struct PollTask<S: ChatSource + ?Sized> {
    source: Arc<S>,
    session: SharedSession,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    config: ConnectionConfig,
}

impl<S: ChatSource + ?Sized> PollTask<S> {
    async fn run(self, token: CancellationToken) {
        let period = self.config.poll_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                _ = interval.tick() => {}
            }

            let joined = self.source.joined_channels();
            let outcome = lock(&self.session).tick(&joined, self.config.max_attempts);

            match outcome {
                TickOutcome::Waiting { attempts } => {
                    debug!("Not joined yet ({attempts}/{})", self.config.max_attempts);
                }
                TickOutcome::Connected { channel } => {
                    info!("Connected to #{channel}");
                    emit(&self.events, ConnectionEvent::Connected { channel });
                    return;
                }
                TickOutcome::Failed { channel, attempts } => {
                    warn!("Gave up on #{channel} after {attempts} polls");
                    self.source.unsubscribe().await;
                    emit(
                        &self.events,
                        ConnectionEvent::Failed(ConnectionError::Failed { channel, attempts }),
                    );
                    return;
                }
                TickOutcome::Ignored => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    /// Reports `#streamer` as joined from the `join_on`-th poll onward
    #[derive(Default)]
    struct MockSource {
        join_on: Option<u32>,
        refuse: bool,
        unsubscribe_delay: Duration,
        polls: AtomicU32,
        subscribed: AtomicBool,
    }

    impl MockSource {
        fn joining_on(poll: u32) -> Arc<Self> {
            Arc::new(Self {
                join_on: Some(poll),
                ..Self::default()
            })
        }

        fn never_joining() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn polls(&self) -> u32 {
            self.polls.load(Ordering::SeqCst)
        }

        fn subscribed(&self) -> bool {
            self.subscribed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatSource for MockSource {
        async fn subscribe(&self, _channel: &str) -> Result<(), ChatError> {
            if self.refuse {
                return Err(ChatError::Closed);
            }
            self.subscribed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn unsubscribe(&self) {
            if !self.unsubscribe_delay.is_zero() {
                time::sleep(self.unsubscribe_delay).await;
            }
            self.subscribed.store(false, Ordering::SeqCst);
        }

        fn joined_channels(&self) -> Vec<String> {
            let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.join_on {
                Some(n) if poll >= n => vec!["#streamer".to_string()],
                _ => Vec::new(),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fails_after_retry_budget() {
        let source = MockSource::never_joining();
        let (mut connector, mut events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        let start = Instant::now();
        connector.request_connect("Streamer").await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Connecting {
                channel: "streamer".to_string()
            })
        );

        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Failed(ConnectionError::Failed {
                channel: "streamer".to_string(),
                attempts: 5
            }))
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2500));
        assert!(elapsed <= Duration::from_millis(3000));

        assert_eq!(source.polls(), 5);
        assert!(!source.subscribed());
        assert_eq!(connector.status(), ConnectionStatus::Failed);
        assert_eq!(connector.session().channel(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn connects_when_membership_appears() {
        let source = MockSource::joining_on(3);
        let (mut connector, mut events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        let start = Instant::now();
        connector.request_connect("#streamer").await.unwrap();
        events.recv().await;
        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Connected {
                channel: "streamer".to_string()
            })
        );
        // Third poll, one interval after the second
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert_eq!(connector.status(), ConnectionStatus::Connected);

        // Polling stops once connected
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.polls(), 3);
        assert!(source.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_mid_attempt_stops_polling() {
        let source = MockSource::never_joining();
        let (mut connector, mut events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        connector.request_connect("streamer").await.unwrap();
        time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(source.polls(), 2);

        connector.disconnect().await.unwrap();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.polls(), 2);
        assert!(!source.subscribed());
        assert_eq!(connector.status(), ConnectionStatus::Idle);

        events.recv().await;
        assert_eq!(events.recv().await, Some(ConnectionEvent::Disconnected));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_when_connected() {
        let source = MockSource::joining_on(1);
        let (mut connector, mut events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        connector.request_connect("streamer").await.unwrap();
        events.recv().await;
        assert!(matches!(
            events.recv().await,
            Some(ConnectionEvent::Connected { .. })
        ));

        connector.disconnect().await.unwrap();
        assert_eq!(connector.status(), ConnectionStatus::Idle);
        assert_eq!(connector.session().channel(), None);
        assert!(!source.subscribed());
        assert_eq!(events.recv().await, Some(ConnectionEvent::Disconnected));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_after_failure_is_an_error() {
        let source = MockSource::never_joining();
        let config = ConnectionConfig {
            poll_interval: Duration::from_millis(100),
            max_attempts: 2,
        };
        let (mut connector, mut events) = Connector::new(Arc::clone(&source), config);

        connector.request_connect("streamer").await.unwrap();
        events.recv().await;
        events.recv().await;
        assert_eq!(connector.status(), ConnectionStatus::Failed);
        assert_eq!(connector.disconnect().await, Err(ConnectionError::NotActive));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_second_request_while_active() {
        let source = MockSource::never_joining();
        let (mut connector, _events) = Connector::new(source, ConnectionConfig::default());

        connector.request_connect("streamer").await.unwrap();
        assert_eq!(
            connector.request_connect("other").await,
            Err(ConnectionError::AlreadyActive(ConnectionStatus::Connecting))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_channel_leaves_session_idle() {
        let source = MockSource::never_joining();
        let (mut connector, _events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        assert!(matches!(
            connector.request_connect("not a channel").await,
            Err(ConnectionError::InvalidChannel(_))
        ));
        assert_eq!(connector.status(), ConnectionStatus::Idle);
        assert!(!source.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_subscription_returns_to_idle() {
        let source = Arc::new(MockSource {
            refuse: true,
            ..MockSource::default()
        });
        let (mut connector, _events) = Connector::new(source, ConnectionConfig::default());

        assert!(matches!(
            connector.request_connect("streamer").await,
            Err(ConnectionError::Subscribe { .. })
        ));
        assert_eq!(connector.status(), ConnectionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_failure() {
        let source = MockSource::never_joining();
        let config = ConnectionConfig {
            poll_interval: Duration::from_millis(100),
            max_attempts: 2,
        };
        let (mut connector, mut events) = Connector::new(Arc::clone(&source), config);

        connector.request_connect("streamer").await.unwrap();
        events.recv().await;
        assert!(matches!(
            events.recv().await,
            Some(ConnectionEvent::Failed(_))
        ));

        connector.request_connect("streamer").await.unwrap();
        assert_eq!(connector.status(), ConnectionStatus::Connecting);
        assert!(source.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_for_previous_teardown() {
        let source = Arc::new(MockSource {
            unsubscribe_delay: Duration::from_millis(10),
            ..MockSource::default()
        });
        let config = ConnectionConfig {
            poll_interval: Duration::from_millis(100),
            max_attempts: 2,
        };
        let (mut connector, _events) = Connector::new(Arc::clone(&source), config);

        connector.request_connect("streamer").await.unwrap();
        // Retry as soon as the session fails, while the old task is still unsubscribing
        while connector.status() != ConnectionStatus::Failed {
            time::sleep(Duration::from_millis(1)).await;
        }
        assert!(source.subscribed());
        connector.request_connect("streamer").await.unwrap();

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(connector.status(), ConnectionStatus::Connecting);
        assert!(source.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_when_idle_is_an_error() {
        let (mut connector, _events) =
            Connector::new(MockSource::never_joining(), ConnectionConfig::default());
        assert_eq!(connector.disconnect().await, Err(ConnectionError::NotActive));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_connector_stops_polling() {
        let source = MockSource::never_joining();
        let (mut connector, _events) =
            Connector::new(Arc::clone(&source), ConnectionConfig::default());

        connector.request_connect("streamer").await.unwrap();
        drop(connector);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.polls(), 0);
    }
}
