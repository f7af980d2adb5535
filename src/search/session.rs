//! Search session: a single task owning the query controller
//!
//! All state mutation goes through one worker task. Handles send commands
//! over an mpsc channel and read published snapshots from a watch channel.
//! Gateway calls run in their own tasks and report back to the worker, which
//! applies or discards each result by its request token.

use super::controller::{QueryController, RequestToken};
use super::state::SearchState;
use crate::gateway::{ModelTier, SearchError, SearchGateway, SearchOutcome};
use crate::metrics::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

enum Command {
    Submit {
        query: String,
        tier: ModelTier,
        reply: oneshot::Sender<Option<RequestToken>>,
    },
    Retry {
        tier: ModelTier,
        reply: oneshot::Sender<Option<RequestToken>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

struct Completion {
    token: RequestToken,
    tier: ModelTier,
    started: Instant,
    result: Result<SearchOutcome, SearchError>,
}

/// Handle to a running search session
#[derive(Clone)]
pub struct SearchSession {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchState>,
}

impl SearchSession {
    /// Spawn the session worker on the current tokio runtime
    pub fn spawn(gateway: Arc<dyn SearchGateway>, metrics: Arc<Metrics>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        info!("Search session started with gateway {}", gateway.name());

        let worker = SessionWorker {
            controller: QueryController::new(),
            gateway,
            metrics,
            state: state_tx,
            done: done_tx,
        };
        tokio::spawn(worker.run(cmd_rx, done_rx));

        Self {
            commands: cmd_tx,
            state: state_rx,
        }
    }

    /// Submit a query. Returns the request token, or `None` when the query
    /// was blank. The state already shows SEARCHING when this returns.
    pub async fn submit(&self, query: impl Into<String>, tier: ModelTier) -> Option<RequestToken> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit {
            query: query.into(),
            tier,
            reply,
        });
        rx.await.ok().flatten()
    }

    /// Retry the failed query; `None` unless the session is in FAILURE
    pub async fn retry(&self, tier: ModelTier) -> Option<RequestToken> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Retry { tier, reply });
        rx.await.ok().flatten()
    }

    /// Return to IDLE, discarding any in-flight result
    pub async fn reset(&self) {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply });
        let _ = rx.await;
    }

    /// Current state
    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Wait until no search is running and return that state
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|s| !s.is_searching)
            .await
            .map(|s| (*s).clone())
            .ok();
        settled.unwrap_or_else(|| self.snapshot())
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("Search session worker is gone; command dropped");
        }
    }
}

struct SessionWorker {
    controller: QueryController,
    gateway: Arc<dyn SearchGateway>,
    metrics: Arc<Metrics>,
    state: watch::Sender<SearchState>,
    done: mpsc::UnboundedSender<Completion>,
}

impl SessionWorker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut done: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(completion) = done.recv() => self.complete(completion),
            }
        }
        debug!("Search session closed");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit { query, tier, reply } => {
                let superseded = self.controller.in_flight();
                let token = self.controller.submit(&query);
                if let (Some(old), Some(_)) = (superseded, token) {
                    debug!("Search #{} superseded", old.generation());
                }
                if let Some(token) = token {
                    self.start(token, query, tier);
                }
                let _ = reply.send(token);
            }
            Command::Retry { tier, reply } => {
                let token = self.controller.retry().map(|(token, query)| {
                    self.start(token, query, tier);
                    token
                });
                let _ = reply.send(token);
            }
            Command::Reset { reply } => {
                self.controller.reset();
                self.metrics.record_reset();
                self.publish();
                let _ = reply.send(());
            }
        }
    }

    fn start(&self, token: RequestToken, query: String, tier: ModelTier) {
        info!(
            "Search #{} submitted ({}, {}): {}",
            token.generation(),
            tier,
            self.gateway.model_for(tier),
            query
        );
        self.metrics.record_search(tier);
        self.publish();

        let gateway = Arc::clone(&self.gateway);
        let done = self.done.clone();
        let started = Instant::now();
        tokio::spawn(async move {
            let call = tokio::spawn(async move { gateway.search(&query, tier).await });
            let result = match call.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Search task for #{} failed: {}", token.generation(), e);
                    Err(SearchError::Internal(e.to_string()))
                }
            };
            let _ = done.send(Completion {
                token,
                tier,
                started,
                result,
            });
        });
    }

    fn complete(&mut self, completion: Completion) {
        let Completion {
            token,
            tier,
            started,
            result,
        } = completion;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let succeeded = result.is_ok();

        if !self.controller.resolve(token, result) {
            self.metrics.record_stale();
            debug!("Discarding stale response for search #{}", token.generation());
            return;
        }

        if succeeded {
            self.metrics.record_success(tier, elapsed_ms);
            info!("Search #{} answered in {}ms", token.generation(), elapsed_ms);
        } else {
            self.metrics.record_failure(tier, elapsed_ms);
            warn!("Search #{} failed after {}ms", token.generation(), elapsed_ms);
        }
        self.publish();
    }

    fn publish(&self) {
        let state = self.controller.state();
        debug_assert!(state.is_consistent(), "inconsistent search state: {:?}", state);
        self.state.send_replace(state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Source;
    use crate::search::Phase;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    type Reply = Result<SearchOutcome, SearchError>;

    /// Gateway whose answers are released by the test.
    ///
    /// Unscripted queries answer immediately with `answer to <query>`.
    #[derive(Default)]
    struct ScriptedGateway {
        pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
        calls: Mutex<Vec<(String, ModelTier)>>,
    }

    impl ScriptedGateway {
        fn hold(&self, query: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().insert(query.to_string(), rx);
            tx
        }

        fn calls(&self) -> Vec<(String, ModelTier)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchGateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model_for(&self, tier: ModelTier) -> String {
            format!("scripted-{}", tier)
        }

        async fn search(&self, query: &str, tier: ModelTier) -> Reply {
            self.calls.lock().unwrap().push((query.to_string(), tier));
            let held = self.pending.lock().unwrap().remove(query);
            match held {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(SearchError::Transport("script dropped".into()))),
                None => Ok(SearchOutcome::new(format!("answer to {}", query), Vec::new())),
            }
        }
    }

    /// Gateway whose search task dies mid-call
    struct PanickingGateway;

    #[async_trait]
    impl SearchGateway for PanickingGateway {
        fn name(&self) -> &str {
            "panicking"
        }

        fn model_for(&self, tier: ModelTier) -> String {
            format!("panicking-{}", tier)
        }

        async fn search(&self, _query: &str, _tier: ModelTier) -> Reply {
            panic!("gateway blew up");
        }
    }

    fn session() -> (SearchSession, Arc<ScriptedGateway>, Arc<Metrics>) {
        let gateway = Arc::new(ScriptedGateway::default());
        let metrics = Arc::new(Metrics::new());
        let session = SearchSession::spawn(gateway.clone(), metrics.clone());
        (session, gateway, metrics)
    }

    async fn until_stale(metrics: &Metrics, count: u64) {
        for _ in 0..200 {
            if metrics.stale_discarded() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("stale response was never processed");
    }

    #[tokio::test]
    async fn test_submit_then_success() {
        let (session, gateway, _) = session();

        let token = session.submit("rust news", ModelTier::Deep).await;
        assert!(token.is_some());

        let state = session.settled().await;
        assert_eq!(state.phase(), Phase::Success);
        assert_eq!(state.result.as_deref(), Some("answer to rust news"));
        assert!(state.error.is_none());
        assert_eq!(gateway.calls(), vec![("rust news".to_string(), ModelTier::Deep)]);
    }

    #[tokio::test]
    async fn test_submit_shows_searching_immediately() {
        let (session, gateway, _) = session();
        let release = gateway.hold("slow");

        session.submit("slow", ModelTier::Fast).await.unwrap();
        let state = session.snapshot();
        assert!(state.is_searching);
        assert!(state.has_searched);
        assert_eq!(state.query, "slow");

        release
            .send(Ok(SearchOutcome::new(
                "done",
                vec![Source::new("A", "https://a.com")],
            )))
            .unwrap();
        let state = session.settled().await;
        assert_eq!(state.result.as_deref(), Some("done"));
        assert_eq!(state.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_submit_no_transition() {
        let (session, gateway, metrics) = session();

        assert!(session.submit("", ModelTier::Fast).await.is_none());
        assert!(session.submit("   ", ModelTier::Fast).await.is_none());

        assert_eq!(session.snapshot(), SearchState::default());
        assert!(gateway.calls().is_empty());
        assert_eq!(metrics.total_searches(), 0);
    }

    #[tokio::test]
    async fn test_failure_preserves_query() {
        let (session, gateway, _) = session();
        let release = gateway.hold("q");

        session.submit("q", ModelTier::Fast).await.unwrap();
        release
            .send(Err(SearchError::Transport("connection reset".into())))
            .unwrap();

        let state = session.settled().await;
        assert_eq!(state.phase(), Phase::Failure);
        assert_eq!(state.query, "q");
        assert!(!state.error.unwrap_or_default().is_empty());
        assert!(state.result.is_none());
    }

    #[tokio::test]
    async fn test_later_submit_wins_when_earlier_resolves_last() {
        let (session, gateway, metrics) = session();
        let q1 = gateway.hold("q1");
        let q2 = gateway.hold("q2");

        session.submit("q1", ModelTier::Fast).await.unwrap();
        session.submit("q2", ModelTier::Fast).await.unwrap();

        q2.send(Ok(SearchOutcome::new("a2", Vec::new()))).unwrap();
        let state = session.settled().await;
        assert_eq!(state.result.as_deref(), Some("a2"));

        q1.send(Ok(SearchOutcome::new("a1", Vec::new()))).unwrap();
        until_stale(&metrics, 1).await;

        let state = session.snapshot();
        assert_eq!(state.query, "q2");
        assert_eq!(state.result.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_later_submit_wins_when_earlier_resolves_first() {
        let (session, gateway, metrics) = session();
        let q1 = gateway.hold("q1");
        let q2 = gateway.hold("q2");

        session.submit("q1", ModelTier::Fast).await.unwrap();
        session.submit("q2", ModelTier::Fast).await.unwrap();

        q1.send(Err(SearchError::Timeout)).unwrap();
        until_stale(&metrics, 1).await;
        let state = session.snapshot();
        assert!(state.is_searching);
        assert!(state.error.is_none());

        q2.send(Ok(SearchOutcome::new("a2", Vec::new()))).unwrap();
        let state = session.settled().await;
        assert_eq!(state.query, "q2");
        assert_eq!(state.result.as_deref(), Some("a2"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight() {
        let (session, gateway, metrics) = session();
        let q1 = gateway.hold("q1");

        session.submit("q1", ModelTier::Fast).await.unwrap();
        session.reset().await;
        assert_eq!(session.snapshot(), SearchState::default());

        q1.send(Ok(SearchOutcome::new("a1", Vec::new()))).unwrap();
        until_stale(&metrics, 1).await;

        assert_eq!(session.snapshot(), SearchState::default());
        assert_eq!(metrics.snapshot().resets, 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_uses_new_tier() {
        let (session, gateway, _) = session();
        let first = gateway.hold("q");

        session.submit("q", ModelTier::Fast).await.unwrap();
        assert!(session.retry(ModelTier::Deep).await.is_none());

        first.send(Err(SearchError::Timeout)).unwrap();
        assert_eq!(session.settled().await.phase(), Phase::Failure);

        assert!(session.retry(ModelTier::Deep).await.is_some());
        let state = session.settled().await;
        assert_eq!(state.phase(), Phase::Success);
        assert_eq!(
            gateway.calls(),
            vec![
                ("q".to_string(), ModelTier::Fast),
                ("q".to_string(), ModelTier::Deep)
            ]
        );
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let (session, _, metrics) = session();
        session.submit("a", ModelTier::Fast).await.unwrap();
        session.settled().await;
        session.submit("b", ModelTier::Deep).await.unwrap();
        session.settled().await;

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_searches, 2);
        assert_eq!(snapshot.fast.successes, 1);
        assert_eq!(snapshot.deep.successes, 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (session, gateway, _) = session();
        let release = gateway.hold("q");
        let mut rx = session.subscribe();

        session.submit("q", ModelTier::Fast).await.unwrap();
        assert!(rx.borrow_and_update().is_searching);

        release.send(Ok(SearchOutcome::new("a", Vec::new()))).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().result.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_gateway_panic_becomes_failure() {
        let metrics = Arc::new(Metrics::new());
        let session = SearchSession::spawn(Arc::new(PanickingGateway), metrics.clone());

        session.submit("boom", ModelTier::Fast).await.unwrap();
        let state = session.settled().await;

        assert_eq!(state.phase(), Phase::Failure);
        assert_eq!(state.query, "boom");
        assert!(state.result.is_none());
        assert!(state.error.as_deref().unwrap_or_default().starts_with("Search failed:"));
        assert_eq!(metrics.snapshot().fast.failures, 1);

        // The session keeps serving after the dead task
        assert!(session.retry(ModelTier::Deep).await.is_some());
        assert_eq!(session.settled().await.phase(), Phase::Failure);
    }
}
