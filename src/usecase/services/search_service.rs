use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::selector::{SearchOutcome, SearchRequest};
use crate::usecase::ports::search::OptionSource;

/// Owns the cancellation token of the one search that may still be running.
pub struct SearchCoordinator {
    source: Arc<dyn OptionSource>,
    debounce: Duration,
    current: Option<CancellationToken>,
}

impl SearchCoordinator {
    pub fn new(source: Arc<dyn OptionSource>, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            current: None,
        }
    }

    /// Cancels whatever was pending and returns the new search, still waiting
    /// out its debounce.
    pub fn schedule(&mut self, request: SearchRequest) -> PendingSearch {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        debug!(id = request.id, term = %request.term, "search scheduled");
        PendingSearch {
            request,
            token,
            source: self.source.clone(),
            debounce: self.debounce,
        }
    }

    /// Swaps in a new source or debounce. Returns false when nothing changed;
    /// otherwise the pending search is cancelled.
    pub fn reconfigure(&mut self, source: Arc<dyn OptionSource>, debounce: Duration) -> bool {
        if Arc::ptr_eq(&self.source, &source) && self.debounce == debounce {
            return false;
        }
        self.cancel();
        self.source = source;
        self.debounce = debounce;
        debug!(debounce_ms = debounce.as_millis() as u64, "search source reconfigured");
        true
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct PendingSearch {
    request: SearchRequest,
    token: CancellationToken,
    source: Arc<dyn OptionSource>,
    debounce: Duration,
}

impl PendingSearch {
    pub fn id(&self) -> u64 {
        self.request.id
    }

    pub async fn run(self) -> SearchOutcome {
        let id = self.request.id;

        tokio::select! {
            biased;
            _ = self.token.cancelled() => return SearchOutcome::Cancelled { id },
            _ = tokio::time::sleep(self.debounce) => {}
        }

        // Dropping the request future aborts the HTTP call.
        tokio::select! {
            biased;
            _ = self.token.cancelled() => SearchOutcome::Cancelled { id },
            result = self.source.search(&self.request.term) => match result {
                Ok(options) => SearchOutcome::Loaded { id, options },
                Err(err) => SearchOutcome::Failed {
                    id,
                    message: err.to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::entities::option::AsyncOption;
    use crate::domain::selector::{SearchPlan, SelectorState};
    use crate::usecase::ports::api::ApiError;

    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<String>>,
        latency: Duration,
        fail: bool,
    }

    impl RecordingSource {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl OptionSource for RecordingSource {
        async fn search(&self, term: &str) -> Result<Vec<AsyncOption>, ApiError> {
            self.calls.lock().expect("calls lock").push(term.to_string());
            tokio::time::sleep(self.latency).await;
            if self.fail {
                return Err(ApiError::http(500, "boom"));
            }
            Ok(vec![AsyncOption::new(term.to_lowercase(), "Beta")])
        }
    }

    fn request(id: u64, term: &str) -> SearchRequest {
        SearchRequest {
            id,
            term: term.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fast_keystrokes_collapse_into_one_request() {
        let source = Arc::new(RecordingSource::default());
        let mut coordinator = SearchCoordinator::new(source.clone(), Duration::from_millis(300));

        let first = coordinator.schedule(request(1, "B"));
        let second = coordinator.schedule(request(2, "Be"));
        let (first, second) = tokio::join!(first.run(), second.run());

        assert_eq!(first, SearchOutcome::Cancelled { id: 1 });
        assert!(matches!(second, SearchOutcome::Loaded { id: 2, .. }));
        assert_eq!(source.calls(), vec!["Be".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_fetched_before_the_debounce_elapses() {
        let source = Arc::new(RecordingSource::default());
        let mut coordinator = SearchCoordinator::new(source.clone(), Duration::from_millis(300));

        let handle = tokio::spawn(coordinator.schedule(request(1, "Al")).run());
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(source.calls().is_empty());

        let outcome = handle.await.expect("search task should finish");
        assert!(matches!(outcome, SearchOutcome::Loaded { id: 1, .. }));
        assert_eq!(source.calls(), vec!["Al".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_an_in_flight_request() {
        let source = Arc::new(RecordingSource {
            latency: Duration::from_secs(5),
            ..RecordingSource::default()
        });
        let mut coordinator = SearchCoordinator::new(source.clone(), Duration::from_millis(300));

        let handle = tokio::spawn(coordinator.schedule(request(7, "Ca")).run());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(source.calls().len(), 1);

        coordinator.cancel();
        let outcome = handle.await.expect("search task should finish");
        assert_eq!(outcome, SearchOutcome::Cancelled { id: 7 });
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_coordinator_cancels_pending_work() {
        let source = Arc::new(RecordingSource::default());
        let mut coordinator = SearchCoordinator::new(source.clone(), Duration::from_millis(300));
        let pending = coordinator.schedule(request(1, "x"));
        drop(coordinator);

        assert_eq!(pending.run().await, SearchOutcome::Cancelled { id: 1 });
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reconfigure_switches_source_and_debounce() {
        let old = Arc::new(RecordingSource::default());
        let new = Arc::new(RecordingSource::default());
        let mut coordinator = SearchCoordinator::new(old.clone(), Duration::from_millis(300));

        assert!(!coordinator.reconfigure(old.clone(), Duration::from_millis(300)));

        let stale = coordinator.schedule(request(1, "Lu"));
        assert!(coordinator.reconfigure(new.clone(), Duration::from_millis(50)));
        assert_eq!(stale.run().await, SearchOutcome::Cancelled { id: 1 });

        let handle = tokio::spawn(coordinator.schedule(request(2, "Luz")).run());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(new.calls(), vec!["Luz".to_string()]);
        assert!(old.calls().is_empty());
        let outcome = handle.await.expect("search task should finish");
        assert!(matches!(outcome, SearchOutcome::Loaded { id: 2, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_surface_as_failed_outcome() {
        let source = Arc::new(RecordingSource {
            fail: true,
            ..RecordingSource::default()
        });
        let mut coordinator = SearchCoordinator::new(source, Duration::from_millis(10));
        let outcome = coordinator.schedule(request(3, "zz")).run().await;
        assert!(matches!(outcome, SearchOutcome::Failed { id: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn selector_typing_scenario_fetches_only_final_term() {
        let source = Arc::new(RecordingSource::default());
        let mut coordinator = SearchCoordinator::new(source.clone(), Duration::from_millis(300));
        let mut state = SelectorState::new(None, vec![AsyncOption::new("a", "Alpha")]);
        state.focus();

        let mut pending = Vec::new();
        for text in ["B", "Be"] {
            if let SearchPlan::Fetch(req) = state.type_query(text) {
                pending.push(coordinator.schedule(req));
            }
        }
        let outcomes = futures::future::join_all(pending.into_iter().map(PendingSearch::run)).await;
        for outcome in outcomes {
            state.finish_search(outcome);
        }

        assert_eq!(source.calls(), vec!["Be".to_string()]);
        let labels: Vec<_> = state.options.iter().map(|o| o.label.clone()).collect();
        assert_eq!(labels, vec!["Beta".to_string()]);
        assert!(!state.is_search_loading);
    }
}
