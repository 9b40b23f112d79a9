use super::*;
use crate::orchestrator::SubmissionController;
use crate::progress::ProgressAnimator;
use crate::testing::{record, traffic_result, FakeBackend, RecordingView, ViewEvent};
use crate::view::TriggerState;
use std::time::Duration;

type Controller = SubmissionController<FakeBackend, RecordingView>;

struct Fixture {
    backend: Arc<FakeBackend>,
    view: Arc<RecordingView>,
    store: Arc<HistoryStore<FakeBackend>>,
}

impl Fixture {
    fn new(backend: FakeBackend) -> Self {
        let backend = Arc::new(backend);
        Self {
            store: Arc::new(HistoryStore::new(backend.clone())),
            backend,
            view: Arc::new(RecordingView::default()),
        }
    }

    fn controller(&self) -> Controller {
        SubmissionController::new(
            self.backend.clone(),
            self.view.clone(),
            ProgressAnimator::consult(Duration::from_millis(1200)),
        )
    }

    fn synchronized(&self) -> HistorySynchronizer<Controller, FakeBackend, RecordingView> {
        HistorySynchronizer::wrap(self.controller(), self.store.clone(), self.view.clone())
    }
}

#[tokio::test]
async fn success_refreshes_history_after_cleanup() {
    let fx = Fixture::new(
        FakeBackend::succeeding(traffic_result()).with_records(vec![record(4, "舊", traffic_result())]),
    );
    let sync = fx.synchronized();

    let result = sync.submit("車禍").await.expect("result");
    assert_eq!(result, traffic_result());
    assert_eq!(fx.backend.list_count(), 1);
    assert_eq!(fx.view.last_history(), Some(vec![5, 4]));

    let events = fx.view.events();
    let idle_at = events
        .iter()
        .position(|e| *e == ViewEvent::Trigger(TriggerState::Idle))
        .expect("trigger re-enabled");
    let history_at = events
        .iter()
        .position(|e| matches!(e, ViewEvent::RenderHistory(_)))
        .expect("history rendered");
    assert!(idle_at < history_at);
}

#[tokio::test]
async fn transport_failure_still_refreshes_and_passes_error_through() {
    let fx = Fixture::new(FakeBackend::failing());
    let sync = fx.synchronized();

    let err = sync.submit("車禍").await.unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
    assert_eq!(fx.backend.list_count(), 1);
    assert!(!fx.view.result_visible());
    assert!(fx.view.trigger().is_enabled());
}

#[tokio::test]
async fn blank_query_makes_no_network_call_at_all() {
    let fx = Fixture::new(FakeBackend::succeeding(traffic_result()));
    let sync = fx.synchronized();

    let err = sync.submit("   ").await.unwrap_err();
    assert!(matches!(err, SubmitError::EmptyQuery));
    assert_eq!(fx.backend.network_calls(), 0);
    assert!(fx.view.trigger_changes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn busy_rejection_does_not_refresh() {
    let fx = Fixture::new(
        FakeBackend::succeeding(traffic_result()).with_delay(Duration::from_millis(500)),
    );
    let sync = fx.synchronized();

    let (first, second) = tokio::join!(sync.submit("a"), sync.submit("b"));
    assert!(first.is_ok());
    assert!(matches!(second, Err(SubmitError::Busy)));
    assert_eq!(fx.backend.consult_count(), 1);
    assert_eq!(fx.backend.list_count(), 1);
}

#[tokio::test]
async fn wrapping_twice_refreshes_once() {
    let fx = Fixture::new(FakeBackend::succeeding(traffic_result()));
    let twice = HistorySynchronizer::wrap(fx.synchronized(), fx.store.clone(), fx.view.clone());
    assert!(twice.refreshes_history());
    assert!(twice.inner().refreshes_history());

    twice.submit("車禍").await.expect("result");
    assert_eq!(fx.backend.list_count(), 1);
    assert_eq!(
        fx.view.count(|e| matches!(e, ViewEvent::RenderHistory(_))),
        1
    );
}

#[tokio::test]
async fn failed_refresh_leaves_submission_outcome_intact() {
    let fx = Fixture::new(FakeBackend::succeeding(traffic_result()));
    fx.backend
        .list_fails
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let sync = fx.synchronized();

    assert_eq!(sync.submit("車禍").await.expect("result"), traffic_result());
    assert!(fx.view.last_history().is_none());
    assert!(fx.view.result_visible());
}

#[test]
fn plain_controller_does_not_claim_refresh() {
    let fx = Fixture::new(FakeBackend::failing());
    assert!(!fx.controller().refreshes_history());
}
