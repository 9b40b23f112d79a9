//! Submission lifecycle controller.
//!
//! Owns one query submission from acceptance to re-enabling the trigger, and
//! the command loop that presentation layers drive.

use crate::backend::ConsultBackend;
use crate::error::SubmitError;
use crate::history::HistoryStore;
use crate::model::{ConsultResult, HistoryRecord, QueryText};
use crate::progress::ProgressAnimator;
use crate::render::{self, PostRenderAction};
use crate::view::{Confirm, ConsultView, ProgressMarker, TriggerState};
use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

pub const EMPTY_QUERY_PROMPT: &str = "請輸入案件內容！";

/// Something that submits a query and reports the outcome.
pub trait Submit: Send + Sync + 'static {
    fn submit(
        &self,
        raw_query: &str,
    ) -> impl Future<Output = Result<ConsultResult, SubmitError>> + Send;

    /// Whether completing a submission already refreshes the history panel.
    fn refreshes_history(&self) -> bool {
        false
    }
}

/// Commands emitted by UI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Submit(String),
    RefreshHistory,
    Restore(i64),
    Delete(i64),
    Quit,
}

/// Holds the submit trigger disabled. Dropping it re-enables the trigger,
/// also when a panic unwinds through the submission.
struct TriggerGuard<'a, V: ConsultView> {
    in_flight: &'a AtomicBool,
    view: &'a V,
}

impl<'a, V: ConsultView> TriggerGuard<'a, V> {
    fn acquire(in_flight: &'a AtomicBool, view: &'a V) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        view.set_trigger(TriggerState::Busy);
        Some(Self { in_flight, view })
    }
}

impl<V: ConsultView> Drop for TriggerGuard<'_, V> {
    fn drop(&mut self) {
        // Restore the label before releasing so a new submission's Busy is never overwritten.
        self.view.set_trigger(TriggerState::Idle);
        self.in_flight.store(false, Ordering::Release);
    }
}

pub struct SubmissionController<B, V> {
    backend: Arc<B>,
    view: Arc<V>,
    animator: ProgressAnimator,
    in_flight: AtomicBool,
}

impl<B: ConsultBackend, V: ConsultView> SubmissionController<B, V> {
    pub fn new(backend: Arc<B>, view: Arc<V>, animator: ProgressAnimator) -> Self {
        Self {
            backend,
            view,
            animator,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl<B: ConsultBackend, V: ConsultView> Submit for SubmissionController<B, V> {
    async fn submit(&self, raw_query: &str) -> Result<ConsultResult, SubmitError> {
        let Some(query) = QueryText::parse(raw_query) else {
            self.view.notify(EMPTY_QUERY_PROMPT);
            return Err(SubmitError::EmptyQuery);
        };
        let Some(_trigger) = TriggerGuard::acquire(&self.in_flight, self.view.as_ref()) else {
            tracing::debug!("submission ignored: trigger disabled");
            return Err(SubmitError::Busy);
        };

        self.view.set_result_visible(false);
        self.view.clear_progress();
        let mut progress = self.animator.start(self.view.clone());

        tracing::info!(chars = query.as_str().chars().count(), "consultation submitted");
        let outcome = self.backend.consult(&query).await;
        progress.stop();

        match outcome {
            Ok(result) => {
                tracing::info!(
                    statutes = result.statutes.len(),
                    cases = result.cases.len(),
                    "consultation completed"
                );
                self.view.clear_progress();
                self.view.show_progress_marker(ProgressMarker::Success);
                present_result(self.view.as_ref(), &result);
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "consultation failed");
                self.view.clear_progress();
                self.view.show_progress_marker(ProgressMarker::Error);
                Err(e.into())
            }
        }
    }
}

/// Draw a result and carry out the plan's post-render action.
pub(crate) fn present_result<V: ConsultView + ?Sized>(view: &V, result: &ConsultResult) {
    let plan = render::render(result);
    view.render_result(&plan);
    view.set_result_visible(true);
    match plan.post_render {
        PostRenderAction::ScrollIntoView => view.scroll_to_result(),
    }
}

/// Put a history record back on screen. No network call is made.
pub(crate) fn restore_record<B, V>(store: &HistoryStore<B>, view: &V, record: &HistoryRecord)
where
    B: ConsultBackend,
    V: ConsultView + ?Sized,
{
    view.set_query_input(&record.query);
    present_result(view, store.get(record));
    view.set_history_open(false);
}

/// Serve UI commands until quit. Each command runs as its own task so a
/// delete or refresh is never queued behind an in-flight consultation.
pub(crate) async fn run_controller<S, B, V, C>(
    submitter: Arc<S>,
    store: Arc<HistoryStore<B>>,
    view: Arc<V>,
    confirm: Arc<C>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()>
where
    S: Submit,
    B: ConsultBackend,
    V: ConsultView,
    C: Confirm + 'static,
{
    let mut tasks = JoinSet::new();

    {
        let store = store.clone();
        let view = view.clone();
        tasks.spawn(async move {
            store.refresh(view.as_ref()).await;
        });
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(query)) => {
                        let submitter = submitter.clone();
                        tasks.spawn(async move {
                            if let Err(e) = submitter.submit(&query).await {
                                tracing::debug!(error = %e, "submission ended without result");
                            }
                        });
                    }
                    Some(UiCommand::RefreshHistory) => {
                        let store = store.clone();
                        let view = view.clone();
                        tasks.spawn(async move {
                            store.refresh(view.as_ref()).await;
                        });
                    }
                    Some(UiCommand::Restore(id)) => match store.find(id) {
                        Some(record) => restore_record(store.as_ref(), view.as_ref(), &record),
                        None => tracing::warn!(id, "restore requested for unknown record"),
                    },
                    Some(UiCommand::Delete(id)) => {
                        let store = store.clone();
                        let view = view.clone();
                        let confirm = confirm.clone();
                        tasks.spawn(async move {
                            store
                                .delete_and_refresh(id, confirm.as_ref(), view.as_ref())
                                .await;
                        });
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            Some(joined) = tasks.join_next() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::error!(error = %e, "UI task panicked");
                    }
                }
            }
        }
    }

    // The network call has no cancellation; leaving drops whatever is still pending.
    tasks.abort_all();
    Ok(())
}
