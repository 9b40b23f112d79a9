//! Post-submission history refresh.
//!
//! `HistorySynchronizer` decorates any [`Submit`] so the history panel is
//! re-fetched once a submission resolves. The wrapped operation's validation,
//! outcome and cleanup pass through untouched.

use super::controller::Submit;
use crate::backend::ConsultBackend;
use crate::error::SubmitError;
use crate::history::HistoryStore;
use crate::model::ConsultResult;
use crate::view::ConsultView;
use std::sync::Arc;

#[cfg(test)]
#[path = "history_sync_test.rs"]
mod history_sync_test;

pub struct HistorySynchronizer<S, B, V> {
    inner: S,
    store: Arc<HistoryStore<B>>,
    view: Arc<V>,
}

impl<S: Submit, B: ConsultBackend, V: ConsultView> HistorySynchronizer<S, B, V> {
    pub fn wrap(inner: S, store: Arc<HistoryStore<B>>, view: Arc<V>) -> Self {
        Self { inner, store, view }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Submit, B: ConsultBackend, V: ConsultView> Submit for HistorySynchronizer<S, B, V> {
    async fn submit(&self, raw_query: &str) -> Result<ConsultResult, SubmitError> {
        let outcome = self.inner.submit(raw_query).await;

        // Rejected submissions made no backend call, so there is nothing new to show.
        let accepted = match &outcome {
            Ok(_) => true,
            Err(e) => e.was_accepted(),
        };
        if accepted && !self.inner.refreshes_history() {
            self.store.refresh(self.view.as_ref()).await;
        }
        outcome
    }

    fn refreshes_history(&self) -> bool {
        true
    }
}
