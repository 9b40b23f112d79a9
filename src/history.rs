//! Client-side view of the server-held query history.
//!
//! The store never edits its snapshot locally: every change is reconciled by
//! re-fetching the list from the backend.

use crate::backend::ConsultBackend;
use crate::error::ApiError;
use crate::model::{ConsultResult, HistoryRecord};
use crate::view::{Confirm, ConsultView};
use std::sync::{Arc, Mutex, MutexGuard};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

pub const DELETE_CONFIRM_PROMPT: &str = "確定要刪除這筆紀錄嗎？";
pub const DELETE_FAILED_NOTICE: &str = "刪除失敗";
pub const EMPTY_HISTORY_PLACEHOLDER: &str = "尚無紀錄";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user said no; nothing was sent.
    Declined,
    Failed,
}

pub struct HistoryStore<B> {
    backend: Arc<B>,
    snapshot: Mutex<Vec<HistoryRecord>>,
}

impl<B: ConsultBackend> HistoryStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    fn snapshot_guard(&self) -> MutexGuard<'_, Vec<HistoryRecord>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the history. A failure is logged and leaves the last good
    /// snapshot in place.
    pub async fn list(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        match self.backend.list_history().await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "history loaded");
                *self.snapshot_guard() = records.clone();
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load history");
                Err(e)
            }
        }
    }

    /// Re-fetch and redraw the history panel. On failure the panel keeps
    /// whatever it showed before and the user is told the list is stale.
    /// Returns whether the panel was redrawn.
    pub async fn refresh<V: ConsultView + ?Sized>(&self, view: &V) -> bool {
        match self.list().await {
            Ok(records) => {
                view.render_history(&records);
                true
            }
            Err(_) => {
                view.history_unavailable();
                false
            }
        }
    }

    /// Last successfully fetched list.
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.snapshot_guard().clone()
    }

    pub fn find(&self, id: i64) -> Option<HistoryRecord> {
        self.snapshot_guard().iter().find(|r| r.id == id).cloned()
    }

    /// Stored result of a record, for restoring it without a consult call.
    pub fn get<'a>(&self, record: &'a HistoryRecord) -> &'a ConsultResult {
        &record.result
    }

    /// Delete one record after the user confirms. The caller reconciles by
    /// refreshing; see [`HistoryStore::delete_and_refresh`].
    pub async fn delete<C, V>(&self, id: i64, confirm: &C, view: &V) -> DeleteOutcome
    where
        C: Confirm,
        V: ConsultView + ?Sized,
    {
        if !confirm.confirm(DELETE_CONFIRM_PROMPT).await {
            tracing::debug!(id, "delete declined");
            return DeleteOutcome::Declined;
        }
        match self.backend.delete_history(id).await {
            Ok(()) => {
                tracing::info!(id, "history record deleted");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::error!(id, error = %e, "failed to delete history record");
                view.notify(DELETE_FAILED_NOTICE);
                DeleteOutcome::Failed
            }
        }
    }

    pub async fn delete_and_refresh<C, V>(&self, id: i64, confirm: &C, view: &V) -> DeleteOutcome
    where
        C: Confirm,
        V: ConsultView + ?Sized,
    {
        let outcome = self.delete(id, confirm, view).await;
        if outcome == DeleteOutcome::Deleted {
            self.refresh(view).await;
        }
        outcome
    }
}

/// Short "M/D HH:MM" form of a record timestamp. Offset timestamps are shown
/// in local time; naive ones as given. Unparseable input is returned as is.
pub fn format_created_at(raw: &str) -> String {
    let display = format_description!("[month padding:none]/[day padding:none] [hour]:[minute]");

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        let local = UtcOffset::current_local_offset()
            .map(|offset| dt.to_offset(offset))
            .unwrap_or(dt);
        return local.format(display).unwrap_or_else(|_| raw.to_string());
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ];
    naive_formats
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(raw, fmt).ok())
        .and_then(|dt| dt.format(display).ok())
        .unwrap_or_else(|| raw.to_string())
}
