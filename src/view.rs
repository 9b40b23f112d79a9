//! Render targets the core drives.
//!
//! The controller, animator and history store never own presentation state;
//! they address these targets through a `ConsultView` handed to them. The TUI
//! and the text surface each provide one.

use crate::model::HistoryRecord;
use crate::render::RenderPlan;
use std::future::Future;

pub const SUBMIT_IDLE_LABEL: &str = "開始分析案件";
pub const SUBMIT_BUSY_LABEL: &str = "⏳ 專家小隊工作中...";
pub const HISTORY_LOAD_FAILED_NOTICE: &str = "無法載入歷史紀錄";

/// State of the submit trigger. `Busy` means disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Busy,
}

impl TriggerState {
    pub fn label(self) -> &'static str {
        match self {
            TriggerState::Idle => SUBMIT_IDLE_LABEL,
            TriggerState::Busy => SUBMIT_BUSY_LABEL,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == TriggerState::Idle
    }
}

/// Terminal marker shown in the progress panel once a submission resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMarker {
    Success,
    Error,
}

impl ProgressMarker {
    pub fn text(self) -> &'static str {
        match self {
            ProgressMarker::Success => "✅ 分析完成！",
            ProgressMarker::Error => "❌ 系統發生錯誤，請稍後再試。",
        }
    }
}

pub trait ConsultView: Send + Sync + 'static {
    fn set_trigger(&self, state: TriggerState);
    fn set_query_input(&self, text: &str);

    fn clear_progress(&self);
    /// Append a new active step indicator.
    fn push_active_step(&self, label: &str);
    /// Demote the indicator at `index` to its settled state.
    fn settle_step(&self, index: usize);
    fn show_progress_marker(&self, marker: ProgressMarker);

    fn render_result(&self, plan: &RenderPlan);
    fn set_result_visible(&self, visible: bool);
    fn scroll_to_result(&self);

    fn render_history(&self, records: &[HistoryRecord]);
    fn set_history_open(&self, open: bool);
    /// The history list could not be fetched. The panel keeps what it shows.
    fn history_unavailable(&self) {
        self.notify(HISTORY_LOAD_FAILED_NOTICE);
    }

    /// Non-blocking user notice (validation prompt, delete failure).
    fn notify(&self, message: &str);
}

/// A blocking yes/no decision from the user.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> impl Future<Output = bool> + Send;
}
