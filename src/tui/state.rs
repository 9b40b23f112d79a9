use crate::model::HistoryRecord;
use crate::progress::StepState;
use crate::render::RenderPlan;
use crate::view::{Confirm, ConsultView, ProgressMarker, TriggerState, HISTORY_LOAD_FAILED_NOTICE};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    History,
}

/// A yes/no question waiting on the user. Answering drops the sender.
pub struct PendingConfirm {
    pub prompt: String,
    reply: oneshot::Sender<bool>,
}

impl PendingConfirm {
    pub fn answer(self, yes: bool) {
        let _ = self.reply.send(yes);
    }
}

pub struct UiState {
    pub base_url: String,
    pub focus: Focus,
    pub show_help: bool,
    pub info: String,

    pub query_input: String,
    pub trigger: TriggerState,

    pub progress: Vec<(String, StepState)>,
    pub marker: Option<ProgressMarker>,

    pub result: Option<RenderPlan>,
    pub result_visible: bool,
    pub result_scroll: u16,

    pub history: Vec<HistoryRecord>,
    pub history_loaded: bool,
    /// Last fetch failed; cleared by the next successful one.
    pub history_failed: bool,
    pub history_selected: usize, // Index of selected history item (0 = most recent)
    pub history_open: bool,

    pub pending_confirm: Option<PendingConfirm>,
}

impl UiState {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            focus: Focus::Input,
            show_help: false,
            info: String::new(),
            query_input: String::new(),
            trigger: TriggerState::Idle,
            progress: Vec::new(),
            marker: None,
            result: None,
            result_visible: false,
            result_scroll: 0,
            history: Vec::new(),
            history_loaded: false,
            history_failed: false,
            history_selected: 0,
            history_open: true,
            pending_confirm: None,
        }
    }

    pub fn selected_record(&self) -> Option<&HistoryRecord> {
        self.history.get(self.history_selected)
    }
}

pub type SharedState = Arc<Mutex<UiState>>;

pub fn lock(state: &SharedState) -> MutexGuard<'_, UiState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes controller output into the shared UI state; the UI thread draws it.
pub struct TuiView {
    state: SharedState,
}

impl TuiView {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl ConsultView for TuiView {
    fn set_trigger(&self, trigger: TriggerState) {
        lock(&self.state).trigger = trigger;
    }

    fn set_query_input(&self, text: &str) {
        lock(&self.state).query_input = text.to_string();
    }

    fn clear_progress(&self) {
        let mut s = lock(&self.state);
        s.progress.clear();
        s.marker = None;
    }

    fn push_active_step(&self, label: &str) {
        lock(&self.state)
            .progress
            .push((label.to_string(), StepState::Active));
    }

    fn settle_step(&self, index: usize) {
        if let Some(step) = lock(&self.state).progress.get_mut(index) {
            step.1 = StepState::Settled;
        }
    }

    fn show_progress_marker(&self, marker: ProgressMarker) {
        lock(&self.state).marker = Some(marker);
    }

    fn render_result(&self, plan: &RenderPlan) {
        let mut s = lock(&self.state);
        s.result = Some(plan.clone());
        s.result_scroll = 0;
    }

    fn set_result_visible(&self, visible: bool) {
        lock(&self.state).result_visible = visible;
    }

    fn scroll_to_result(&self) {
        let mut s = lock(&self.state);
        s.result_scroll = 0;
        s.focus = Focus::Input;
    }

    fn render_history(&self, records: &[HistoryRecord]) {
        let mut s = lock(&self.state);
        s.history = records.to_vec();
        s.history_loaded = true;
        s.history_failed = false;
        if s.history_selected >= s.history.len() {
            s.history_selected = s.history.len().saturating_sub(1);
        }
    }

    fn set_history_open(&self, open: bool) {
        let mut s = lock(&self.state);
        s.history_open = open;
        if !open {
            s.focus = Focus::Input;
        }
    }

    fn notify(&self, message: &str) {
        lock(&self.state).info = message.to_string();
    }

    fn history_unavailable(&self) {
        let mut s = lock(&self.state);
        s.history_failed = true;
        s.info = format!("{HISTORY_LOAD_FAILED_NOTICE} (Ctrl-R)");
    }
}

/// Asks through a modal drawn by the UI thread.
pub struct TuiConfirm {
    state: SharedState,
}

impl TuiConfirm {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl Confirm for TuiConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        {
            let mut s = lock(&self.state);
            // A newer question replaces an unanswered one, which counts as "no".
            if let Some(previous) = s.pending_confirm.take() {
                previous.answer(false);
            }
            s.pending_confirm = Some(PendingConfirm {
                prompt: prompt.to_string(),
                reply: tx,
            });
        }
        rx.await.unwrap_or(false)
    }
}
