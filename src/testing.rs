//! Fakes shared by unit tests: an in-memory backend, a recording view and
//! fixed confirmers.

use crate::backend::ConsultBackend;
use crate::error::ApiError;
use crate::model::{CaseRef, ConsultResult, HistoryRecord, QueryText, StatuteRef};
use crate::progress::{step_line, StepState};
use crate::render::RenderPlan;
use crate::view::{Confirm, ConsultView, ProgressMarker, TriggerState};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One civil statute and one court case, as returned for the traffic sample.
pub fn traffic_result() -> ConsultResult {
    ConsultResult {
        summary: "對方闖紅燈應負主要責任。\n您可主張與有過失。".to_owned(),
        statutes: vec![StatuteRef {
            law_name: "民法".to_owned(),
            article_id: "民法_184".to_owned(),
            content: "因故意或過失，不法侵害他人之權利者，負損害賠償責任。".to_owned(),
        }],
        cases: vec![CaseRef {
            court: "最高法院".to_owned(),
            case_id: "最高法院 100 年台上字第 1 號".to_owned(),
            summary: "信賴原則之適用。".to_owned(),
        }],
        domains: vec!["民法".to_owned()],
    }
}

pub fn record(id: i64, query: &str, result: ConsultResult) -> HistoryRecord {
    HistoryRecord {
        id,
        query: query.to_owned(),
        result,
        created_at: "2024-05-01 12:34:56".to_owned(),
    }
}

/// In-memory backend. A successful consult stores a history record the way
/// the real service does.
pub struct FakeBackend {
    consult_result: Mutex<Option<ConsultResult>>,
    consult_delay: Duration,
    pub consult_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub deleted: Mutex<Vec<i64>>,
    records: Mutex<Vec<HistoryRecord>>,
    next_id: AtomicUsize,
    pub list_fails: AtomicBool,
    pub delete_fails: AtomicBool,
}

impl FakeBackend {
    pub fn succeeding(result: ConsultResult) -> Self {
        Self::new(Some(result))
    }

    pub fn failing() -> Self {
        Self::new(None)
    }

    fn new(result: Option<ConsultResult>) -> Self {
        Self {
            consult_result: Mutex::new(result),
            consult_delay: Duration::ZERO,
            consult_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            list_fails: AtomicBool::new(false),
            delete_fails: AtomicBool::new(false),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.consult_delay = delay;
        self
    }

    pub fn with_records(self, records: Vec<HistoryRecord>) -> Self {
        let max = records.iter().map(|r| r.id).max().unwrap_or(0);
        self.next_id.store(max as usize + 1, Ordering::SeqCst);
        *lock(&self.records) = records;
        self
    }

    pub fn consult_count(&self) -> usize {
        self.consult_calls.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.consult_count() + self.list_count() + lock(&self.deleted).len()
    }

    pub fn deleted_ids(&self) -> Vec<i64> {
        lock(&self.deleted).clone()
    }
}

impl ConsultBackend for FakeBackend {
    async fn consult(&self, query: &QueryText) -> Result<ConsultResult, ApiError> {
        self.consult_calls.fetch_add(1, Ordering::SeqCst);
        if !self.consult_delay.is_zero() {
            tokio::time::sleep(self.consult_delay).await;
        }
        let result = lock(&self.consult_result).clone();
        match result {
            Some(result) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
                lock(&self.records).insert(0, record(id, query.as_str(), result.clone()));
                Ok(result)
            }
            None => Err(ApiError::Request("connection refused".to_owned())),
        }
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Request("connection reset".to_owned()));
        }
        Ok(lock(&self.records).clone())
    }

    async fn delete_history(&self, id: i64) -> Result<(), ApiError> {
        lock(&self.deleted).push(id);
        if self.delete_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500 });
        }
        lock(&self.records).retain(|r| r.id != id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Trigger(TriggerState),
    QueryInput(String),
    ClearProgress,
    PushStep(String),
    SettleStep(usize),
    Marker(ProgressMarker),
    RenderResult(RenderPlan),
    ResultVisible(bool),
    ScrollToResult,
    RenderHistory(Vec<i64>),
    HistoryOpen(bool),
    Notify(String),
}

/// View that records every call in order.
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    pub panic_on_render: AtomicBool,
}

impl RecordingView {
    fn push(&self, ev: ViewEvent) {
        lock(&self.events).push(ev);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        lock(&self.events).clone()
    }

    pub fn count(&self, pred: impl Fn(&ViewEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|e| pred(e)).count()
    }

    pub fn trigger_changes(&self) -> Vec<TriggerState> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Trigger(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn trigger(&self) -> TriggerState {
        self.trigger_changes()
            .last()
            .copied()
            .unwrap_or(TriggerState::Idle)
    }

    pub fn result_visible(&self) -> bool {
        lock(&self.events)
            .iter()
            .rev()
            .find_map(|e| match e {
                ViewEvent::ResultVisible(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn last_rendered(&self) -> Option<RenderPlan> {
        lock(&self.events).iter().rev().find_map(|e| match e {
            ViewEvent::RenderResult(plan) => Some(plan.clone()),
            _ => None,
        })
    }

    pub fn last_history(&self) -> Option<Vec<i64>> {
        lock(&self.events).iter().rev().find_map(|e| match e {
            ViewEvent::RenderHistory(ids) => Some(ids.clone()),
            _ => None,
        })
    }

    /// Progress panel contents reconstructed from the event stream.
    pub fn progress_lines(&self) -> Vec<String> {
        let mut lines: Vec<(String, StepState)> = Vec::new();
        let mut out_marker: Option<ProgressMarker> = None;
        for ev in lock(&self.events).iter() {
            match ev {
                ViewEvent::ClearProgress => {
                    lines.clear();
                    out_marker = None;
                }
                ViewEvent::PushStep(label) => lines.push((label.clone(), StepState::Active)),
                ViewEvent::SettleStep(i) => {
                    if let Some(line) = lines.get_mut(*i) {
                        line.1 = StepState::Settled;
                    }
                }
                ViewEvent::Marker(m) => out_marker = Some(*m),
                _ => {}
            }
        }
        let mut out: Vec<String> = lines.iter().map(|(l, s)| step_line(l, *s)).collect();
        if let Some(m) = out_marker {
            out.push(m.text().to_owned());
        }
        out
    }
}

impl ConsultView for RecordingView {
    fn set_trigger(&self, state: TriggerState) {
        self.push(ViewEvent::Trigger(state));
    }

    fn set_query_input(&self, text: &str) {
        self.push(ViewEvent::QueryInput(text.to_owned()));
    }

    fn clear_progress(&self) {
        self.push(ViewEvent::ClearProgress);
    }

    fn push_active_step(&self, label: &str) {
        self.push(ViewEvent::PushStep(label.to_owned()));
    }

    fn settle_step(&self, index: usize) {
        self.push(ViewEvent::SettleStep(index));
    }

    fn show_progress_marker(&self, marker: ProgressMarker) {
        self.push(ViewEvent::Marker(marker));
    }

    fn render_result(&self, plan: &RenderPlan) {
        if self.panic_on_render.load(Ordering::SeqCst) {
            panic!("render failed");
        }
        self.push(ViewEvent::RenderResult(plan.clone()));
    }

    fn set_result_visible(&self, visible: bool) {
        self.push(ViewEvent::ResultVisible(visible));
    }

    fn scroll_to_result(&self) {
        self.push(ViewEvent::ScrollToResult);
    }

    fn render_history(&self, records: &[HistoryRecord]) {
        self.push(ViewEvent::RenderHistory(
            records.iter().map(|r| r.id).collect(),
        ));
    }

    fn set_history_open(&self, open: bool) {
        self.push(ViewEvent::HistoryOpen(open));
    }

    fn notify(&self, message: &str) {
        self.push(ViewEvent::Notify(message.to_owned()));
    }
}

/// Confirmer with a fixed answer that counts how often it was asked.
pub struct FixedConfirm {
    answer: bool,
    pub asked: AtomicUsize,
}

impl FixedConfirm {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirm for FixedConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
