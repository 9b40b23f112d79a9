//! Cosmetic staged progress display.
//!
//! The animator walks a fixed list of stage labels on a timer while a
//! consultation is in flight. It knows nothing about the backend: the stages
//! are illustrative and may run out before or after the real response.

use crate::view::ConsultView;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[cfg(test)]
#[path = "progress_test.rs"]
mod progress_test;

pub const CONSULT_STEPS: [&str; 4] = [
    "🔍 Classifier Agent: 正在分析案件領域...",
    "📚 Expert Agent: 正在檢索法律資料庫...",
    "⚖️ Retrieval Agent: 正在比對相關判例...",
    "✍️ Synthesizer Agent: 正在撰寫法律分析報告...",
];

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Active,
    Settled,
}

/// Text of a step indicator in the given state.
pub fn step_line(label: &str, state: StepState) -> String {
    match state {
        StepState::Active => format!("▶ {label}"),
        StepState::Settled => format!("✓ {label}"),
    }
}

#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    steps: Vec<String>,
    interval: Duration,
}

impl ProgressAnimator {
    pub fn new(steps: Vec<String>, interval: Duration) -> Self {
        Self { steps, interval }
    }

    /// The four pipeline stages at the given cadence.
    pub fn consult(interval: Duration) -> Self {
        Self::new(CONSULT_STEPS.iter().map(|s| s.to_string()).collect(), interval)
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Spawn the step timer. Step `i` becomes active after `(i + 1) * interval`
    /// and step `i - 1` settles at the same moment. The timer ends after the
    /// last step.
    pub fn start<V: ConsultView>(&self, view: Arc<V>) -> ProgressHandle {
        let shared = Arc::new(Mutex::new(Emission::default()));
        let task_shared = shared.clone();
        let steps = self.steps.clone();
        // interval_at panics on a zero period.
        let interval = self.interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            for (i, label) in steps.iter().enumerate() {
                ticker.tick().await;
                let mut emission = lock(&task_shared);
                if emission.stopped {
                    return;
                }
                view.push_active_step(label);
                if i > 0 {
                    view.settle_step(i - 1);
                }
                emission.emitted = i + 1;
            }
        });

        ProgressHandle {
            shared,
            task: Some(task),
        }
    }
}

#[derive(Debug, Default)]
struct Emission {
    stopped: bool,
    emitted: usize,
}

fn lock(shared: &Mutex<Emission>) -> MutexGuard<'_, Emission> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to a running animation. Dropping it stops the animation.
#[derive(Debug)]
pub struct ProgressHandle {
    shared: Arc<Mutex<Emission>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    /// Cancel the pending timer. Indicators already emitted stay as they are.
    ///
    /// Emission and stop share one lock, so no step appears once this returns.
    /// Repeated calls and calls after the last step are no-ops.
    pub fn stop(&mut self) {
        {
            let mut emission = lock(&self.shared);
            if emission.stopped {
                return;
            }
            emission.stopped = true;
            tracing::trace!(emitted = emission.emitted, "progress stopped");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Number of step indicators emitted so far.
    #[cfg(test)]
    pub fn emitted(&self) -> usize {
        lock(&self.shared).emitted
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        lock(&self.shared).stopped
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
