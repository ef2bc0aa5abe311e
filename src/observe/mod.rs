//! Completion tracking: supervises the interval between dispatching N
//! independent scoring tasks and all N results being available, publishing
//! throttled progress snapshots and honoring a wall-clock budget. Every
//! observable effect goes through the persisted index document; there is
//! no other notification channel.

mod clock;

pub use clock::{Clock, DeadlineBudget, SystemClock, TimeBudget};

use tracing::info;

use crate::config::ScoreConfig;
use crate::error::Result;
use crate::plan::{self, PlanResult, Progress};
use crate::store::{ObjectStore, StoreError, Visibility};

/// Lifecycle of one completion-tracking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No poll attempted yet.
    Pending,
    /// Waiting on expected results in index order.
    InProgress,
    /// Every expected result appeared.
    Completed,
    /// The time budget ran out first. A normal terminal outcome, not an
    /// error: the persisted result keeps a permanent explanation.
    Overdue,
}

const COMPLETED_MESSAGE: &str = "Finished scoring this plan.";
const OVERDUE_MESSAGE: &str = "Giving up on this plan after it took too long, sorry.";

fn progress_message(progress: Progress) -> String {
    format!(
        "Scoring this newly-uploaded plan. {} of {} parts complete. \
         Reload this page to see the result.",
        progress.completed(),
        progress.total()
    )
}

/// Write the publicly readable index document for an upload.
pub fn put_index(store: &dyn ObjectStore, upload: &PlanResult) -> Result<()> {
    let body = upload
        .to_json()
        .map_err(|err| crate::error::ScoreError::parse("index document", err))?;
    store.put(&plan::index_key(&upload.id), &body, "text/json", Visibility::Public)?;
    Ok(())
}

/// Waits for expected per-district results in fixed index order.
pub struct CompletionTracker<'a> {
    store: &'a dyn ObjectStore,
    clock: &'a dyn Clock,
    budget: &'a dyn TimeBudget,
    cfg: &'a ScoreConfig,
    state: TrackerState,
}

impl<'a> CompletionTracker<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        clock: &'a dyn Clock,
        budget: &'a dyn TimeBudget,
        cfg: &'a ScoreConfig,
    ) -> Self {
        Self { store, clock, budget, cfg, state: TrackerState::Pending }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Poll until every expected key exists or the budget runs out.
    ///
    /// Keys are processed strictly in order: index i+1 is not examined
    /// until index i has appeared, so total wait is bounded by the
    /// slowest-to-appear prefix rather than by true completion order, and
    /// published progress can undercount work finished out of order.
    /// Returns the terminal state and the final snapshot written.
    pub fn watch(
        mut self,
        upload: PlanResult,
        expected: &[String],
    ) -> Result<(TrackerState, PlanResult)> {
        let total = expected.len();
        let mut current = upload;
        let mut next_update = self.clock.now();

        for (index, key) in expected.iter().enumerate() {
            self.state = TrackerState::InProgress;
            let progress = Progress::new(index, total);
            current = current.with_progress(progress, progress_message(progress));

            // Publish a snapshot when the throttle window has passed.
            if self.clock.now() >= next_update {
                put_index(self.store, &current)?;
                next_update = self.clock.now() + self.cfg.update_throttle;
            }

            // Wait for this one expected result.
            loop {
                match self.store.get(key) {
                    Ok(_) => break,
                    Err(StoreError::NotFound(_)) => {
                        // Not ready yet: back off, then make sure there is
                        // still budget for another attempt.
                        self.clock.sleep(self.cfg.poll_backoff);
                        if self.budget.remaining() < self.cfg.safety_margin {
                            self.state = TrackerState::Overdue;
                            let overdue = current.with_message(OVERDUE_MESSAGE);
                            put_index(self.store, &overdue)?;
                            info!(completed = index, total, "gave up waiting for results");
                            return Ok((self.state, overdue));
                        }
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        self.state = TrackerState::Completed;
        let progress = Progress::new(total, total);
        let completed = current.with_progress(progress, COMPLETED_MESSAGE);
        put_index(self.store, &completed)?;
        info!(total, "all expected results appeared");
        Ok((self.state, completed))
    }
}
