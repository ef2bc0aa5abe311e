//! Fire-and-forget task dispatch. The core never observes a return value
//! from a scoring task; results surface only through the object store.

use tracing::error;

use crate::config::ScoreConfig;
use crate::error::{Result, ScoreError};
use crate::score;
use crate::store::ObjectStore;

/// Invocation of an independent scoring task per unit of work.
pub trait TaskDispatcher: Send + Sync {
    fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<()>;
}

/// Runs each task on a detached thread against a clone of the store.
/// Stands in for a remote task queue when scoring locally; the threads are
/// never joined, matching the fire-and-forget contract.
pub struct ThreadDispatcher<S> {
    store: S,
    cfg: ScoreConfig,
}

impl<S: ObjectStore + Clone + Send + 'static> ThreadDispatcher<S> {
    pub fn new(store: S, cfg: ScoreConfig) -> Self {
        Self { store, cfg }
    }
}

impl<S: ObjectStore + Clone + Send + 'static> TaskDispatcher for ThreadDispatcher<S> {
    fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<()> {
        let store = self.store.clone();
        let cfg = self.cfg.clone();
        let target = target.to_string();

        std::thread::spawn(move || {
            let outcome = match target.as_str() {
                score::SCORE_DISTRICT_TASK => score::run_district_task(&store, &payload, &cfg),
                other => Err(ScoreError::parse("task target", format!("unknown target {other:?}"))),
            };
            if let Err(err) = outcome {
                // Nobody is listening for task results; the tracker will
                // time the missing object out.
                error!(%target, %err, "scoring task failed");
            }
        });
        Ok(())
    }
}
