//! Process-wide "current scenario" accessor.
//!
//! Legacy binding code that cannot receive the scenario context through
//! explicit injection reads it from a process-wide slot instead. That
//! convenience is only sound while scenarios run strictly sequentially, so
//! the gateway has two states: `Enabled` (initial) and `Disabled` (entered
//! once, before parallel execution begins, never left). The gateway is an
//! ordinary struct so hosts and tests can hold private instances; the
//! process-wide one lives behind [`CurrentScenario::global`].

use std::sync::atomic::{AtomicBool, Ordering, fence};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use thiserror::Error;

use crate::scenario::ScenarioContext;

/// Errors surfaced by the current-scenario accessor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CurrentAccessError {
    /// The accessor was read after being disabled for parallel execution.
    ///
    /// There is no well-defined "current" scenario when many run
    /// concurrently; inject the scenario context into the binding class
    /// instead.
    #[error(
        "the current-scenario accessor cannot be used in multi-threaded \
         execution; inject the scenario context into the binding class"
    )]
    SingleThreadedAccessViolation,
}

static GLOBAL: CurrentScenario = CurrentScenario::new();

/// Two-state gateway to the currently executing scenario context.
///
/// Holds a weak back-reference: the host runner owns the context and the
/// slot never extends its lifetime.
#[derive(Debug, Default)]
pub struct CurrentScenario {
    disabled: AtomicBool,
    slot: Mutex<Weak<ScenarioContext>>,
}

impl CurrentScenario {
    /// Creates an enabled gateway with an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            disabled: AtomicBool::new(false),
            slot: Mutex::new(Weak::new()),
        }
    }

    /// The process-wide gateway instance.
    #[must_use]
    pub const fn global() -> &'static Self {
        &GLOBAL
    }

    fn slot(&self) -> MutexGuard<'_, Weak<ScenarioContext>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the gateway has been switched off for parallel execution.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Returns the currently stored scenario context.
    ///
    /// While enabled, an empty slot is not an error: `Ok(None)` is returned
    /// and a trace diagnostic is emitted, keeping legacy sequential callers
    /// working while they migrate to explicit injection.
    ///
    /// # Errors
    ///
    /// Returns [`CurrentAccessError::SingleThreadedAccessViolation`] once the
    /// gateway has been disabled.
    pub fn get(&self) -> Result<Option<Arc<ScenarioContext>>, CurrentAccessError> {
        if self.is_disabled() {
            return Err(CurrentAccessError::SingleThreadedAccessViolation);
        }
        let context = self.slot().upgrade();
        if context.is_none() {
            tracing::trace!("no active scenario context in the current-scenario accessor");
        }
        Ok(context)
    }

    /// Stores a weak reference to the scenario context starting execution.
    ///
    /// A silent no-op once disabled, so sequential legacy code paths that
    /// still call it keep working under parallel execution.
    pub fn set(&self, context: &Arc<ScenarioContext>) {
        let mut slot = self.slot();
        if self.is_disabled() {
            return;
        }
        *slot = Arc::downgrade(context);
    }

    /// Empties the slot when a scenario finishes. A no-op once disabled.
    pub fn clear(&self) {
        let mut slot = self.slot();
        if self.is_disabled() {
            return;
        }
        *slot = Weak::new();
    }

    /// Switches the gateway off for the rest of the process.
    ///
    /// Called once at suite startup when parallel execution is selected,
    /// before any concurrent scenario begins. The full fence makes every
    /// worker observe both the disabled flag and the cleared slot; there is
    /// no re-enable operation.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
        fence(Ordering::SeqCst);
        *self.slot() = Weak::new();
    }

    /// Whether the slot currently holds a live reference, bypassing the
    /// disabled check. Test probe only.
    #[cfg(test)]
    pub(crate) fn slot_occupied(&self) -> bool {
        self.slot().upgrade().is_some()
    }
}
