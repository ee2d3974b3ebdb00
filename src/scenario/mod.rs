//! Scenario-lifetime execution state.
//!
//! One [`ScenarioContext`] exists per executing scenario. It owns the scoped
//! container backing the scenario, tracks status and timing, accumulates
//! pending and missing steps, and bridges binding code to the binding
//! instance resolver. The host runner creates the context at scenario start
//! and disposes it at scenario end; binding code and the step executor
//! mutate it in between.

pub mod data;
pub mod info;

use std::any::Any;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error as ThisError;

use crate::binding::{BindingInstance, BindingInstanceResolver, BindingResolutionError};
use crate::container::{
    DisposalError, ResolutionError, ScopedContainer, ScopedContainerExt, TypeKey,
};
use crate::step::{SharedStepContextManager, StepContext};

pub use data::ScenarioData;
pub use info::{ScenarioBlock, ScenarioInfo, StepInstance, TestStatus};

/// Control-flow signal raised by a step definition that is not yet
/// implemented.
///
/// The step executor catches this signal and translates it into
/// [`TestStatus::StepDefinitionPending`]; it is expected behaviour, not a
/// defect, and is never recovered from within this crate.
#[derive(Debug, Clone, Copy, ThisError, PartialEq, Eq)]
#[error("step definition is not yet implemented")]
pub struct PendingStepSignal;

/// Failure recorded against the scenario, shared so both the context and the
/// reporting pipeline can hold it.
pub type TestFailure = Arc<dyn Error + Send + Sync>;

/// Mutable execution state, grouped so a single lock covers it.
#[derive(Debug, Default)]
struct ExecutionState {
    block: ScenarioBlock,
    status: TestStatus,
    error: Option<TestFailure>,
    pending_steps: Vec<String>,
    missing_steps: Vec<StepInstance>,
}

/// Per-scenario execution context.
///
/// The context itself takes no locks callers can observe: its `Mutex` fields
/// exist so the type is `Sync` for the process-wide accessor, and stay
/// uncontended because exactly one scenario is active per logical execution
/// unit.
pub struct ScenarioContext {
    info: ScenarioInfo,
    started: Instant,
    container: Box<dyn ScopedContainer>,
    resolver: Arc<dyn BindingInstanceResolver>,
    state: Mutex<ExecutionState>,
    data: Mutex<ScenarioData>,
    disposed: AtomicBool,
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ScenarioContext")
            .field("info", &self.info)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Creates the context for one scenario.
    ///
    /// Takes ownership of the scoped container, which will be disposed
    /// exactly once with the context. The elapsed-time clock starts here.
    #[must_use]
    pub fn new(
        container: Box<dyn ScopedContainer>,
        info: ScenarioInfo,
        resolver: Arc<dyn BindingInstanceResolver>,
    ) -> Self {
        Self {
            info,
            started: Instant::now(),
            container,
            resolver,
            state: Mutex::new(ExecutionState::default()),
            data: Mutex::new(ScenarioData::new()),
            disposed: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, ExecutionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn data(&self) -> MutexGuard<'_, ScenarioData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Descriptor of the scenario being run.
    #[must_use]
    pub const fn scenario_info(&self) -> &ScenarioInfo {
        &self.info
    }

    /// The scoped container backing this scenario.
    #[must_use]
    pub fn scenario_container(&self) -> &dyn ScopedContainer {
        self.container.as_ref()
    }

    /// Which Given/When/Then phase is currently active.
    #[must_use]
    pub fn current_block(&self) -> ScenarioBlock {
        self.state().block
    }

    /// Advances the active phase. Called by the step executor.
    pub fn set_current_block(&self, block: ScenarioBlock) {
        self.state().block = block;
    }

    /// Status recorded against the scenario so far.
    #[must_use]
    pub fn test_status(&self) -> TestStatus {
        self.state().status
    }

    /// Records a status observation.
    ///
    /// Escalation is one-way: writing [`TestStatus::Ok`] over an already
    /// recorded failure kind is ignored.
    pub fn set_test_status(&self, status: TestStatus) {
        let mut state = self.state();
        if state.status.is_failure() && !status.is_failure() {
            return;
        }
        state.status = status;
    }

    /// The first failure recorded against the scenario, if any.
    #[must_use]
    pub fn test_error(&self) -> Option<TestFailure> {
        self.state().error.clone()
    }

    /// Records a failure. Only the first recorded failure is kept.
    pub fn record_test_error(&self, error: TestFailure) {
        let mut state = self.state();
        if state.error.is_none() {
            state.error = Some(error);
        }
    }

    /// Names of steps that signalled pending, in invocation order.
    #[must_use]
    pub fn pending_steps(&self) -> Vec<String> {
        self.state().pending_steps.clone()
    }

    /// Appends a pending step name. Called by the step executor after it
    /// catches a [`PendingStepSignal`].
    pub fn record_pending_step(&self, name: impl Into<String>) {
        self.state().pending_steps.push(name.into());
    }

    /// Steps for which no binding could be found, in invocation order.
    #[must_use]
    pub fn missing_steps(&self) -> Vec<StepInstance> {
        self.state().missing_steps.clone()
    }

    /// Appends a step that had no matching binding.
    pub fn record_missing_step(&self, step: StepInstance) {
        self.state().missing_steps.push(step);
    }

    /// Time elapsed since the context was constructed. Never resets.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Signals that the currently executing step is not yet implemented.
    ///
    /// Returns the signal for the step definition to propagate; the step
    /// executor translates it into a pending status and records the step
    /// name via [`ScenarioContext::record_pending_step`].
    #[must_use]
    pub const fn pending(&self) -> PendingStepSignal {
        PendingStepSignal
    }

    /// Resolves the instance that should handle invocations of the given
    /// binding class.
    ///
    /// The context is a pass-through: it does no caching of its own, but it
    /// always supplies the same scoped container, which is what gives binding
    /// classes scenario-scoped lifetime.
    ///
    /// # Errors
    ///
    /// Propagates the resolver's [`BindingResolutionError`] unchanged.
    pub fn binding_instance(
        &self,
        binding_type: TypeKey,
    ) -> Result<BindingInstance, BindingResolutionError> {
        self.resolver
            .resolve_binding_instance(binding_type, self.container.as_ref())
    }

    /// Typed variant of [`ScenarioContext::binding_instance`].
    ///
    /// # Errors
    ///
    /// Propagates the resolver's [`BindingResolutionError`], or reports the
    /// binding type as ineligible when the resolved instance is not a `T`.
    pub fn binding_instance_of<T: Any + Send + Sync>(
        &self,
    ) -> Result<Arc<T>, BindingResolutionError> {
        let key = TypeKey::of::<T>();
        let instance = self.binding_instance(key)?;
        instance
            .downcast::<T>()
            .map_err(|_| BindingResolutionError::NoEligibleInstance {
                type_name: key.name().to_owned(),
            })
    }

    /// Current step context, read through the step-context manager registered
    /// in this scenario's container.
    ///
    /// The context does not track step-level nesting itself; the manager
    /// reachable through the same container is the single source of truth for
    /// "what step is executing now".
    ///
    /// # Errors
    ///
    /// Propagates the container's [`ResolutionError`] when no step-context
    /// manager is registered in this scenario's scope.
    pub fn step_context(&self) -> Result<Option<StepContext>, ResolutionError> {
        let manager = self.container.resolve_of::<SharedStepContextManager>()?;
        Ok(manager.step_context())
    }

    /// Stores a scenario-scoped value under a case-sensitive key. The last
    /// write wins.
    pub fn set_value<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.data().insert(key, value);
    }

    /// Reads a scenario-scoped value by key, when it has type `T`.
    #[must_use]
    pub fn value<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.data().get::<T>(key)
    }

    /// Whether any value is stored under `key`.
    #[must_use]
    pub fn contains_value(&self, key: &str) -> bool {
        self.data().contains_key(key)
    }

    /// Removes a scenario-scoped value, reporting whether one existed.
    #[must_use]
    pub fn remove_value(&self, key: &str) -> bool {
        self.data().remove(key)
    }

    /// Tears the context down, disposing the owned container.
    ///
    /// Idempotent: both the direct owner and a wrapping context manager may
    /// call this; only the first call runs teardown, later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Propagates the container's [`DisposalError`] from the first call.
    pub fn dispose(&self) -> Result<(), DisposalError> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.data().clear();
        self.container.dispose()
    }
}

impl Drop for ScenarioContext {
    fn drop(&mut self) {
        if let Err(error) = self.dispose() {
            tracing::debug!("scenario container teardown failed on drop: {error}");
        }
    }
}

#[cfg(test)]
mod tests;
