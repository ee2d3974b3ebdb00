//! Step-level context read surface.
//!
//! Step nesting is tracked by a narrower-scoped manager owned by the host
//! runner and registered in each scenario's container. The scenario context
//! reaches it through the container rather than tracking steps itself, so
//! there is a single source of truth for "what step is executing now".

use std::sync::Arc;

use crate::scenario::info::StepInstance;

/// Read-only view of the step currently executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContext {
    step: StepInstance,
}

impl StepContext {
    /// Creates a step context for a step occurrence.
    #[must_use]
    pub const fn new(step: StepInstance) -> Self {
        Self { step }
    }

    /// The step this context describes.
    #[must_use]
    pub const fn step(&self) -> &StepInstance {
        &self.step
    }
}

/// Tracks the step currently executing within a scenario.
///
/// Hosts register an implementation in each scenario's scoped container under
/// the [`SharedStepContextManager`] type.
#[cfg_attr(test, mockall::automock)]
pub trait StepContextManager: Send + Sync {
    /// The current step context, or `None` between steps.
    fn step_context(&self) -> Option<StepContext>;
}

/// Registration type for step-context managers in a scoped container.
pub type SharedStepContextManager = Arc<dyn StepContextManager>;
