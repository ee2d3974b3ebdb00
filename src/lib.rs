//! Scenario-scoped execution context for behaviour-driven test runners.
//!
//! The crate holds per-test-case state (status, current step phase,
//! pending and missing step bookkeeping, elapsed time) and mediates lookup
//! of binding-class instances from a scoped dependency container. A
//! process-wide "current scenario" accessor remains available for legacy
//! sequential callers and can be disabled, once, when execution goes
//! parallel.
//!
//! The container engine, step matching, feature parsing, and runner
//! integration are external collaborators consumed through the trait seams
//! in [`container`], [`binding`], and [`step`].

pub mod binding;
pub mod container;
pub mod current;
pub mod scenario;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use binding::{BindingInstance, BindingInstanceResolver, BindingResolutionError};
pub use container::{
    DisposalError, ResolutionError, ScopedContainer, ScopedContainerExt, SharedInstance, TypeKey,
};
pub use current::{CurrentAccessError, CurrentScenario};
pub use scenario::{
    PendingStepSignal, ScenarioBlock, ScenarioContext, ScenarioData, ScenarioInfo, StepInstance,
    TestFailure, TestStatus,
};
pub use step::{SharedStepContextManager, StepContext, StepContextManager};
#[cfg(any(test, feature = "test-support"))]
pub use test_support::{ContainerBindingResolver, FactoryContainer};
