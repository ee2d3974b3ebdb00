//! Immutable descriptors for scenarios and steps.

use serde::{Deserialize, Serialize};

/// Describes the scenario being run. Supplied at construction and never
/// mutated by the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    /// Scenario title as written in the feature source.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Tags attached to the scenario, without the leading `@`.
    pub tags: Vec<String>,
}

impl ScenarioInfo {
    /// Creates a descriptor with a title and no tags.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            tags: Vec::new(),
        }
    }

    /// Creates a descriptor with a title and tags.
    #[must_use]
    pub fn with_tags(title: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            tags,
        }
    }
}

/// Phase marker indicating which part of a scenario is executing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioBlock {
    /// No step has started yet.
    #[default]
    None,
    /// A `Given` step (or one of its `And`/`But` continuations).
    Given,
    /// A `When` step.
    When,
    /// A `Then` step.
    Then,
    /// A step outside the Given/When/Then structure.
    Other,
}

/// Outcome recorded against a scenario while it executes.
///
/// The status escalates one-way for the duration of a scenario: once it
/// leaves [`TestStatus::Ok`] it is never reset back by the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// No failure observed so far.
    #[default]
    Ok,
    /// A step signalled that its definition is not yet implemented.
    StepDefinitionPending,
    /// A step had no matching binding.
    UndefinedStep,
    /// Binding resolution or invocation failed.
    BindingError,
    /// A step raised an ordinary test failure.
    TestError,
}

impl TestStatus {
    /// Whether this status represents a failure kind.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

/// A concrete step occurrence, recorded when no binding matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInstance {
    /// Block the step belongs to.
    pub block: ScenarioBlock,
    /// Keyword as written in the feature source, e.g. `Given`.
    pub keyword: String,
    /// Step text after the keyword.
    pub text: String,
}

impl StepInstance {
    /// Creates a step descriptor.
    #[must_use]
    pub fn new(block: ScenarioBlock, keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            block,
            keyword: keyword.into(),
            text: text.into(),
        }
    }
}
