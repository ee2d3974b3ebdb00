//! Unit tests for the scenario execution context.
#![expect(clippy::expect_used, reason = "Test assertions panic on failure")]

use std::sync::Arc;

use rstest::rstest;

use super::{ScenarioBlock, ScenarioContext, ScenarioInfo, StepInstance, TestStatus};
use crate::binding::{BindingResolutionError, MockBindingInstanceResolver};
use crate::container::{DisposalError, MockScopedContainer, ResolutionError, TypeKey};
use crate::scenario::PendingStepSignal;
use crate::step::{MockStepContextManager, SharedStepContextManager, StepContext};
use crate::test_support::{ContainerBindingResolver, FactoryContainer};

/// Binding class with observable state, used to probe instance identity.
#[derive(Debug, Default)]
struct CounterBinding {
    count: std::sync::atomic::AtomicUsize,
}

impl CounterBinding {
    fn bump(&self) -> usize {
        self.count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1
    }
}

fn shared_resolver() -> Arc<ContainerBindingResolver> {
    Arc::new(ContainerBindingResolver::new())
}

fn sample_context() -> (FactoryContainer, ScenarioContext) {
    let container = FactoryContainer::new();
    let context = ScenarioContext::new(
        Box::new(container.clone()),
        ScenarioInfo::new("S1"),
        shared_resolver(),
    );
    (container, context)
}

#[rstest]
fn new_context_starts_clean() {
    let (_container, context) = sample_context();

    assert_eq!(context.scenario_info().title, "S1", "title mismatch");
    assert_eq!(
        context.current_block(),
        ScenarioBlock::None,
        "initial block should be None"
    );
    assert_eq!(
        context.test_status(),
        TestStatus::Ok,
        "initial status should be Ok"
    );
    assert!(context.test_error().is_none(), "no error expected at start");
    assert!(context.pending_steps().is_empty(), "pending list not empty");
    assert!(context.missing_steps().is_empty(), "missing list not empty");
}

#[rstest]
fn elapsed_never_decreases() {
    let (_container, context) = sample_context();

    let first = context.elapsed();
    let second = context.elapsed();
    assert!(second >= first, "elapsed time went backwards");
}

#[rstest]
fn current_block_tracks_step_phase() {
    let (_container, context) = sample_context();

    context.set_current_block(ScenarioBlock::Given);
    assert_eq!(context.current_block(), ScenarioBlock::Given);
    context.set_current_block(ScenarioBlock::Then);
    assert_eq!(context.current_block(), ScenarioBlock::Then);
}

#[rstest]
#[case::pending(TestStatus::StepDefinitionPending)]
#[case::undefined(TestStatus::UndefinedStep)]
#[case::binding(TestStatus::BindingError)]
#[case::test(TestStatus::TestError)]
fn status_never_resets_to_ok(#[case] failure: TestStatus) {
    let (_container, context) = sample_context();

    context.set_test_status(failure);
    context.set_test_status(TestStatus::Ok);
    assert_eq!(
        context.test_status(),
        failure,
        "failure status was downgraded to Ok"
    );
}

#[rstest]
fn status_may_escalate_between_failure_kinds() {
    let (_container, context) = sample_context();

    context.set_test_status(TestStatus::StepDefinitionPending);
    context.set_test_status(TestStatus::TestError);
    assert_eq!(context.test_status(), TestStatus::TestError);
}

#[rstest]
fn first_recorded_error_wins() {
    let (_container, context) = sample_context();

    context.record_test_error(Arc::new(DisposalError::new("first")));
    context.record_test_error(Arc::new(DisposalError::new("second")));

    let recorded = context.test_error().expect("an error should be recorded");
    assert_eq!(recorded.to_string(), "scoped container teardown failed: first");
}

#[rstest]
fn pending_signal_round_trip_through_executor() {
    let (_container, context) = sample_context();

    // Simulates the step executor invoking a not-yet-implemented step.
    let step_name = "the feature is ready";
    let outcome: Result<(), PendingStepSignal> = Err(context.pending());
    if outcome.is_err() {
        context.record_pending_step(step_name);
        context.set_test_status(TestStatus::StepDefinitionPending);
    }

    assert_eq!(
        context.pending_steps(),
        vec![step_name.to_owned()],
        "pending step was not recorded"
    );
    assert_eq!(context.test_status(), TestStatus::StepDefinitionPending);
}

#[rstest]
fn missing_steps_accumulate_in_order() {
    let (_container, context) = sample_context();

    context.record_missing_step(StepInstance::new(ScenarioBlock::Given, "Given", "one"));
    context.record_missing_step(StepInstance::new(ScenarioBlock::When, "When", "two"));

    let texts: Vec<String> = context
        .missing_steps()
        .into_iter()
        .map(|step| step.text)
        .collect();
    assert_eq!(texts, vec!["one".to_owned(), "two".to_owned()]);
}

#[rstest]
fn value_storage_is_last_write_wins() {
    let (_container, context) = sample_context();

    context.set_value("answer", 41_u32);
    context.set_value("answer", 42_u32);

    let stored = context.value::<u32>("answer").expect("value should exist");
    assert_eq!(*stored, 42, "last write did not win");
    assert!(context.value::<u32>("unset").is_none(), "unset key not None");
    assert!(context.remove_value("answer"), "remove should report presence");
    assert!(!context.contains_value("answer"), "key survived removal");
}

#[rstest]
fn value_storage_keys_are_case_sensitive() {
    let (_container, context) = sample_context();

    context.set_value("Key", 1_u32);
    assert!(context.value::<u32>("key").is_none(), "keys must differ by case");
}

#[rstest]
fn dispose_runs_container_teardown_exactly_once() {
    let mut container = MockScopedContainer::new();
    container.expect_dispose().times(1).returning(|| Ok(()));

    let context = ScenarioContext::new(
        Box::new(container),
        ScenarioInfo::new("S1"),
        shared_resolver(),
    );

    context.dispose().expect("first dispose should succeed");
    context.dispose().expect("second dispose should be a no-op");
    drop(context);
}

#[rstest]
fn dispose_surfaces_container_failure_once() {
    let mut container = MockScopedContainer::new();
    container
        .expect_dispose()
        .times(1)
        .returning(|| Err(DisposalError::new("teardown broke")));

    let context = ScenarioContext::new(
        Box::new(container),
        ScenarioInfo::new("S1"),
        shared_resolver(),
    );

    let first = context.dispose();
    assert_eq!(first, Err(DisposalError::new("teardown broke")));
    assert_eq!(context.dispose(), Ok(()), "retry must not re-trigger teardown");
}

#[rstest]
fn dispose_clears_scenario_values() {
    let (_container, context) = sample_context();

    context.set_value("key", 5_u32);
    context.dispose().expect("dispose should succeed");
    assert!(!context.contains_value("key"), "bag should be cleared");
}

#[rstest]
fn binding_instance_passes_through_resolver() {
    let mut resolver = MockBindingInstanceResolver::new();
    let expected_key = TypeKey::of::<CounterBinding>();
    resolver
        .expect_resolve_binding_instance()
        .times(1)
        .withf(move |binding_type, _scope| *binding_type == expected_key)
        .returning(|_, _| Ok(Arc::new(CounterBinding::default())));

    let mut container = MockScopedContainer::new();
    container.expect_dispose().returning(|| Ok(()));

    let context = ScenarioContext::new(
        Box::new(container),
        ScenarioInfo::new("S1"),
        Arc::new(resolver),
    );

    let instance = context
        .binding_instance_of::<CounterBinding>()
        .expect("resolution should succeed");
    assert_eq!(instance.bump(), 1);
}

#[rstest]
fn binding_resolution_errors_propagate_unchanged() {
    let mut resolver = MockBindingInstanceResolver::new();
    resolver.expect_resolve_binding_instance().returning(|_, _| {
        Err(BindingResolutionError::NoEligibleInstance {
            type_name: "CounterBinding".to_owned(),
        })
    });

    let mut container = MockScopedContainer::new();
    container.expect_dispose().returning(|| Ok(()));

    let context = ScenarioContext::new(
        Box::new(container),
        ScenarioInfo::new("S1"),
        Arc::new(resolver),
    );

    let result = context.binding_instance(TypeKey::of::<CounterBinding>());
    assert!(
        matches!(
            result,
            Err(BindingResolutionError::NoEligibleInstance { ref type_name })
                if type_name == "CounterBinding"
        ),
        "expected NoEligibleInstance, got {result:?}"
    );
}

#[rstest]
fn step_context_reads_through_registered_manager() {
    let step = StepInstance::new(ScenarioBlock::When, "When", "the user logs in");
    let mut manager = MockStepContextManager::new();
    let managed_step = step.clone();
    manager
        .expect_step_context()
        .returning(move || Some(StepContext::new(managed_step.clone())));

    let (container, context) = sample_context();
    container.register_instance::<SharedStepContextManager>(Arc::new(manager));

    let current = context
        .step_context()
        .expect("manager should resolve")
        .expect("a step should be active");
    assert_eq!(current.step(), &step);
}

#[rstest]
fn test_status_serialises_snake_case_for_reports() {
    let json =
        serde_json::to_string(&TestStatus::StepDefinitionPending).expect("status serialises");
    assert_eq!(json, "\"step_definition_pending\"");
}

#[rstest]
fn step_context_fails_without_registered_manager() {
    let (_container, context) = sample_context();

    let result = context.step_context();
    assert!(
        matches!(result, Err(ResolutionError::NotRegistered { .. })),
        "expected NotRegistered, got {result:?}"
    );
}
