//! In-memory collaborators for tests and downstream harnesses.
//!
//! Production hosts bring their own container engine and binding resolver;
//! these minimal implementations exist so the scenario context can be
//! exercised without one. [`FactoryContainer`] is a flat scoped-singleton
//! container and [`ContainerBindingResolver`] gives binding classes
//! scenario-scoped lifetime by resolving them through the scenario's own
//! container.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::binding::{BindingInstance, BindingInstanceResolver, BindingResolutionError};
use crate::container::{
    DisposalError, ResolutionError, ScopedContainer, SharedInstance, TypeKey,
};

type Factory = Box<dyn Fn() -> SharedInstance + Send + Sync>;

#[derive(Default)]
struct ContainerState {
    factories: Mutex<HashMap<TypeId, Factory>>,
    instances: Mutex<HashMap<TypeId, SharedInstance>>,
    disposed: AtomicBool,
    dispose_count: AtomicUsize,
}

/// Flat scoped container backed by registered factories.
///
/// Each type resolves to one shared instance per container, built lazily on
/// first resolution. Cloning the handle shares the underlying scope, which
/// lets a test keep a probe on a container it has handed to a context.
#[derive(Clone, Default)]
pub struct FactoryContainer {
    state: Arc<ContainerState>,
}

impl std::fmt::Debug for FactoryContainer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FactoryContainer")
            .field("disposed", &self.state.disposed)
            .finish_non_exhaustive()
    }
}

impl FactoryContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn factories(&self) -> MutexGuard<'_, HashMap<TypeId, Factory>> {
        self.state
            .factories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn instances(&self) -> MutexGuard<'_, HashMap<TypeId, SharedInstance>> {
        self.state
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a factory for `T`. Resolution builds one instance per
    /// container and reuses it afterwards.
    pub fn register<T, F>(&self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories()
            .insert(TypeId::of::<T>(), Box::new(move || Arc::new(factory())));
    }

    /// Registers an already-built instance of `T`.
    pub fn register_instance<T: Any + Send + Sync>(&self, value: T) {
        self.instances().insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// How many times teardown has actually run. Stays at one however often
    /// [`ScopedContainer::dispose`] is called.
    #[must_use]
    pub fn dispose_count(&self) -> usize {
        self.state.dispose_count.load(Ordering::SeqCst)
    }
}

impl ScopedContainer for FactoryContainer {
    fn resolve(&self, key: TypeKey) -> Result<SharedInstance, ResolutionError> {
        if self.state.disposed.load(Ordering::SeqCst) {
            return Err(ResolutionError::ContainerDisposed);
        }
        let mut instances = self.instances();
        if let Some(existing) = instances.get(&key.id()) {
            return Ok(Arc::clone(existing));
        }
        let built = self
            .factories()
            .get(&key.id())
            .map(|factory| factory())
            .ok_or_else(|| ResolutionError::NotRegistered {
                type_name: key.name().to_owned(),
            })?;
        instances.insert(key.id(), Arc::clone(&built));
        Ok(built)
    }

    fn dispose(&self) -> Result<(), DisposalError> {
        if self.state.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.state.dispose_count.fetch_add(1, Ordering::SeqCst);
        self.instances().clear();
        self.factories().clear();
        Ok(())
    }
}

/// Binding resolver that treats the scenario's container as the instance
/// source.
///
/// Caching is therefore the container's: within one scenario the same
/// instance handles every invocation, and two scenarios never share one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerBindingResolver;

impl ContainerBindingResolver {
    /// Creates the resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BindingInstanceResolver for ContainerBindingResolver {
    fn resolve_binding_instance(
        &self,
        binding_type: TypeKey,
        scope: &dyn ScopedContainer,
    ) -> Result<BindingInstance, BindingResolutionError> {
        scope.resolve(binding_type).map_err(|source| match source {
            ResolutionError::NotRegistered { type_name } => {
                BindingResolutionError::NoEligibleInstance { type_name }
            }
            other => BindingResolutionError::Resolution {
                type_name: binding_type.name().to_owned(),
                source: other,
            },
        })
    }
}
