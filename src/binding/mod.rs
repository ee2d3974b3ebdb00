//! Binding instance resolution seam.
//!
//! A binding class groups step-handling and lifecycle-hook methods. Which
//! instance handles an invocation is decided by a resolver supplied by the
//! host runner; the scenario context only guarantees that every resolution
//! within one scenario uses the same scoped container.

use thiserror::Error;

use crate::container::{ResolutionError, ScopedContainer, SharedInstance, TypeKey};

/// A resolved binding-class instance, shared for the scenario's lifetime.
pub type BindingInstance = SharedInstance;

/// Errors surfaced while resolving a binding-class instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingResolutionError {
    /// No eligible instance or constructor exists for the binding type.
    #[error("no eligible binding instance for {type_name}")]
    NoEligibleInstance {
        /// Name of the binding type that was requested.
        type_name: String,
    },

    /// The underlying scoped container rejected the resolution.
    #[error("binding resolution failed for {type_name}")]
    Resolution {
        /// Name of the binding type that was requested.
        type_name: String,
        /// Container failure that caused this error.
        #[source]
        source: ResolutionError,
    },
}

/// Resolves binding-class instances within a given scope.
///
/// Any caching (for example, one instance per scenario) is the resolver's or
/// the container's responsibility, never the scenario context's.
#[cfg_attr(test, mockall::automock)]
pub trait BindingInstanceResolver: Send + Sync {
    /// Returns the instance that should handle invocations of methods on the
    /// binding class identified by `binding_type`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingResolutionError`] when no eligible instance can be
    /// created or the scope rejects the resolution.
    fn resolve_binding_instance(
        &self,
        binding_type: TypeKey,
        scope: &dyn ScopedContainer,
    ) -> Result<BindingInstance, BindingResolutionError>;
}
