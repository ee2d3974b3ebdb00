//! Scoped container seam used to give objects scenario-scoped lifetimes.
//!
//! The container engine itself lives outside this crate; the scenario context
//! only needs two capabilities from it: resolving a shared instance by type
//! and tearing the scope down. The trait-based design enables mocking in
//! tests while production hosts plug in their own hierarchical container.

use std::any::{Any, TypeId};
use std::sync::Arc;

use thiserror::Error;

/// A shared instance handed out by a scoped container.
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Identifies a resolvable type, carrying its name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Builds the key for a concrete type.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type identity used for lookups.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name for error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Errors surfaced while resolving an instance from a scoped container.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No registration exists for the requested type.
    #[error("no registration for type {type_name}")]
    NotRegistered {
        /// Name of the type that was requested.
        type_name: String,
    },

    /// More than one registration matched the requested type.
    #[error("ambiguous registrations for type {type_name}")]
    Ambiguous {
        /// Name of the type that was requested.
        type_name: String,
    },

    /// The stored instance does not have the requested concrete type.
    #[error("stored instance is not of type {type_name}")]
    TypeMismatch {
        /// Name of the type the caller asked for.
        type_name: String,
    },

    /// The scope was already torn down.
    #[error("scoped container has been disposed")]
    ContainerDisposed,
}

/// Error surfaced when a scoped container fails to tear down.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("scoped container teardown failed: {message}")]
pub struct DisposalError {
    /// Detail reported by the container during teardown.
    pub message: String,
}

impl DisposalError {
    /// Creates a disposal error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A scope-bound instance container.
///
/// One container instance backs exactly one scenario; every resolution within
/// a scenario goes through the same container, which is what gives resolved
/// objects scenario-scoped lifetime.
#[cfg_attr(test, mockall::automock)]
pub trait ScopedContainer: Send + Sync {
    /// Resolves the shared instance registered for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] when the type is unregistered, matches
    /// ambiguously, or the scope has been disposed.
    fn resolve(&self, key: TypeKey) -> Result<SharedInstance, ResolutionError>;

    /// Tears the scope down, releasing owned instances.
    ///
    /// Implementations must be idempotent; callers may invoke this both
    /// directly and through a wrapping context manager.
    ///
    /// # Errors
    ///
    /// Returns a [`DisposalError`] when teardown fails.
    fn dispose(&self) -> Result<(), DisposalError>;
}

/// Typed resolution helper layered over the untyped [`ScopedContainer`] seam.
pub trait ScopedContainerExt {
    /// Resolves an instance of `T` and downcasts it.
    ///
    /// # Errors
    ///
    /// Propagates the container's [`ResolutionError`] unchanged, or returns
    /// [`ResolutionError::TypeMismatch`] when the stored instance is not a
    /// `T`.
    fn resolve_of<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ResolutionError>;
}

impl<C: ScopedContainer + ?Sized> ScopedContainerExt for C {
    fn resolve_of<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ResolutionError> {
        let key = TypeKey::of::<T>();
        let instance = self.resolve(key)?;
        instance
            .downcast::<T>()
            .map_err(|_| ResolutionError::TypeMismatch {
                type_name: key.name().to_owned(),
            })
    }
}
