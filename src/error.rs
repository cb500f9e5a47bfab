//! Error types for planning, materialization and code generation

use thiserror::Error;

/// Errors that can occur while resolving, instantiating or generating factories
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiError {
    /// Service was not found in the container
    #[error("Service not found: {id}")]
    NotFound { id: String },

    /// No viable injection exists for a required parameter
    #[error("Unable to resolve {class}: {reason}")]
    UnresolvableDependency { class: String, reason: String },

    /// A type is reachable from itself through declared-type edges
    #[error("Circular dependency detected while resolving {type_name}: {}", .chain.join(" -> "))]
    CircularDependency {
        type_name: String,
        chain: Vec<String>,
    },

    /// An alias chain never reaches a concrete identifier
    #[error("Alias cycle detected for {alias}: {}", .chain.join(" -> "))]
    AliasCycle { alias: String, chain: Vec<String> },

    /// A literal cannot be rendered as source text
    #[error("Value cannot be exported: {reason}")]
    UnexportableValue { reason: String },

    /// Generation requested without a configured output sink
    #[error("No output location configured for generated factories")]
    NoOutputLocation,

    /// A value does not convert into the argument type a constructor expects
    #[error("Invalid argument `{parameter}`: expected {expected}, found {found}")]
    InvalidArgument {
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Constructor failed to create the instance
    #[error("Failed to create {type_name}: {reason}")]
    CreationFailed { type_name: String, reason: String },

    /// Output sink rejected a generated file
    #[error("Failed to write {path}: {reason}")]
    Output { path: String, reason: String },

    /// Two classes map onto the same generated factory name or file
    #[error("Factory {factory} for {class} collides with the one generated for {existing}")]
    FactoryCollision {
        factory: String,
        class: String,
        existing: String,
    },
}

impl DiError {
    /// Create a NotFound error for an identifier
    #[inline]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an UnresolvableDependency error
    #[inline]
    pub fn unresolvable(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableDependency {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Create a CircularDependency error from the resolution chain
    #[inline]
    pub fn circular(type_name: impl Into<String>, chain: Vec<String>) -> Self {
        Self::CircularDependency {
            type_name: type_name.into(),
            chain,
        }
    }

    /// Create an UnexportableValue error
    #[inline]
    pub fn unexportable(reason: impl Into<String>) -> Self {
        Self::UnexportableValue {
            reason: reason.into(),
        }
    }

    /// Create a FactoryCollision error
    #[inline]
    pub fn factory_collision(
        factory: impl Into<String>,
        class: impl Into<String>,
        existing: impl Into<String>,
    ) -> Self {
        Self::FactoryCollision {
            factory: factory.into(),
            class: class.into(),
            existing: existing.into(),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
