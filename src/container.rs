//! Container handle used at materialization time
//!
//! The resolver never touches a container. [`ServiceLocator`] is what
//! injections, the [`Injector`](crate::Injector) and generated factories call
//! to fetch type dependencies; [`Container`] is a small in-memory
//! implementation keyed by identifier.

use crate::{DiError, Injectable, Instance, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Fetches instances by identifier.
pub trait ServiceLocator: Send + Sync {
    /// Fetch the instance registered under `id`, failing with `NotFound`
    fn get(&self, id: &str) -> Result<Instance>;

    /// Whether an instance is registered under `id`
    fn has(&self, id: &str) -> bool;
}

/// In-memory service locator holding one shared instance per identifier.
///
/// # Examples
///
/// ```rust
/// use dependency_compiler::{Container, ServiceLocator};
///
/// struct Database { url: String }
///
/// let container = Container::new();
/// container.singleton(Database { url: "postgres://localhost".into() });
///
/// let db = container.get_as::<Database>().unwrap();
/// assert_eq!(db.url, "postgres://localhost");
/// assert!(container.has(std::any::type_name::<Database>()));
/// ```
#[derive(Clone, Default)]
pub struct Container {
    services: Arc<DashMap<String, Instance, RandomState>>,
}

impl Container {
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "dependency_compiler", "Creating new container");

        Self::default()
    }

    /// Register a singleton under the type's own name
    #[inline]
    pub fn singleton<T: Injectable>(&self, instance: T) {
        self.singleton_as(T::identifier(), instance);
    }

    /// Register a singleton under an explicit identifier
    pub fn singleton_as<T: Injectable>(&self, id: impl Into<String>, instance: T) {
        self.instance(id, Arc::new(instance));
    }

    /// Register an already erased instance
    pub fn instance(&self, id: impl Into<String>, instance: Instance) {
        let id = id.into();

        #[cfg(feature = "logging")]
        debug!(target: "dependency_compiler", service = %id, "Registering service");

        self.services.insert(id, instance);
    }

    /// Fetch and downcast a service registered under the type's own name
    pub fn get_as<T: Injectable>(&self) -> Result<Arc<T>> {
        let id = T::identifier();
        self.get(id)?.downcast::<T>().map_err(|_| {
            DiError::creation_failed(id, "registered instance has a different type")
        })
    }

    pub fn remove(&self, id: &str) -> bool {
        self.services.remove(id).is_some()
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.services.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceLocator for Container {
    fn get(&self, id: &str) -> Result<Instance> {
        match self.services.get(id) {
            Some(instance) => {
                #[cfg(feature = "logging")]
                trace!(target: "dependency_compiler", service = id, "Service fetched");

                Ok(Arc::clone(instance.value()))
            }
            None => {
                #[cfg(feature = "logging")]
                debug!(target: "dependency_compiler", service = id, "Service not found");

                Err(DiError::not_found(id))
            }
        }
    }

    #[inline]
    fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestService {
        value: String,
    }

    #[test]
    fn test_singleton() {
        let container = Container::new();
        container.singleton(TestService {
            value: "test".into(),
        });

        let s1 = container.get_as::<TestService>().unwrap();
        let s2 = container.get_as::<TestService>().unwrap();

        assert_eq!(s1.value, "test");
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_reregistering_replaces() {
        let container = Container::new();
        container.singleton_as("app::Service", TestService { value: "old".into() });
        let old = container.get("app::Service").unwrap();
        container.singleton_as("app::Service", TestService { value: "new".into() });

        let fetched = container.get("app::Service").unwrap();
        assert!(!Arc::ptr_eq(&old, &fetched));
        assert_eq!(fetched.downcast::<TestService>().unwrap().value, "new");
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_not_found() {
        let container = Container::new();
        assert_eq!(
            container.get("app::Missing").unwrap_err(),
            DiError::not_found("app::Missing")
        );
        assert!(!container.has("app::Missing"));
    }

    #[test]
    fn test_explicit_ids() {
        let container = Container::new();
        container.singleton_as("db.primary", TestService { value: "a".into() });
        container.instance("db.replica", Arc::new(TestService { value: "b".into() }));

        assert_eq!(container.ids(), vec!["db.primary".to_owned(), "db.replica".to_owned()]);
        assert!(container.remove("db.primary"));
        assert_eq!(container.len(), 1);
    }
}
