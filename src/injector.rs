//! Direct instantiation from a resolved plan
//!
//! The [`Injector`] is the runtime counterpart of generated factories: it
//! walks the same plan, materializes each injection against a container and
//! calls the constructor registered for the class.

use crate::{
    Arguments, DependencyResolver, DiError, Injectable, Instance, Options, Result, ServiceLocator,
};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Types that can be built from named constructor arguments.
///
/// Generated factories call `<T as Constructible>::construct` unless the class
/// definition names an instantiator.
pub trait Constructible: Injectable + Sized {
    fn construct(arguments: Arguments) -> Result<Self>;
}

/// Type-erased constructor
pub type Constructor = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;

/// Builds instances by executing resolved plans.
///
/// # Examples
///
/// ```rust
/// use dependency_compiler::{
///     Arguments, ClassDefinition, Constructible, Container, DefinitionStore, DependencyResolver,
///     Injector, Options, ParameterInfo, Result, CONSTRUCTOR,
/// };
/// use std::sync::Arc;
///
/// struct Server { port: u16 }
///
/// impl Constructible for Server {
///     fn construct(mut arguments: Arguments) -> Result<Self> {
///         Ok(Self { port: arguments.take("port")? })
///     }
/// }
///
/// let mut definition = ClassDefinition::new(std::any::type_name::<Server>());
/// definition.add_method_parameter(CONSTRUCTOR, "port", ParameterInfo::new().with_default(80));
///
/// let resolver = DependencyResolver::new(DefinitionStore::from_iter([definition]), Default::default());
/// let injector = Injector::new(Arc::new(resolver));
/// injector.register::<Server>();
///
/// let server = injector.create_as::<Server>(&Container::new(), &Options::default()).unwrap();
/// assert_eq!(server.port, 80);
/// ```
pub struct Injector {
    resolver: Arc<DependencyResolver>,
    constructors: DashMap<String, Constructor, RandomState>,
}

impl Injector {
    pub fn new(resolver: Arc<DependencyResolver>) -> Self {
        Self {
            resolver,
            constructors: DashMap::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    /// Register `T::construct` under the type's own name
    pub fn register<T: Constructible>(&self) {
        self.register_constructor(T::identifier(), |arguments| {
            T::construct(arguments).map(|instance| Arc::new(instance) as Instance)
        });
    }

    /// Register a constructor for an explicit class identifier
    pub fn register_constructor<F>(&self, class: impl Into<String>, constructor: F)
    where
        F: Fn(Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        let class = class.into();

        #[cfg(feature = "logging")]
        debug!(target: "dependency_compiler", class = %class, "Registering constructor");

        self.constructors.insert(class, Arc::new(constructor));
    }

    #[inline]
    pub fn has_constructor(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Collect the constructor arguments for `type_name`.
    ///
    /// A flat option with the parameter's name replaces the planned injection.
    pub fn arguments(
        &self,
        container: &dyn ServiceLocator,
        type_name: &str,
        options: &Options,
    ) -> Result<Arguments> {
        let plan = self.resolver.resolve_parameters(type_name)?;

        let mut arguments = Arguments::new();
        for injection in plan.iter() {
            let name = injection.parameter_name();
            let value = match options.get(name) {
                Some(value) => value.clone(),
                None => injection.to_value(container)?,
            };
            arguments.push(name, value);
        }
        Ok(arguments)
    }

    /// Build an instance of `type_name`
    pub fn create(
        &self,
        container: &dyn ServiceLocator,
        type_name: &str,
        options: &Options,
    ) -> Result<Instance> {
        let class = self.resolver.resolve_class_name(type_name)?;
        let constructor = self
            .constructors
            .get(&class)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DiError::creation_failed(class.as_str(), "no constructor registered"))?;

        let arguments = self.arguments(container, &class, options)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "dependency_compiler",
            class = %class,
            arguments = arguments.len(),
            "Creating instance"
        );

        constructor(arguments)
    }

    /// Build an instance of `T` and downcast it
    pub fn create_as<T: Injectable>(
        &self,
        container: &dyn ServiceLocator,
        options: &Options,
    ) -> Result<Arc<T>> {
        let id = T::identifier();
        self.create(container, id, options)?
            .downcast::<T>()
            .map_err(|_| DiError::creation_failed(id, "constructor produced a different type"))
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("resolver", &self.resolver)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}
