//! Constructor-injection planning
//!
//! [`DependencyResolver`] turns a class identifier into the ordered list of
//! [`Injection`]s that satisfies its constructor. Planning only reads the
//! [`Definition`] and [`Config`]; no container is involved until the plan is
//! materialized.
//!
//! # Example
//!
//! ```rust
//! use dependency_compiler::{
//!     ClassDefinition, Config, DefinitionStore, DependencyResolver, Injection, ParameterInfo,
//!     CONSTRUCTOR,
//! };
//!
//! let mut mailer = ClassDefinition::new("app::Mailer");
//! mailer
//!     .add_method_parameter(CONSTRUCTOR, "transport", ParameterInfo::new().with_type("app::Transport").required())
//!     .add_method_parameter(CONSTRUCTOR, "port", ParameterInfo::new().with_default(25));
//!
//! let mut tcp = ClassDefinition::new("app::TcpTransport");
//! tcp.set_supertypes(["app::Transport"]);
//!
//! let store: DefinitionStore = [mailer, tcp].into_iter().collect();
//! let config = Config::builder().prefer("app::Transport", "app::TcpTransport").build();
//! let resolver = DependencyResolver::new(store, config);
//!
//! let plan = resolver.resolve_parameters("app::Mailer").unwrap();
//! assert_eq!(plan[0], Injection::type_of("transport", "app::TcpTransport"));
//! assert_eq!(plan[1], Injection::value("port", 25));
//! ```

use crate::definition::{Parameter, CONSTRUCTOR};
use crate::{Config, Definition, DiError, Injection, Override, Result, Value};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Classes currently being planned, outermost first
#[derive(Debug, Default)]
struct ResolutionStack {
    classes: Vec<String>,
}

impl ResolutionStack {
    #[inline]
    fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The current chain closed by `class`
    fn chain_to(&self, class: &str) -> Vec<String> {
        let mut chain = self.classes.clone();
        chain.push(class.to_owned());
        chain
    }

    fn enter(&mut self, class: &str) -> Result<()> {
        if self.contains(class) {
            return Err(DiError::circular(class, self.chain_to(class)));
        }
        self.classes.push(class.to_owned());
        Ok(())
    }

    #[inline]
    fn exit(&mut self) {
        self.classes.pop();
    }

    /// The chain closed by following `edge` from the top of the stack
    fn chain_through(&self, edge: &TypeEdge) -> Vec<String> {
        let mut chain = self.classes.clone();
        chain.extend(edge.path.iter().cloned());
        chain.push(edge.target.clone());
        chain
    }
}

/// A typed parameter reachable from a planned class.
///
/// `path` runs from the planned class down to the class declaring the
/// parameter, through required typed parameters only.
#[derive(Debug, Clone)]
struct TypeEdge {
    target: String,
    path: Vec<String>,
}

impl TypeEdge {
    fn under(&self, class: &str) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.push(class.to_owned());
        path.extend(self.path.iter().cloned());
        Self {
            target: self.target.clone(),
            path,
        }
    }
}

/// Keeps the first edge per target, in planning order
fn record_edge(edges: &mut Vec<TypeEdge>, edge: TypeEdge) {
    if !edges.iter().any(|existing| existing.target == edge.target) {
        edges.push(edge);
    }
}

/// A memoized plan with every typed parameter its planning checked.
///
/// A cache hit replays those checks against the caller's stack, so a plan
/// read from the memo fails exactly when planning it afresh would.
#[derive(Debug, Clone)]
struct Plan {
    injections: Arc<[Injection]>,
    edges: Arc<[TypeEdge]>,
}

/// Plans constructor injections and memoizes them per concrete class.
pub struct DependencyResolver {
    definition: Arc<dyn Definition>,
    config: Config,
    cache: DashMap<String, Plan, RandomState>,
}

impl DependencyResolver {
    pub fn new(definition: impl Definition + 'static, config: Config) -> Self {
        Self::from_shared(Arc::new(definition), config)
    }

    /// Create a resolver over a definition that is shared elsewhere
    pub fn from_shared(definition: Arc<dyn Definition>, config: Config) -> Self {
        Self {
            definition,
            config,
            cache: DashMap::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn definition(&self) -> &dyn Definition {
        self.definition.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the config. Memoized plans are discarded.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.clear_cache();
    }

    /// Replace the definition provider. Memoized plans are discarded.
    pub fn set_definition(&mut self, definition: impl Definition + 'static) {
        self.definition = Arc::new(definition);
        self.clear_cache();
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Whether a plan for the concrete `class` is memoized
    #[inline]
    pub fn is_cached(&self, class: &str) -> bool {
        self.cache.contains_key(class)
    }

    /// Follow aliases from `type_name` to its concrete identifier.
    #[inline]
    pub fn resolve_class_name(&self, type_name: &str) -> Result<String> {
        self.config.class_for_alias(type_name)
    }

    /// The preferred implementation of `type_name` when requested by
    /// `context`, if one is configured and actually is a `type_name`.
    pub fn resolve_preference(&self, type_name: &str, context: Option<&str>) -> Result<Option<String>> {
        let Some(preferred) = self.config.type_preference(type_name, context) else {
            return Ok(None);
        };

        if self.is_type_of(preferred, type_name)? {
            return Ok(Some(preferred.to_owned()));
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "dependency_compiler",
            requested = type_name,
            preferred,
            "Preference ignored: preferred type does not implement the requested type"
        );

        Ok(None)
    }

    fn is_type_of(&self, candidate: &str, type_name: &str) -> Result<bool> {
        let concrete = self.resolve_class_name(candidate)?;
        Ok(concrete == type_name
            || self
                .definition
                .class_supertypes(&concrete)
                .iter()
                .any(|supertype| supertype == type_name))
    }

    /// Plan the constructor of `type_name`.
    ///
    /// The returned list has one injection per constructor parameter, in
    /// declaration order. Failures leave the memo untouched.
    pub fn resolve_parameters(&self, type_name: &str) -> Result<Arc<[Injection]>> {
        let mut stack = ResolutionStack::default();
        self.resolve_inner(type_name, &mut stack).map(|plan| plan.injections)
    }

    fn resolve_inner(&self, type_name: &str, stack: &mut ResolutionStack) -> Result<Plan> {
        let class = self.resolve_class_name(type_name)?;

        if let Some(cached) = self.cache.get(&class) {
            let plan = cached.value().clone();
            drop(cached);

            if let Some(edge) = plan.edges.iter().find(|edge| stack.contains(&edge.target)) {
                return Err(DiError::circular(edge.target.as_str(), stack.chain_through(edge)));
            }

            #[cfg(feature = "logging")]
            trace!(target: "dependency_compiler", class = %class, "Resolved parameters from cache");

            return Ok(plan);
        }

        if !self.definition.has_class(&class) {
            return Err(DiError::unresolvable(class, "no definition is registered for the class"));
        }

        stack.enter(&class)?;
        let planned = self.plan_constructor(&class, stack);
        stack.exit();

        let (injections, edges) = planned?;
        let plan = Plan {
            injections: injections.into(),
            edges: edges.into(),
        };

        #[cfg(feature = "logging")]
        debug!(
            target: "dependency_compiler",
            class = %class,
            parameters = plan.injections.len(),
            "Resolved constructor parameters"
        );

        self.cache.insert(class, plan.clone());
        Ok(plan)
    }

    fn plan_constructor(
        &self,
        class: &str,
        stack: &mut ResolutionStack,
    ) -> Result<(Vec<Injection>, Vec<TypeEdge>)> {
        let parameters = self.definition.method_parameters(class, CONSTRUCTOR);
        let mut injections = Vec::with_capacity(parameters.len());
        let mut edges = Vec::new();

        for parameter in parameters {
            injections.push(self.plan_parameter(class, parameter, stack, &mut edges)?);
        }
        Ok((injections, edges))
    }

    fn plan_parameter(
        &self,
        class: &str,
        parameter: &Parameter,
        stack: &mut ResolutionStack,
        edges: &mut Vec<TypeEdge>,
    ) -> Result<Injection> {
        let name = parameter.name();

        let effective_type = match self.config.parameter_override(class, name) {
            Some(Override::Value(value)) => return Ok(Injection::value(name, value.clone())),
            Some(Override::Type(bound)) => Some(bound.clone()),
            None => match parameter.declared_type() {
                Some(declared) => Some(
                    self.resolve_preference(declared, Some(class))?
                        .unwrap_or_else(|| declared.to_owned()),
                ),
                None => None,
            },
        };

        if let Some(effective_type) = effective_type {
            let concrete = self.resolve_class_name(&effective_type)?;
            if stack.contains(&concrete) {
                return Err(DiError::circular(concrete.as_str(), stack.chain_to(&concrete)));
            }

            if self.definition.has_class(&concrete) {
                record_edge(
                    edges,
                    TypeEdge {
                        target: concrete.clone(),
                        path: vec![class.to_owned()],
                    },
                );

                // Optional dependencies are checked against the stack but not planned
                if parameter.is_required() {
                    let dependency = self.resolve_inner(&concrete, stack)?;
                    for edge in dependency.edges.iter() {
                        record_edge(edges, edge.under(class));
                    }
                }
                return Ok(Injection::type_of(name, concrete));
            }
        }

        if let Some(default) = parameter.default() {
            return Ok(Injection::value(name, default.clone()));
        }

        if !parameter.is_required() {
            return Ok(Injection::value(name, Value::Null));
        }

        Err(DiError::unresolvable(
            class,
            format!("required parameter `{name}` has no injectable value"),
        ))
    }
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("classes", &self.definition.classes())
            .field("cached", &self.cache.len())
            .finish()
    }
}
