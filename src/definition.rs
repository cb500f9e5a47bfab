//! Class definitions: the injectable surface of a type
//!
//! A [`ClassDefinition`] describes exactly one class. Definitions are built
//! once (by hand, from a manifest, or by `#[derive(Inject)]`) and composed
//! into a [`DefinitionStore`] that the resolver reads through the
//! [`Definition`] trait.

use crate::builder::InjectionMethod;
use crate::Value;
use ahash::AHashMap;

/// Reserved method name of the constructor
pub const CONSTRUCTOR: &str = "new";

/// A registered method and whether it must be called during construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: String,
    required: bool,
}

impl Method {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Descriptor of one method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    fq_name: String,
    name: String,
    declared_type: Option<String>,
    required: bool,
    default: Option<Value>,
}

impl Parameter {
    /// The definition-wide unique key, `class::method:name`
    #[inline]
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Type, required flag and default recorded for a parameter.
///
/// Parameters are optional and untyped unless stated otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterInfo {
    pub(crate) declared_type: Option<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
}

impl ParameterInfo {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Read access to class metadata.
///
/// Queries for a class the provider does not know return empty results.
pub trait Definition: Send + Sync {
    /// Known classes, sorted
    fn classes(&self) -> Vec<&str>;

    fn has_class(&self, class: &str) -> bool;

    fn class_supertypes(&self, class: &str) -> &[String];

    /// Path of an alternate construction function, when one is set
    fn instantiator(&self, class: &str) -> Option<&str>;

    fn methods(&self, class: &str) -> &[Method];

    fn has_method(&self, class: &str, method: &str) -> bool;

    /// Parameters of `method` in declaration order
    fn method_parameters(&self, class: &str, method: &str) -> &[Parameter];
}

/// Types that describe their own injectable surface at build time
pub trait Describe {
    fn definition() -> ClassDefinition;
}

// =============================================================================
// ClassDefinition
// =============================================================================

/// The injectable surface of a single class.
///
/// # Examples
///
/// ```rust
/// use dependency_compiler::{ClassDefinition, Definition, ParameterInfo, CONSTRUCTOR};
///
/// let mut definition = ClassDefinition::new("app::Mailer");
/// definition
///     .set_supertypes(["app::Transport"])
///     .add_method_parameter(CONSTRUCTOR, "host", ParameterInfo::new().required())
///     .add_method_parameter(CONSTRUCTOR, "port", ParameterInfo::new().with_default(25));
///
/// let params = definition.method_parameters("app::Mailer", CONSTRUCTOR);
/// assert_eq!(params.len(), 2);
/// assert_eq!(params[0].fq_name(), "app::Mailer::new:host");
/// assert!(definition.methods("app::Other").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    class: String,
    supertypes: Vec<String>,
    instantiator: Option<String>,
    methods: Vec<Method>,
    parameters: AHashMap<String, Vec<Parameter>>,
}

impl ClassDefinition {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            supertypes: Vec::new(),
            instantiator: None,
            methods: Vec::new(),
            parameters: AHashMap::new(),
        }
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn set_instantiator(&mut self, instantiator: impl Into<String>) -> &mut Self {
        self.instantiator = Some(instantiator.into());
        self
    }

    pub fn set_supertypes<I, S>(&mut self, supertypes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes = supertypes.into_iter().map(Into::into).collect();
        self
    }

    /// Register a method. `None` means required only for the constructor.
    pub fn add_method(&mut self, method: &str, required: Option<bool>) -> &mut Self {
        let required = required.unwrap_or(method == CONSTRUCTOR);
        match self.methods.iter_mut().find(|m| m.name == method) {
            Some(existing) => existing.required = required,
            None => self.methods.push(Method {
                name: method.to_owned(),
                required,
            }),
        }
        self
    }

    /// Record a parameter, registering the method first if it is unknown.
    ///
    /// A parameter with an existing fully qualified key is replaced in place.
    pub fn add_method_parameter(
        &mut self,
        method: &str,
        name: &str,
        info: ParameterInfo,
    ) -> &mut Self {
        if !self.methods.iter().any(|m| m.name == method) {
            self.add_method(method, None);
        }

        let parameter = Parameter {
            fq_name: format!("{}::{}:{}", self.class, method, name),
            name: name.to_owned(),
            declared_type: info.declared_type,
            required: info.required,
            default: info.default,
        };

        let parameters = self.parameters.entry(method.to_owned()).or_default();
        match parameters.iter_mut().find(|p| p.fq_name == parameter.fq_name) {
            Some(slot) => *slot = parameter,
            None => parameters.push(parameter),
        }
        self
    }

    /// Consume a method builder. An unnamed builder describes the constructor.
    pub fn add_injection_method(&mut self, method: InjectionMethod) -> &mut Self {
        let (name, parameters) = method.into_parts();
        let name = name.unwrap_or_else(|| CONSTRUCTOR.to_owned());

        self.add_method(&name, None);
        for (parameter, info) in parameters {
            self.add_method_parameter(&name, &parameter, info);
        }
        self
    }

    #[inline]
    fn owns(&self, class: &str) -> bool {
        self.class == class
    }
}

impl Definition for ClassDefinition {
    fn classes(&self) -> Vec<&str> {
        vec![self.class.as_str()]
    }

    fn has_class(&self, class: &str) -> bool {
        self.owns(class)
    }

    fn class_supertypes(&self, class: &str) -> &[String] {
        if self.owns(class) {
            self.supertypes.as_slice()
        } else {
            &[]
        }
    }

    fn instantiator(&self, class: &str) -> Option<&str> {
        self.instantiator.as_deref().filter(|_| self.owns(class))
    }

    fn methods(&self, class: &str) -> &[Method] {
        if self.owns(class) {
            self.methods.as_slice()
        } else {
            &[]
        }
    }

    fn has_method(&self, class: &str, method: &str) -> bool {
        self.owns(class) && self.methods.iter().any(|m| m.name == method)
    }

    fn method_parameters(&self, class: &str, method: &str) -> &[Parameter] {
        if !self.owns(class) {
            return &[];
        }
        self.parameters.get(method).map(Vec::as_slice).unwrap_or(&[])
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Multi-class definition provider composed from single-class definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionStore {
    definitions: AHashMap<String, ClassDefinition>,
}

impl DefinitionStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, replacing any previous one for the same class
    pub fn add(&mut self, definition: ClassDefinition) -> &mut Self {
        self.definitions
            .insert(definition.class().to_owned(), definition);
        self
    }

    /// Add the build-time definition of `T`
    pub fn describe<T: Describe>(&mut self) -> &mut Self {
        self.add(T::definition())
    }

    pub fn get(&self, class: &str) -> Option<&ClassDefinition> {
        self.definitions.get(class)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<ClassDefinition> for DefinitionStore {
    fn from_iter<I: IntoIterator<Item = ClassDefinition>>(iter: I) -> Self {
        let mut store = Self::new();
        for definition in iter {
            store.add(definition);
        }
        store
    }
}

impl Definition for DefinitionStore {
    fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }

    fn has_class(&self, class: &str) -> bool {
        self.definitions.contains_key(class)
    }

    fn class_supertypes(&self, class: &str) -> &[String] {
        self.get(class)
            .map(|d| d.class_supertypes(class))
            .unwrap_or(&[])
    }

    fn instantiator(&self, class: &str) -> Option<&str> {
        self.get(class).and_then(|d| d.instantiator(class))
    }

    fn methods(&self, class: &str) -> &[Method] {
        self.get(class).map(|d| d.methods(class)).unwrap_or(&[])
    }

    fn has_method(&self, class: &str, method: &str) -> bool {
        self.get(class).is_some_and(|d| d.has_method(class, method))
    }

    fn method_parameters(&self, class: &str, method: &str) -> &[Parameter] {
        self.get(class)
            .map(|d| d.method_parameters(class, method))
            .unwrap_or(&[])
    }
}
