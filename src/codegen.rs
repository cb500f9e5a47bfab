//! Ahead-of-time factory generation
//!
//! [`FactoryGenerator`] renders one Rust source file per class from its
//! resolved plan. Each file holds a unit struct implementing
//! [`CompiledFactory`](crate::CompiledFactory) with two initialization paths:
//! a fast path for calls without options and an override path that consults
//! the options map parameter by parameter.
//!
//! Names and paths are pure functions of the class identifier, and the same
//! inputs always render byte-identical output.
//!
//! # Example
//!
//! ```rust
//! use dependency_compiler::{
//!     ClassDefinition, Config, DefinitionStore, DependencyResolver, FactoryGenerator, MemorySink,
//!     ParameterInfo, CONSTRUCTOR,
//! };
//! use std::sync::Arc;
//!
//! let mut user = ClassDefinition::new("app::models::User");
//! user.add_method_parameter(CONSTRUCTOR, "name", ParameterInfo::new().with_default("guest"));
//!
//! let resolver = DependencyResolver::new(DefinitionStore::from_iter([user]), Config::default());
//! let sink = Arc::new(MemorySink::new());
//! let generator = FactoryGenerator::new(Arc::new(resolver)).with_sink(sink.clone());
//!
//! let factory = generator.generate("app::models::User").unwrap();
//! assert_eq!(factory, "generated::app_models_UserFactory");
//! assert!(sink.get("app/models/UserFactory.rs").is_some());
//! ```

use crate::{DependencyResolver, DiError, Injection, OutputSink, Result};
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Module path generated factories are placed under by default
pub const DEFAULT_NAMESPACE: &str = "generated";

/// Path generated code uses to reach this crate by default
pub const DEFAULT_RUNTIME_PATH: &str = "::dependency_compiler";

/// File name of the generated module index
pub const INDEX_FILE: &str = "mod.rs";

static IDENTIFIER_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex"));

static PATH_SEGMENT_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\\]+").expect("Invalid regex"));

// =============================================================================
// Names
// =============================================================================

fn trim_separators(class: &str) -> &str {
    class.trim_start_matches(['\\', ':'])
}

/// Collapse runs of non-alphanumerics into `_`, keeping the result a valid
/// identifier
fn sanitize_identifier(raw: &str) -> String {
    let sanitized = IDENTIFIER_RUNS.replace_all(raw, "_");
    if sanitized.is_empty() || sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized.into_owned()
    }
}

/// Struct name of the factory for `class`.
///
/// ```rust
/// use dependency_compiler::build_class_name;
///
/// assert_eq!(build_class_name("App\\Models\\User"), "App_Models_UserFactory");
/// assert_eq!(build_class_name("app::models::User"), "app_models_UserFactory");
/// ```
pub fn build_class_name(class: &str) -> String {
    format!("{}Factory", sanitize_identifier(trim_separators(class)))
}

/// Relative file path of the factory for `class`.
///
/// `::` and `\` separate segments, and each segment becomes a directory.
///
/// ```rust
/// use dependency_compiler::build_file_name;
///
/// assert_eq!(build_file_name("App\\Models\\User"), "App/Models/UserFactory.rs");
/// assert_eq!(build_file_name("app::models::User"), "app/models/UserFactory.rs");
/// ```
pub fn build_file_name(class: &str) -> String {
    let normalized = trim_separators(class).replace("::", "\\");
    let sanitized = PATH_SEGMENT_RUNS.replace_all(&normalized, "_");
    let segments: Vec<&str> = sanitized.split('\\').filter(|s| !s.is_empty()).collect();
    format!("{}Factory.rs", segments.join("/"))
}

/// Rust path of `class`, which must name a type implementing `Constructible`
fn rust_path(class: &str) -> String {
    trim_separators(class).replace('\\', "::")
}

/// Index module declaring the factory file, named after the file itself.
///
/// Factory names are unique within a generator and never end in `_rs`, so
/// module names neither collide with each other nor with a factory struct.
fn module_name(factory_name: &str) -> String {
    format!("{factory_name}_rs")
}

// =============================================================================
// Generator
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassmapEntry {
    class: String,
    path: String,
}

/// Outcome of [`FactoryGenerator::generate_all`]
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Factory identifiers, in request order
    pub generated: Vec<String>,
    /// Requested types whose generation failed
    pub failed: Vec<(String, DiError)>,
}

impl GenerationReport {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders and writes compiled factories.
pub struct FactoryGenerator {
    resolver: Arc<DependencyResolver>,
    sink: Option<Arc<dyn OutputSink>>,
    namespace: String,
    runtime_path: String,
    classmap: DashMap<String, ClassmapEntry, RandomState>,
}

impl FactoryGenerator {
    pub fn new(resolver: Arc<DependencyResolver>) -> Self {
        Self {
            resolver,
            sink: None,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_owned(),
            classmap: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Write generated files to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Module path the generated factories live under
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Path generated code uses to import the runtime, `::dependency_compiler`
    /// unless the crate is renamed
    pub fn with_runtime_path(mut self, runtime_path: impl Into<String>) -> Self {
        self.runtime_path = runtime_path.into();
        self
    }

    pub fn set_sink(&mut self, sink: Arc<dyn OutputSink>) {
        self.sink = Some(sink);
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    /// Factory identifier for the concrete `class`
    pub fn factory_identifier(&self, class: &str) -> String {
        format!("{}::{}", self.namespace, build_class_name(class))
    }

    /// Source text of the factory for `type_name`, without writing it
    pub fn render(&self, type_name: &str) -> Result<String> {
        let class = self.resolver.resolve_class_name(type_name)?;
        self.render_class(&class)
    }

    fn render_class(&self, class: &str) -> Result<String> {
        let plan = self.resolver.resolve_parameters(class)?;

        if let Some(injection) = plan.iter().find(|injection| !injection.is_exportable()) {
            return Err(DiError::unexportable(format!(
                "parameter `{}` of `{}` holds a value without a source form",
                injection.parameter_name(),
                class
            )));
        }

        let constructor = match self.resolver.definition().instantiator(class) {
            Some(instantiator) => instantiator.to_owned(),
            None => format!("<{} as Constructible>::construct", rust_path(class)),
        };

        let mut parameters: Vec<RenderedParameter<'_>> = Vec::with_capacity(plan.len());
        for (index, injection) in plan.iter().enumerate() {
            let name = injection.parameter_name();
            let mut binding = format!("p_{}", sanitize_identifier(name));
            // `a-b` and `a_b` sanitize alike; later parameters take their position
            while parameters.iter().any(|p| p.binding == binding) {
                binding = format!("{binding}_{index}");
            }
            parameters.push(RenderedParameter {
                name,
                binding,
                expression: render_expression(injection)?,
            });
        }

        Ok(render_factory(
            class,
            &build_class_name(class),
            &self.runtime_path,
            &constructor,
            &parameters,
        ))
    }

    /// Render and write the factory for `type_name`, returning its identifier.
    ///
    /// The classmap is only updated once the file is written.
    pub fn generate(&self, type_name: &str) -> Result<String> {
        let result = self.generate_inner(type_name);

        #[cfg(feature = "logging")]
        if let Err(err) = &result {
            warn!(
                target: "dependency_compiler",
                requested = type_name,
                error = %err,
                "Factory generation failed"
            );
        }

        result
    }

    fn generate_inner(&self, type_name: &str) -> Result<String> {
        let class = self.resolver.resolve_class_name(type_name)?;
        let source = self.render_class(&class)?;
        let sink = self.sink.as_ref().ok_or(DiError::NoOutputLocation)?;

        let path = build_file_name(&class);
        let factory = self.factory_identifier(&class);
        self.check_collision(&factory, &class, &path)?;

        sink.write(&path, &source)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "dependency_compiler",
            class = %class,
            factory = %factory,
            path = %path,
            "Generated factory"
        );

        match self.classmap.entry(factory.clone()) {
            Entry::Occupied(entry) if entry.get().class != class => {
                return Err(DiError::factory_collision(factory, class, entry.get().class.clone()));
            }
            Entry::Occupied(mut entry) => {
                entry.insert(ClassmapEntry { class, path });
            }
            Entry::Vacant(entry) => {
                entry.insert(ClassmapEntry { class, path });
            }
        }
        Ok(factory)
    }

    /// Fail when another class already owns `factory` or `path`
    fn check_collision(&self, factory: &str, class: &str, path: &str) -> Result<()> {
        let existing = self.classmap.iter().find(|entry| {
            entry.value().class != class && (entry.key() == factory || entry.value().path == path)
        });

        match existing {
            Some(entry) => Err(DiError::factory_collision(factory, class, entry.value().class.clone())),
            None => Ok(()),
        }
    }

    /// Generate every type, continuing past failures
    pub fn generate_all<I, S>(&self, types: I) -> GenerationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = GenerationReport::default();
        for type_name in types {
            let type_name = type_name.as_ref();
            match self.generate(type_name) {
                Ok(factory) => report.generated.push(factory),
                Err(err) => report.failed.push((type_name.to_owned(), err)),
            }
        }
        report
    }

    /// Factory identifier to relative path of every generated file
    pub fn classmap(&self) -> BTreeMap<String, String> {
        self.classmap
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().path.clone()))
            .collect()
    }

    /// Source text of a `mod.rs` declaring every generated factory
    pub fn render_index(&self) -> String {
        let entries: BTreeMap<String, ClassmapEntry> = self
            .classmap
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut out = String::new();
        out.push_str("// Generated factory index.\n\n");
        let _ = writeln!(out, "use {}::CompiledFactory;", self.runtime_path);

        for entry in entries.values() {
            let name = build_class_name(&entry.class);
            let module = module_name(&name);
            out.push('\n');
            let _ = writeln!(out, "#[path = {:?}]", entry.path);
            out.push_str("#[allow(non_snake_case)]\n");
            let _ = writeln!(out, "mod {module};");
            let _ = writeln!(out, "pub use self::{module}::{name};");
        }

        out.push_str("\n/// Source class and factory of every generated file\n");
        out.push_str("pub fn factories() -> Vec<(&'static str, &'static dyn CompiledFactory)> {\n");
        out.push_str("    vec![\n");
        for entry in entries.values() {
            let _ = writeln!(
                out,
                "        ({:?}, &{} as &dyn CompiledFactory),",
                entry.class,
                build_class_name(&entry.class)
            );
        }
        out.push_str("    ]\n");
        out.push_str("}\n");
        out
    }

    /// Write the index next to the generated files
    pub fn write_index(&self) -> Result<()> {
        let sink = self.sink.as_ref().ok_or(DiError::NoOutputLocation)?;
        sink.write(INDEX_FILE, &self.render_index())
    }
}

impl std::fmt::Debug for FactoryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryGenerator")
            .field("namespace", &self.namespace)
            .field("runtime_path", &self.runtime_path)
            .field("has_sink", &self.sink.is_some())
            .field("generated", &self.classmap.len())
            .finish()
    }
}

// =============================================================================
// Rendering
// =============================================================================

struct RenderedParameter<'a> {
    name: &'a str,
    binding: String,
    expression: String,
}

fn render_expression(injection: &Injection) -> Result<String> {
    match injection {
        Injection::Value(value) => value.export(),
        Injection::Type(ty) => Ok(format!("Value::Object(container.get({})?)", ty.export()?)),
    }
}

fn render_factory(
    class: &str,
    name: &str,
    runtime_path: &str,
    constructor: &str,
    parameters: &[RenderedParameter<'_>],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "// Generated factory for {class}.");
    out.push_str("// Do not edit: regenerate from the class definition instead.\n\n");
    out.push_str("#[allow(unused_imports)]\n");
    let _ = writeln!(
        out,
        "use {runtime_path}::{{Arguments, CompiledFactory, Constructible, Instance, Options, Record, Result, ServiceLocator, Value}};"
    );
    out.push('\n');
    out.push_str("#[allow(non_camel_case_types)]\n");
    let _ = writeln!(out, "pub struct {name};");
    out.push('\n');
    let _ = writeln!(out, "impl CompiledFactory for {name} {{");
    out.push_str("    #[allow(unused_variables)]\n");
    out.push_str(
        "    fn create(&self, container: &dyn ServiceLocator, options: &Options) -> Result<Instance> {\n",
    );

    if parameters.is_empty() {
        let _ = writeln!(
            out,
            "        let instance: Instance = ::std::sync::Arc::new({constructor}(Arguments::new())?);"
        );
    } else {
        for parameter in parameters {
            let _ = writeln!(out, "        let {};", parameter.binding);
        }

        out.push_str("        if options.is_empty() {\n");
        for parameter in parameters {
            let _ = writeln!(
                out,
                "            {} = {};",
                parameter.binding, parameter.expression
            );
        }
        out.push_str("        } else {\n");
        for parameter in parameters {
            let _ = writeln!(
                out,
                "            {} = match options.get({:?}) {{",
                parameter.binding, parameter.name
            );
            out.push_str("                Some(value) => value.clone(),\n");
            let _ = writeln!(out, "                None => {},", parameter.expression);
            out.push_str("            };\n");
        }
        out.push_str("        }\n");

        let _ = writeln!(
            out,
            "        let instance: Instance = ::std::sync::Arc::new({constructor}(Arguments::from(vec!["
        );
        for parameter in parameters {
            let _ = writeln!(out, "            ({:?}, {}),", parameter.name, parameter.binding);
        }
        out.push_str("        ]))?);\n");
    }

    out.push_str("        Ok(instance)\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}
