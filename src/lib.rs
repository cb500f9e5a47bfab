//! # dependency-compiler - Constructor Injection, Planned Ahead of Time
//!
//! Computes, for every class, the ordered list of values that satisfies its
//! constructor, and compiles those plans into standalone factory sources.
//!
//! ## Features
//!
//! - **Deterministic planning** - aliases, scoped and global preferences,
//!   per-parameter overrides, defaults and optionals
//! - **Cycle safe** - alias loops and constructor cycles are reported with the
//!   full chain instead of recursing forever
//! - **Memoized** - each plan is computed once and shared behind an `Arc`
//! - **Factory generation** - one source file per class with a fast path and
//!   an options override path, plus a classmap and module index
//! - **Observable** - optional `tracing` events with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use dependency_compiler::prelude::*;
//!
//! let mut logger = ClassDefinition::new("app::FileLogger");
//! logger.set_supertypes(["app::Logger"]);
//!
//! let mut service = ClassDefinition::new("app::UserService");
//! service
//!     .add_method_parameter(CONSTRUCTOR, "logger", ParameterInfo::new().with_type("app::Logger").required())
//!     .add_method_parameter(CONSTRUCTOR, "page_size", ParameterInfo::new().with_default(50));
//!
//! let config = Config::builder()
//!     .alias("users", "app::UserService")
//!     .prefer("app::Logger", "app::FileLogger")
//!     .build();
//!
//! let resolver = Arc::new(DependencyResolver::new(
//!     DefinitionStore::from_iter([logger, service]),
//!     config,
//! ));
//!
//! let plan = resolver.resolve_parameters("users").unwrap();
//! assert_eq!(plan[0], Injection::type_of("logger", "app::FileLogger"));
//! assert_eq!(plan[1], Injection::value("page_size", 50));
//!
//! let generator = FactoryGenerator::new(resolver).with_sink(Arc::new(MemorySink::new()));
//! assert_eq!(generator.generate("users").unwrap(), "generated::app_UserServiceFactory");
//! ```
//!
//! ## Runtime Instantiation
//!
//! ```rust
//! use dependency_compiler::prelude::*;
//!
//! struct Clock;
//!
//! struct Scheduler {
//!     clock: Arc<Clock>,
//!     workers: usize,
//! }
//!
//! impl Constructible for Scheduler {
//!     fn construct(mut arguments: Arguments) -> Result<Self> {
//!         Ok(Self {
//!             clock: arguments.take("clock")?,
//!             workers: arguments.take("workers")?,
//!         })
//!     }
//! }
//!
//! let clock = std::any::type_name::<Clock>();
//! let mut scheduler = ClassDefinition::new(std::any::type_name::<Scheduler>());
//! scheduler
//!     .add_method_parameter(CONSTRUCTOR, "clock", ParameterInfo::new().with_type(clock).required())
//!     .add_method_parameter(CONSTRUCTOR, "workers", ParameterInfo::new().with_default(4));
//!
//! let resolver = DependencyResolver::new(
//!     DefinitionStore::from_iter([scheduler, ClassDefinition::new(clock)]),
//!     Config::default(),
//! );
//! let injector = Injector::new(Arc::new(resolver));
//! injector.register::<Scheduler>();
//!
//! let container = Container::new();
//! container.singleton(Clock);
//!
//! let scheduler = injector.create_as::<Scheduler>(&container, &Options::default()).unwrap();
//! assert_eq!(scheduler.workers, 4);
//! ```

// Generated and derived code names the runtime by its crate path
extern crate self as dependency_compiler;

mod builder;
mod codegen;
mod compiled;
mod config;
mod container;
mod definition;
mod error;
mod injection;
mod injector;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod resolver;
mod sink;
mod value;

pub use builder::*;
pub use codegen::*;
pub use compiled::*;
pub use config::*;
pub use container::*;
pub use definition::*;
pub use error::*;
pub use injection::*;
pub use injector::*;
pub use provider::*;
pub use resolver::*;
pub use sink::*;
pub use value::*;

#[cfg(feature = "derive")]
pub use dependency_compiler_derive::Inject;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Arguments, ClassDefinition, CompiledFactory, Config, Constructible, Container, Definition,
        DefinitionStore, DependencyResolver, DiError, FactoryGenerator, Injection, Injector,
        MemorySink, Options, OutputSink, ParameterInfo, Result, ServiceLocator, Value,
        CONSTRUCTOR,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Logger {
        path: String,
    }

    struct Mailer {
        logger: Arc<Logger>,
        host: String,
        port: u16,
    }

    impl Constructible for Mailer {
        fn construct(mut arguments: Arguments) -> Result<Self> {
            Ok(Self {
                logger: arguments.take("logger")?,
                host: arguments.take("host")?,
                port: arguments.take("port")?,
            })
        }
    }

    fn resolver(config: Config) -> Arc<DependencyResolver> {
        let mut mailer = ClassDefinition::new(Mailer::identifier());
        mailer
            .add_method_parameter(
                CONSTRUCTOR,
                "logger",
                ParameterInfo::new().with_type("logger").required(),
            )
            .add_method_parameter(CONSTRUCTOR, "host", ParameterInfo::new().required())
            .add_method_parameter(CONSTRUCTOR, "port", ParameterInfo::new().with_default(25));

        let store: DefinitionStore = [mailer, ClassDefinition::new(Logger::identifier())]
            .into_iter()
            .collect();
        Arc::new(DependencyResolver::new(store, config))
    }

    fn config() -> Config {
        Config::builder()
            .alias("mailer", Mailer::identifier())
            .alias("logger", Logger::identifier())
            .parameter(Mailer::identifier(), "host", "smtp.local")
            .build()
    }

    #[test]
    fn test_plan_then_instantiate() {
        let resolver = resolver(config());
        let injector = Injector::new(Arc::clone(&resolver));
        injector.register::<Mailer>();

        let container = Container::new();
        container.singleton(Logger {
            path: "/var/log/mail".into(),
        });

        let mailer = injector.create_as::<Mailer>(&container, &Options::default()).unwrap();
        assert_eq!(mailer.logger.path, "/var/log/mail");
        assert_eq!(mailer.host, "smtp.local");
        assert_eq!(mailer.port, 25);

        // Type injections name the concrete class, never the alias
        let plan = resolver.resolve_parameters("mailer").unwrap();
        assert_eq!(plan[0], Injection::type_of("logger", Logger::identifier()));
    }

    #[test]
    fn test_missing_override_is_unresolvable() {
        let config = Config::builder()
            .alias("logger", Logger::identifier())
            .build();
        let resolver = resolver(config);

        assert!(matches!(
            resolver.resolve_parameters(Mailer::identifier()),
            Err(DiError::UnresolvableDependency { .. })
        ));
    }

    #[test]
    fn test_generate_from_shared_resolver() {
        let resolver = resolver(config());
        let sink = Arc::new(MemorySink::new());
        let generator = FactoryGenerator::new(resolver).with_sink(sink.clone());

        let factory = generator.generate("mailer").unwrap();
        let classmap = generator.classmap();
        let source = sink.get(&classmap[&factory]).unwrap();

        assert!(source.contains("p_host = Value::from(\"smtp.local\");"));
        assert!(source.contains("p_port = Value::Int(25);"));
        assert!(source.contains(&format!(
            "p_logger = Value::Object(container.get({:?})?);",
            Logger::identifier()
        )));
    }
}
