//! Integration tests for factory generation
//!
//! `generated/` holds a checked-in factory. It is compared byte for byte with
//! the generator's output and compiled into this test crate, so a change in
//! the rendered shape breaks either the snapshot or the build.

use dependency_compiler::{
    ClassDefinition, CompiledFactory, Config, Container, DefinitionStore, DependencyResolver,
    DiError, DirectorySink, FactoryCall, FactoryGenerator, MemorySink, Options, ParameterInfo,
    Value, CONSTRUCTOR,
};
use std::fs;
use std::sync::Arc;

mod fixtures {
    use dependency_compiler::{Arguments, Constructible, Result};
    use std::sync::Arc;

    pub struct Clock {
        pub now: u64,
    }

    pub struct Greeter {
        pub clock: Arc<Clock>,
        pub name: String,
        pub excited: Option<bool>,
    }

    impl Constructible for Greeter {
        fn construct(mut arguments: Arguments) -> Result<Self> {
            Ok(Self {
                clock: arguments.take("clock")?,
                name: arguments.take("name")?,
                excited: arguments.take("excited")?,
            })
        }
    }

    impl Greeter {
        pub fn greet(&self) -> String {
            let mark = if self.excited == Some(true) { "!" } else { "." };
            format!("[{}] hello {}{}", self.clock.now, self.name, mark)
        }
    }
}

#[rustfmt::skip]
#[path = "generated/crate/fixtures/GreeterFactory.rs"]
mod greeter_factory;

const GREETER: &str = "crate::fixtures::Greeter";
const CLOCK: &str = "crate::fixtures::Clock";
const SNAPSHOT: &str = include_str!("generated/crate/fixtures/GreeterFactory.rs");

fn resolver() -> Arc<DependencyResolver> {
    let mut greeter = ClassDefinition::new(GREETER);
    greeter
        .add_method_parameter(CONSTRUCTOR, "clock", ParameterInfo::new().with_type("clock").required())
        .add_method_parameter(CONSTRUCTOR, "name", ParameterInfo::new().with_default("world"))
        .add_method_parameter(CONSTRUCTOR, "excited", ParameterInfo::new().optional());

    let store: DefinitionStore = [greeter, ClassDefinition::new(CLOCK)].into_iter().collect();
    let config = Config::builder()
        .alias("greeter", GREETER)
        .alias("clock", CLOCK)
        .build();

    Arc::new(DependencyResolver::new(store, config))
}

fn container() -> Container {
    let container = Container::new();
    container.singleton_as(CLOCK, fixtures::Clock { now: 42 });
    container
}

fn greet(instance: dependency_compiler::Instance) -> String {
    instance
        .downcast::<fixtures::Greeter>()
        .map(|greeter| greeter.greet())
        .unwrap_or_else(|_| panic!("factory produced a different type"))
}

#[test]
fn test_render_matches_snapshot() {
    let generator = FactoryGenerator::new(resolver());
    assert_eq!(generator.render("greeter").unwrap(), SNAPSHOT);
}

#[test]
fn test_compiled_factory_fast_path() {
    let factory = greeter_factory::crate_fixtures_GreeterFactory;
    let instance = factory.create(&container(), &Options::default()).unwrap();
    assert_eq!(greet(instance), "[42] hello world.");
}

#[test]
fn test_compiled_factory_override_path() {
    let factory = greeter_factory::crate_fixtures_GreeterFactory;

    let mut options = Options::default();
    options.insert("name".into(), Value::from("rust"));
    options.insert("excited".into(), Value::Bool(true));

    let instance = factory.create(&container(), &options).unwrap();
    assert_eq!(greet(instance), "[42] hello rust!");
}

#[test]
fn test_compiled_factory_legacy_invoke() {
    let factory = greeter_factory::crate_fixtures_GreeterFactory;

    let instance = factory
        .invoke(
            &container(),
            FactoryCall::Legacy {
                requested: "greeter".into(),
                options: None,
            },
        )
        .unwrap();
    assert_eq!(greet(instance), "[42] hello world.");
}

#[test]
fn test_compiled_factory_missing_dependency() {
    let factory = greeter_factory::crate_fixtures_GreeterFactory;
    assert_eq!(
        factory.create(&Container::new(), &Options::default()).unwrap_err(),
        DiError::not_found(CLOCK)
    );
}

#[test]
fn test_generation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let generator = FactoryGenerator::new(resolver()).with_sink(Arc::new(DirectorySink::new(dir.path())));

    let first = generator.generate("greeter").unwrap();
    let path = dir.path().join("crate/fixtures/GreeterFactory.rs");
    let written = fs::read(&path).unwrap();
    let classmap = generator.classmap();

    let second = generator.generate(GREETER).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&path).unwrap(), written);
    assert_eq!(generator.classmap(), classmap);
    assert_eq!(written, SNAPSHOT.as_bytes());
    assert_eq!(
        classmap.get("generated::crate_fixtures_GreeterFactory").map(String::as_str),
        Some("crate/fixtures/GreeterFactory.rs")
    );
}

#[test]
fn test_index_declares_generated_files() {
    let dir = tempfile::tempdir().unwrap();
    let generator = FactoryGenerator::new(resolver()).with_sink(Arc::new(DirectorySink::new(dir.path())));

    let report = generator.generate_all(["greeter", "clock"]);
    assert!(report.is_success());
    generator.write_index().unwrap();

    let index = fs::read_to_string(dir.path().join("mod.rs")).unwrap();
    assert!(index.contains(
        "#[path = \"crate/fixtures/ClockFactory.rs\"]\n#[allow(non_snake_case)]\nmod crate_fixtures_ClockFactory_rs;\n"
    ));
    assert!(index.contains(
        "pub use self::crate_fixtures_GreeterFactory_rs::crate_fixtures_GreeterFactory;\n"
    ));
    assert!(index.contains(
        "        (\"crate::fixtures::Clock\", &crate_fixtures_ClockFactory as &dyn CompiledFactory),\n"
    ));
    assert!(index.find("ClockFactory.rs").unwrap() < index.find("GreeterFactory.rs").unwrap());
}

#[test]
fn test_failed_generation_leaves_classmap_alone() {
    let mut socket = ClassDefinition::new("crate::fixtures::Socket");
    socket.add_method_parameter(
        CONSTRUCTOR,
        "handle",
        ParameterInfo::new().with_default(Value::object(std::io::stdout())),
    );
    let store: DefinitionStore = [socket].into_iter().collect();
    let resolver = Arc::new(DependencyResolver::new(store, Config::default()));

    let sink = Arc::new(MemorySink::new());
    let generator = FactoryGenerator::new(Arc::clone(&resolver)).with_sink(sink.clone());

    assert!(matches!(
        generator.generate("crate::fixtures::Socket"),
        Err(DiError::UnexportableValue { .. })
    ));
    assert!(generator.classmap().is_empty());
    assert!(sink.is_empty());

    // Planning alone still succeeds; only export rejects the live handle
    assert_eq!(resolver.resolve_parameters("crate::fixtures::Socket").unwrap().len(), 1);
}
