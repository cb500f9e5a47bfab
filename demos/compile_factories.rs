//! Example: plan a small service graph and compile its factories
//!
//! Run with:
//!   cargo run --example compile_factories -- [output-dir]
//!
//! Set RUST_LOG=dependency_compiler=trace to watch plans being built.

use dependency_compiler::{
    ClassDefinition, Config, DefinitionStore, DependencyResolver, DirectorySink, FactoryGenerator,
    Injection, ParameterInfo, Record, Value, CONSTRUCTOR,
};
use std::path::PathBuf;
use std::sync::Arc;

fn definitions() -> DefinitionStore {
    let mut transport = ClassDefinition::new("demo::SmtpTransport");
    transport
        .set_supertypes(["demo::Transport"])
        .add_method_parameter(CONSTRUCTOR, "host", ParameterInfo::new().required())
        .add_method_parameter(CONSTRUCTOR, "port", ParameterInfo::new().with_default(25));

    let mut mailer = ClassDefinition::new("demo::Mailer");
    mailer
        .add_method_parameter(
            CONSTRUCTOR,
            "transport",
            ParameterInfo::new().with_type("demo::Transport").required(),
        )
        .add_method_parameter(
            CONSTRUCTOR,
            "sender",
            ParameterInfo::new().with_default(
                Record::restorable("demo::Address", "demo::Address::restore")
                    .with("name", "Robot")
                    .with("email", "robot@example.com"),
            ),
        )
        .add_method_parameter(CONSTRUCTOR, "signature", ParameterInfo::new().optional());

    let mut signup = ClassDefinition::new("demo::SignupHandler");
    signup
        .add_method_parameter(CONSTRUCTOR, "mailer", ParameterInfo::new().with_type("mailer").required())
        .add_method_parameter(
            CONSTRUCTOR,
            "welcome_tags",
            ParameterInfo::new().with_default(vec!["welcome", "onboarding"]),
        );

    // Holds a live handle, so it can be planned but not compiled
    let mut audit = ClassDefinition::new("demo::AuditLog");
    audit.add_method_parameter(
        CONSTRUCTOR,
        "sink",
        ParameterInfo::new().with_default(Value::object(std::io::stderr())),
    );

    [transport, mailer, signup, audit].into_iter().collect()
}

fn main() {
    #[cfg(feature = "logging")]
    dependency_compiler::logging::builder()
        .compiler_only()
        .from_env()
        .compact()
        .init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("dependency-compiler-demo"));

    let config = Config::builder()
        .alias("mailer", "demo::Mailer")
        .prefer("demo::Transport", "demo::SmtpTransport")
        .parameter("demo::SmtpTransport", "host", "smtp.example.com")
        .build();

    let resolver = Arc::new(DependencyResolver::new(definitions(), config));

    println!("=== Plans ===");
    for class in ["demo::SignupHandler", "mailer", "demo::AuditLog"] {
        match resolver.resolve_parameters(class) {
            Ok(plan) => {
                println!("{class}:");
                for injection in plan.iter() {
                    match injection {
                        Injection::Value(value) => {
                            println!("  {:<14} = {:?}", value.parameter_name(), value.value())
                        }
                        Injection::Type(ty) => {
                            println!("  {:<14} <- {}", ty.parameter_name(), ty.type_name())
                        }
                    }
                }
            }
            Err(err) => println!("{class}: {err}"),
        }
    }

    let generator = FactoryGenerator::new(resolver)
        .with_namespace("factories")
        .with_sink(Arc::new(DirectorySink::new(&output)));

    println!("\n=== Generation into {} ===", output.display());
    let report = generator.generate_all([
        "demo::SmtpTransport",
        "demo::Mailer",
        "demo::SignupHandler",
        "demo::AuditLog",
    ]);
    for (requested, err) in &report.failed {
        println!("skipped {requested}: {err}");
    }
    for (factory, path) in generator.classmap() {
        println!("{factory:<40} {path}");
    }

    match generator.write_index() {
        Ok(()) => println!("\nIndex written to {}", output.join("mod.rs").display()),
        Err(err) => println!("\nIndex not written: {err}"),
    }
}
