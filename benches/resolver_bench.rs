//! Benchmarks for planning, export and factory rendering

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dependency_compiler::{
    ClassDefinition, Config, Container, DefinitionStore, DependencyResolver, FactoryGenerator,
    Injector, MemorySink, Options, ParameterInfo, Record, Value, CONSTRUCTOR,
};
use std::hint::black_box;
use std::sync::Arc;

/// A chain `app::C0 -> app::C1 -> ... -> app::C{depth}`, each class with a
/// literal parameter next to its typed dependency
fn chain(depth: usize) -> DefinitionStore {
    (0..=depth)
        .map(|index| {
            let mut definition = ClassDefinition::new(format!("app::C{index}"));
            definition.add_method(CONSTRUCTOR, None);
            if index < depth {
                definition.add_method_parameter(
                    CONSTRUCTOR,
                    "next",
                    ParameterInfo::new().with_type(format!("app::C{}", index + 1)).required(),
                );
            }
            definition.add_method_parameter(CONSTRUCTOR, "level", ParameterInfo::new().with_default(index as i64));
            definition
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for depth in [1usize, 8, 32] {
        group.throughput(Throughput::Elements(depth as u64));

        group.bench_with_input(BenchmarkId::new("cold", depth), &depth, |b, &depth| {
            let resolver = DependencyResolver::new(chain(depth), Config::default());
            b.iter(|| {
                resolver.clear_cache();
                black_box(resolver.resolve_parameters("app::C0").unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("memoized", depth), &depth, |b, &depth| {
            let resolver = DependencyResolver::new(chain(depth), Config::default());
            resolver.resolve_parameters("app::C0").unwrap();
            b.iter(|| black_box(resolver.resolve_parameters("app::C0").unwrap()))
        });
    }

    group.bench_function("aliased_with_preference", |b| {
        let mut store = chain(4);
        let mut preferred = ClassDefinition::new("app::Fast");
        preferred.set_supertypes(["app::C1"]);
        store.add(preferred);

        let config = Config::builder()
            .alias("root", "app::C0")
            .prefer("app::C1", "app::Fast")
            .build();
        let resolver = DependencyResolver::new(store, config);

        b.iter(|| {
            resolver.clear_cache();
            black_box(resolver.resolve_parameters("root").unwrap())
        })
    });

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    let scalar = Value::from("postgres://localhost:5432/app");
    group.bench_function("string", |b| b.iter(|| black_box(scalar.export().unwrap())));

    let nested = Value::Sequence(
        (0..64)
            .map(|i| {
                Value::Record(
                    Record::restorable("app::Point", "app::Point::restore")
                        .with("x", i)
                        .with("y", f64::from(i) / 2.0),
                )
            })
            .collect(),
    );
    group.bench_function("records_64", |b| b.iter(|| black_box(nested.export().unwrap())));

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    let resolver = Arc::new(DependencyResolver::new(chain(8), Config::default()));
    let generator = FactoryGenerator::new(Arc::clone(&resolver)).with_sink(Arc::new(MemorySink::new()));

    group.bench_function("render", |b| b.iter(|| black_box(generator.render("app::C0").unwrap())));
    group.bench_function("generate", |b| b.iter(|| black_box(generator.generate("app::C0").unwrap())));

    group.finish();
}

fn bench_instantiate(c: &mut Criterion) {
    let mut group = c.benchmark_group("instantiate");

    let mut definition = ClassDefinition::new("app::Settings");
    definition
        .add_method_parameter(CONSTRUCTOR, "clock", ParameterInfo::new().with_type("app::Clock").required())
        .add_method_parameter(CONSTRUCTOR, "retries", ParameterInfo::new().with_default(3));
    let store: DefinitionStore = [definition, ClassDefinition::new("app::Clock")].into_iter().collect();

    let injector = Injector::new(Arc::new(DependencyResolver::new(store, Config::default())));
    injector.register_constructor("app::Settings", |arguments| Ok(Arc::new(arguments.len())));

    let container = Container::new();
    container.singleton_as("app::Clock", 0u64);

    let empty = Options::default();
    group.bench_function("fast_path", |b| {
        b.iter(|| black_box(injector.create(&container, "app::Settings", &empty).unwrap()))
    });

    let mut options = Options::default();
    options.insert("retries".into(), Value::Int(5));
    group.bench_function("with_options", |b| {
        b.iter(|| black_box(injector.create(&container, "app::Settings", &options).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_export, bench_generate, bench_instantiate);
criterion_main!(benches);
