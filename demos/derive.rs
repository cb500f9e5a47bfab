//! Example demonstrating the #[derive(Inject)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use dependency_compiler::{
    Config, Container, DefinitionStore, DependencyResolver, FactoryGenerator, Inject, Injector,
    MemorySink, Options, Value,
};
use std::sync::Arc;

#[derive(Debug)]
struct Database {
    url: String,
}

#[derive(Debug)]
struct Cache {
    size: usize,
}

#[derive(Inject)]
struct UserService {
    #[inject]
    db: Arc<Database>,
    #[inject(optional)]
    cache: Option<Arc<Cache>>,
    #[inject(value)]
    region: String,
    #[inject(default = 50)]
    page_size: u32,
    // Non-injected field uses Default
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let cache = match &self.cache {
            Some(cache) => format!("cache of {}", cache.size),
            None => "no cache".to_owned(),
        };
        format!(
            "UserService on {} in {} ({cache}, page size {}, requests {})",
            self.db.url, self.region, self.page_size, self.request_count
        )
    }
}

fn main() {
    let mut store = DefinitionStore::new();
    store.describe::<UserService>();

    // The dependencies carry no metadata of their own yet
    store.add(dependency_compiler::ClassDefinition::new(std::any::type_name::<Database>()));
    store.add(dependency_compiler::ClassDefinition::new(std::any::type_name::<Cache>()));

    let service = std::any::type_name::<UserService>();
    let config = Config::builder()
        .alias("users", service)
        .parameter(service, "region", "eu-west-1")
        .build();
    let resolver = Arc::new(DependencyResolver::new(store, config));

    let container = Container::new();
    container.singleton(Database {
        url: "postgres://localhost".into(),
    });
    container.singleton(Cache { size: 1024 });

    let injector = Injector::new(Arc::clone(&resolver));
    injector.register::<UserService>();

    println!("=== Runtime ===");
    let users = injector
        .create_as::<UserService>(&container, &Options::default())
        .expect("plan should resolve");
    println!("{}", users.describe());

    // Options replace planned values by parameter name
    let mut options = Options::default();
    options.insert("page_size".into(), Value::Int(10));
    options.insert("cache".into(), Value::Null);
    let users = injector
        .create_as::<UserService>(&container, &options)
        .expect("plan should resolve");
    println!("{}", users.describe());

    println!("\n=== Generated factory ===");
    let generator = FactoryGenerator::new(resolver).with_sink(Arc::new(MemorySink::new()));
    match generator.render("users") {
        Ok(source) => println!("{source}"),
        Err(err) => println!("render failed: {err}"),
    }
}
