// Generated factory for crate::fixtures::Greeter.
// Do not edit: regenerate from the class definition instead.

#[allow(unused_imports)]
use ::dependency_compiler::{Arguments, CompiledFactory, Constructible, Instance, Options, Record, Result, ServiceLocator, Value};

#[allow(non_camel_case_types)]
pub struct crate_fixtures_GreeterFactory;

impl CompiledFactory for crate_fixtures_GreeterFactory {
    #[allow(unused_variables)]
    fn create(&self, container: &dyn ServiceLocator, options: &Options) -> Result<Instance> {
        let p_clock;
        let p_name;
        let p_excited;
        if options.is_empty() {
            p_clock = Value::Object(container.get("crate::fixtures::Clock")?);
            p_name = Value::from("world");
            p_excited = Value::Null;
        } else {
            p_clock = match options.get("clock") {
                Some(value) => value.clone(),
                None => Value::Object(container.get("crate::fixtures::Clock")?),
            };
            p_name = match options.get("name") {
                Some(value) => value.clone(),
                None => Value::from("world"),
            };
            p_excited = match options.get("excited") {
                Some(value) => value.clone(),
                None => Value::Null,
            };
        }
        let instance: Instance = ::std::sync::Arc::new(<crate::fixtures::Greeter as Constructible>::construct(Arguments::from(vec![
            ("clock", p_clock),
            ("name", p_name),
            ("excited", p_excited),
        ]))?);
        Ok(instance)
    }
}
