#![no_main]

//! Fuzz target for plan resolution
//!
//! Builds arbitrary class graphs with aliases, preferences and overrides and
//! checks that resolution terminates with a well-formed plan or a planning
//! error, and that a warm memo never changes the answer.

use arbitrary::Arbitrary;
use dependency_compiler::{
    ClassDefinition, Config, DefinitionStore, DependencyResolver, DiError, ParameterInfo,
    CONSTRUCTOR,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const CLASSES: u8 = 8;

fn class_name(index: u8) -> String {
    format!("app::C{}", index % CLASSES)
}

#[derive(Debug, Arbitrary)]
struct FuzzParameter {
    declared_type: Option<u8>,
    required: bool,
    default: Option<i64>,
}

#[derive(Debug, Arbitrary)]
struct FuzzClass {
    defined: bool,
    supertypes: Vec<u8>,
    parameters: Vec<FuzzParameter>,
}

#[derive(Debug, Arbitrary)]
enum FuzzRule {
    Alias(u8, u8),
    Prefer(u8, u8),
    PreferFor(u8, u8, u8),
    Literal(u8, u8, i64),
    Bind(u8, u8, u8),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    classes: Vec<FuzzClass>,
    rules: Vec<FuzzRule>,
    requests: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let mut store = DefinitionStore::new();
    let mut parameter_counts = vec![None; CLASSES as usize];

    for (index, class) in input.classes.iter().take(CLASSES as usize).enumerate() {
        if !class.defined {
            continue;
        }
        let name = class_name(index as u8);
        let mut definition = ClassDefinition::new(name.as_str());
        definition
            .set_supertypes(class.supertypes.iter().map(|&s| class_name(s)))
            .add_method(CONSTRUCTOR, None);

        for (position, parameter) in class.parameters.iter().take(6).enumerate() {
            let mut info = ParameterInfo::new();
            if let Some(ty) = parameter.declared_type {
                info = info.with_type(class_name(ty));
            }
            info = if parameter.required { info.required() } else { info.optional() };
            if let Some(default) = parameter.default {
                info = info.with_default(default);
            }
            definition.add_method_parameter(CONSTRUCTOR, &format!("p{position}"), info);
        }

        parameter_counts[index] = Some(class.parameters.len().min(6));
        store.add(definition);
    }

    let mut config = Config::builder();
    for rule in input.rules.iter().take(16) {
        config = match *rule {
            FuzzRule::Alias(a, b) => config.alias(format!("alias{}", a % CLASSES), class_or_alias(b)),
            FuzzRule::Prefer(a, b) => config.prefer(class_name(a), class_name(b)),
            FuzzRule::PreferFor(c, a, b) => config.prefer_for(class_name(c), class_name(a), class_name(b)),
            FuzzRule::Literal(c, p, v) => config.parameter(class_name(c), format!("p{}", p % 6), v),
            FuzzRule::Bind(c, p, t) => config.bind_type(class_name(c), format!("p{}", p % 6), class_or_alias(t)),
        };
    }

    let store: Arc<dyn dependency_compiler::Definition> = Arc::new(store);
    let config = config.build();
    let resolver = DependencyResolver::from_shared(Arc::clone(&store), config.clone());

    for &request in input.requests.iter().take(16) {
        let requested = class_or_alias(request);
        let warm = resolver.resolve_parameters(&requested);
        let cold = DependencyResolver::from_shared(Arc::clone(&store), config.clone())
            .resolve_parameters(&requested);
        assert_eq!(warm.as_deref().map_err(Clone::clone), cold.as_deref().map_err(Clone::clone));

        match warm {
            Ok(plan) => {
                let class = resolver
                    .resolve_class_name(&requested)
                    .expect("alias resolved once already");
                let index = class[6..].parse::<usize>().expect("class index");
                assert_eq!(Some(plan.len()), parameter_counts[index]);

                let again = resolver.resolve_parameters(&requested).expect("memoized plan");
                assert!(Arc::ptr_eq(&plan, &again));
            }
            Err(
                DiError::UnresolvableDependency { .. }
                | DiError::CircularDependency { .. }
                | DiError::AliasCycle { .. },
            ) => {}
            Err(other) => panic!("unexpected planning error: {other}"),
        }
    }
});

/// Even bytes name classes, odd bytes name aliases
fn class_or_alias(byte: u8) -> String {
    if byte % 2 == 0 {
        class_name(byte / 2)
    } else {
        format!("alias{}", (byte / 2) % CLASSES)
    }
}
