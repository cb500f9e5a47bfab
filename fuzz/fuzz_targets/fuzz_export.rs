#![no_main]

//! Fuzz target for literal export
//!
//! Exportability and export must agree for arbitrary value trees, and export
//! must be deterministic.

use arbitrary::{Arbitrary, Unstructured};
use dependency_compiler::{DiError, Record, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<FuzzValue>),
    Record {
        class: String,
        restore: Option<String>,
        state: Vec<(String, FuzzValue)>,
    },
    Object,
}

impl FuzzValue {
    fn build(self, depth: usize) -> Value {
        if depth > 8 {
            return Value::Null;
        }
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::Int(i),
            Self::Float(f) => Value::Float(f),
            Self::String(s) => Value::String(s),
            Self::Sequence(items) => {
                Value::Sequence(items.into_iter().map(|item| item.build(depth + 1)).collect())
            }
            Self::Record { class, restore, state } => {
                let mut record = match restore {
                    Some(restore) => Record::restorable(class, restore),
                    None => Record::new(class),
                };
                for (name, value) in state {
                    record.set(name, value.build(depth + 1));
                }
                Value::Record(record)
            }
            Self::Object => Value::object(0u8),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);
    let Ok(input) = FuzzValue::arbitrary(&mut unstructured) else {
        return;
    };
    let value = input.build(0);

    match value.export() {
        Ok(source) => {
            assert!(value.is_exportable());
            assert_eq!(value.export().ok().as_deref(), Some(source.as_str()));
        }
        Err(DiError::UnexportableValue { .. }) => assert!(!value.is_exportable()),
        Err(other) => panic!("unexpected export error: {other}"),
    }
});
