//! Literal values carried by injections and handed to constructors
//!
//! [`Value`] is a closed set of variants. Everything except [`Value::Object`]
//! and records without a restore function can be rendered back into Rust
//! source, which is what lets the generator embed literals in factories.

use crate::{DiError, Injectable, Result};
use ahash::AHashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased instance produced by a constructor or fetched from a container
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Per-call named overrides, keyed by flat parameter name
pub type Options = AHashMap<String, Value>;

/// A single literal or live object.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Record(Record),
    /// Live instance (resource handle, container service). Never exportable.
    Object(Instance),
}

impl Value {
    /// Wrap a live instance
    #[inline]
    pub fn object<T: Injectable>(instance: T) -> Self {
        Self::Object(Arc::new(instance))
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Object(_) => "object",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether [`export`](Self::export) can render this value as source text
    pub fn is_exportable(&self) -> bool {
        match self {
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_) => true,
            Self::Sequence(items) => items.iter().all(Value::is_exportable),
            Self::Record(record) => record.is_exportable(),
            Self::Object(_) => false,
        }
    }

    /// Render a Rust expression that evaluates to an equal `Value`.
    ///
    /// The expression expects `Value` and `Record` to be in scope.
    pub fn export(&self) -> Result<String> {
        let mut out = String::new();
        self.write_literal(&mut out)?;
        Ok(out)
    }

    fn write_literal(&self, out: &mut String) -> Result<()> {
        match self {
            Self::Null => out.push_str("Value::Null"),
            Self::Bool(b) => out.push_str(&format!("Value::Bool({b})")),
            Self::Int(i) if *i == i64::MIN => out.push_str("Value::Int(i64::MIN)"),
            Self::Int(i) => out.push_str(&format!("Value::Int({i})")),
            Self::Float(f) => out.push_str(&format!("Value::Float({})", float_literal(*f))),
            Self::String(s) => out.push_str(&format!("Value::from({s:?})")),
            Self::Sequence(items) => {
                out.push_str("Value::Sequence(vec![");
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out)?;
                }
                out.push_str("])");
            }
            Self::Record(record) => {
                let restore = record.restore.as_deref().ok_or_else(|| {
                    DiError::unexportable(format!(
                        "record `{}` has no restore function",
                        record.class
                    ))
                })?;
                out.push_str(&format!(
                    "Value::Record(Record::restorable({:?}, {:?})",
                    record.class, restore
                ));
                for (name, value) in &record.state {
                    out.push_str(&format!(".with({name:?}, "));
                    value.write_literal(out)?;
                    out.push(')');
                }
                out.push(')');
            }
            Self::Object(_) => {
                return Err(DiError::unexportable("live object instances have no source form"));
            }
        }
        Ok(())
    }

    /// Convert into a constructor argument type
    #[inline]
    pub fn extract<T: FromValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "f64::NAN".to_owned()
    } else if f == f64::INFINITY {
        "f64::INFINITY".to_owned()
    } else if f == f64::NEG_INFINITY {
        "f64::NEG_INFINITY".to_owned()
    } else {
        // Debug output is the shortest representation that reads back exactly
        format!("{f:?}")
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            // Objects are equal only when they are the same instance
            (Self::Object(a), Self::Object(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// =============================================================================
// Records
// =============================================================================

/// Structured literal rebuilt through a named restore function.
///
/// `restore` is the path of the associated function that reconstructs the
/// instance from its captured state. A record without one cannot be exported.
///
/// Neither the injector nor generated factories call `restore`. Both pass the
/// record to the constructor as a `Value::Record`, and the constructor takes
/// it as a [`Record`] argument and rebuilds the instance from
/// [`state`](Self::state). The path travels with the exported literal so the
/// constructor can check which restore function the record was captured for.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    class: String,
    restore: Option<String>,
    state: Vec<(String, Value)>,
}

impl Record {
    /// A record with no restore function
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            restore: None,
            state: Vec::new(),
        }
    }

    /// A record that can be rebuilt by `restore`
    pub fn restorable(class: impl Into<String>, restore: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            restore: Some(restore.into()),
            state: Vec::new(),
        }
    }

    /// Add or replace a state field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a state field, keeping the position of replaced fields
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.state.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.state.push((name, value)),
        }
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn restore(&self) -> Option<&str> {
        self.restore.as_deref()
    }

    #[inline]
    pub fn state(&self) -> &[(String, Value)] {
        &self.state
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.state
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Exportable when a restore function exists and all state is exportable
    pub fn is_exportable(&self) -> bool {
        self.restore.is_some() && self.state.iter().all(|(_, value)| value.is_exportable())
    }
}

// =============================================================================
// Conversion into argument types
// =============================================================================

/// Conversion from a [`Value`] into a concrete constructor argument.
pub trait FromValue: Sized {
    /// Human-readable description of the accepted input
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Record {
    const EXPECTED: &'static str = "record";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "sequence";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Injectable> FromValue for Arc<T> {
    const EXPECTED: &'static str = "object";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(instance) => instance.downcast::<T>().ok(),
            _ => None,
        }
    }
}

macro_rules! from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value_int!(i64, i32, i16, i8, u64, u32, u16, u8, usize, isize);

// =============================================================================
// Arguments
// =============================================================================

/// Ordered, named arguments handed to a constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// Append an argument, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Remove an argument and convert it.
    ///
    /// A missing argument reads as `Null`, so `Option<T>` targets accept it.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        let value = match self.entries.iter().position(|(entry, _)| entry == name) {
            Some(index) => self.entries.remove(index).1,
            None => Value::Null,
        };
        let found = value.kind();

        T::from_value(value).ok_or_else(|| DiError::InvalidArgument {
            parameter: name.to_owned(),
            expected: T::EXPECTED,
            found,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> From<Vec<(N, Value)>> for Arguments {
    fn from(entries: Vec<(N, Value)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_export() {
        assert_eq!(Value::Null.export().unwrap(), "Value::Null");
        assert_eq!(Value::Bool(true).export().unwrap(), "Value::Bool(true)");
        assert_eq!(Value::Int(-42).export().unwrap(), "Value::Int(-42)");
        assert_eq!(Value::Int(i64::MIN).export().unwrap(), "Value::Int(i64::MIN)");
        assert_eq!(Value::Float(1.5).export().unwrap(), "Value::Float(1.5)");
        assert_eq!(Value::Float(2.0).export().unwrap(), "Value::Float(2.0)");
        assert_eq!(
            Value::Float(f64::NEG_INFINITY).export().unwrap(),
            "Value::Float(f64::NEG_INFINITY)"
        );
        assert_eq!(
            Value::from("say \"hi\"\n").export().unwrap(),
            r#"Value::from("say \"hi\"\n")"#
        );
    }

    #[test]
    fn test_sequence_export() {
        let value = Value::from(vec![Value::Int(1), Value::Null, Value::Sequence(vec![])]);
        assert_eq!(
            value.export().unwrap(),
            "Value::Sequence(vec![Value::Int(1), Value::Null, Value::Sequence(vec![])])"
        );
    }

    #[test]
    fn test_record_export() {
        let record = Record::restorable("app::Money", "app::Money::restore")
            .with("amount", 5)
            .with("currency", "EUR");
        assert_eq!(
            Value::from(record).export().unwrap(),
            "Value::Record(Record::restorable(\"app::Money\", \"app::Money::restore\")\
             .with(\"amount\", Value::Int(5)).with(\"currency\", Value::from(\"EUR\")))"
        );
    }

    #[test]
    fn test_object_is_not_exportable() {
        let value = Value::object(std::io::sink());
        assert!(!value.is_exportable());
        assert!(matches!(value.export(), Err(DiError::UnexportableValue { .. })));
    }

    #[test]
    fn test_record_without_restore_is_not_exportable() {
        let value = Value::from(Record::new("app::Socket").with("port", 80));
        assert!(!value.is_exportable());
        assert!(value.export().is_err());

        let nested = Value::Sequence(vec![Value::Int(1), value]);
        assert!(!nested.is_exportable());
        assert!(nested.export().is_err());
    }

    #[test]
    fn test_record_set_keeps_position() {
        let mut record = Record::restorable("app::Point", "restore").with("x", 1).with("y", 2);
        record.set("x", 10);
        assert_eq!(record.state()[0], ("x".to_owned(), Value::Int(10)));
        assert_eq!(record.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_object_equality_is_identity() {
        let shared = Value::object(String::from("db"));
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, Value::object(String::from("db")));
    }

    #[test]
    fn test_arguments_take() {
        let mut args = Arguments::from(vec![
            ("port", Value::Int(8080)),
            ("host", Value::from("localhost")),
        ]);

        assert_eq!(args.take::<u16>("port").unwrap(), 8080);
        assert_eq!(args.take::<String>("host").unwrap(), "localhost");
        assert_eq!(args.take::<Option<String>>("missing").unwrap(), None);
        assert!(args.is_empty());
    }

    #[test]
    fn test_arguments_type_mismatch() {
        let mut args = Arguments::new().with("port", "eighty");
        let err = args.take::<u16>("port").unwrap_err();
        assert_eq!(
            err,
            DiError::InvalidArgument {
                parameter: "port".into(),
                expected: "u16",
                found: "string",
            }
        );
    }

    #[test]
    fn test_extract_object() {
        #[derive(Debug, PartialEq)]
        struct Database(&'static str);

        let value = Value::object(Database("postgres"));
        let db: Arc<Database> = value.clone().extract().unwrap();
        assert_eq!(*db, Database("postgres"));
        assert!(value.extract::<Arc<String>>().is_none());
    }

    #[test]
    fn test_constructor_restores_record_argument() {
        #[derive(Debug, PartialEq)]
        struct Money {
            cents: i64,
        }

        impl Money {
            fn restore(record: &Record) -> Option<Self> {
                let cents = record.get("cents")?.clone().extract()?;
                Some(Self { cents })
            }
        }

        let captured = Record::restorable("app::Money", "app::Money::restore").with("cents", 250);
        let mut arguments = Arguments::new().with("price", captured.clone());

        let record: Record = arguments.take("price").unwrap();
        assert_eq!(record, captured);
        assert_eq!(record.restore(), Some("app::Money::restore"));
        assert_eq!(Money::restore(&record), Some(Money { cents: 250 }));
    }
}
