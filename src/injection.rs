//! Resolved injections: one per constructor parameter
//!
//! An [`Injection`] is what the resolver hands out for a parameter. It is
//! either a literal ([`ValueInjection`]) or a reference to another type
//! that will be fetched from a container ([`TypeInjection`]).

use crate::{Result, ServiceLocator, Value};
use std::cell::Cell;

#[cfg(feature = "logging")]
use tracing::warn;

thread_local! {
    static DEPRECATION_NOTICES: Cell<u64> = const { Cell::new(0) };
}

/// Number of deprecated accessor calls made on the current thread
pub fn deprecation_notices() -> u64 {
    DEPRECATION_NOTICES.with(Cell::get)
}

fn notify_deprecated(accessor: &'static str, replacement: &'static str) {
    DEPRECATION_NOTICES.with(|count| count.set(count.get() + 1));

    #[cfg(feature = "logging")]
    warn!(
        target: "dependency_compiler",
        accessor,
        replacement,
        "Deprecated injection accessor called"
    );

    #[cfg(not(feature = "logging"))]
    let _ = (accessor, replacement);
}

/// A literal injected as-is
#[derive(Debug, Clone, PartialEq)]
pub struct ValueInjection {
    parameter: String,
    value: Value,
}

impl ValueInjection {
    pub fn new(parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn parameter_name(&self) -> &str {
        &self.parameter
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn is_exportable(&self) -> bool {
        self.value.is_exportable()
    }

    /// Source text evaluating to the wrapped value
    #[inline]
    pub fn export(&self) -> Result<String> {
        self.value.export()
    }

    /// The wrapped value. The container is never consulted.
    #[inline]
    pub fn to_value(&self, _container: &dyn ServiceLocator) -> Result<Value> {
        Ok(self.value.clone())
    }

    #[deprecated(note = "use `value()` or `to_value()` instead")]
    pub fn get_value(&self) -> &Value {
        notify_deprecated("ValueInjection::get_value", "ValueInjection::to_value");
        &self.value
    }
}

/// A dependency on another type, fetched from the container on use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInjection {
    parameter: String,
    type_name: String,
}

impl TypeInjection {
    pub fn new(parameter: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            type_name: type_name.into(),
        }
    }

    #[inline]
    pub fn parameter_name(&self) -> &str {
        &self.parameter
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type references are always exportable
    #[inline]
    pub fn is_exportable(&self) -> bool {
        true
    }

    /// The type identifier as a quoted string literal
    #[inline]
    pub fn export(&self) -> Result<String> {
        Ok(format!("{:?}", self.type_name))
    }

    pub fn to_value(&self, container: &dyn ServiceLocator) -> Result<Value> {
        container.get(&self.type_name).map(Value::Object)
    }

    #[deprecated(note = "use `type_name()` or `to_value()` instead")]
    pub fn get_value(&self) -> &str {
        notify_deprecated("TypeInjection::get_value", "TypeInjection::to_value");
        &self.type_name
    }
}

/// How one constructor parameter is satisfied.
///
/// # Examples
///
/// ```rust
/// use dependency_compiler::{Container, Injection, Value};
///
/// let port = Injection::value("port", 8080);
/// assert_eq!(port.export().unwrap(), "Value::Int(8080)");
///
/// let db = Injection::type_of("db", "app::Database");
/// assert_eq!(db.export().unwrap(), "\"app::Database\"");
///
/// let container = Container::new();
/// assert_eq!(port.to_value(&container).unwrap(), Value::Int(8080));
/// assert!(db.to_value(&container).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Injection {
    Value(ValueInjection),
    Type(TypeInjection),
}

impl Injection {
    #[inline]
    pub fn value(parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Value(ValueInjection::new(parameter, value))
    }

    #[inline]
    pub fn type_of(parameter: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::Type(TypeInjection::new(parameter, type_name))
    }

    pub fn parameter_name(&self) -> &str {
        match self {
            Self::Value(injection) => injection.parameter_name(),
            Self::Type(injection) => injection.parameter_name(),
        }
    }

    pub fn is_exportable(&self) -> bool {
        match self {
            Self::Value(injection) => injection.is_exportable(),
            Self::Type(injection) => injection.is_exportable(),
        }
    }

    pub fn export(&self) -> Result<String> {
        match self {
            Self::Value(injection) => injection.export(),
            Self::Type(injection) => injection.export(),
        }
    }

    /// Materialize the injection against `container`
    pub fn to_value(&self, container: &dyn ServiceLocator) -> Result<Value> {
        match self {
            Self::Value(injection) => injection.to_value(container),
            Self::Type(injection) => injection.to_value(container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, DiError};
    use std::sync::Arc;

    struct Database;

    #[test]
    fn test_value_injection_never_touches_container() {
        let injection = Injection::value("retries", 3);
        let container = Container::new();

        assert_eq!(injection.parameter_name(), "retries");
        assert!(injection.is_exportable());
        assert_eq!(injection.to_value(&container).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_type_injection_fetches_from_container() {
        let container = Container::new();
        container.singleton_as("app::Database", Database);

        let injection = Injection::type_of("db", "app::Database");
        let value = injection.to_value(&container).unwrap();

        let Value::Object(instance) = value else {
            panic!("expected an object");
        };
        assert!(Arc::ptr_eq(&instance, &container.get("app::Database").unwrap()));
    }

    #[test]
    fn test_type_injection_missing_service() {
        let injection = Injection::type_of("db", "app::Database");
        assert_eq!(
            injection.to_value(&Container::new()).unwrap_err(),
            DiError::not_found("app::Database")
        );
    }

    #[test]
    fn test_type_export_is_quoted() {
        let injection = TypeInjection::new("db", "app::Db\"Quoted\"");
        assert!(injection.is_exportable());
        assert_eq!(injection.export().unwrap(), r#""app::Db\"Quoted\"""#);
    }

    #[test]
    fn test_object_value_is_not_exportable() {
        let injection = Injection::value("handle", Value::object(std::io::sink()));
        assert!(!injection.is_exportable());
        assert!(matches!(
            injection.export(),
            Err(DiError::UnexportableValue { .. })
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn test_deprecated_accessor_counts_each_call() {
        let value = ValueInjection::new("port", 80);
        let ty = TypeInjection::new("db", "app::Database");
        let before = deprecation_notices();

        assert_eq!(value.get_value(), &Value::Int(80));
        assert_eq!(value.get_value(), &Value::Int(80));
        assert_eq!(ty.get_value(), "app::Database");

        assert_eq!(deprecation_notices(), before + 3);
        assert_eq!(value, ValueInjection::new("port", 80));
    }
}
