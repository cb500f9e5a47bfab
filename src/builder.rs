//! Transient builder for one method signature

use crate::definition::ParameterInfo;
use crate::Value;

/// Collects the parameters of one injection method before they are handed to
/// [`ClassDefinition::add_injection_method`](crate::ClassDefinition::add_injection_method).
#[derive(Debug, Clone, Default)]
pub struct InjectionMethod {
    name: Option<String>,
    parameters: Vec<(String, ParameterInfo)>,
}

impl InjectionMethod {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder for a named method
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parameters: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Append a parameter. Without an explicit flag the parameter is required.
    pub fn add_parameter(
        &mut self,
        name: &str,
        declared_type: Option<&str>,
        required: Option<bool>,
        default: Option<Value>,
    ) -> &mut Self {
        self.parameters.push((
            name.to_owned(),
            ParameterInfo {
                declared_type: declared_type.map(str::to_owned),
                required: required.unwrap_or(true),
                default,
            },
        ));
        self
    }

    #[inline]
    pub fn parameters(&self) -> &[(String, ParameterInfo)] {
        &self.parameters
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<(String, ParameterInfo)>) {
        (self.name, self.parameters)
    }
}
