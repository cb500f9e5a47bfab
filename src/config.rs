//! Aliases, type preferences and parameter overrides
//!
//! A [`Config`] is assembled once with [`ConfigBuilder`] and read-only
//! afterward.
//!
//! # Example
//!
//! ```rust
//! use dependency_compiler::Config;
//!
//! let config = Config::builder()
//!     .alias("mailer", "app::SmtpMailer")
//!     .prefer("app::Transport", "app::TcpTransport")
//!     .prefer_for("app::TestMailer", "app::Transport", "app::MemoryTransport")
//!     .parameter("app::SmtpMailer", "port", 2525)
//!     .build();
//!
//! assert_eq!(config.class_for_alias("mailer").unwrap(), "app::SmtpMailer");
//! assert_eq!(
//!     config.type_preference("app::Transport", Some("app::TestMailer")),
//!     Some("app::MemoryTransport")
//! );
//! ```

use crate::{DiError, Result, Value};
use ahash::{AHashMap, AHashSet};

/// Explicit value for one parameter of one class
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// Inject this literal
    Value(Value),
    /// Fetch this type instead of the declared one
    Type(String),
}

/// Resolution configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    aliases: AHashMap<String, String>,
    preferences: AHashMap<String, String>,
    /// requesting class -> (type -> preferred type)
    scoped_preferences: AHashMap<String, AHashMap<String, String>>,
    /// class -> (parameter -> override)
    parameters: AHashMap<String, AHashMap<String, Override>>,
}

impl Config {
    /// Create a new config builder
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    #[inline]
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// All alias names, sorted
    pub fn aliases(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Follow the alias chain from `name` to a terminal identifier.
    ///
    /// Identifiers that are not aliases resolve to themselves.
    pub fn class_for_alias(&self, name: &str) -> Result<String> {
        let mut current = name;
        let mut visited = AHashSet::new();
        let mut chain = vec![name.to_owned()];

        while let Some(target) = self.aliases.get(current) {
            if !visited.insert(current) {
                return Err(DiError::AliasCycle {
                    alias: name.to_owned(),
                    chain,
                });
            }
            chain.push(target.clone());
            current = target;
        }

        Ok(current.to_owned())
    }

    /// Preferred implementation for `type_name`; a preference scoped to
    /// `context` wins over the global one.
    pub fn type_preference(&self, type_name: &str, context: Option<&str>) -> Option<&str> {
        context
            .and_then(|context| self.scoped_preference(context, type_name))
            .or_else(|| self.global_preference(type_name))
    }

    pub fn scoped_preference(&self, context: &str, type_name: &str) -> Option<&str> {
        self.scoped_preferences
            .get(context)
            .and_then(|preferences| preferences.get(type_name))
            .map(String::as_str)
    }

    pub fn global_preference(&self, type_name: &str) -> Option<&str> {
        self.preferences.get(type_name).map(String::as_str)
    }

    pub fn parameter_override(&self, class: &str, parameter: &str) -> Option<&Override> {
        self.parameters
            .get(class)
            .and_then(|overrides| overrides.get(parameter))
    }

    /// Whether any override is configured for `class`
    pub fn has_parameters(&self, class: &str) -> bool {
        self.parameters
            .get(class)
            .is_some_and(|overrides| !overrides.is_empty())
    }
}

/// Builder for [`Config`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `alias` stand in for `target`
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.config.aliases.insert(alias.into(), target.into());
        self
    }

    /// Prefer `preferred` wherever `type_name` is requested
    pub fn prefer(mut self, type_name: impl Into<String>, preferred: impl Into<String>) -> Self {
        self.config
            .preferences
            .insert(type_name.into(), preferred.into());
        self
    }

    /// Prefer `preferred` for `type_name` only inside `context`
    pub fn prefer_for(
        mut self,
        context: impl Into<String>,
        type_name: impl Into<String>,
        preferred: impl Into<String>,
    ) -> Self {
        self.config
            .scoped_preferences
            .entry(context.into())
            .or_default()
            .insert(type_name.into(), preferred.into());
        self
    }

    /// Inject a literal for `parameter` of `class`
    pub fn parameter(
        mut self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert_override(class.into(), parameter.into(), Override::Value(value.into()));
        self
    }

    /// Fetch `type_name` for `parameter` of `class`
    pub fn bind_type(
        mut self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.insert_override(class.into(), parameter.into(), Override::Type(type_name.into()));
        self
    }

    fn insert_override(&mut self, class: String, parameter: String, value: Override) {
        self.config
            .parameters
            .entry(class)
            .or_default()
            .insert(parameter, value);
    }

    #[inline]
    pub fn build(self) -> Config {
        self.config
    }
}
