//! FILENAME: core/engine/src/context.rs
//! PURPOSE: The named values a formula is evaluated against.
//! CONTEXT: A Context is built by the caller for each evaluation and only
//! ever read by the engine. Names are case-sensitive.

use crate::error::ConfigError;
use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variable names in sorted order, for variable palettes.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a context from a JSON object such as `{"price": 100, "tags": ["a"]}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let object = match parsed {
            serde_json::Value::Object(map) => map,
            _ => return Err(ConfigError::InvalidContext("expected a JSON object".to_string())),
        };

        let mut context = Context::new();
        for (name, json_value) in object {
            let value = Value::from_json(json_value).ok_or_else(|| {
                ConfigError::InvalidContext(format!("unsupported value for '{}'", name))
            })?;
            context.insert(name, value);
        }
        Ok(context)
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(values: HashMap<String, Value>) -> Self {
        Context { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
