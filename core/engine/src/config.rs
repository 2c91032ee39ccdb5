//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Engine limits, loadable from JSON.
//! CONTEXT: Formulas are short and human-authored, but the engine may be fed
//! arbitrary text. These bounds keep a single call from recursing or
//! allocating without limit.

use crate::error::ConfigError;
use formula_parser::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Highest accepted `max_depth`. Parsing, validation and evaluation all
/// recurse once per level, so deeper trees risk exhausting a thread stack.
pub const MAX_DEPTH_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of parentheses, calls and operators.
    pub max_depth: usize,
    /// Maximum AST node count accepted by validation.
    pub max_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: 10_000,
        }
    }
}

impl EngineConfig {
    /// Parses a config such as `{"max_depth": 64}`; omitted fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".to_string()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_depth must be at most {}, got {}",
                MAX_DEPTH_LIMIT, self.max_depth
            )));
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::Invalid("max_nodes must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pulls every limit into its accepted range.
    pub fn clamped(self) -> Self {
        EngineConfig {
            max_depth: self.max_depth.clamp(1, MAX_DEPTH_LIMIT),
            max_nodes: self.max_nodes.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = EngineConfig::from_json(r#"{"max_depth": 32}"#).unwrap();
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.max_nodes, EngineConfig::default().max_nodes);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"max_nodes": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_depth_above_limit() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"max_depth": 10000000}"#),
            Err(ConfigError::Invalid(_))
        ));
        let at_limit = format!(r#"{{"max_depth": {}}}"#, MAX_DEPTH_LIMIT);
        assert_eq!(EngineConfig::from_json(&at_limit).unwrap().max_depth, MAX_DEPTH_LIMIT);
    }

    #[test]
    fn test_clamped_pulls_limits_into_range() {
        let config = EngineConfig {
            max_depth: usize::MAX,
            max_nodes: 0,
        }
        .clamped();
        assert_eq!(config.max_depth, MAX_DEPTH_LIMIT);
        assert_eq!(config.max_nodes, 1);
        assert!(config.validate().is_ok());

        let config = EngineConfig { max_depth: 0, max_nodes: 7 }.clamped();
        assert_eq!(config, EngineConfig { max_depth: 1, max_nodes: 7 });
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("max_depth = 3"),
            Err(ConfigError::Json(_))
        ));
    }
}
