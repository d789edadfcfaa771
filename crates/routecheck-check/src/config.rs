//! Checker configuration.
//!
//! Every option has a default, so an empty JSON object (or no config file at
//! all) yields the stock `@BasePath` / `@Response` / `this.rtn` conventions.

use serde::{Deserialize, Serialize};

/// How a return site's type tag is compared against the accepted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeMatching {
    /// Exact identifier-set membership.
    #[default]
    Identifier,
    /// Identifier membership, falling back to the type resolver's
    /// assignability check.
    Assignability,
}

/// Options recognized by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Whether a canonical return call without a type tag is reported.
    pub require_explicit_type_tag: bool,
    pub strict_type_matching: TypeMatching,
    /// In assignability mode, accept exact identifier matches before asking
    /// the resolver. When `false` both names must resolve and be assignable.
    pub identifier_shortcut: bool,
    /// Class decorators that mark a controller.
    pub controller_markers: Vec<String>,
    /// Method decorator that declares a response contract.
    pub contract_decorator: String,
    /// Name of the canonical return-construction method on `this`.
    pub return_method: String,
    /// Member names that denote "the schema of" their object, so that
    /// `UserDTO.z` names the type `UserDTO`.
    pub schema_accessors: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            require_explicit_type_tag: true,
            strict_type_matching: TypeMatching::Identifier,
            identifier_shortcut: true,
            controller_markers: vec!["BasePath".to_string(), "Controller".to_string()],
            contract_decorator: "Response".to_string(),
            return_method: "rtn".to_string(),
            schema_accessors: vec!["z".to_string()],
        }
    }
}

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config option '{option}' must not be empty")]
    Empty { option: &'static str },
}

impl CheckerConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CheckerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that could never match anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contract_decorator.trim().is_empty() {
            return Err(ConfigError::Empty {
                option: "contractDecorator",
            });
        }
        if self.return_method.trim().is_empty() {
            return Err(ConfigError::Empty {
                option: "returnMethod",
            });
        }
        if self.controller_markers.is_empty()
            || self.controller_markers.iter().any(|m| m.trim().is_empty())
        {
            return Err(ConfigError::Empty {
                option: "controllerMarkers",
            });
        }
        Ok(())
    }

    pub fn is_controller_marker(&self, name: &str) -> bool {
        self.controller_markers.iter().any(|m| m == name)
    }

    pub fn is_schema_accessor(&self, name: &str) -> bool {
        self.schema_accessors.iter().any(|a| a == name)
    }
}
