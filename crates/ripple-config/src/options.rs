//! Client-supplied `initializationOptions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Options nested under `initializationOptions.typescript`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TypeScriptOptions {
    /// Path to a TypeScript SDK `lib` directory.
    #[serde(default)]
    pub tsdk: Option<String>,
}

/// Validated view of the `initializationOptions` payload.
///
/// Every field is optional; empty strings count as absent so that a client
/// sending `"ripplePath": ""` falls back to the environment exactly like one
/// that omits the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    /// Path to the Ripple compiler module.
    #[serde(default)]
    pub ripple_path: Option<String>,
    /// TypeScript-specific options.
    #[serde(default)]
    pub typescript: Option<TypeScriptOptions>,
}

impl InitializationOptions {
    /// Parses the raw payload carried by the `initialize` request.
    ///
    /// A missing or `null` payload yields empty options. Any other non-object
    /// payload, or a field with the wrong JSON type, is rejected instead of
    /// being silently ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOptions`] when the payload has the wrong
    /// shape.
    pub fn from_value(value: Option<&Value>) -> Result<Self, ConfigError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(object @ Value::Object(_)) => Self::deserialize(object)
                .map_err(|error| ConfigError::invalid_options(error.to_string())),
            Some(other) => Err(ConfigError::invalid_options(format!(
                "expected an object, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Returns the compiler path when it is present and non-empty.
    #[must_use]
    pub fn ripple_path(&self) -> Option<&str> {
        non_empty(self.ripple_path.as_deref())
    }

    /// Returns the TypeScript SDK path when it is present and non-empty.
    #[must_use]
    pub fn tsdk(&self) -> Option<&str> {
        non_empty(
            self.typescript
                .as_ref()
                .and_then(|typescript| typescript.tsdk.as_deref()),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
