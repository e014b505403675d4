//! JSON Schema validation module
//!
//! Collections can carry a schema; the validation mode controls how strictly
//! it is enforced on create and update.

use jsonschema::{validator_for, Validator};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Validation mode for schema enforcement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemaValidationMode {
    /// No validation
    Off,
    /// Reject any document that doesn't match the schema
    #[default]
    Strict,
    /// Accept the document but log violations
    Lenient,
}

/// Compiled schema validator
pub struct SchemaValidator {
    name: String,
    mode: SchemaValidationMode,
    validator: Option<Validator>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

impl SchemaValidator {
    /// Compile a schema; with `Off` the schema is not compiled at all
    pub fn new(name: impl Into<String>, schema: &Value, mode: SchemaValidationMode) -> ApiResult<Self> {
        let validator = if mode == SchemaValidationMode::Off {
            None
        } else {
            Some(
                validator_for(schema)
                    .map_err(|e| ApiError::SchemaCompilation(e.to_string()))?,
            )
        };

        Ok(Self {
            name: name.into(),
            mode,
            validator,
        })
    }

    pub fn mode(&self) -> SchemaValidationMode {
        self.mode
    }

    /// Validate a document against the schema
    pub fn validate(&self, document: &Value) -> ApiResult<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };

        let violations: Vec<String> = validator
            .iter_errors(document)
            .map(|e| e.to_string())
            .collect();
        if violations.is_empty() {
            return Ok(());
        }

        match self.mode {
            SchemaValidationMode::Strict => Err(ApiError::Validation(violations)),
            SchemaValidationMode::Lenient => {
                for violation in &violations {
                    tracing::warn!(
                        schema = %self.name,
                        violation = %violation,
                        "Schema validation warning (lenient mode)"
                    );
                }
                Ok(())
            }
            SchemaValidationMode::Off => Ok(()),
        }
    }
}
