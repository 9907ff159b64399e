use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named JSON schema sent along with a schema-constrained completion.
///
/// Schemas follow the strict structured-output subset: every object lists
/// all properties as required and sets `additionalProperties: false`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: Value,
}

impl JsonSchemaSpec {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Pretty-printed schema for providers that only take it in the prompt.
    pub fn to_prompt_block(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }
}

/// A record type that a schema-constrained provider can be asked to produce.
pub trait StructuredOutput: DeserializeOwned {
    fn json_schema() -> JsonSchemaSpec;
}
