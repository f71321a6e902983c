use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured result requested from the generation service.
///
/// Both fields are nullable in the schema; a model may legitimately answer with
/// commentary only. Callers decide whether a missing rewrite is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingResponse {
    pub commentary: Option<String>,
    pub rewritten_text: Option<String>,
}

impl WritingResponse {
    /// Name the schema is registered under in the completion request.
    pub const SCHEMA_NAME: &'static str = "writing_response";

    /// JSON schema for strict structured output.
    ///
    /// Strict mode requires every property to be listed in `required`, so the
    /// optional fields are expressed as `["string", "null"]` instead.
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "commentary": { "type": ["string", "null"] },
                "rewritten_text": { "type": ["string", "null"] }
            },
            "required": ["commentary", "rewritten_text"],
            "additionalProperties": false
        })
    }

    /// The rewritten text, if present and not blank.
    pub fn rewritten(&self) -> Option<&str> {
        self.rewritten_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Outcome of one rewrite: the improved text and the id of the traced call that
/// produced it. The two always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub call_id: String,
    pub improved_text: String,
    #[serde(default)]
    pub commentary: Option<String>,
}
