//! Generative AI service abstraction
//!
//! The rest of the crate talks to the model only through
//! [`GenerativeService`], which covers the four generation modes the
//! planner needs:
//!
//! - free text with an optional system instruction
//! - JSON constrained by a declared [`Schema`]
//! - image synthesis returning inline bytes
//! - search-grounded answers with web citations
//!
//! [`GeminiClient`] is the HTTP implementation.

mod gemini;

pub use gemini::GeminiClient;

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI service error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("AI service returned no usable content")]
    EmptyResponse,
    #[error("failed to decode AI response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Decode(e.to_string())
    }
}

/// Declared shape of a structured response.
///
/// Serializes to the `{"type": "OBJECT", ...}` form the service expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Schema {
    Object {
        properties: BTreeMap<String, Schema>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
    Array {
        items: Box<Schema>,
    },
    String,
    Integer,
}

impl Schema {
    pub fn object<'a>(
        properties: impl IntoIterator<Item = (&'a str, Schema)>,
        required: &[&str],
    ) -> Self {
        Schema::Object {
            properties: properties.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array { items: Box::new(items) }
    }

    /// Whether `value` satisfies this schema. Unknown object keys are allowed.
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (Schema::Object { properties, required }, Value::Object(map)) => {
                required.iter().all(|key| map.contains_key(key))
                    && properties
                        .iter()
                        .all(|(key, schema)| map.get(key).is_none_or(|v| schema.conforms(v)))
            }
            (Schema::Array { items }, Value::Array(values)) => values.iter().all(|v| items.conforms(v)),
            (Schema::String, Value::String(_)) => true,
            (Schema::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }
}

/// Image returned by the synthesis endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub aspect_ratio: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    /// `data:<mime>;base64,...` form for embedding
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Search-grounded answer with its citations in service order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Free-text completion
    async fn generate_text(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String, AiError>;

    /// JSON completion, constrained by `schema` when given
    async fn generate_json(&self, prompt: &str, schema: Option<&Schema>) -> Result<Value, AiError>;

    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<GeneratedImage, AiError>;

    async fn search_grounded(&self, prompt: &str) -> Result<GroundedAnswer, AiError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted service double for unit tests

    use std::sync::Mutex;

    use super::*;

    /// Returns canned results; a `None` slot fails with a 500.
    #[derive(Default)]
    pub struct ScriptedService {
        pub text: Option<String>,
        pub json: Option<Value>,
        pub image: Option<GeneratedImage>,
        pub grounded: Option<GroundedAnswer>,
        /// `(prompt, system_instruction)` of every text call
        pub text_calls: Mutex<Vec<(String, Option<String>)>>,
        pub json_prompts: Mutex<Vec<String>>,
    }

    fn unavailable() -> AiError {
        AiError::Api { status: 500, message: "scripted failure".into() }
    }

    #[async_trait]
    impl GenerativeService for ScriptedService {
        async fn generate_text(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String, AiError> {
            self.text_calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), system_instruction.map(str::to_string)));
            self.text.clone().ok_or_else(unavailable)
        }

        async fn generate_json(&self, prompt: &str, _schema: Option<&Schema>) -> Result<Value, AiError> {
            self.json_prompts.lock().unwrap().push(prompt.to_string());
            self.json.clone().ok_or_else(unavailable)
        }

        async fn generate_image(&self, _prompt: &str, _aspect_ratio: &str) -> Result<GeneratedImage, AiError> {
            self.image.clone().ok_or_else(unavailable)
        }

        async fn search_grounded(&self, _prompt: &str) -> Result<GroundedAnswer, AiError> {
            self.grounded.clone().ok_or_else(unavailable)
        }
    }
}
