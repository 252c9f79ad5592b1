//! services/api/src/generation/mod.rs
//!
//! Prompt construction and defensive parsing for everything the workflow asks
//! the text-generation service to produce. The service returns freeform text
//! that is *expected* to be a JSON object; every parse here is fallible and
//! each operation defines its own failure policy (strict for quizzes and
//! guides, placeholder fallback for recommendations and feedback).

pub mod feedback;
pub mod guide;
pub mod quiz;
pub mod remediation;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Errors produced while interpreting generated output.
#[derive(Debug, thiserror::Error)]
pub enum GeneratedPayloadError {
    #[error("generated output contained no JSON object")]
    MissingJson,

    #[error("generated output did not match the expected shape: {0}")]
    Shape(String),

    #[error("generated quiz returned {got} questions, expected at least {expected}")]
    TooFewQuestions { got: usize, expected: usize },

    #[error("generated quiz is missing the reading passage")]
    MissingReading,

    #[error("multiple-choice question has {got} options, at least 4 are required")]
    TooFewOptions { got: usize },

    #[error("correct option index {index} is out of range ({len} options)")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

impl From<GeneratedPayloadError> for ApiError {
    fn from(err: GeneratedPayloadError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Cuts the outermost JSON object out of a generated reply, tolerating
/// Markdown fences and prose around it.
pub fn extract_json_object(text: &str) -> Result<String, GeneratedPayloadError> {
    // Models regularly wrap JSON in ```json fences despite instructions.
    let fence = Regex::new(r"```(?:json)?").expect("static regex");
    let cleaned = fence.replace_all(text, "");

    let start = cleaned.find('{').ok_or(GeneratedPayloadError::MissingJson)?;
    let end = cleaned.rfind('}').ok_or(GeneratedPayloadError::MissingJson)?;
    if end < start {
        return Err(GeneratedPayloadError::MissingJson);
    }
    Ok(cleaned[start..=end].to_string())
}

/// Extracts and deserializes a generated JSON payload into `T`.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, GeneratedPayloadError> {
    let json = extract_json_object(text)?;
    serde_json::from_str(&json).map_err(|e| GeneratedPayloadError::Shape(e.to_string()))
}
