//! Classification gateway backed by a vision-language model
//!
//! The pipelines only ever ask yes/no questions about an image. The model's
//! free-text answer is interpreted by [`interpret_answer`]: anything that does
//! not start with `YES` is a rejection.

mod gemini_client;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::shared::constants::CLASSIFIER_INSTRUCTION;

pub use gemini_client::GeminiClassifier;

/// Yes/no image classifier
///
/// Implementations never retry and never cache; an `Err` means the model could
/// not be consulted, not that the answer was negative.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image: &[u8], mime_type: &str, question: &str) -> Result<bool>;
}

/// Full prompt sent to the model for a question
pub fn build_prompt(question: &str) -> String {
    format!("{}\n{}", CLASSIFIER_INSTRUCTION, question)
}

/// `true` iff the trimmed, upper-cased answer starts with `YES`
pub fn interpret_answer(text: &str) -> bool {
    text.trim().to_uppercase().starts_with("YES")
}
