//! Google Gemini `generateContent` client used as the classification gateway

use async_trait::async_trait;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::ClassifierConfig;
use crate::core::error::{AppError, Result};
use crate::modules::vision::{build_prompt, interpret_answer, ImageClassifier};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, empty when the model said nothing
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Classifier talking to the Gemini REST API
pub struct GeminiClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClassifier {
    /// Builds the client up front so a bad credential or TLS setup fails at startup
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::DependencyUnavailable(
                "Gemini API key is not configured".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AppError::DependencyUnavailable(format!("Failed to initialize Gemini client: {}", e))
            })?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url, config.model
        );

        info!("Gemini classifier initialized: model={}", config.model);

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl ImageClassifier for GeminiClassifier {
    async fn classify(&self, image: &[u8], mime_type: &str, question: &str) -> Result<bool> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: build_prompt(question),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: BASE64_STANDARD.encode(image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::DependencyUnavailable(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::DependencyUnavailable(format!(
                "Gemini analysis failed: {} - {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::DependencyUnavailable(format!("Invalid Gemini response: {}", e))
        })?;

        let answer = parsed.text();
        let verdict = interpret_answer(&answer);
        debug!(
            "Gemini answered {:?} for {} byte {} image -> {}",
            answer,
            image.len(),
            mime_type,
            verdict
        );

        Ok(verdict)
    }
}
