//! Model Extractor
//!
//! Sends the instruction prompt and the raw text to a Gemini-style
//! `generateContent` endpoint and turns the reply into a draft.
//!
//! # Reply handling
//! 1. concatenate the text parts of the first candidate
//! 2. strip markdown code fences
//! 3. parse JSON → `MalformedResponse` on failure
//! 4. shape check → `Schema` on failure
//! 5. typed decode → `MalformedResponse` on failure
//! 6. `finish_draft` (original text, scheme tag, classifier repair)
//!
//! # API Reference
//! - Endpoint: `{endpoint}/models/{model}:generateContent`
//! - Auth: `x-goog-api-key` header

use super::prompt::{build_prompt, user_message};
use super::schema::check_shape;
use super::{finish_draft, ExtractionError, Extractor};
use crate::classifier::Classifier;
use crate::types::SpecRecord;
use crate::vocabulary::Vocabulary;
use async_trait::async_trait;
use fabspec_common::config::ExtractorConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP model extractor
pub struct ModelExtractor {
    /// HTTP client for API requests
    http_client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
    prompt: String,
    classifier: Classifier,
}

impl ModelExtractor {
    /// Create a model extractor from the `[extractor]` config section
    pub fn new(
        config: &ExtractorConfig,
        api_key: String,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self, ExtractionError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout,
            prompt: build_prompt(&vocabulary),
            classifier: Classifier::new(vocabulary),
        })
    }

    /// `generateContent` URL for the configured model
    pub fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(&self, raw: &str) -> Result<String, ExtractionError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: Some(self.prompt.clone()),
                    },
                    Part {
                        text: Some(user_message(raw)),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .http_client
            .post(self.request_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout)
                } else {
                    ExtractionError::Network(format!("Model request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api(format!(
                "Model endpoint returned error {}: {}",
                status, body
            )));
        }

        let reply: GenerateResponse = response.json().await.map_err(|e| {
            ExtractionError::MalformedResponse(format!("Failed to parse model response: {}", e))
        })?;

        reply.text().ok_or_else(|| {
            ExtractionError::MalformedResponse("Model response has no text candidate".to_string())
        })
    }
}

#[async_trait]
impl Extractor for ModelExtractor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
        if raw.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        debug!(model = %self.model, chars = raw.chars().count(), "Requesting model extraction");
        let text = self.generate(raw).await?;
        let record = decode_reply(&text, raw, &self.classifier)?;

        info!(
            model = %self.model,
            fabric_code = %record.classification.fabric_code,
            compositions = record.compositions.len(),
            "Model extraction complete"
        );
        Ok(record)
    }
}

/// Remove markdown code fences around a JSON reply
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Turn reply text into a contract-conforming draft
pub fn decode_reply(
    text: &str,
    raw: &str,
    classifier: &Classifier,
) -> Result<SpecRecord, ExtractionError> {
    let value: serde_json::Value = serde_json::from_str(strip_fences(text))
        .map_err(|e| ExtractionError::MalformedResponse(format!("Reply is not JSON: {}", e)))?;

    check_shape(&value)?;

    let record: SpecRecord = serde_json::from_value(value)
        .map_err(|e| ExtractionError::MalformedResponse(format!("Reply does not decode: {}", e)))?;

    finish_draft(record, raw, classifier)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ViolationKind;
    use crate::vocabulary::FiberScheme;
    use serde_json::json;

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(Vocabulary::standard(FiberScheme::Legacy)))
    }

    fn reply_json() -> serde_json::Value {
        let side = json!({ "raw_text": "70D", "denier": 70, "filament": null, "process_type": "FDY", "luster": "FD" });
        json!({
            "meta": {
                "original_text": "model may rewrite this",
                "etc_info": "",
                "ai_analysis_kr": "나일론 원단",
                "predicted_material": "Nylon",
                "construction_type": "Taslan"
            },
            "compositions": [{ "fiberType": "NA", "percentage": 100 }],
            "yarn_spec": { "warp": side.clone(), "weft": side },
            "physical_spec": {
                "density_total": 228,
                "weight_gsm": null,
                "width_inch": null,
                "finishings_code": [],
                "finishings_desc": []
            },
            "classification": { "fabric_code": "XX", "fabric_name_kr": "" }
        })
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_decode_reply_repairs_and_restores_original() {
        let text = format!("```json\n{}\n```", reply_json());
        let record = decode_reply(&text, "70D NYLON TASLAN", &classifier()).unwrap();

        assert_eq!(record.meta.original_text, "70D NYLON TASLAN");
        assert_eq!(record.classification.fabric_code, "ZZ");
        assert_eq!(record.physical_spec.density_total, Some(228.0));
        assert_eq!(record.meta.fiber_scheme, FiberScheme::Legacy);
    }

    #[test]
    fn test_decode_reply_rejects_non_json() {
        let err = decode_reply("Sorry, I can't help", "x", &classifier()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_reply_rejects_legacy_key_name() {
        let mut value = reply_json();
        let classification = value.as_object_mut().unwrap().remove("classification").unwrap();
        value["ui_view"] = classification;

        let err = decode_reply(&value.to_string(), "x", &classifier()).unwrap_err();
        match err {
            ExtractionError::Schema(violation) => {
                assert_eq!(violation.path, "classification");
                assert_eq!(violation.kind, ViolationKind::Missing);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_reply_rejects_bad_enum() {
        let mut value = reply_json();
        value["yarn_spec"]["warp"]["luster"] = json!("GLOSSY");
        let err = decode_reply(&value.to_string(), "x", &classifier()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_request_url() {
        let config = ExtractorConfig {
            endpoint: "http://localhost:9000/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        };
        let extractor = ModelExtractor::new(
            &config,
            "key".to_string(),
            Arc::new(Vocabulary::standard(FiberScheme::Legacy)),
        )
        .unwrap();
        assert_eq!(
            extractor.request_url(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );
    }
}
