//! Draft Extractors
//!
//! An extractor turns one raw specification string into one `SpecRecord`
//! draft, or fails. Two implementations ship:
//! 1. **rule_extractor** - deterministic token rules, no I/O
//! 2. **model_client** - Gemini-style `generateContent` call
//!
//! # Contract
//! Every draft leaves `finish_draft` with:
//! - `meta.original_text` equal to the input, byte for byte
//! - `meta.fiber_scheme` equal to the active vocabulary's scheme
//! - at least one composition
//! - a `fabric_code` inside the weave vocabulary (classifier repair)
//!
//! `categoryMajor` is left as the producer supplied it; the session derives
//! it on merge and reports a disagreement there.
//!
//! Failures never carry a partial record. The caller's current record is
//! untouched by a failed extraction.

pub mod composition;
pub mod model_client;
pub mod prompt;
pub mod rule_extractor;
pub mod schema;

pub use model_client::ModelExtractor;
pub use rule_extractor::RuleExtractor;
pub use schema::{SchemaViolation, ViolationKind};

use crate::classifier::Classifier;
use crate::types::SpecRecord;
use crate::vocabulary::Vocabulary;
use async_trait::async_trait;
use fabspec_common::config::{ExtractorBackend, ExtractorConfig};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Draft producer
///
/// # Example
/// ```rust,ignore
/// let extractor: Arc<dyn Extractor> = Arc::new(RuleExtractor::new(vocabulary));
/// let draft = extractor.extract("70D/36F FDY FD*160D/96F ATY FD 228T").await?;
/// assert_eq!(draft.yarn_spec.warp.denier, Some(70));
/// ```
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extractor name for logging
    fn name(&self) -> &'static str;

    /// Produce a draft record from the raw specification text
    async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError>;
}

/// Extraction failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// Nothing to extract from
    #[error("Input is empty")]
    EmptyInput,

    /// Endpoint unreachable or connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Reply is not JSON, or does not decode into the record types
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Reply JSON does not have the record shape
    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    /// Caller-imposed deadline expired
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// Superseded by a newer extraction or cancelled by the caller
    #[error("Extraction cancelled")]
    Cancelled,

    /// Backend needs configuration that is missing (API key)
    #[error("Extractor not configured: {0}")]
    NotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Enforce the draft contract on a decoded record
pub fn finish_draft(
    mut record: SpecRecord,
    raw: &str,
    classifier: &Classifier,
) -> Result<SpecRecord, ExtractionError> {
    if record.compositions.is_empty() {
        return Err(SchemaViolation::new("compositions", ViolationKind::Empty).into());
    }

    record.meta.original_text = raw.to_string();
    record.meta.fiber_scheme = classifier.vocabulary().scheme();

    let repaired = classifier
        .classify_repair(&record.classification.fabric_code)
        .to_string();
    if repaired != record.classification.fabric_code {
        debug!(
            from = %record.classification.fabric_code,
            to = %repaired,
            "Draft fabric code repaired"
        );
        record.classification.fabric_code = repaired;
    }

    Ok(record)
}

/// Build the configured extractor
///
/// `api_key` is only consulted for the model backend; a missing key fails
/// here with `NotConfigured` rather than on the first request.
pub fn build_extractor(
    config: &ExtractorConfig,
    api_key: Option<String>,
    vocabulary: Arc<Vocabulary>,
) -> Result<Arc<dyn Extractor>, ExtractionError> {
    match config.backend {
        ExtractorBackend::Rules => Ok(Arc::new(RuleExtractor::new(vocabulary))),
        ExtractorBackend::Model => {
            let api_key = api_key.ok_or_else(|| {
                ExtractionError::NotConfigured("no API key for the model backend".to_string())
            })?;
            Ok(Arc::new(ModelExtractor::new(config, api_key, vocabulary)?))
        }
    }
}

// ============================================================================
// Mock Extractor for Testing
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Returns a fixed draft or a fixed error
    pub struct MockExtractor {
        pub result: Result<SpecRecord, ExtractionError>,
    }

    #[async_trait]
    impl Extractor for MockExtractor {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
            let mut record = self.result.clone()?;
            record.meta.original_text = raw.to_string();
            Ok(record)
        }
    }
}
