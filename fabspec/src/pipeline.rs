//! Normalization pipeline
//!
//! Wires the configured vocabulary, extractor and merge policy together and
//! hands out form sessions. `normalize` is the one-shot path used by the CLI:
//! extract, classify, validate.

use crate::classifier::ClassifyOutcome;
use crate::extractors::{build_extractor, ExtractionError, Extractor};
use crate::session::{FormSession, MergePolicy, SessionError, SessionHandle, SessionState};
use crate::types::SpecRecord;
use crate::validators::ValidationReport;
use crate::vocabulary::{FiberScheme, Vocabulary};
use fabspec_common::config::{resolve_api_key, ExtractorBackend, TomlConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Pipeline construction failure
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Extractor(#[from] ExtractionError),
}

/// Result of a one-shot normalization
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    pub record: SpecRecord,
    pub state: SessionState,
    pub deviations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_overridden: Option<String>,
}

impl Normalized {
    fn new(record: SpecRecord, state: SessionState, report: ValidationReport, outcome: ClassifyOutcome) -> Self {
        Self {
            record,
            state,
            deviations: report.messages(),
            repaired_from: outcome.repaired_from,
            category_overridden: outcome.overridden,
        }
    }
}

/// Configured vocabulary, extractor and merge policy
#[derive(Clone)]
pub struct Pipeline {
    vocabulary: Arc<Vocabulary>,
    extractor: Arc<dyn Extractor>,
    merge_policy: MergePolicy,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        extractor: Arc<dyn Extractor>,
        merge_policy: MergePolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            vocabulary,
            extractor,
            merge_policy,
            timeout,
        }
    }

    /// Build from the TOML bootstrap config
    ///
    /// The API key is only resolved for the model backend.
    pub fn from_config(config: &TomlConfig) -> Result<Self, PipelineError> {
        let scheme: FiberScheme = config
            .vocabulary
            .fiber_scheme
            .parse()
            .map_err(PipelineError::Config)?;
        let vocabulary = Arc::new(Vocabulary::standard(scheme));

        let api_key = match config.extractor.backend {
            ExtractorBackend::Rules => None,
            ExtractorBackend::Model => match resolve_api_key(&config.extractor) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(error = %e, "No API key for the model extractor");
                    None
                }
            },
        };
        let extractor = build_extractor(&config.extractor, api_key, Arc::clone(&vocabulary))?;

        info!(
            fiber_scheme = %scheme,
            extractor = extractor.name(),
            merge_policy = ?config.session.merge_policy,
            "Pipeline configured"
        );

        Ok(Self::new(
            vocabulary,
            extractor,
            config.session.merge_policy.into(),
            Duration::from_secs(config.extractor.timeout_secs),
        ))
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn extractor(&self) -> &Arc<dyn Extractor> {
        &self.extractor
    }

    /// New empty form session
    pub fn session(&self) -> FormSession {
        FormSession::new(Arc::clone(&self.vocabulary), self.merge_policy)
    }

    /// New empty session behind a shared handle
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.session(), Arc::clone(&self.extractor), self.timeout)
    }

    /// Extract, classify and validate one string
    pub async fn normalize(&self, raw: &str) -> Result<Normalized, SessionError> {
        let handle = self.handle();
        let report = handle.extract(raw).await?;

        let mut session = handle.lock().await;
        let validation = session.validate();
        Ok(Normalized::new(
            session.record().clone(),
            session.state(),
            validation,
            report.classification,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_normalize_with_rules() {
        let pipeline = Pipeline::from_config(&TomlConfig::default()).unwrap();
        let normalized = pipeline
            .normalize("70D/36F FDY FD*160D/96F ATY FD 228T/ 120GSM/ PD WR/ TASLAN")
            .await
            .unwrap();

        assert_eq!(normalized.state, SessionState::Valid);
        assert!(normalized.deviations.is_empty());
        assert_eq!(normalized.record.classification.fabric_code, "PL");
        assert_eq!(normalized.record.classification.category_major(), "평직 (Plain)");
    }

    #[test]
    fn test_bad_scheme_is_config_error() {
        let mut config = TomlConfig::default();
        config.vocabulary.fiber_scheme = "ansi".to_string();
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(PipelineError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_fails() {
        let pipeline = Pipeline::from_config(&TomlConfig::default()).unwrap();
        let err = pipeline.normalize("   ").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Extraction(ExtractionError::EmptyInput)
        ));
    }
}
