//! Integration tests for the configured pipeline
//!
//! Config files are written to temp dirs; tests that touch process
//! environment variables run serially.

use fabspec::extractors::ExtractionError;
use fabspec::session::SessionState;
use fabspec::vocabulary::{migrate_record, FiberScheme};
use fabspec::{Pipeline, PipelineError};
use fabspec_common::config::{ConfigResolver, ExtractorBackend, TomlConfig};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const EXAMPLE: &str = "70D/36F FDY FD*160D/96F ATY FD 228T/ 120GSM/ PD WR/ TASLAN";

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn test_example_line_normalizes_to_valid_record() {
    let pipeline = Pipeline::from_config(&TomlConfig::default()).unwrap();
    let normalized = pipeline.normalize(EXAMPLE).await.unwrap();
    let record = &normalized.record;

    assert_eq!(normalized.state, SessionState::Valid);
    assert_eq!(record.meta.original_text, EXAMPLE);
    assert_eq!(record.yarn_spec.warp.denier, Some(70));
    assert_eq!(record.yarn_spec.warp.filament, Some(36));
    assert_eq!(record.yarn_spec.weft.denier, Some(160));
    assert_eq!(record.physical_spec.density_total, Some(228.0));
    assert_eq!(record.physical_spec.weight_gsm, Some(120.0));
    assert_eq!(record.physical_spec.finishings_code, vec!["PD", "WR"]);
    assert_eq!(record.compositions.len(), 1);
    assert_eq!(record.compositions[0].percentage, 100);
}

#[tokio::test]
async fn test_iso_vocabulary_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [vocabulary]
        fiber_scheme = "iso"

        [session]
        merge_policy = "replace"
        "#,
    );

    let config = ConfigResolver::new(Some(path)).load().unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.vocabulary().scheme(), FiberScheme::Iso);

    let normalized = pipeline.normalize("Nylon 100% Oxford").await.unwrap();
    assert_eq!(normalized.record.meta.fiber_scheme, FiberScheme::Iso);
    assert_eq!(normalized.record.compositions[0].fiber_type, "PA");
    assert_eq!(normalized.record.classification.fabric_code, "PO");
    assert!(normalized.deviations.is_empty());
}

#[tokio::test]
async fn test_normalized_record_migrates_and_back() {
    let pipeline = Pipeline::from_config(&TomlConfig::default()).unwrap();
    let original = pipeline.normalize("C/N 60/40 twill").await.unwrap().record;
    assert_eq!(original.compositions[0].fiber_type, "CO");
    assert_eq!(original.compositions[1].fiber_type, "NA");

    let mut record = original.clone();
    migrate_record(&mut record, FiberScheme::Iso).unwrap();
    assert_eq!(record.compositions[1].fiber_type, "PA");
    migrate_record(&mut record, FiberScheme::Legacy).unwrap();
    assert_eq!(record, original);
}

#[tokio::test]
#[serial]
async fn test_model_backend_without_key_is_not_configured() {
    for var in ["FABSPEC_API_KEY", "GEMINI_API_KEY", "GOOGLE_GENERATIVE_AI_API_KEY"] {
        std::env::remove_var(var);
    }

    let mut config = TomlConfig::default();
    config.extractor.backend = ExtractorBackend::Model;
    assert!(matches!(
        Pipeline::from_config(&config),
        Err(PipelineError::Extractor(ExtractionError::NotConfigured(_)))
    ));
}

#[tokio::test]
#[serial]
async fn test_model_backend_key_from_env() {
    std::env::set_var("FABSPEC_API_KEY", "env-key");

    let mut config = TomlConfig::default();
    config.extractor.backend = ExtractorBackend::Model;
    let pipeline = Pipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.extractor().name(), "model");

    std::env::remove_var("FABSPEC_API_KEY");
}
