//! Record Validation
//!
//! Checks a `SpecRecord` against the invariants that gate the `Valid` state
//! and persistence. Violations are values, not errors: validation never
//! fails, it reports.
//!
//! # Checks
//! 1. **Composition** - non-empty, each percentage in `[0, 100]`, total 100
//! 2. **Fibers** - every `fiberType` in the active scheme (foreign-scheme
//!    codes and free text reported separately)
//! 3. **Classification** - `fabric_code` in the weave vocabulary,
//!    `categoryMajor` equal to the derived label
//! 4. **Finishings** - code and description lists of equal length

pub mod record_validator;

pub use record_validator::{composition_deviations, RecordValidator};

use crate::vocabulary::FiberScheme;
use serde::Serialize;
use thiserror::Error;

/// One human-readable invariant violation
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deviation {
    #[error("composition is empty, at least one fiber is required")]
    EmptyComposition,

    #[error("composition {index}: {fiber} percentage {percentage} is outside 0-100")]
    PercentageOutOfRange {
        index: usize,
        fiber: String,
        percentage: i32,
    },

    #[error("composition total is {total}%, needs 100%")]
    CompositionTotal { total: i64 },

    #[error("fiber code '{fiber}' belongs to the {scheme} scheme, this record uses {active}")]
    MixedFiberScheme {
        fiber: String,
        scheme: FiberScheme,
        active: FiberScheme,
    },

    #[error("fiber '{fiber}' is not a {active} fiber code")]
    NonNormalizedFiber { fiber: String, active: FiberScheme },

    #[error("record is tagged {record} but the active vocabulary is {active}")]
    SchemeTagMismatch {
        record: FiberScheme,
        active: FiberScheme,
    },

    #[error("fabric code '{code}' is not in the weave vocabulary")]
    UnknownWeaveCode { code: String },

    #[error("categoryMajor is '{found}', expected '{expected}'")]
    CategoryMismatch { found: String, expected: String },

    #[error("finishings_code has {codes} entries but finishings_desc has {descs}")]
    FinishingLengthMismatch { codes: usize, descs: usize },
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub deviations: Vec<Deviation>,
}

impl ValidationReport {
    /// No deviations
    pub fn is_valid(&self) -> bool {
        self.deviations.is_empty()
    }

    /// Deviation messages in check order
    pub fn messages(&self) -> Vec<String> {
        self.deviations.iter().map(ToString::to_string).collect()
    }

    /// Composition total deviation, if any (live form indicator)
    pub fn composition_total(&self) -> Option<i64> {
        self.deviations.iter().find_map(|d| match d {
            Deviation::CompositionTotal { total } => Some(*total),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            Deviation::CompositionTotal { total: 92 }.to_string(),
            "composition total is 92%, needs 100%"
        );
        assert_eq!(
            Deviation::MixedFiberScheme {
                fiber: "PES".to_string(),
                scheme: FiberScheme::Iso,
                active: FiberScheme::Legacy,
            }
            .to_string(),
            "fiber code 'PES' belongs to the iso scheme, this record uses legacy"
        );
    }

    #[test]
    fn test_report_helpers() {
        let report = ValidationReport {
            deviations: vec![
                Deviation::UnknownWeaveCode { code: "XX".to_string() },
                Deviation::CompositionTotal { total: 120 },
            ],
        };
        assert!(!report.is_valid());
        assert_eq!(report.composition_total(), Some(120));
        assert_eq!(report.messages().len(), 2);
        assert!(ValidationReport::default().is_valid());
    }

    #[test]
    fn test_deviation_serializes_with_kind() {
        let value = serde_json::to_value(Deviation::CompositionTotal { total: 92 }).unwrap();
        assert_eq!(value["kind"], "composition_total");
        assert_eq!(value["total"], 92);
    }
}
