//! Record Validator
//!
//! Runs every record check against one vocabulary and collects deviations in
//! a fixed order (composition, fibers, classification, finishings).

use super::{Deviation, ValidationReport};
use crate::classifier::Classifier;
use crate::types::{composition_total, Composition, SpecRecord};
use crate::vocabulary::Vocabulary;
use std::sync::Arc;
use tracing::debug;

/// Composition invariants alone
///
/// Used both by the full validator and by the live form indicator.
pub fn composition_deviations(compositions: &[Composition]) -> Vec<Deviation> {
    if compositions.is_empty() {
        return vec![Deviation::EmptyComposition];
    }

    let mut deviations: Vec<Deviation> = compositions
        .iter()
        .enumerate()
        .filter(|(_, c)| !(0..=100).contains(&c.percentage))
        .map(|(index, c)| Deviation::PercentageOutOfRange {
            index,
            fiber: c.fiber_type.clone(),
            percentage: c.percentage,
        })
        .collect();

    let total = composition_total(compositions);
    if total != 100 {
        deviations.push(Deviation::CompositionTotal { total });
    }
    deviations
}

/// Validator bound to one vocabulary
#[derive(Debug, Clone)]
pub struct RecordValidator {
    vocabulary: Arc<Vocabulary>,
    classifier: Classifier,
}

impl RecordValidator {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        let classifier = Classifier::new(Arc::clone(&vocabulary));
        Self {
            vocabulary,
            classifier,
        }
    }

    /// Validate `record`; never fails
    pub fn validate(&self, record: &SpecRecord) -> ValidationReport {
        let mut deviations = composition_deviations(&record.compositions);
        self.check_fibers(record, &mut deviations);
        self.check_classification(record, &mut deviations);
        check_finishings(record, &mut deviations);

        debug!(
            deviations = deviations.len(),
            fabric_code = %record.classification.fabric_code,
            "Record validated"
        );

        ValidationReport { deviations }
    }

    fn check_fibers(&self, record: &SpecRecord, deviations: &mut Vec<Deviation>) {
        let active = self.vocabulary.scheme();
        if record.meta.fiber_scheme != active {
            deviations.push(Deviation::SchemeTagMismatch {
                record: record.meta.fiber_scheme,
                active,
            });
        }

        for composition in &record.compositions {
            let code = composition.fiber_type.as_str();
            if self.vocabulary.is_fiber(code) {
                continue;
            }
            match self.vocabulary.foreign_scheme_of(code) {
                Some(scheme) => deviations.push(Deviation::MixedFiberScheme {
                    fiber: code.to_string(),
                    scheme,
                    active,
                }),
                None => deviations.push(Deviation::NonNormalizedFiber {
                    fiber: code.to_string(),
                    active,
                }),
            }
        }
    }

    fn check_classification(&self, record: &SpecRecord, deviations: &mut Vec<Deviation>) {
        let classification = &record.classification;
        if self.classifier.family(&classification.fabric_code).is_none() {
            deviations.push(Deviation::UnknownWeaveCode {
                code: classification.fabric_code.clone(),
            });
        }

        let expected = self.classifier.classify(&classification.fabric_code);
        if classification.category_major() != expected {
            deviations.push(Deviation::CategoryMismatch {
                found: classification.category_major().to_string(),
                expected: expected.to_string(),
            });
        }
    }
}

fn check_finishings(record: &SpecRecord, deviations: &mut Vec<Deviation>) {
    let codes = record.physical_spec.finishings_code.len();
    let descs = record.physical_spec.finishings_desc.len();
    if codes != descs {
        deviations.push(Deviation::FinishingLengthMismatch { codes, descs });
    }
}
