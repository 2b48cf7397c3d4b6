//! Classifier
//!
//! Derives `categoryMajor` from `fabric_code` by exact lookup in the weave
//! vocabulary. A code outside the vocabulary is repaired to the fallback
//! code (`ZZ`, family Etc) in place.
//!
//! # Fixed point
//! `classify(classify_repair(c)) == classify(c)` for every input: a known code
//! repairs to itself, an unknown one repairs to the fallback, whose label is
//! what `classify` reports for every unknown code anyway.
//!
//! # categoryMajor precedence
//! A supplied `categoryMajor` that disagrees with the derived label is
//! replaced, and the replaced value is returned in `ClassifyOutcome` so the
//! caller can surface it.

use crate::types::Classification;
use crate::vocabulary::{Vocabulary, WeaveFamily};
use std::sync::Arc;
use tracing::{debug, warn};

/// What `Classifier::apply` had to change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyOutcome {
    /// Code that was not in the vocabulary and got replaced by the fallback
    pub repaired_from: Option<String>,
    /// Non-empty `categoryMajor` that disagreed with the derived label
    pub overridden: Option<String>,
}

impl ClassifyOutcome {
    /// Nothing was changed except filling in derived values
    pub fn is_clean(&self) -> bool {
        self.repaired_from.is_none() && self.overridden.is_none()
    }
}

/// Weave code classifier bound to one vocabulary
#[derive(Debug, Clone)]
pub struct Classifier {
    vocabulary: Arc<Vocabulary>,
}

impl Classifier {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// Family of a known code
    pub fn family(&self, fabric_code: &str) -> Option<WeaveFamily> {
        self.vocabulary.weave_family(fabric_code)
    }

    /// Category label for a code; unknown codes get the fallback label
    pub fn classify(&self, fabric_code: &str) -> &'static str {
        self.family(fabric_code)
            .unwrap_or(WeaveFamily::Etc)
            .label()
    }

    /// Code to store for `fabric_code`: itself if known, else the fallback
    pub fn classify_repair<'a>(&'a self, fabric_code: &'a str) -> &'a str {
        if self.vocabulary.weave_family(fabric_code).is_some() {
            fabric_code
        } else {
            self.vocabulary.fallback_weave()
        }
    }

    /// Repair the code and derive `categoryMajor` in place
    ///
    /// An empty `fabric_name_kr` is filled with the conventional name of the
    /// (possibly repaired) code when the vocabulary has one.
    pub fn apply(&self, classification: &mut Classification) -> ClassifyOutcome {
        let mut outcome = ClassifyOutcome::default();

        let repaired = self.classify_repair(&classification.fabric_code).to_string();
        if repaired != classification.fabric_code {
            debug!(
                from = %classification.fabric_code,
                to = %repaired,
                "Unknown fabric code repaired to fallback"
            );
            outcome.repaired_from = Some(std::mem::replace(
                &mut classification.fabric_code,
                repaired,
            ));
        }

        let derived = self.classify(&classification.fabric_code);
        let supplied = classification.category_major.trim();
        if !supplied.is_empty() && supplied != derived {
            warn!(
                fabric_code = %classification.fabric_code,
                supplied,
                derived,
                "Supplied categoryMajor overridden by derived label"
            );
            outcome.overridden = Some(supplied.to_string());
        }
        classification.category_major = derived.to_string();

        if classification.fabric_name_kr.trim().is_empty() {
            if let Some(name) = self.vocabulary.weave_name(&classification.fabric_code) {
                classification.fabric_name_kr = name.to_string();
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::FiberScheme;

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(Vocabulary::standard(FiberScheme::Legacy)))
    }

    #[test]
    fn test_known_codes() {
        let c = classifier();
        assert_eq!(c.classify("PO"), "평직 (Plain)");
        assert_eq!(c.classify("TW"), "능직 (Twill)");
        assert_eq!(c.classify("SN"), "주자직 (Satin)");
        assert_eq!(c.classify("JA"), "변형 (Fancy)");
        assert_eq!(c.classify("KR"), "니트 (Knit)");
        assert_eq!(c.classify("ZZ"), "기타 (Etc)");
    }

    #[test]
    fn test_repair_unknown_code() {
        let c = classifier();
        let mut classification = Classification::new("XX", "");
        let outcome = c.apply(&mut classification);

        assert_eq!(classification.fabric_code, "ZZ");
        assert_eq!(classification.category_major(), "기타 (Etc)");
        assert_eq!(outcome.repaired_from.as_deref(), Some("XX"));
        assert!(outcome.overridden.is_none());
    }

    #[test]
    fn test_match_is_exact() {
        let c = classifier();
        assert_eq!(c.classify_repair("po"), "ZZ");
        assert_eq!(c.classify_repair(" PO"), "ZZ");
        assert_eq!(c.classify_repair("PO"), "PO");
    }

    #[test]
    fn test_repair_is_fixed_point() {
        let c = classifier();
        for code in ["PL", "XX", "", "zz", "CO", "KS", "??"] {
            assert_eq!(c.classify(c.classify_repair(code)), c.classify(code), "code {code:?}");
        }
    }

    #[test]
    fn test_disagreeing_category_is_overridden_and_reported() {
        let c = classifier();
        let mut classification = Classification::new("PO", "옥스포드");
        classification.category_major = "능직 (Twill)".to_string();

        let outcome = c.apply(&mut classification);
        assert_eq!(classification.category_major(), "평직 (Plain)");
        assert_eq!(outcome.overridden.as_deref(), Some("능직 (Twill)"));
        assert!(outcome.repaired_from.is_none());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let c = classifier();
        let mut classification = Classification::new("QQ", "");
        c.apply(&mut classification);
        let once = classification.clone();

        let outcome = c.apply(&mut classification);
        assert_eq!(classification, once);
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_fills_missing_name() {
        let c = classifier();
        let mut classification = Classification::new("PR", "");
        c.apply(&mut classification);
        assert_eq!(classification.fabric_name_kr, "립스탑");

        let mut named = Classification::new("PR", "나일론 립스탑");
        c.apply(&mut named);
        assert_eq!(named.fabric_name_kr, "나일론 립스탑");
    }

    #[test]
    fn test_alternate_vocabulary() {
        let vocab = Vocabulary::builder(FiberScheme::Legacy)
            .weave("PL", WeaveFamily::Plain)
            .weave("OT", WeaveFamily::Etc)
            .fallback_weave("OT")
            .build()
            .unwrap();
        let c = Classifier::new(Arc::new(vocab));

        let mut classification = Classification::new("TW", "");
        let outcome = c.apply(&mut classification);
        assert_eq!(classification.fabric_code, "OT");
        assert_eq!(outcome.repaired_from.as_deref(), Some("TW"));
    }
}
