//! Composition inference from free text
//!
//! Tried in order; the first strategy that yields fibers wins:
//! 1. **Combined** notation: `C/N 60/40`, `T/C 65/35` (split in stated order)
//! 2. **Explicit** pairs: `Nylon 100%`, `60% Cotton 40% Nylon`
//! 3. **Named** fibers without any ratio: one fiber → 100, several → even
//!    split with the remainder on the first
//! 4. **Hinted**: no fiber at all, `Taslan`/`Cordura` present → Nylon 100
//! 5. **Default**: Polyester 100
//!
//! Every strategy returns at least one composition.

use crate::types::Composition;
use crate::vocabulary::{Fiber, FiberScheme, Vocabulary};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// Spelled-out fiber names (lowercase)
const FIBER_NAMES: [(&str, Fiber); 19] = [
    ("nylon", Fiber::Nylon),
    ("polyamide", Fiber::Nylon),
    ("polyester", Fiber::Polyester),
    ("cotton", Fiber::Cotton),
    ("linen", Fiber::Linen),
    ("wool", Fiber::Wool),
    ("silk", Fiber::Silk),
    ("polyurethane", Fiber::Polyurethane),
    ("spandex", Fiber::Elastane),
    ("elastane", Fiber::Elastane),
    ("lycra", Fiber::Elastane),
    ("acrylic", Fiber::Acrylic),
    ("viscose", Fiber::Viscose),
    ("rayon", Fiber::Viscose),
    ("modal", Fiber::Modal),
    ("lyocell", Fiber::Lyocell),
    ("tencel", Fiber::Lyocell),
    ("microfiber", Fiber::Microfiber),
    ("cashmere", Fiber::Cashmere),
];

/// Trade abbreviations used in combined notation (`T/C` is polyester/cotton)
const ABBREVIATIONS: [(&str, Fiber); 9] = [
    ("C", Fiber::Cotton),
    ("N", Fiber::Nylon),
    ("P", Fiber::Polyester),
    ("T", Fiber::Polyester),
    ("R", Fiber::Viscose),
    ("L", Fiber::Linen),
    ("W", Fiber::Wool),
    ("SP", Fiber::Elastane),
    ("SPAN", Fiber::Elastane),
];

static COMBINED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z]+(?:\s*/\s*[a-z]+)+)\s*(\d{1,3}(?:\s*/\s*\d{1,3})+)\b")
        .expect("static regex")
});

static PERCENT_THEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*%\s*([a-z]+)\b").expect("static regex"));

static NAME_THEN_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([a-z]+)\s*(\d{1,3})\s*%").expect("static regex"));

static FIBER_NAME: Lazy<Regex> = Lazy::new(|| {
    let names: Vec<&str> = FIBER_NAMES.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(r"(?i)\b({})\b", names.join("|"))).expect("static regex")
});

static NYLON_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(taslan|cordura)\b").expect("static regex"));

/// Which strategy produced the compositions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceSource {
    Combined,
    Explicit,
    Named,
    Hinted,
    Default,
}

/// Inferred compositions plus the input spans they were read from
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub compositions: Vec<Composition>,
    pub fibers: Vec<Fiber>,
    pub source: InferenceSource,
    /// Byte ranges of `text` consumed by the inference
    pub consumed: Vec<Range<usize>>,
}

impl Inference {
    /// English material name (`Cotton/Nylon`)
    pub fn predicted_material(&self) -> String {
        self.fibers
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Resolve a spelled-out fiber name
pub fn fiber_by_name(word: &str) -> Option<Fiber> {
    let lower = word.to_ascii_lowercase();
    FIBER_NAMES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, fiber)| *fiber)
}

/// Resolve a name, trade abbreviation, or code of either scheme
fn fiber_by_token(token: &str) -> Option<Fiber> {
    let upper = token.trim().to_ascii_uppercase();
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == upper)
        .map(|(_, fiber)| *fiber)
        .or_else(|| Fiber::from_code(&upper, FiberScheme::Legacy))
        .or_else(|| Fiber::from_code(&upper, FiberScheme::Iso))
        .or_else(|| fiber_by_name(token.trim()))
}

/// Infer compositions from `text`
pub fn infer_compositions(text: &str, vocabulary: &Vocabulary) -> Inference {
    let (pairs, consumed, source) = if let Some((pairs, span)) = combined(text) {
        (pairs, vec![span], InferenceSource::Combined)
    } else if let Some((pairs, spans)) = explicit(text) {
        (pairs, spans, InferenceSource::Explicit)
    } else if let Some((fibers, spans)) = named(text) {
        (even_split(&fibers), spans, InferenceSource::Named)
    } else if NYLON_HINT.is_match(text) {
        (vec![(Fiber::Nylon, 100)], Vec::new(), InferenceSource::Hinted)
    } else {
        (vec![(Fiber::Polyester, 100)], Vec::new(), InferenceSource::Default)
    };

    let compositions = pairs
        .iter()
        .map(|(fiber, pct)| {
            let code = vocabulary
                .code_for(*fiber)
                .unwrap_or_else(|| fiber.code(vocabulary.scheme()));
            Composition::new(code, *pct)
        })
        .collect();

    debug!(?source, ?pairs, "Compositions inferred");

    Inference {
        compositions,
        fibers: pairs.iter().map(|(fiber, _)| *fiber).collect(),
        source,
        consumed,
    }
}

fn split_list(s: &str) -> Vec<&str> {
    s.split('/').map(str::trim).collect()
}

fn combined(text: &str) -> Option<(Vec<(Fiber, i32)>, Range<usize>)> {
    for caps in COMBINED.captures_iter(text) {
        let names = split_list(&caps[1]);
        let ratios = split_list(&caps[2]);
        if names.len() != ratios.len() {
            continue;
        }

        let fibers: Option<Vec<Fiber>> = names.iter().map(|n| fiber_by_token(n)).collect();
        let ratios: Option<Vec<i32>> = ratios.iter().map(|r| r.parse().ok()).collect();
        if let (Some(fibers), Some(ratios)) = (fibers, ratios) {
            if ratios.iter().sum::<i32>() == 100 {
                let whole = caps.get(0).map(|m| m.range())?;
                return Some((fibers.into_iter().zip(ratios).collect(), whole));
            }
        }
    }
    None
}

/// Resolvable (fiber, pct, span) matches of one pair pattern
fn pairs_of(
    pattern: &Regex,
    text: &str,
    name_group: usize,
    pct_group: usize,
) -> Vec<(Fiber, i32, Range<usize>)> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let fiber = fiber_by_token(caps.get(name_group)?.as_str())?;
            let pct = caps.get(pct_group)?.as_str().parse().ok()?;
            Some((fiber, pct, caps.get(0)?.range()))
        })
        .collect()
}

fn explicit(text: &str) -> Option<(Vec<(Fiber, i32)>, Vec<Range<usize>>)> {
    let leading = pairs_of(&PERCENT_THEN_NAME, text, 2, 1);
    let trailing = pairs_of(&NAME_THEN_PERCENT, text, 1, 2);

    // Whichever style starts first is the one the text is written in
    let start = |v: &[(Fiber, i32, Range<usize>)]| v.first().map(|(_, _, r)| r.start);
    let chosen = match (start(leading.as_slice()), start(trailing.as_slice())) {
        (Some(a), Some(b)) if b < a => trailing,
        (Some(_), _) => leading,
        (None, Some(_)) => trailing,
        (None, None) => return None,
    };

    let mut pairs: Vec<(Fiber, i32)> = Vec::new();
    let mut spans = Vec::new();
    for (fiber, pct, span) in chosen {
        if !pairs.iter().any(|(f, _)| *f == fiber) {
            pairs.push((fiber, pct));
        }
        spans.push(span);
    }
    Some((pairs, spans))
}

fn named(text: &str) -> Option<(Vec<Fiber>, Vec<Range<usize>>)> {
    let mut fibers = Vec::new();
    let mut spans = Vec::new();
    for m in FIBER_NAME.find_iter(text) {
        if let Some(fiber) = fiber_by_name(m.as_str()) {
            if !fibers.contains(&fiber) {
                fibers.push(fiber);
            }
            spans.push(m.range());
        }
    }
    (!fibers.is_empty()).then_some((fibers, spans))
}

/// 100 split evenly, remainder on the first fiber
fn even_split(fibers: &[Fiber]) -> Vec<(Fiber, i32)> {
    let n = fibers.len() as i32;
    let share = 100 / n;
    let remainder = 100 % n;
    fibers
        .iter()
        .enumerate()
        .map(|(i, fiber)| (*fiber, if i == 0 { share + remainder } else { share }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> Vocabulary {
        Vocabulary::standard(FiberScheme::Legacy)
    }

    fn codes(inference: &Inference) -> Vec<(String, i32)> {
        inference
            .compositions
            .iter()
            .map(|c| (c.fiber_type.clone(), c.percentage))
            .collect()
    }

    #[test]
    fn test_single_name_is_100() {
        let inference = infer_compositions("Nylon", &legacy());
        assert_eq!(codes(&inference), vec![("NA".to_string(), 100)]);
        assert_eq!(inference.source, InferenceSource::Named);
        assert_eq!(inference.predicted_material(), "Nylon");
    }

    #[test]
    fn test_combined_notation_keeps_order() {
        let inference = infer_compositions("C/N 60/40 oxford", &legacy());
        assert_eq!(
            codes(&inference),
            vec![("CO".to_string(), 60), ("NA".to_string(), 40)]
        );
        assert_eq!(inference.source, InferenceSource::Combined);
        assert_eq!(inference.consumed, vec![0..9]);
    }

    #[test]
    fn test_combined_notation_with_full_names() {
        let inference = infer_compositions("Polyester/Cotton 65/35", &legacy());
        assert_eq!(
            codes(&inference),
            vec![("PE".to_string(), 65), ("CO".to_string(), 35)]
        );
        assert_eq!(inference.source, InferenceSource::Combined);
        assert_eq!(inference.consumed, vec![0..22]);

        let inference = infer_compositions("Nylon/Spandex 90/10 jersey", &legacy());
        assert_eq!(
            codes(&inference),
            vec![("NA".to_string(), 90), ("EL".to_string(), 10)]
        );
        assert_eq!(inference.predicted_material(), "Nylon/Elastane");
    }

    #[test]
    fn test_combined_needs_full_total() {
        // 58/60 is a width, not a ratio
        let inference = infer_compositions("N/C 58/60", &legacy());
        assert_ne!(inference.source, InferenceSource::Combined);
    }

    #[test]
    fn test_explicit_pairs_both_styles() {
        let inference = infer_compositions("Nylon 100%", &legacy());
        assert_eq!(codes(&inference), vec![("NA".to_string(), 100)]);
        assert_eq!(inference.source, InferenceSource::Explicit);

        let inference = infer_compositions("60% Cotton 40% Nylon", &legacy());
        assert_eq!(
            codes(&inference),
            vec![("CO".to_string(), 60), ("NA".to_string(), 40)]
        );

        let inference = infer_compositions("Cotton 60% Nylon 40%", &legacy());
        assert_eq!(
            codes(&inference),
            vec![("CO".to_string(), 60), ("NA".to_string(), 40)]
        );
    }

    #[test]
    fn test_names_without_ratio_split_evenly() {
        let inference = infer_compositions("cotton nylon spandex blend", &legacy());
        assert_eq!(
            codes(&inference),
            vec![
                ("CO".to_string(), 34),
                ("NA".to_string(), 33),
                ("EL".to_string(), 33)
            ]
        );
    }

    #[test]
    fn test_hint_and_default() {
        let hinted = infer_compositions("228T TASLAN WR", &legacy());
        assert_eq!(codes(&hinted), vec![("NA".to_string(), 100)]);
        assert_eq!(hinted.source, InferenceSource::Hinted);
        assert!(hinted.consumed.is_empty());

        let default = infer_compositions("75D DTY 190T", &legacy());
        assert_eq!(codes(&default), vec![("PE".to_string(), 100)]);
        assert_eq!(default.source, InferenceSource::Default);
    }

    #[test]
    fn test_codes_follow_active_scheme() {
        let iso = Vocabulary::standard(FiberScheme::Iso);
        let inference = infer_compositions("T/C 65/35", &iso);
        assert_eq!(
            codes(&inference),
            vec![("PES".to_string(), 65), ("CO".to_string(), 35)]
        );
    }
}
