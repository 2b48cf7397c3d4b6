//! Rule Extractor
//!
//! Deterministic draft producer. No I/O, no randomness: the same input and
//! vocabulary always yield the same record.
//!
//! # Passes
//! Each pass reads a working copy of the input in which everything consumed
//! by an earlier pass has been blanked out (byte offsets are preserved):
//! 1. yarn span → `disambiguator`
//! 2. compositions → `composition::infer_compositions`
//! 3. width with a unit (`58/60"`, `58/60 inch`)
//! 4. density (`228T`)
//! 5. weight (`120GSM`, `90g/y`)
//! 6. bare width range (`58/60`, plausibility-checked)
//! 7. finishing codes
//! 8. weave / construction keywords
//!
//! Whatever is left becomes `meta.etc_info`.

use super::composition::infer_compositions;
use super::{finish_draft, ExtractionError, Extractor};
use crate::classifier::Classifier;
use crate::disambiguator::{classify_token, disambiguate, split_segments, tokens, YarnToken};
use crate::types::{
    Classification, Meta, PhysicalSpec, SpecRecord, YarnSide, YarnSpec,
};
use crate::vocabulary::{Vocabulary, FALLBACK_WEAVE_CODE};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, warn};

/// Weave code when no keyword is present
const DEFAULT_WEAVE_CODE: &str = "PL";

/// (pattern, weave code, construction name), scanned in priority order
const WEAVE_KEYWORDS: [(&str, &str, &str); 23] = [
    ("oxford", "PO", "Oxford"),
    (r"rip[\s-]?stop", "PR", "Ripstop"),
    ("twill", "TW", "Twill"),
    ("satin", "SA", "Satin"),
    ("dobby", "DO", "Dobby"),
    ("jersey", "KS", "Jersey"),
    ("taslan", "PL", "Taslan"),
    ("taffeta", "PL", "Taffeta"),
    ("plain", "PL", "Plain"),
    ("jacquard", FALLBACK_WEAVE_CODE, "Jacquard"),
    ("velvet", FALLBACK_WEAVE_CODE, "Velvet"),
    ("corduroy", FALLBACK_WEAVE_CODE, "Corduroy"),
    ("herringbone", FALLBACK_WEAVE_CODE, "Herringbone"),
    ("seersucker", FALLBACK_WEAVE_CODE, "Seersucker"),
    ("interlock", FALLBACK_WEAVE_CODE, "Interlock"),
    ("rib", FALLBACK_WEAVE_CODE, "Rib"),
    ("terry", FALLBACK_WEAVE_CODE, "Terry"),
    ("tricot", FALLBACK_WEAVE_CODE, "Tricot"),
    ("mesh", FALLBACK_WEAVE_CODE, "Mesh"),
    ("fleece", FALLBACK_WEAVE_CODE, "Fleece"),
    ("crepe", FALLBACK_WEAVE_CODE, "Crepe"),
    ("chiffon", FALLBACK_WEAVE_CODE, "Chiffon"),
    ("georgette", FALLBACK_WEAVE_CODE, "Georgette"),
];

static WEAVE_PATTERNS: Lazy<Vec<(Regex, &'static str, &'static str)>> = Lazy::new(|| {
    WEAVE_KEYWORDS
        .iter()
        .map(|(pattern, code, name)| {
            let regex = Regex::new(&format!(r"(?i)\b{pattern}\b")).expect("static regex");
            (regex, *code, *name)
        })
        .collect()
});

static WIDTH_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\d{2,3}(?:\.\d+)?(?:\s*/\s*\d{2,3}(?:\.\d+)?)?)\s*(?:"|”|inch(?:es)?\b)"#)
        .expect("static regex")
});

static BARE_WIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2,3})\s*/\s*(\d{2,3})\b").expect("static regex"));

static DENSITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{2,4})T\b").expect("static regex"));

static WEIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:gsm|g/y)\b").expect("static regex")
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("static regex"));

/// Deterministic rule-based extractor
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    vocabulary: Arc<Vocabulary>,
    classifier: Classifier,
}

impl RuleExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        let classifier = Classifier::new(Arc::clone(&vocabulary));
        Self {
            vocabulary,
            classifier,
        }
    }

    /// Parse `raw` into a draft record
    pub fn parse(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
        if raw.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let mut work = Workspace::new(raw);

        // 1. Yarn
        let yarn_spec = match find_yarn_span(raw) {
            Some(span) => {
                work.blank(span.clone());
                match disambiguate(&raw[span]) {
                    Ok(spec) => spec,
                    Err(e) => {
                        warn!(error = %e, "Yarn span kept as raw text");
                        e.fallback
                    }
                }
            }
            None => YarnSpec::default(),
        };

        // 2. Compositions
        let inference = infer_compositions(work.text(), &self.vocabulary);
        for span in &inference.consumed {
            work.blank(span.clone());
        }

        // 3-6. Physical
        let mut physical = PhysicalSpec::default();
        if let Some((value, span)) = first_capture(&WIDTH_WITH_UNIT, work.text()) {
            physical.width_inch = Some(strip_whitespace(&value));
            work.blank(span);
        }
        if let Some((value, span)) = first_capture(&DENSITY, work.text()) {
            physical.density_total = value.parse().ok();
            work.blank(span);
        }
        if let Some((value, span)) = first_capture(&WEIGHT, work.text()) {
            physical.weight_gsm = value.parse().ok();
            work.blank(span);
        }
        if physical.width_inch.is_none() {
            if let Some((width, span)) = plausible_bare_width(work.text()) {
                physical.width_inch = Some(width);
                work.blank(span);
            }
        }

        // 7. Finishings
        let words: Vec<(String, Range<usize>)> = WORD
            .find_iter(work.text())
            .map(|m| (m.as_str().to_ascii_uppercase(), m.range()))
            .collect();
        for (word, span) in words {
            if let Some(desc) = self.vocabulary.finishing_desc(&word) {
                if !physical.finishings_code.contains(&word) {
                    physical.finishings_code.push(word);
                    physical.finishings_desc.push(desc.to_string());
                }
                work.blank(span);
            }
        }

        // 8. Weave
        let mut weave: Option<(&str, &str)> = None;
        for (regex, code, name) in WEAVE_PATTERNS.iter() {
            let spans: Vec<Range<usize>> = regex.find_iter(work.text()).map(|m| m.range()).collect();
            if !spans.is_empty() && weave.is_none() {
                weave = Some((*code, *name));
            }
            for span in spans {
                work.blank(span);
            }
        }
        let (fabric_code, construction_type) = weave.unwrap_or((DEFAULT_WEAVE_CODE, ""));

        let classification = Classification::new(
            fabric_code,
            self.vocabulary.weave_name(fabric_code).unwrap_or_default(),
        );

        let mut record = SpecRecord {
            meta: Meta {
                original_text: raw.to_string(),
                etc_info: work.leftovers(),
                ai_analysis_kr: String::new(),
                predicted_material: inference.predicted_material(),
                construction_type: construction_type.to_string(),
                fiber_scheme: self.vocabulary.scheme(),
            },
            compositions: inference.compositions,
            yarn_spec,
            physical_spec: physical,
            classification,
        };
        record.meta.ai_analysis_kr = summarize_kr(&record);

        debug!(
            fabric_code = %record.classification.fabric_code,
            compositions = record.compositions.len(),
            etc_info = %record.meta.etc_info,
            "Rule extraction complete"
        );

        finish_draft(record, raw, &self.classifier)
    }
}

#[async_trait]
impl Extractor for RuleExtractor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
        self.parse(raw)
    }
}

/// Input copy with consumed ranges replaced by spaces
struct Workspace {
    text: String,
}

impl Workspace {
    fn new(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
        }
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn blank(&mut self, span: Range<usize>) {
        let width = span.len();
        self.text.replace_range(span, &" ".repeat(width));
    }

    /// Unconsumed chunks with separator punctuation trimmed
    fn leftovers(&self) -> String {
        self.text
            .split_whitespace()
            .map(|chunk| chunk.trim_matches(|c: char| matches!(c, '/' | ',' | ';' | '*' | '+' | '|')))
            .filter(|chunk| chunk.chars().any(char::is_alphanumeric))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Byte ranges of whitespace-separated chunks
fn chunk_ranges(text: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push(s..i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(s..text.len());
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkKind {
    /// Only yarn tokens, at least one count
    Count,
    /// Only process / luster tokens
    Yarn,
    /// No tokens at all (`*`, `x`, `/`)
    Separator,
    Other,
}

fn chunk_kind(chunk: &str) -> ChunkKind {
    let mut has_count = false;
    let mut has_token = false;
    for segment in split_segments(chunk) {
        for token in tokens(segment) {
            has_token = true;
            match classify_token(token) {
                YarnToken::Denier(_) | YarnToken::Filament(_) => has_count = true,
                YarnToken::Process(_) | YarnToken::Luster(_) => {}
                YarnToken::Other => return ChunkKind::Other,
            }
        }
    }
    match (has_token, has_count) {
        (false, _) => ChunkKind::Separator,
        (true, true) => ChunkKind::Count,
        (true, false) => ChunkKind::Yarn,
    }
}

/// Yarn span: from the first count chunk through the last yarn chunk of the
/// unbroken run that follows it
fn find_yarn_span(raw: &str) -> Option<Range<usize>> {
    let chunks = chunk_ranges(raw);
    let first = chunks
        .iter()
        .position(|r| chunk_kind(&raw[r.clone()]) == ChunkKind::Count)?;

    let mut end = chunks[first].end;
    for range in &chunks[first + 1..] {
        match chunk_kind(&raw[range.clone()]) {
            ChunkKind::Count | ChunkKind::Yarn => end = range.end,
            ChunkKind::Separator => {}
            ChunkKind::Other => break,
        }
    }
    Some(chunks[first].start..end)
}

fn first_capture(regex: &Regex, text: &str) -> Option<(String, Range<usize>)> {
    let caps = regex.captures(text)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(0)?.range()))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `a/b` counts as a width when 36 <= a < b <= a + 4 and a + b != 100
fn plausible_bare_width(text: &str) -> Option<(String, Range<usize>)> {
    BARE_WIDTH.captures_iter(text).find_map(|caps| {
        let a: u32 = caps.get(1)?.as_str().parse().ok()?;
        let b: u32 = caps.get(2)?.as_str().parse().ok()?;
        if a >= 36 && a < b && b <= a + 4 && a + b != 100 {
            Some((format!("{a}/{b}"), caps.get(0)?.range()))
        } else {
            None
        }
    })
}

fn describe_side(label: &str, side: &YarnSide) -> Option<String> {
    let denier = side.denier?;
    let mut text = format!("{label} {denier}D");
    if let Some(filament) = side.filament {
        text.push_str(&format!("/{filament}F"));
    }
    if let Some(process) = side.process_type {
        text.push_str(&format!(" {process}"));
    }
    Some(text)
}

/// Short Korean description of a parsed record
fn summarize_kr(record: &SpecRecord) -> String {
    let mut sentences = Vec::new();

    let name = if record.classification.fabric_name_kr.is_empty() {
        "직물"
    } else {
        record.classification.fabric_name_kr.as_str()
    };
    sentences.push(format!("{} 소재의 {} 원단입니다.", record.meta.predicted_material, name));

    let yarn: Vec<String> = [
        describe_side("경사", &record.yarn_spec.warp),
        describe_side("위사", &record.yarn_spec.weft),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !yarn.is_empty() {
        sentences.push(format!("원사 구성은 {}입니다.", yarn.join(", ")));
    }

    let physical = &record.physical_spec;
    let mut facts = Vec::new();
    if let Some(density) = physical.density_total {
        facts.push(format!("밀도 {density}T"));
    }
    if let Some(weight) = physical.weight_gsm {
        facts.push(format!("중량 {weight}GSM"));
    }
    if let Some(width) = &physical.width_inch {
        facts.push(format!("폭 {width}인치"));
    }
    if !facts.is_empty() {
        sentences.push(format!("{}입니다.", facts.join(", ")));
    }

    if !physical.finishings_desc.is_empty() {
        sentences.push(format!(
            "{} 가공이 적용되어 있습니다.",
            physical.finishings_desc.join(", ")
        ));
    }

    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Composition, Luster, ProcessType};
    use crate::vocabulary::FiberScheme;

    fn extractor() -> RuleExtractor {
        RuleExtractor::new(Arc::new(Vocabulary::standard(FiberScheme::Legacy)))
    }

    #[test]
    fn test_full_specification_line() {
        let raw = "70D/36F FDY FD*160D/96F ATY FD 228T/ 120GSM/ PD WR/ TASLAN";
        let record = extractor().parse(raw).unwrap();

        assert_eq!(record.meta.original_text, raw);
        assert_eq!(record.yarn_spec.warp.raw_text, "70D/36F FDY FD");
        assert_eq!(record.yarn_spec.warp.process_type, Some(ProcessType::Fdy));
        assert_eq!(record.yarn_spec.warp.luster, Some(Luster::Fd));
        assert_eq!(record.yarn_spec.weft.raw_text, "160D/96F ATY FD");
        assert_eq!(record.yarn_spec.weft.denier, Some(160));
        assert_eq!(record.physical_spec.density_total, Some(228.0));
        assert_eq!(record.physical_spec.weight_gsm, Some(120.0));
        assert_eq!(record.physical_spec.finishings_code, vec!["PD", "WR"]);
        assert_eq!(
            record.physical_spec.finishings_desc,
            vec!["Plain Dyed", "Water Repellent"]
        );
        assert_eq!(record.compositions, vec![Composition::new("NA", 100)]);
        assert_eq!(record.classification.fabric_code, "PL");
        assert_eq!(record.meta.construction_type, "Taslan");
        assert_eq!(record.meta.predicted_material, "Nylon");
        assert_eq!(record.meta.etc_info, "");
        assert!(record.meta.ai_analysis_kr.starts_with("Nylon 소재의 기본 평직 원단입니다."));
    }

    #[test]
    fn test_oxford_beats_twill() {
        let record = extractor().parse("Twill Oxford 300D").unwrap();
        assert_eq!(record.classification.fabric_code, "PO");
        assert_eq!(record.meta.construction_type, "Oxford");
    }

    #[test]
    fn test_width_forms() {
        let quoted = extractor().parse("Nylon 58/60\" 120GSM").unwrap();
        assert_eq!(quoted.physical_spec.width_inch.as_deref(), Some("58/60"));

        let inch = extractor().parse("Nylon 58/60 inch").unwrap();
        assert_eq!(inch.physical_spec.width_inch.as_deref(), Some("58/60"));

        let bare = extractor().parse("Nylon 58/60").unwrap();
        assert_eq!(bare.physical_spec.width_inch.as_deref(), Some("58/60"));

        let single = extractor().parse("Cotton 44\"").unwrap();
        assert_eq!(single.physical_spec.width_inch.as_deref(), Some("44"));
    }

    #[test]
    fn test_bare_ratio_is_not_width() {
        let record = extractor().parse("48/52 something").unwrap();
        assert_eq!(record.physical_spec.width_inch, None);
    }

    #[test]
    fn test_weight_per_yard() {
        let record = extractor().parse("Polyester 90g/y").unwrap();
        assert_eq!(record.physical_spec.weight_gsm, Some(90.0));
    }

    #[test]
    fn test_construction_keyword_maps_to_fallback() {
        let record = extractor().parse("Polyester Jacquard").unwrap();
        assert_eq!(record.classification.fabric_code, "ZZ");
        assert_eq!(record.meta.construction_type, "Jacquard");
    }

    #[test]
    fn test_no_keyword_defaults_to_plain() {
        let record = extractor().parse("75D/72F DTY SD 190T").unwrap();
        assert_eq!(record.classification.fabric_code, "PL");
        assert_eq!(record.meta.construction_type, "");
        assert_eq!(record.compositions, vec![Composition::new("PE", 100)]);
    }

    #[test]
    fn test_leftovers_go_to_etc_info() {
        let record = extractor().parse("Nylon Ripstop 70D MADE IN KOREA").unwrap();
        assert_eq!(record.classification.fabric_code, "PR");
        assert_eq!(record.meta.etc_info, "MADE IN KOREA");
    }

    #[test]
    fn test_x_separated_yarn() {
        let record = extractor().parse("Cotton 40D x 40D twill").unwrap();
        assert_eq!(record.yarn_spec.warp.denier, Some(40));
        assert_eq!(record.yarn_spec.weft.denier, Some(40));
        assert_eq!(record.classification.fabric_code, "TW");
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(extractor().parse("   "), Err(ExtractionError::EmptyInput));
    }

    #[test]
    fn test_spelled_out_blend_ratio() {
        let record = extractor().parse("Polyester/Cotton 65/35 twill").unwrap();
        assert_eq!(
            record.compositions,
            vec![Composition::new("PE", 65), Composition::new("CO", 35)]
        );
        assert!(!record.meta.etc_info.contains("65/35"));
    }

    #[test]
    fn test_deterministic() {
        let raw = "C/N 60/40 Oxford 58/60\" WR";
        assert_eq!(extractor().parse(raw), extractor().parse(raw));
    }
}
