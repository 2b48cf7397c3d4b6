//! Token Disambiguator
//!
//! Parses a raw yarn-count string (`70D/36F FDY FD*160D/96F ATY FD`) into a
//! warp and a weft `YarnSide`.
//!
//! # Segmentation
//! The string is split on the warp/weft separator: `*`, or an `x`/`X` that
//! either stands alone between whitespace or is directly followed by a digit
//! after whitespace, a digit, or a count token (`70Dx160D`). An `x` inside a
//! word (`TEX10`, `TEXTURED`) never separates.
//! - one segment (or none): weft is empty, not an error
//! - two segments: warp, weft
//! - more than two: `SegmentationError`, carrying a fallback pair that keeps
//!   the whole input as warp `raw_text` with every typed field null
//!
//! # Token precedence (per segment)
//! Tokens are maximal ASCII-alphanumeric runs.
//! 1. `<int>D` → denier, `<int>F` → filament (digits and suffix only)
//! 2. process type: FDY, DTY, ATY, ITY
//! 3. luster: FD, SD, BR, TKT, only among tokens step 2 did not consume
//! 4. anything else stays in `raw_text` only
//!
//! Because tokens are whole runs, `FDY` can never be read as `FD` + `Y`, and
//! a span consumed as a process type is never offered to the luster step.
//! The first match per field wins.

use crate::types::{Luster, ProcessType, YarnSide, YarnSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

/// `<digits><D|F>` as a whole token
static COUNT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(\d+)([DF])$").expect("static regex"));

/// Raw yarn string had more than one warp/weft separator
#[derive(Debug, Clone, Error, PartialEq)]
#[error("expected at most 2 warp/weft segments, found {segments} in '{raw}'")]
pub struct SegmentationError {
    pub segments: usize,
    pub raw: String,
    /// Information-preserving result to use in place of a parse
    pub fallback: YarnSpec,
}

/// Classification of one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YarnToken {
    Denier(u32),
    Filament(u32),
    Process(ProcessType),
    Luster(Luster),
    Other,
}

/// Classify a single alphanumeric token in precedence order
pub fn classify_token(token: &str) -> YarnToken {
    if let Some(caps) = COUNT_TOKEN.captures(token) {
        if let Ok(value) = caps[1].parse::<u32>() {
            return match caps[2].to_ascii_uppercase().as_str() {
                "D" => YarnToken::Denier(value),
                _ => YarnToken::Filament(value),
            };
        }
    }
    if let Some(process) = ProcessType::from_token(token) {
        return YarnToken::Process(process);
    }
    if let Some(luster) = Luster::from_token(token) {
        return YarnToken::Luster(luster);
    }
    YarnToken::Other
}

/// Whether `token` is part of the yarn vocabulary (count, process, luster)
pub fn is_yarn_token(token: &str) -> bool {
    classify_token(token) != YarnToken::Other
}

/// Split `text` into maximal alphanumeric runs
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Split a yarn string into warp/weft segments (trimmed, not filtered)
pub fn split_segments(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        let is_separator = match b {
            b'*' => true,
            b'x' | b'X' => {
                let prev_space = i == 0 || bytes[i - 1].is_ascii_whitespace();
                let next = bytes.get(i + 1).copied();
                let next_space = next.map_or(true, |n| n.is_ascii_whitespace());
                let next_digit = next.map_or(false, |n| n.is_ascii_digit());
                // "70Dx160D": x follows a count token and precedes a digit
                let prev_count = i >= 2
                    && matches!(bytes[i - 1].to_ascii_uppercase(), b'D' | b'F')
                    && bytes[i - 2].is_ascii_digit();
                (prev_space && next_space)
                    || (next_digit && (prev_space || prev_count || bytes[i - 1].is_ascii_digit()))
            }
            _ => false,
        };
        if is_separator {
            segments.push(raw[start..i].trim());
            start = i + 1;
        }
    }
    segments.push(raw[start..].trim());
    segments
}

/// Parse one segment into a `YarnSide`
pub fn parse_side(segment: &str) -> YarnSide {
    let mut side = YarnSide {
        raw_text: segment.to_string(),
        ..Default::default()
    };

    let mut leftovers = Vec::new();
    for token in tokens(segment) {
        match classify_token(token) {
            YarnToken::Denier(d) if side.denier.is_none() => side.denier = Some(d),
            YarnToken::Filament(f) if side.filament.is_none() => side.filament = Some(f),
            YarnToken::Process(p) if side.process_type.is_none() => side.process_type = Some(p),
            YarnToken::Luster(l) if side.luster.is_none() => side.luster = Some(l),
            _ => leftovers.push(token),
        }
    }

    if !leftovers.is_empty() {
        trace!(segment, ?leftovers, "Tokens kept in raw_text only");
    }
    side
}

/// Disambiguate a raw yarn-count string into warp and weft
pub fn disambiguate(raw: &str) -> Result<YarnSpec, SegmentationError> {
    let segments = split_segments(raw);

    // A trailing or leading separator with nothing around it still counts
    let segment_count = if raw.trim().is_empty() { 0 } else { segments.len() };

    if segment_count > 2 {
        return Err(SegmentationError {
            segments: segment_count,
            raw: raw.to_string(),
            fallback: YarnSpec {
                warp: YarnSide {
                    raw_text: raw.to_string(),
                    ..Default::default()
                },
                weft: YarnSide::default(),
            },
        });
    }

    let warp = segments.first().map(|s| parse_side(s)).unwrap_or_default();
    let weft = segments.get(1).map(|s| parse_side(s)).unwrap_or_default();

    debug!(
        raw,
        warp_denier = ?warp.denier,
        weft_denier = ?weft.denier,
        "Yarn string disambiguated"
    );

    Ok(YarnSpec { warp, weft })
}
