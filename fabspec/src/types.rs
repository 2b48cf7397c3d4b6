//! Core record types for the normalization pipeline
//!
//! `SpecRecord` is the structured form of one fabric specification. Its serde
//! shape is the wire format every Extractor must produce: the field names
//! below are the JSON keys, unknown keys are rejected at every level.
//!
//! # Ownership
//! A record is owned by exactly one form session (`crate::session`). The
//! session mutates it in place; the JSON and field-table views are both
//! projections of that single value.

use crate::vocabulary::FiberScheme;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize a string that a producer may also send as `null`
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Yarn tokens
// ============================================================================

/// Synthetic yarn spinning / texturing process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessType {
    /// Fully drawn yarn
    Fdy,
    /// Draw textured yarn
    Dty,
    /// Air textured yarn
    Aty,
    /// Interlace textured yarn
    Ity,
}

impl ProcessType {
    pub const ALL: [ProcessType; 4] = [Self::Fdy, Self::Dty, Self::Aty, Self::Ity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fdy => "FDY",
            Self::Dty => "DTY",
            Self::Aty => "ATY",
            Self::Ity => "ITY",
        }
    }

    /// Whole-token match (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Luster grade of synthetic yarn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Luster {
    /// Full dull
    Fd,
    /// Semi dull
    Sd,
    /// Bright
    Br,
    Tkt,
}

impl Luster {
    pub const ALL: [Luster; 4] = [Self::Fd, Self::Sd, Self::Br, Self::Tkt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fd => "FD",
            Self::Sd => "SD",
            Self::Br => "BR",
            Self::Tkt => "TKT",
        }
    }

    /// Whole-token match (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Luster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Record parts
// ============================================================================

/// One side (warp or weft) of the yarn specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YarnSide {
    /// Segment text exactly as it appeared in the input
    #[serde(deserialize_with = "string_or_null")]
    pub raw_text: String,
    pub denier: Option<u32>,
    pub filament: Option<u32>,
    pub process_type: Option<ProcessType>,
    pub luster: Option<Luster>,
}

impl YarnSide {
    /// Side with no text and no typed fields
    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty()
            && self.denier.is_none()
            && self.filament.is_none()
            && self.process_type.is_none()
            && self.luster.is_none()
    }
}

/// Warp and weft yarn sides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YarnSpec {
    pub warp: YarnSide,
    pub weft: YarnSide,
}

/// One fiber / percentage pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Composition {
    #[serde(rename = "fiberType")]
    pub fiber_type: String,
    pub percentage: i32,
}

impl Composition {
    pub fn new(fiber_type: impl Into<String>, percentage: i32) -> Self {
        Self {
            fiber_type: fiber_type.into(),
            percentage,
        }
    }
}

/// Sum of all percentages
pub fn composition_total(compositions: &[Composition]) -> i64 {
    compositions.iter().map(|c| i64::from(c.percentage)).sum()
}

/// Physical properties and finishing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalSpec {
    pub density_total: Option<f64>,
    pub weight_gsm: Option<f64>,
    pub width_inch: Option<String>,
    #[serde(default)]
    pub finishings_code: Vec<String>,
    #[serde(default)]
    pub finishings_desc: Vec<String>,
}

/// Weave classification
///
/// `category_major` is derived from `fabric_code` by the classifier and has
/// no public setter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    #[serde(deserialize_with = "string_or_null")]
    pub fabric_code: String,
    #[serde(deserialize_with = "string_or_null")]
    pub fabric_name_kr: String,
    #[serde(rename = "categoryMajor", default, deserialize_with = "string_or_null")]
    pub(crate) category_major: String,
}

impl Classification {
    /// Classification with an underived category (run the classifier next)
    pub fn new(fabric_code: impl Into<String>, fabric_name_kr: impl Into<String>) -> Self {
        Self {
            fabric_code: fabric_code.into(),
            fabric_name_kr: fabric_name_kr.into(),
            category_major: String::new(),
        }
    }

    /// Derived category display label
    pub fn category_major(&self) -> &str {
        &self.category_major
    }
}

/// Provenance and free-text analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    /// The user's literal input, never rewritten
    #[serde(deserialize_with = "string_or_null")]
    pub original_text: String,
    /// Input fragments not parsed into any field
    #[serde(deserialize_with = "string_or_null")]
    pub etc_info: String,
    /// Korean description of the fabric
    #[serde(deserialize_with = "string_or_null")]
    pub ai_analysis_kr: String,
    #[serde(deserialize_with = "string_or_null")]
    pub predicted_material: String,
    #[serde(deserialize_with = "string_or_null")]
    pub construction_type: String,
    /// Fiber code scheme the compositions are written in
    #[serde(default)]
    pub fiber_scheme: FiberScheme,
}

/// The structured fabric specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecRecord {
    pub meta: Meta,
    pub compositions: Vec<Composition>,
    pub yarn_spec: YarnSpec,
    pub physical_spec: PhysicalSpec,
    pub classification: Classification,
}

impl SpecRecord {
    /// Empty record tagged with a fiber scheme
    pub fn empty(scheme: FiberScheme) -> Self {
        let mut record = Self::default();
        record.meta.fiber_scheme = scheme;
        record
    }

    /// Composition percentage sum
    pub fn composition_total(&self) -> i64 {
        composition_total(&self.compositions)
    }
}
