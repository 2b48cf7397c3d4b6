//! Fabric identity and the denormalized search string

use crate::types::SpecRecord;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};

/// Season term within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeasonTerm {
    /// Spring / summer
    Ss,
    /// Fall / winter
    Fw,
}

impl SeasonTerm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ss => "SS",
            Self::Fw => "FW",
        }
    }
}

/// Identity fields stored next to the record blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricIdentity {
    pub art_no: String,
    pub vendor: String,
    pub brand: String,
    pub season_year: Option<i32>,
    pub season_month: Option<u32>,
    pub season_term: Option<SeasonTerm>,
}

impl FabricIdentity {
    pub fn new(art_no: impl Into<String>) -> Self {
        Self {
            art_no: art_no.into(),
            ..Default::default()
        }
    }

    /// `2025 SS`, `2025-03`, or empty
    pub fn season_label(&self) -> String {
        let mut parts = Vec::new();
        match (self.season_year, self.season_month) {
            (Some(year), Some(month)) => parts.push(format!("{year}-{month:02}")),
            (Some(year), None) => parts.push(year.to_string()),
            _ => {}
        }
        if let Some(term) = self.season_term {
            parts.push(term.as_str().to_string());
        }
        parts.join(" ")
    }
}

/// Concatenate every human-readable field into one searchable string
///
/// Fiber codes are followed by their display labels so that either spelling
/// finds the record. Empty fields are skipped; parts are space-separated.
pub fn build_search_string(
    identity: &FabricIdentity,
    record: &SpecRecord,
    vocabulary: &Vocabulary,
) -> String {
    let mut parts: Vec<String> = vec![
        identity.art_no.clone(),
        identity.vendor.clone(),
        identity.brand.clone(),
        identity.season_label(),
    ];

    for composition in &record.compositions {
        parts.push(format!("{} {}%", composition.fiber_type, composition.percentage));
        if let Some(label) = vocabulary.fiber_label(&composition.fiber_type) {
            parts.push(label.to_string());
        }
    }

    let yarn = &record.yarn_spec;
    parts.push(yarn.warp.raw_text.clone());
    parts.push(yarn.weft.raw_text.clone());

    let physical = &record.physical_spec;
    if let Some(density) = physical.density_total {
        parts.push(format!("{density}T"));
    }
    if let Some(weight) = physical.weight_gsm {
        parts.push(format!("{weight}GSM"));
    }
    if let Some(width) = &physical.width_inch {
        parts.push(format!("{width}\""));
    }
    parts.extend(physical.finishings_code.iter().cloned());
    parts.extend(physical.finishings_desc.iter().cloned());

    let classification = &record.classification;
    parts.push(classification.fabric_code.clone());
    parts.push(classification.fabric_name_kr.clone());
    parts.push(classification.category_major().to_string());

    let meta = &record.meta;
    parts.push(meta.construction_type.clone());
    parts.push(meta.predicted_material.clone());
    parts.push(meta.etc_info.clone());
    parts.push(meta.original_text.clone());

    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
