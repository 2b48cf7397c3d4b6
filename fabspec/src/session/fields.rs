//! Field paths, merge units and the tabular projection
//!
//! A form edits one field at a time through a dotted path
//! (`compositions.0.percentage`, `yarn_spec.warp.denier`). The same paths
//! label the rows of the field table, so the table and the JSON view are
//! both read from the one record.
//!
//! Merging works on coarser `FieldUnit`s: the composition list moves as a
//! whole, and so does the finishing code/description pair.

use crate::types::{Luster, ProcessType, SpecRecord, YarnSide};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field edit failure; the record is left unchanged
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {0} is read-only")]
    ReadOnly(FieldPath),

    #[error("Field {path} expects {expected}, got {found}")]
    WrongType {
        path: FieldPath,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid value for {path}: {message}")]
    InvalidValue { path: FieldPath, message: String },

    #[error("Composition index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot remove the last composition")]
    LastComposition,
}

// ============================================================================
// Paths
// ============================================================================

/// Warp or weft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Warp,
    Weft,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warp => "warp",
            Self::Weft => "weft",
        }
    }

    fn of(self, record: &SpecRecord) -> &YarnSide {
        match self {
            Self::Warp => &record.yarn_spec.warp,
            Self::Weft => &record.yarn_spec.weft,
        }
    }

    fn of_mut(self, record: &mut SpecRecord) -> &mut YarnSide {
        match self {
            Self::Warp => &mut record.yarn_spec.warp,
            Self::Weft => &mut record.yarn_spec.weft,
        }
    }
}

/// Field of one yarn side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum YarnField {
    RawText,
    Denier,
    Filament,
    ProcessType,
    Luster,
}

impl YarnField {
    pub const ALL: [YarnField; 5] = [
        Self::RawText,
        Self::Denier,
        Self::Filament,
        Self::ProcessType,
        Self::Luster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RawText => "raw_text",
            Self::Denier => "denier",
            Self::Filament => "filament",
            Self::ProcessType => "process_type",
            Self::Luster => "luster",
        }
    }
}

/// Free-text field of `meta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetaField {
    OriginalText,
    EtcInfo,
    AiAnalysisKr,
    PredictedMaterial,
    ConstructionType,
}

impl MetaField {
    pub const ALL: [MetaField; 5] = [
        Self::OriginalText,
        Self::EtcInfo,
        Self::AiAnalysisKr,
        Self::PredictedMaterial,
        Self::ConstructionType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OriginalText => "original_text",
            Self::EtcInfo => "etc_info",
            Self::AiAnalysisKr => "ai_analysis_kr",
            Self::PredictedMaterial => "predicted_material",
            Self::ConstructionType => "construction_type",
        }
    }

    fn of(self, record: &SpecRecord) -> &String {
        let meta = &record.meta;
        match self {
            Self::OriginalText => &meta.original_text,
            Self::EtcInfo => &meta.etc_info,
            Self::AiAnalysisKr => &meta.ai_analysis_kr,
            Self::PredictedMaterial => &meta.predicted_material,
            Self::ConstructionType => &meta.construction_type,
        }
    }

    fn of_mut(self, record: &mut SpecRecord) -> &mut String {
        let meta = &mut record.meta;
        match self {
            Self::OriginalText => &mut meta.original_text,
            Self::EtcInfo => &mut meta.etc_info,
            Self::AiAnalysisKr => &mut meta.ai_analysis_kr,
            Self::PredictedMaterial => &mut meta.predicted_material,
            Self::ConstructionType => &mut meta.construction_type,
        }
    }
}

/// Half of a composition entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompositionPart {
    FiberType,
    Percentage,
}

/// Addressable field of a `SpecRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Meta(MetaField),
    Composition { index: usize, part: CompositionPart },
    Yarn { side: Side, field: YarnField },
    Density,
    Weight,
    Width,
    FinishingsCode,
    FinishingsDesc,
    FabricCode,
    FabricName,
    CategoryMajor,
}

/// Value kind accepted by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    OptionalText,
    Count,
    Number,
    Percentage,
    Process,
    Luster,
    TextList,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::OptionalText => "text or empty",
            Self::Count => "a whole number or empty",
            Self::Number => "a number or empty",
            Self::Percentage => "an integer percentage",
            Self::Process => "FDY, DTY, ATY, ITY or empty",
            Self::Luster => "FD, SD, BR, TKT or empty",
            Self::TextList => "a comma-separated list",
        }
    }
}

impl FieldPath {
    /// Paths the form may not write
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Self::Meta(MetaField::OriginalText) | Self::CategoryMajor
        )
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Meta(_) | Self::FabricCode | Self::FabricName | Self::CategoryMajor => {
                FieldKind::Text
            }
            Self::Composition { part: CompositionPart::FiberType, .. } => FieldKind::Text,
            Self::Composition { part: CompositionPart::Percentage, .. } => FieldKind::Percentage,
            Self::Yarn { field, .. } => match field {
                YarnField::RawText => FieldKind::Text,
                YarnField::Denier | YarnField::Filament => FieldKind::Count,
                YarnField::ProcessType => FieldKind::Process,
                YarnField::Luster => FieldKind::Luster,
            },
            Self::Density | Self::Weight => FieldKind::Number,
            Self::Width => FieldKind::OptionalText,
            Self::FinishingsCode | Self::FinishingsDesc => FieldKind::TextList,
        }
    }

    /// Merge unit this path belongs to; `None` for read-only paths
    pub fn unit(self) -> Option<FieldUnit> {
        match self {
            Self::Meta(MetaField::OriginalText) | Self::CategoryMajor => None,
            Self::Meta(field) => Some(FieldUnit::Meta(field)),
            Self::Composition { .. } => Some(FieldUnit::Compositions),
            Self::Yarn { side, field } => Some(FieldUnit::Yarn { side, field }),
            Self::Density => Some(FieldUnit::Density),
            Self::Weight => Some(FieldUnit::Weight),
            Self::Width => Some(FieldUnit::Width),
            Self::FinishingsCode | Self::FinishingsDesc => Some(FieldUnit::Finishings),
            Self::FabricCode => Some(FieldUnit::FabricCode),
            Self::FabricName => Some(FieldUnit::FabricName),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta(field) => write!(f, "meta.{}", field.as_str()),
            Self::Composition { index, part } => {
                let part = match part {
                    CompositionPart::FiberType => "fiberType",
                    CompositionPart::Percentage => "percentage",
                };
                write!(f, "compositions.{index}.{part}")
            }
            Self::Yarn { side, field } => {
                write!(f, "yarn_spec.{}.{}", side.as_str(), field.as_str())
            }
            Self::Density => f.write_str("physical_spec.density_total"),
            Self::Weight => f.write_str("physical_spec.weight_gsm"),
            Self::Width => f.write_str("physical_spec.width_inch"),
            Self::FinishingsCode => f.write_str("physical_spec.finishings_code"),
            Self::FinishingsDesc => f.write_str("physical_spec.finishings_desc"),
            Self::FabricCode => f.write_str("classification.fabric_code"),
            Self::FabricName => f.write_str("classification.fabric_name_kr"),
            Self::CategoryMajor => f.write_str("classification.categoryMajor"),
        }
    }
}

impl FromStr for FieldPath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || EditError::UnknownField(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();

        let path = match parts.as_slice() {
            ["meta", name] => MetaField::ALL
                .into_iter()
                .find(|m| m.as_str() == *name)
                .map(Self::Meta),
            ["compositions", index, part] => {
                let index = index.parse::<usize>().map_err(|_| unknown())?;
                let part = match *part {
                    "fiberType" => CompositionPart::FiberType,
                    "percentage" => CompositionPart::Percentage,
                    _ => return Err(unknown()),
                };
                Some(Self::Composition { index, part })
            }
            ["yarn_spec", side, name] => {
                let side = match *side {
                    "warp" => Side::Warp,
                    "weft" => Side::Weft,
                    _ => return Err(unknown()),
                };
                YarnField::ALL
                    .into_iter()
                    .find(|y| y.as_str() == *name)
                    .map(|field| Self::Yarn { side, field })
            }
            ["physical_spec", "density_total"] => Some(Self::Density),
            ["physical_spec", "weight_gsm"] => Some(Self::Weight),
            ["physical_spec", "width_inch"] => Some(Self::Width),
            ["physical_spec", "finishings_code"] => Some(Self::FinishingsCode),
            ["physical_spec", "finishings_desc"] => Some(Self::FinishingsDesc),
            ["classification", "fabric_code"] => Some(Self::FabricCode),
            ["classification", "fabric_name_kr"] => Some(Self::FabricName),
            ["classification", "categoryMajor"] => Some(Self::CategoryMajor),
            _ => None,
        };

        path.ok_or_else(unknown)
    }
}

// ============================================================================
// Values
// ============================================================================

/// Dynamically typed field value used by the form widgets
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    List(Vec<String>),
}

impl FieldValue {
    fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Text(t) => format!("text '{t}'"),
            Self::Integer(i) => format!("integer {i}"),
            Self::Number(n) => format!("number {n}"),
            Self::List(_) => "list".to_string(),
        }
    }

    /// Widget text for this value
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(t) => t.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

fn opt_text(value: &Option<String>) -> FieldValue {
    value.clone().map(FieldValue::Text).unwrap_or(FieldValue::Null)
}

fn opt_number(value: Option<f64>) -> FieldValue {
    value.map(FieldValue::Number).unwrap_or(FieldValue::Null)
}

fn opt_count(value: Option<u32>) -> FieldValue {
    value
        .map(|v| FieldValue::Integer(i64::from(v)))
        .unwrap_or(FieldValue::Null)
}

/// Parse widget text for `path`
///
/// Empty input clears nullable fields. Lists are comma-separated; empty
/// items are dropped.
pub fn parse_input(path: FieldPath, text: &str) -> Result<FieldValue, EditError> {
    let trimmed = text.trim();
    let invalid = |message: String| EditError::InvalidValue { path, message };

    match path.kind() {
        FieldKind::Text => Ok(FieldValue::Text(trimmed.to_string())),
        FieldKind::OptionalText | FieldKind::Process | FieldKind::Luster if trimmed.is_empty() => {
            Ok(FieldValue::Null)
        }
        FieldKind::OptionalText | FieldKind::Process | FieldKind::Luster => {
            Ok(FieldValue::Text(trimmed.to_string()))
        }
        FieldKind::Count | FieldKind::Number if trimmed.is_empty() => Ok(FieldValue::Null),
        FieldKind::Count | FieldKind::Percentage => trimmed
            .trim_end_matches('%')
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| invalid(format!("'{trimmed}' is not a whole number"))),
        FieldKind::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number)
            .ok_or_else(|| invalid(format!("'{trimmed}' is not a number"))),
        FieldKind::TextList => Ok(FieldValue::List(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )),
    }
}

/// Read a field; `None` when a composition index is out of range
pub fn get(record: &SpecRecord, path: FieldPath) -> Option<FieldValue> {
    let physical = &record.physical_spec;
    let value = match path {
        FieldPath::Meta(field) => FieldValue::Text(field.of(record).clone()),
        FieldPath::Composition { index, part } => {
            let composition = record.compositions.get(index)?;
            match part {
                CompositionPart::FiberType => FieldValue::Text(composition.fiber_type.clone()),
                CompositionPart::Percentage => {
                    FieldValue::Integer(i64::from(composition.percentage))
                }
            }
        }
        FieldPath::Yarn { side, field } => {
            let yarn = side.of(record);
            match field {
                YarnField::RawText => FieldValue::Text(yarn.raw_text.clone()),
                YarnField::Denier => opt_count(yarn.denier),
                YarnField::Filament => opt_count(yarn.filament),
                YarnField::ProcessType => yarn
                    .process_type
                    .map(|p| FieldValue::Text(p.as_str().to_string()))
                    .unwrap_or(FieldValue::Null),
                YarnField::Luster => yarn
                    .luster
                    .map(|l| FieldValue::Text(l.as_str().to_string()))
                    .unwrap_or(FieldValue::Null),
            }
        }
        FieldPath::Density => opt_number(physical.density_total),
        FieldPath::Weight => opt_number(physical.weight_gsm),
        FieldPath::Width => opt_text(&physical.width_inch),
        FieldPath::FinishingsCode => FieldValue::List(physical.finishings_code.clone()),
        FieldPath::FinishingsDesc => FieldValue::List(physical.finishings_desc.clone()),
        FieldPath::FabricCode => FieldValue::Text(record.classification.fabric_code.clone()),
        FieldPath::FabricName => FieldValue::Text(record.classification.fabric_name_kr.clone()),
        FieldPath::CategoryMajor => {
            FieldValue::Text(record.classification.category_major().to_string())
        }
    };
    Some(value)
}

/// Write one field, checking the value before anything is changed
///
/// Does not touch derived fields; the session reclassifies after a
/// `fabric_code` write.
pub fn set(record: &mut SpecRecord, path: FieldPath, value: FieldValue) -> Result<(), EditError> {
    if path.is_read_only() {
        return Err(EditError::ReadOnly(path));
    }

    let wrong_type = |value: &FieldValue| EditError::WrongType {
        path,
        expected: path.kind().expected(),
        found: value.type_name(),
    };

    match path {
        FieldPath::Composition { index, part } => {
            let len = record.compositions.len();
            let entry = record
                .compositions
                .get_mut(index)
                .ok_or(EditError::IndexOutOfRange { index, len })?;
            match (part, value) {
                (CompositionPart::FiberType, FieldValue::Text(code)) => {
                    entry.fiber_type = code.trim().to_string();
                }
                (CompositionPart::Percentage, FieldValue::Integer(n)) => {
                    entry.percentage = i32::try_from(n).map_err(|_| EditError::InvalidValue {
                        path,
                        message: format!("{n} does not fit a percentage"),
                    })?;
                }
                (_, other) => return Err(wrong_type(&other)),
            }
        }
        FieldPath::Yarn { side, field } => {
            let yarn = side.of_mut(record);
            match (field, value) {
                (YarnField::RawText, FieldValue::Text(text)) => yarn.raw_text = text,
                (YarnField::Denier, v) => yarn.denier = to_count(path, v)?,
                (YarnField::Filament, v) => yarn.filament = to_count(path, v)?,
                (YarnField::ProcessType, FieldValue::Null) => yarn.process_type = None,
                (YarnField::ProcessType, FieldValue::Text(t)) => {
                    yarn.process_type = Some(ProcessType::from_token(t.trim()).ok_or_else(
                        || EditError::InvalidValue {
                            path,
                            message: format!("'{t}' is not a process type"),
                        },
                    )?);
                }
                (YarnField::Luster, FieldValue::Null) => yarn.luster = None,
                (YarnField::Luster, FieldValue::Text(t)) => {
                    yarn.luster = Some(Luster::from_token(t.trim()).ok_or_else(|| {
                        EditError::InvalidValue {
                            path,
                            message: format!("'{t}' is not a luster grade"),
                        }
                    })?);
                }
                (_, other) => return Err(wrong_type(&other)),
            }
        }
        FieldPath::Density | FieldPath::Weight => {
            let number = match value {
                FieldValue::Null => None,
                FieldValue::Number(n) => Some(n),
                FieldValue::Integer(i) => Some(i as f64),
                other => return Err(wrong_type(&other)),
            };
            let physical = &mut record.physical_spec;
            if path == FieldPath::Density {
                physical.density_total = number;
            } else {
                physical.weight_gsm = number;
            }
        }
        FieldPath::Width => {
            record.physical_spec.width_inch = match value {
                FieldValue::Null => None,
                FieldValue::Text(t) if t.trim().is_empty() => None,
                FieldValue::Text(t) => Some(t.trim().to_string()),
                other => return Err(wrong_type(&other)),
            };
        }
        FieldPath::FinishingsCode | FieldPath::FinishingsDesc => {
            let items = match value {
                FieldValue::List(items) => items,
                other => return Err(wrong_type(&other)),
            };
            if path == FieldPath::FinishingsCode {
                record.physical_spec.finishings_code = items;
            } else {
                record.physical_spec.finishings_desc = items;
            }
        }
        FieldPath::Meta(field) => match value {
            FieldValue::Text(text) => *field.of_mut(record) = text,
            other => return Err(wrong_type(&other)),
        },
        FieldPath::FabricCode => match value {
            FieldValue::Text(text) => {
                record.classification.fabric_code = text.trim().to_ascii_uppercase()
            }
            other => return Err(wrong_type(&other)),
        },
        FieldPath::FabricName => match value {
            FieldValue::Text(text) => record.classification.fabric_name_kr = text,
            other => return Err(wrong_type(&other)),
        },
        FieldPath::CategoryMajor => return Err(EditError::ReadOnly(path)),
    }
    Ok(())
}

fn to_count(path: FieldPath, value: FieldValue) -> Result<Option<u32>, EditError> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Integer(n) => u32::try_from(n).map(Some).map_err(|_| {
            EditError::InvalidValue {
                path,
                message: format!("{n} is not a positive count"),
            }
        }),
        other => Err(EditError::WrongType {
            path,
            expected: path.kind().expected(),
            found: other.type_name(),
        }),
    }
}

/// Every readable field of `record` in form order
pub fn field_table(record: &SpecRecord) -> Vec<(FieldPath, FieldValue)> {
    let mut paths: Vec<FieldPath> = MetaField::ALL.into_iter().map(FieldPath::Meta).collect();
    for index in 0..record.compositions.len() {
        paths.push(FieldPath::Composition {
            index,
            part: CompositionPart::FiberType,
        });
        paths.push(FieldPath::Composition {
            index,
            part: CompositionPart::Percentage,
        });
    }
    for side in [Side::Warp, Side::Weft] {
        paths.extend(
            YarnField::ALL
                .into_iter()
                .map(|field| FieldPath::Yarn { side, field }),
        );
    }
    paths.extend([
        FieldPath::Density,
        FieldPath::Weight,
        FieldPath::Width,
        FieldPath::FinishingsCode,
        FieldPath::FinishingsDesc,
        FieldPath::FabricCode,
        FieldPath::FabricName,
        FieldPath::CategoryMajor,
    ]);

    paths
        .into_iter()
        .filter_map(|path| get(record, path).map(|value| (path, value)))
        .collect()
}

// ============================================================================
// Merge units
// ============================================================================

/// Smallest part of a record the merge takes or keeps as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldUnit {
    Meta(MetaField),
    Compositions,
    Yarn { side: Side, field: YarnField },
    Density,
    Weight,
    Width,
    Finishings,
    FabricCode,
    FabricName,
}

impl FieldUnit {
    /// All units in form order (`meta.original_text` is not a unit)
    pub fn all() -> Vec<FieldUnit> {
        let mut units: Vec<FieldUnit> = MetaField::ALL
            .into_iter()
            .filter(|m| *m != MetaField::OriginalText)
            .map(FieldUnit::Meta)
            .collect();
        units.push(FieldUnit::Compositions);
        for side in [Side::Warp, Side::Weft] {
            units.extend(
                YarnField::ALL
                    .into_iter()
                    .map(|field| FieldUnit::Yarn { side, field }),
            );
        }
        units.extend([
            FieldUnit::Density,
            FieldUnit::Weight,
            FieldUnit::Width,
            FieldUnit::Finishings,
            FieldUnit::FabricCode,
            FieldUnit::FabricName,
        ]);
        units
    }

    /// JSON value of this unit in `record`
    pub fn value(self, record: &SpecRecord) -> Value {
        let physical = &record.physical_spec;
        match self {
            Self::Meta(field) => json!(field.of(record)),
            Self::Compositions => json!(record.compositions),
            Self::Yarn { side, field } => {
                let yarn = side.of(record);
                match field {
                    YarnField::RawText => json!(yarn.raw_text),
                    YarnField::Denier => json!(yarn.denier),
                    YarnField::Filament => json!(yarn.filament),
                    YarnField::ProcessType => json!(yarn.process_type),
                    YarnField::Luster => json!(yarn.luster),
                }
            }
            Self::Density => json!(physical.density_total),
            Self::Weight => json!(physical.weight_gsm),
            Self::Width => json!(physical.width_inch),
            Self::Finishings => json!({
                "finishings_code": physical.finishings_code,
                "finishings_desc": physical.finishings_desc,
            }),
            Self::FabricCode => json!(record.classification.fabric_code),
            Self::FabricName => json!(record.classification.fabric_name_kr),
        }
    }

    /// Same value in both records
    pub fn same(self, a: &SpecRecord, b: &SpecRecord) -> bool {
        match self {
            Self::Compositions => a.compositions == b.compositions,
            _ => self.value(a) == self.value(b),
        }
    }

    /// Copy this unit from `from` into `to`
    pub fn copy(self, from: &SpecRecord, to: &mut SpecRecord) {
        match self {
            Self::Meta(field) => *field.of_mut(to) = field.of(from).clone(),
            Self::Compositions => {
                to.compositions = from.compositions.clone();
                to.meta.fiber_scheme = from.meta.fiber_scheme;
            }
            Self::Yarn { side, field } => {
                let source = side.of(from);
                let target = side.of_mut(to);
                match field {
                    YarnField::RawText => target.raw_text = source.raw_text.clone(),
                    YarnField::Denier => target.denier = source.denier,
                    YarnField::Filament => target.filament = source.filament,
                    YarnField::ProcessType => target.process_type = source.process_type,
                    YarnField::Luster => target.luster = source.luster,
                }
            }
            Self::Density => to.physical_spec.density_total = from.physical_spec.density_total,
            Self::Weight => to.physical_spec.weight_gsm = from.physical_spec.weight_gsm,
            Self::Width => to.physical_spec.width_inch = from.physical_spec.width_inch.clone(),
            Self::Finishings => {
                to.physical_spec.finishings_code = from.physical_spec.finishings_code.clone();
                to.physical_spec.finishings_desc = from.physical_spec.finishings_desc.clone();
            }
            Self::FabricCode => {
                to.classification.fabric_code = from.classification.fabric_code.clone()
            }
            Self::FabricName => {
                to.classification.fabric_name_kr = from.classification.fabric_name_kr.clone()
            }
        }
    }
}

impl fmt::Display for FieldUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta(field) => write!(f, "meta.{}", field.as_str()),
            Self::Compositions => f.write_str("compositions"),
            Self::Yarn { side, field } => {
                write!(f, "yarn_spec.{}.{}", side.as_str(), field.as_str())
            }
            Self::Density => f.write_str("physical_spec.density_total"),
            Self::Weight => f.write_str("physical_spec.weight_gsm"),
            Self::Width => f.write_str("physical_spec.width_inch"),
            Self::Finishings => f.write_str("physical_spec.finishings"),
            Self::FabricCode => f.write_str("classification.fabric_code"),
            Self::FabricName => f.write_str("classification.fabric_name_kr"),
        }
    }
}
