//! Shape check for raw draft JSON
//!
//! Runs on the `serde_json::Value` before typed decoding so that a missing
//! key is reported as missing (serde would silently default some of them)
//! and every violation carries the dotted path where it was found.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// What is wrong at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required key absent
    Missing,
    /// Key not in the record shape
    Unexpected,
    /// Value has the wrong JSON type
    WrongType { expected: &'static str },
    /// List that must not be empty is empty
    Empty,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("required key is missing"),
            Self::Unexpected => f.write_str("key is not part of the record shape"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::Empty => f.write_str("must not be empty"),
        }
    }
}

/// First shape violation found in a draft
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}: {kind}")]
pub struct SchemaViolation {
    pub path: String,
    pub kind: ViolationKind,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Text,
    Integer,
    Number,
    Nullable(&'static Shape),
    List(&'static Shape),
    Object(&'static [Key]),
}

#[derive(Debug, Clone, Copy)]
struct Key {
    name: &'static str,
    shape: Shape,
    required: bool,
}

macro_rules! req {
    ($name:literal, $shape:expr $(,)?) => {
        Key {
            name: $name,
            shape: $shape,
            required: true,
        }
    };
}

macro_rules! opt {
    ($name:literal, $shape:expr $(,)?) => {
        Key {
            name: $name,
            shape: $shape,
            required: false,
        }
    };
}

const NULLABLE_TEXT: Shape = Shape::Nullable(&Shape::Text);
const NULLABLE_INT: Shape = Shape::Nullable(&Shape::Integer);
const NULLABLE_NUMBER: Shape = Shape::Nullable(&Shape::Number);

const YARN_SIDE: Shape = Shape::Object(&[
    req!("raw_text", NULLABLE_TEXT),
    req!("denier", NULLABLE_INT),
    req!("filament", NULLABLE_INT),
    req!("process_type", NULLABLE_TEXT),
    req!("luster", NULLABLE_TEXT),
]);

const RECORD: Shape = Shape::Object(&[
    req!(
        "meta",
        Shape::Object(&[
            req!("original_text", NULLABLE_TEXT),
            req!("etc_info", NULLABLE_TEXT),
            req!("ai_analysis_kr", NULLABLE_TEXT),
            req!("predicted_material", NULLABLE_TEXT),
            req!("construction_type", NULLABLE_TEXT),
            opt!("fiber_scheme", Shape::Text),
        ]),
    ),
    req!(
        "compositions",
        Shape::List(&Shape::Object(&[
            req!("fiberType", Shape::Text),
            req!("percentage", Shape::Integer),
        ])),
    ),
    req!(
        "yarn_spec",
        Shape::Object(&[req!("warp", YARN_SIDE), req!("weft", YARN_SIDE)]),
    ),
    req!(
        "physical_spec",
        Shape::Object(&[
            req!("density_total", NULLABLE_NUMBER),
            req!("weight_gsm", NULLABLE_NUMBER),
            req!("width_inch", NULLABLE_TEXT),
            req!("finishings_code", Shape::List(&Shape::Text)),
            req!("finishings_desc", Shape::List(&Shape::Text)),
        ]),
    ),
    req!(
        "classification",
        Shape::Object(&[
            req!("fabric_code", Shape::Text),
            req!("fabric_name_kr", NULLABLE_TEXT),
            opt!("categoryMajor", NULLABLE_TEXT),
        ]),
    ),
]);

/// Check `value` against the record shape
pub fn check_shape(value: &Value) -> Result<(), SchemaViolation> {
    check(value, &RECORD, "")
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

fn check(value: &Value, shape: &Shape, path: &str) -> Result<(), SchemaViolation> {
    let wrong = |expected: &'static str| {
        SchemaViolation::new(display_path(path), ViolationKind::WrongType { expected })
    };

    match shape {
        Shape::Text if value.is_string() => Ok(()),
        Shape::Text => Err(wrong("string")),
        Shape::Integer if value.is_i64() || value.is_u64() => Ok(()),
        Shape::Integer => Err(wrong("integer")),
        Shape::Number if value.is_number() => Ok(()),
        Shape::Number => Err(wrong("number")),
        Shape::Nullable(_) if value.is_null() => Ok(()),
        Shape::Nullable(inner) => check(value, inner, path),
        Shape::List(item) => {
            let items = value.as_array().ok_or_else(|| wrong("array"))?;
            for (i, v) in items.iter().enumerate() {
                check(v, item, &join(path, &i.to_string()))?;
            }
            Ok(())
        }
        Shape::Object(keys) => {
            let map = value.as_object().ok_or_else(|| wrong("object"))?;
            for key in keys.iter() {
                match map.get(key.name) {
                    Some(v) => check(v, &key.shape, &join(path, key.name))?,
                    None if key.required => {
                        return Err(SchemaViolation::new(join(path, key.name), ViolationKind::Missing))
                    }
                    None => {}
                }
            }
            if let Some(extra) = map.keys().find(|k| !keys.iter().any(|key| key.name == k.as_str())) {
                return Err(SchemaViolation::new(join(path, extra), ViolationKind::Unexpected));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn side() -> Value {
        json!({ "raw_text": "70D", "denier": 70, "filament": null, "process_type": null, "luster": null })
    }

    fn record() -> Value {
        json!({
            "meta": {
                "original_text": "70D nylon",
                "etc_info": "",
                "ai_analysis_kr": "",
                "predicted_material": "Nylon",
                "construction_type": null
            },
            "compositions": [{ "fiberType": "NA", "percentage": 100 }],
            "yarn_spec": { "warp": side(), "weft": side() },
            "physical_spec": {
                "density_total": 228,
                "weight_gsm": 120.5,
                "width_inch": "58/60",
                "finishings_code": ["WR"],
                "finishings_desc": ["Water Repellent"]
            },
            "classification": { "fabric_code": "PL", "fabric_name_kr": "기본 평직" }
        })
    }

    #[test]
    fn test_valid_record_passes() {
        assert_eq!(check_shape(&record()), Ok(()));
    }

    #[test]
    fn test_optional_keys_accepted() {
        let mut value = record();
        value["classification"]["categoryMajor"] = json!("평직 (Plain)");
        value["meta"]["fiber_scheme"] = json!("legacy");
        assert_eq!(check_shape(&value), Ok(()));
    }

    #[test]
    fn test_missing_key_reported_with_path() {
        let mut value = record();
        value["yarn_spec"]["weft"].as_object_mut().unwrap().remove("luster");
        let err = check_shape(&value).unwrap_err();
        assert_eq!(err.path, "yarn_spec.weft.luster");
        assert_eq!(err.kind, ViolationKind::Missing);
    }

    #[test]
    fn test_extra_key_rejected() {
        let mut value = record();
        value["ui_view"] = json!({});
        let err = check_shape(&value).unwrap_err();
        assert_eq!(err.path, "ui_view");
        assert_eq!(err.kind, ViolationKind::Unexpected);
    }

    #[test]
    fn test_percentage_must_be_integer() {
        let mut value = record();
        value["compositions"][0]["percentage"] = json!("100");
        let err = check_shape(&value).unwrap_err();
        assert_eq!(err.path, "compositions.0.percentage");
        assert_eq!(err.kind, ViolationKind::WrongType { expected: "integer" });
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = check_shape(&json!([])).unwrap_err();
        assert_eq!(err.path, "$");
        assert_eq!(err.to_string(), "$: expected object");
    }
}
