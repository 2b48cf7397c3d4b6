//! Code Tables
//!
//! Single source of truth for the closed vocabularies: fiber codes, weave
//! codes with their families, and finishing codes.
//!
//! # Architecture
//! A `Vocabulary` is an immutable configuration object. It is built once
//! (usually via `Vocabulary::standard`) and shared as `Arc<Vocabulary>` with
//! every component at construction time. Tests build alternate vocabularies
//! through `VocabularyBuilder`.
//!
//! Exactly one fiber scheme is active per vocabulary. Codes that belong only
//! to the other scheme are remembered so validation can flag a mixed-scheme
//! record instead of calling it free text.

pub mod fibers;
pub mod finishings;
pub mod migration;
pub mod weaves;

pub use fibers::{migrate_code, Fiber, FiberScheme};
pub use migration::{migrate_record, MigrationError};
pub use weaves::{WeaveFamily, FALLBACK_WEAVE_CODE};

use std::collections::BTreeMap;
use thiserror::Error;

/// Vocabulary construction error
#[derive(Debug, Error, PartialEq)]
pub enum VocabularyError {
    /// Fallback weave code missing from the weave table
    #[error("fallback weave code '{0}' is not in the weave vocabulary")]
    MissingFallback(String),

    /// Fallback weave code must belong to the Etc family
    #[error("fallback weave code '{0}' must be in the Etc family")]
    FallbackNotEtc(String),

    /// The same code registered twice
    #[error("duplicate {kind} code '{code}'")]
    Duplicate { kind: &'static str, code: String },
}

/// Weave vocabulary entry
#[derive(Debug, Clone, PartialEq)]
pub struct WeaveEntry {
    pub family: WeaveFamily,
    pub name_kr: Option<String>,
}

/// Immutable set of closed vocabularies
#[derive(Debug, Clone)]
pub struct Vocabulary {
    scheme: FiberScheme,
    fibers: BTreeMap<String, String>,
    foreign_fibers: BTreeMap<String, FiberScheme>,
    weaves: BTreeMap<String, WeaveEntry>,
    fallback_weave: String,
    finishings: BTreeMap<String, String>,
}

impl Vocabulary {
    /// Standard vocabulary for the given fiber scheme
    pub fn standard(scheme: FiberScheme) -> Self {
        let mut fibers = BTreeMap::new();
        let mut foreign_fibers = BTreeMap::new();

        for fiber in Fiber::ALL {
            fibers.insert(fiber.code(scheme).to_string(), fiber.label().to_string());
        }
        for other in FiberScheme::ALL.into_iter().filter(|s| *s != scheme) {
            for fiber in Fiber::ALL {
                let code = fiber.code(other);
                if !fibers.contains_key(code) {
                    foreign_fibers.insert(code.to_string(), other);
                }
            }
        }

        let weaves = weaves::WEAVE_TABLE
            .iter()
            .map(|(code, family, name)| {
                (
                    code.to_string(),
                    WeaveEntry {
                        family: *family,
                        name_kr: name.map(str::to_string),
                    },
                )
            })
            .collect();

        let finishings = finishings::FINISHING_TABLE
            .iter()
            .map(|(code, desc)| (code.to_string(), desc.to_string()))
            .collect();

        Self {
            scheme,
            fibers,
            foreign_fibers,
            weaves,
            fallback_weave: FALLBACK_WEAVE_CODE.to_string(),
            finishings,
        }
    }

    /// Start an empty vocabulary (test doubles, alternate tables)
    pub fn builder(scheme: FiberScheme) -> VocabularyBuilder {
        VocabularyBuilder::new(scheme)
    }

    /// Active fiber scheme
    pub fn scheme(&self) -> FiberScheme {
        self.scheme
    }

    /// Display label for an active-scheme fiber code
    pub fn fiber_label(&self, code: &str) -> Option<&str> {
        self.fibers.get(code).map(String::as_str)
    }

    /// Whether `code` belongs to the active fiber scheme
    pub fn is_fiber(&self, code: &str) -> bool {
        self.fibers.contains_key(code)
    }

    /// Scheme a non-member code belongs to, if it is a known foreign code
    pub fn foreign_scheme_of(&self, code: &str) -> Option<FiberScheme> {
        self.foreign_fibers.get(code).copied()
    }

    /// Active-scheme fiber codes in sorted order
    pub fn fiber_codes(&self) -> impl Iterator<Item = &str> {
        self.fibers.keys().map(String::as_str)
    }

    /// Code for a canonical fiber, if the vocabulary carries it
    pub fn code_for(&self, fiber: Fiber) -> Option<&str> {
        let code = fiber.code(self.scheme);
        self.fibers.get_key_value(code).map(|(k, _)| k.as_str())
    }

    /// Family of a weave code (exact match)
    pub fn weave_family(&self, code: &str) -> Option<WeaveFamily> {
        self.weaves.get(code).map(|e| e.family)
    }

    /// Conventional Korean fabric name for a weave code
    pub fn weave_name(&self, code: &str) -> Option<&str> {
        self.weaves.get(code).and_then(|e| e.name_kr.as_deref())
    }

    /// All weave codes in sorted order
    pub fn weave_codes(&self) -> impl Iterator<Item = &str> {
        self.weaves.keys().map(String::as_str)
    }

    /// Code used by the classifier fallback
    pub fn fallback_weave(&self) -> &str {
        &self.fallback_weave
    }

    /// Description for a finishing code
    pub fn finishing_desc(&self, code: &str) -> Option<&str> {
        self.finishings.get(code).map(String::as_str)
    }
}

/// Builder for alternate vocabularies
#[derive(Debug)]
pub struct VocabularyBuilder {
    scheme: FiberScheme,
    fibers: Vec<(String, String)>,
    foreign_fibers: Vec<(String, FiberScheme)>,
    weaves: Vec<(String, WeaveEntry)>,
    fallback_weave: String,
    finishings: Vec<(String, String)>,
}

impl VocabularyBuilder {
    fn new(scheme: FiberScheme) -> Self {
        Self {
            scheme,
            fibers: Vec::new(),
            foreign_fibers: Vec::new(),
            weaves: Vec::new(),
            fallback_weave: FALLBACK_WEAVE_CODE.to_string(),
            finishings: Vec::new(),
        }
    }

    pub fn fiber(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.fibers.push((code.into(), label.into()));
        self
    }

    pub fn foreign_fiber(mut self, code: impl Into<String>, scheme: FiberScheme) -> Self {
        self.foreign_fibers.push((code.into(), scheme));
        self
    }

    pub fn weave(mut self, code: impl Into<String>, family: WeaveFamily) -> Self {
        self.weaves.push((
            code.into(),
            WeaveEntry {
                family,
                name_kr: None,
            },
        ));
        self
    }

    pub fn fallback_weave(mut self, code: impl Into<String>) -> Self {
        self.fallback_weave = code.into();
        self
    }

    pub fn finishing(mut self, code: impl Into<String>, desc: impl Into<String>) -> Self {
        self.finishings.push((code.into(), desc.into()));
        self
    }

    /// Validate and freeze the vocabulary
    pub fn build(self) -> Result<Vocabulary, VocabularyError> {
        let fibers = collect_unique("fiber", self.fibers)?;
        let weaves = collect_unique("weave", self.weaves)?;
        let finishings = collect_unique("finishing", self.finishings)?;
        let foreign_fibers = collect_unique("foreign fiber", self.foreign_fibers)?;

        match weaves.get(&self.fallback_weave) {
            None => return Err(VocabularyError::MissingFallback(self.fallback_weave)),
            Some(entry) if entry.family != WeaveFamily::Etc => {
                return Err(VocabularyError::FallbackNotEtc(self.fallback_weave))
            }
            Some(_) => {}
        }

        Ok(Vocabulary {
            scheme: self.scheme,
            fibers,
            foreign_fibers,
            weaves,
            fallback_weave: self.fallback_weave,
            finishings,
        })
    }
}

fn collect_unique<V>(
    kind: &'static str,
    entries: Vec<(String, V)>,
) -> Result<BTreeMap<String, V>, VocabularyError> {
    let mut map = BTreeMap::new();
    for (code, value) in entries {
        if map.contains_key(&code) {
            return Err(VocabularyError::Duplicate { kind, code });
        }
        map.insert(code, value);
    }
    Ok(map)
}
