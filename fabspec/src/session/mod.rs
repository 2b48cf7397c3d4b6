//! Form Session
//!
//! Owns one `SpecRecord` while a user works on it and keeps it consistent.
//!
//! # States
//! ```text
//! Empty ──draft──► Drafted ──edit──► Edited ──validate (clean)──► Valid ──persist──► Persisted
//!                     ▲                 ▲                           │                   │
//!                     └──── draft ──────┴──────────── edit ─────────┴───────────────────┘
//! ```
//! - `Valid` is reached only by a clean validation from `Edited`; validating
//!   a `Drafted` record passes through `Edited` first
//! - a validation with deviations downgrades `Valid` to `Edited`
//! - every transition is recorded with a UTC timestamp
//!
//! # Draft application
//! A draft is classified, then merged (see `merge`), then the merged record
//! is classified again, all under `&mut self`: partial application is never
//! observable.

pub mod extraction;
pub mod fields;
pub mod merge;

pub use extraction::{ExtractionTicket, SessionHandle};
pub use fields::{EditError, FieldPath, FieldUnit, FieldValue};
pub use merge::{MergeConflict, MergePolicy, Resolution};

use crate::classifier::{ClassifyOutcome, Classifier};
use crate::extractors::ExtractionError;
use crate::search::{build_search_string, FabricIdentity};
use crate::store::{FabricId, SpecStore, StoreError};
use crate::types::{Composition, SpecRecord};
use crate::validators::{composition_deviations, Deviation, RecordValidator, ValidationReport};
use crate::vocabulary::Vocabulary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Form session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Nothing entered yet
    Empty,
    /// Holds an unedited extractor draft
    Drafted,
    /// User has edited since the last draft or validation
    Edited,
    /// Last validation found no deviations
    Valid,
    /// Stored and unchanged since
    Persisted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "EMPTY",
            Self::Drafted => "DRAFTED",
            Self::Edited => "EDITED",
            Self::Valid => "VALID",
            Self::Persisted => "PERSISTED",
        };
        f.write_str(name)
    }
}

/// Recorded state change
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    pub at: DateTime<Utc>,
}

/// What applying a draft did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftReport {
    pub classification: ClassifyOutcome,
    pub conflicts: Vec<MergeConflict>,
    pub taken: Vec<FieldUnit>,
    pub kept: Vec<FieldUnit>,
}

/// Session operation failure
#[derive(Debug, Error)]
pub enum SessionError {
    /// Record has deviations; nothing was stored
    #[error("Record is not valid: {}", .0.messages().join("; "))]
    Invalid(ValidationReport),

    /// Reply belongs to a superseded extraction
    #[error("Stale extraction reply (generation {reply}, current {current})")]
    Stale { reply: u64, current: u64 },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("Fabric identity has no art number")]
    MissingIdentity,
}

/// One record being entered or edited
pub struct FormSession {
    id: Uuid,
    record: SpecRecord,
    /// Last applied draft (classified)
    base: Option<SpecRecord>,
    /// Units edited in this session
    touched: BTreeSet<FieldUnit>,
    state: SessionState,
    history: Vec<Transition>,
    identity: FabricIdentity,
    stored_id: Option<FabricId>,
    vocabulary: Arc<Vocabulary>,
    classifier: Classifier,
    validator: RecordValidator,
    merge_policy: MergePolicy,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl FormSession {
    /// Empty session
    pub fn new(vocabulary: Arc<Vocabulary>, merge_policy: MergePolicy) -> Self {
        let record = SpecRecord::empty(vocabulary.scheme());
        Self {
            id: Uuid::new_v4(),
            record,
            base: None,
            touched: BTreeSet::new(),
            state: SessionState::Empty,
            history: Vec::new(),
            identity: FabricIdentity::default(),
            stored_id: None,
            classifier: Classifier::new(Arc::clone(&vocabulary)),
            validator: RecordValidator::new(Arc::clone(&vocabulary)),
            vocabulary,
            merge_policy,
            generation: 0,
            in_flight: None,
        }
    }

    /// Session over a stored record
    pub fn load(
        vocabulary: Arc<Vocabulary>,
        merge_policy: MergePolicy,
        id: FabricId,
        identity: FabricIdentity,
        record: SpecRecord,
    ) -> Self {
        let mut session = Self::new(vocabulary, merge_policy);
        session.record = record;
        session.identity = identity;
        session.stored_id = Some(id);
        session.transition_to(SessionState::Persisted);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record(&self) -> &SpecRecord {
        &self.record
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    pub fn identity(&self) -> &FabricIdentity {
        &self.identity
    }

    pub fn stored_id(&self) -> Option<FabricId> {
        self.stored_id
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    /// Units edited in this session
    pub fn touched(&self) -> &BTreeSet<FieldUnit> {
        &self.touched
    }

    /// JSON projection of the record
    pub fn json(&self) -> serde_json::Value {
        serde_json::to_value(&self.record).unwrap_or(serde_json::Value::Null)
    }

    /// Tabular projection of the record
    pub fn field_table(&self) -> Vec<(FieldPath, FieldValue)> {
        fields::field_table(&self.record)
    }

    /// Identity fields change nothing in the record or the state
    pub fn set_identity(&mut self, identity: FabricIdentity) {
        self.identity = identity;
    }

    // ========================================================================
    // Drafts
    // ========================================================================

    /// Merge a draft into the record
    pub fn apply_draft(&mut self, mut draft: SpecRecord) -> DraftReport {
        let classification = self.classifier.apply(&mut draft.classification);

        let outcome = merge::merge(
            self.base.as_ref(),
            &self.record,
            &draft,
            &self.touched,
            self.merge_policy,
        );

        let mut record = outcome.record;
        record.classification.category_major.clear();
        self.classifier.apply(&mut record.classification);
        self.record = record;
        self.base = Some(draft);
        if self.merge_policy == MergePolicy::Replace {
            self.touched.clear();
        }

        self.transition_to(SessionState::Drafted);
        info!(
            session_id = %self.id,
            fabric_code = %self.record.classification.fabric_code,
            conflicts = outcome.conflicts.len(),
            "Draft applied"
        );

        DraftReport {
            classification,
            conflicts: outcome.conflicts,
            taken: outcome.taken,
            kept: outcome.kept,
        }
    }

    // ========================================================================
    // Field edits
    // ========================================================================

    /// Write one field
    ///
    /// A `fabric_code` write re-runs the classifier.
    pub fn set_field(&mut self, path: FieldPath, value: FieldValue) -> Result<(), EditError> {
        fields::set(&mut self.record, path, value)?;
        if path == FieldPath::FabricCode {
            self.record.classification.category_major.clear();
            self.classifier.apply(&mut self.record.classification);
        }
        debug!(session_id = %self.id, field = %path, "Field edited");
        self.mark_edited(path.unit());
        Ok(())
    }

    /// Parse widget text and write it
    pub fn set_field_text(&mut self, path: &str, text: &str) -> Result<(), EditError> {
        let path: FieldPath = path.parse()?;
        let value = fields::parse_input(path, text)?;
        self.set_field(path, value)
    }

    /// Read one field
    pub fn field(&self, path: FieldPath) -> Option<FieldValue> {
        fields::get(&self.record, path)
    }

    pub fn add_composition(&mut self, fiber_type: &str, percentage: i32) {
        self.record
            .compositions
            .push(Composition::new(fiber_type.trim(), percentage));
        self.mark_edited(Some(FieldUnit::Compositions));
    }

    /// Remove one entry; the last one cannot be removed
    pub fn remove_composition(&mut self, index: usize) -> Result<Composition, EditError> {
        let len = self.record.compositions.len();
        if index >= len {
            return Err(EditError::IndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(EditError::LastComposition);
        }
        let removed = self.record.compositions.remove(index);
        self.mark_edited(Some(FieldUnit::Compositions));
        Ok(removed)
    }

    pub fn set_composition_fiber(&mut self, index: usize, fiber_type: &str) -> Result<(), EditError> {
        self.set_field(
            FieldPath::Composition {
                index,
                part: fields::CompositionPart::FiberType,
            },
            FieldValue::Text(fiber_type.to_string()),
        )
    }

    pub fn set_composition_percentage(
        &mut self,
        index: usize,
        percentage: i32,
    ) -> Result<(), EditError> {
        self.set_field(
            FieldPath::Composition {
                index,
                part: fields::CompositionPart::Percentage,
            },
            FieldValue::Integer(i64::from(percentage)),
        )
    }

    /// Replace the composition with one fiber at 100%
    pub fn set_single_fiber(&mut self, fiber_type: &str) {
        self.record.compositions = vec![Composition::new(fiber_type.trim(), 100)];
        self.mark_edited(Some(FieldUnit::Compositions));
    }

    /// Set finishing codes; descriptions come from the vocabulary
    pub fn set_finishings(&mut self, codes: &[&str]) {
        let codes: Vec<String> = codes
            .iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        let descs: Vec<String> = codes
            .iter()
            .map(|c| {
                self.vocabulary
                    .finishing_desc(c)
                    .map(str::to_string)
                    .unwrap_or_else(|| c.clone())
            })
            .collect();

        self.record.physical_spec.finishings_code = codes;
        self.record.physical_spec.finishings_desc = descs;
        self.mark_edited(Some(FieldUnit::Finishings));
    }

    fn mark_edited(&mut self, unit: Option<FieldUnit>) {
        if let Some(unit) = unit {
            self.touched.insert(unit);
        }
        if self.state != SessionState::Edited {
            self.transition_to(SessionState::Edited);
        }
    }

    // ========================================================================
    // Validation and persistence
    // ========================================================================

    /// Current deviations without changing state
    pub fn deviations(&self) -> ValidationReport {
        self.validator.validate(&self.record)
    }

    /// Composition-only deviations for the live total indicator
    pub fn composition_deviations(&self) -> Vec<Deviation> {
        composition_deviations(&self.record.compositions)
    }

    /// Validate and move to `Valid` when clean
    pub fn validate(&mut self) -> ValidationReport {
        let report = self.validator.validate(&self.record);

        match (self.state, report.is_valid()) {
            (SessionState::Empty, _) => {}
            (SessionState::Persisted, true) => {}
            (SessionState::Valid, true) => {}
            (SessionState::Drafted, true) => {
                self.transition_to(SessionState::Edited);
                self.transition_to(SessionState::Valid);
            }
            (SessionState::Edited, true) => self.transition_to(SessionState::Valid),
            (SessionState::Edited, false) => {}
            (_, false) => self.transition_to(SessionState::Edited),
        }

        if !report.is_valid() {
            debug!(
                session_id = %self.id,
                deviations = ?report.messages(),
                "Validation found deviations"
            );
        }
        report
    }

    /// Validate, then create or update the stored record
    pub async fn persist(&mut self, store: &dyn SpecStore) -> Result<FabricId, SessionError> {
        if self.identity.art_no.trim().is_empty() {
            return Err(SessionError::MissingIdentity);
        }

        let report = self.validate();
        if !report.is_valid() {
            return Err(SessionError::Invalid(report));
        }

        let search = build_search_string(&self.identity, &self.record, &self.vocabulary);
        let id = match self.stored_id {
            Some(id) => {
                store.update(id, &self.identity, &self.record, &search).await?;
                id
            }
            None => store.create(&self.identity, &self.record, &search).await?,
        };

        self.stored_id = Some(id);
        if self.state != SessionState::Persisted {
            self.transition_to(SessionState::Persisted);
        }
        info!(session_id = %self.id, fabric_id = %id, "Record persisted");
        Ok(id)
    }

    fn transition_to(&mut self, to: SessionState) {
        let transition = Transition {
            from: self.state,
            to,
            at: Utc::now(),
        };
        info!(
            session_id = %self.id,
            from = %transition.from,
            to = %transition.to,
            "Session state transition"
        );
        self.state = to;
        self.history.push(transition);
    }
}
