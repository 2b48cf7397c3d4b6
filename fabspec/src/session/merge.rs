//! Draft Merge
//!
//! Reconciles a new extractor draft with the record a user may already have
//! edited.
//!
//! # Three-way merge
//! Per `FieldUnit`, with `base` = last applied draft, `ours` = current record,
//! `theirs` = new draft:
//! - unit not changed by the user → take theirs
//! - unit changed by the user → keep ours; if theirs also moved away from
//!   base to a different value, report a conflict
//!
//! "Changed by the user" means `ours != base` when a base exists, else
//! membership in the session's touched set (empty or loaded sessions).
//!
//! `meta.original_text` always follows the newest draft.
//!
//! # Replace
//! The draft supersedes the record; user-changed units that differ are
//! reported as overwritten.

use super::fields::FieldUnit;
use crate::types::SpecRecord;
use fabspec_common::config::MergePolicySetting;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// How a new draft is combined with the current record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    #[default]
    ThreeWay,
    Replace,
}

impl From<MergePolicySetting> for MergePolicy {
    fn from(setting: MergePolicySetting) -> Self {
        match setting {
            MergePolicySetting::ThreeWay => Self::ThreeWay,
            MergePolicySetting::Replace => Self::Replace,
        }
    }
}

/// Which side a conflicting unit ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    KeptOurs,
    TookTheirs,
}

/// One unit where the user edit and the draft disagree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeConflict {
    pub unit: String,
    pub ours: Value,
    pub theirs: Value,
    pub resolution: Resolution,
}

/// Result of one merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub record: SpecRecord,
    /// Units taken from the draft
    pub taken: Vec<FieldUnit>,
    /// Units kept from the current record
    pub kept: Vec<FieldUnit>,
    pub conflicts: Vec<MergeConflict>,
}

/// Combine `theirs` with `ours`
pub fn merge(
    base: Option<&SpecRecord>,
    ours: &SpecRecord,
    theirs: &SpecRecord,
    touched: &BTreeSet<FieldUnit>,
    policy: MergePolicy,
) -> MergeOutcome {
    let user_changed = |unit: FieldUnit| match base {
        Some(base) => !unit.same(ours, base),
        None => touched.contains(&unit),
    };

    let mut outcome = MergeOutcome {
        record: ours.clone(),
        taken: Vec::new(),
        kept: Vec::new(),
        conflicts: Vec::new(),
    };

    for unit in FieldUnit::all() {
        let changed = user_changed(unit);
        let differs = !unit.same(ours, theirs);

        match policy {
            MergePolicy::Replace => {
                unit.copy(theirs, &mut outcome.record);
                outcome.taken.push(unit);
                if changed && differs {
                    outcome.conflicts.push(conflict(unit, ours, theirs, Resolution::TookTheirs));
                }
            }
            MergePolicy::ThreeWay if !changed => {
                unit.copy(theirs, &mut outcome.record);
                outcome.taken.push(unit);
            }
            MergePolicy::ThreeWay => {
                outcome.kept.push(unit);
                let draft_moved = base.map_or(true, |base| !unit.same(theirs, base));
                if differs && draft_moved {
                    outcome.conflicts.push(conflict(unit, ours, theirs, Resolution::KeptOurs));
                }
            }
        }
    }

    outcome.record.meta.original_text = theirs.meta.original_text.clone();
    if policy == MergePolicy::Replace {
        outcome.record.meta.fiber_scheme = theirs.meta.fiber_scheme;
    }

    for c in &outcome.conflicts {
        warn!(unit = %c.unit, resolution = ?c.resolution, "Merge conflict");
    }
    debug!(
        policy = ?policy,
        taken = outcome.taken.len(),
        kept = outcome.kept.len(),
        conflicts = outcome.conflicts.len(),
        "Draft merged"
    );

    outcome
}

fn conflict(
    unit: FieldUnit,
    ours: &SpecRecord,
    theirs: &SpecRecord,
    resolution: Resolution,
) -> MergeConflict {
    MergeConflict {
        unit: unit.to_string(),
        ours: unit.value(ours),
        theirs: unit.value(theirs),
        resolution,
    }
}
