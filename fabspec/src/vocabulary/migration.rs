//! Fiber-scheme migration of stored records

use super::fibers::{migrate_code, FiberScheme};
use crate::types::SpecRecord;
use thiserror::Error;
use tracing::info;

/// Migration failure; the record is left unchanged
#[derive(Debug, Error, PartialEq)]
#[error("cannot migrate from {from} to {to}: no mapping for {}", .unmapped.join(", "))]
pub struct MigrationError {
    pub from: FiberScheme,
    pub to: FiberScheme,
    /// Composition codes that are not members of the source scheme
    pub unmapped: Vec<String>,
}

/// Rewrite every composition code into `to` and retag the record
///
/// All codes are checked before any is rewritten, so a failed migration
/// leaves the record untouched. Returns how many codes changed spelling.
pub fn migrate_record(record: &mut SpecRecord, to: FiberScheme) -> Result<usize, MigrationError> {
    let from = record.meta.fiber_scheme;
    if from == to {
        return Ok(0);
    }

    let mut mapped = Vec::with_capacity(record.compositions.len());
    let mut unmapped = Vec::new();
    for composition in &record.compositions {
        match migrate_code(&composition.fiber_type, from, to) {
            Some(code) => mapped.push(code),
            None => unmapped.push(composition.fiber_type.clone()),
        }
    }

    if !unmapped.is_empty() {
        return Err(MigrationError { from, to, unmapped });
    }

    let mut changed = 0;
    for (composition, code) in record.compositions.iter_mut().zip(mapped) {
        if composition.fiber_type != code {
            composition.fiber_type = code.to_string();
            changed += 1;
        }
    }
    record.meta.fiber_scheme = to;

    info!(%from, %to, changed, "Migrated record fiber scheme");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Composition;

    fn legacy_record(codes: &[(&str, i32)]) -> SpecRecord {
        let mut record = SpecRecord::empty(FiberScheme::Legacy);
        record.compositions = codes
            .iter()
            .map(|(code, pct)| Composition::new(*code, *pct))
            .collect();
        record
    }

    #[test]
    fn test_legacy_to_iso() {
        let mut record = legacy_record(&[("PE", 60), ("CO", 35), ("EL", 5)]);
        let changed = migrate_record(&mut record, FiberScheme::Iso).unwrap();

        assert_eq!(changed, 1);
        assert_eq!(record.meta.fiber_scheme, FiberScheme::Iso);
        let codes: Vec<&str> = record.compositions.iter().map(|c| c.fiber_type.as_str()).collect();
        assert_eq!(codes, vec!["PES", "CO", "EL"]);
    }

    #[test]
    fn test_round_trip_restores_codes() {
        let original = legacy_record(&[("NA", 80), ("TE", 20)]);
        let mut record = original.clone();
        migrate_record(&mut record, FiberScheme::Iso).unwrap();
        migrate_record(&mut record, FiberScheme::Legacy).unwrap();
        assert_eq!(record, original);
    }

    #[test]
    fn test_unmapped_codes_fail_without_changes() {
        let original = legacy_record(&[("NA", 50), ("Bamboo", 30), ("PES", 20)]);
        let mut record = original.clone();

        let err = migrate_record(&mut record, FiberScheme::Iso).unwrap_err();
        assert_eq!(err.unmapped, vec!["Bamboo".to_string(), "PES".to_string()]);
        assert_eq!(record, original);
    }

    #[test]
    fn test_same_scheme_is_noop() {
        let mut record = legacy_record(&[("Whatever", 100)]);
        assert_eq!(migrate_record(&mut record, FiberScheme::Legacy), Ok(0));
    }
}
