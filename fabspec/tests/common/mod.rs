//! Test Helper Utilities
//!
//! In-memory store and scripted extractors shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fabspec::extractors::{ExtractionError, Extractor};
use fabspec::search::FabricIdentity;
use fabspec::store::{FabricId, SpecStore, StoreError};
use fabspec::types::{Classification, Composition, SpecRecord};
use fabspec::vocabulary::{FiberScheme, Vocabulary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn vocabulary() -> Arc<Vocabulary> {
    Arc::new(Vocabulary::standard(FiberScheme::Legacy))
}

/// Draft with one fiber, a weave code and a density
pub fn draft(fiber: &str, fabric_code: &str, density: f64) -> SpecRecord {
    let mut record = SpecRecord::empty(FiberScheme::Legacy);
    record.compositions = vec![Composition::new(fiber, 100)];
    record.classification = Classification::new(fabric_code, "");
    record.physical_spec.density_total = Some(density);
    record
}

/// Stored row
#[derive(Debug, Clone)]
pub struct StoredFabric {
    pub identity: FabricIdentity,
    pub record: SpecRecord,
    pub search: String,
}

/// `SpecStore` backed by a map
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<FabricId, StoredFabric>>,
}

impl MemoryStore {
    pub fn get(&self, id: FabricId) -> Option<StoredFabric> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SpecStore for MemoryStore {
    async fn create(
        &self,
        identity: &FabricIdentity,
        record: &SpecRecord,
        search: &str,
    ) -> Result<FabricId, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|row| row.identity.art_no == identity.art_no) {
            return Err(StoreError::Conflict(identity.art_no.clone()));
        }
        let id = FabricId::new();
        rows.insert(
            id,
            StoredFabric {
                identity: identity.clone(),
                record: record.clone(),
                search: search.to_string(),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: FabricId,
        identity: &FabricIdentity,
        record: &SpecRecord,
        search: &str,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *row = StoredFabric {
            identity: identity.clone(),
            record: record.clone(),
            search: search.to_string(),
        };
        Ok(())
    }
}

/// Returns a fixed draft after an optional delay
pub struct FixedExtractor {
    pub draft: SpecRecord,
    pub delay: Duration,
}

#[async_trait]
impl Extractor for FixedExtractor {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
        tokio::time::sleep(self.delay).await;
        let mut record = self.draft.clone();
        record.meta.original_text = raw.to_string();
        Ok(record)
    }
}

/// First call blocks until released; later calls answer at once
pub struct GatedExtractor {
    pub gate: Arc<Notify>,
    pub started: Arc<Notify>,
    calls: Mutex<usize>,
}

impl GatedExtractor {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            started: Arc::new(Notify::new()),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Extractor for GatedExtractor {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn extract(&self, raw: &str) -> Result<SpecRecord, ExtractionError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let fiber = if call == 1 {
            self.started.notify_one();
            self.gate.notified().await;
            "CO"
        } else {
            "NA"
        };
        let mut record = draft(fiber, "PL", 200.0);
        record.meta.original_text = raw.to_string();
        Ok(record)
    }
}
