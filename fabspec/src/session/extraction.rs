//! Extraction lifecycle
//!
//! At most one extraction is in flight per session. Starting one cancels the
//! previous token and bumps the generation counter; a reply carrying an
//! older generation is discarded as stale.
//!
//! `SessionHandle` drives the extractor call without holding the session
//! lock across the network round trip: lock to begin, unlock, await the
//! extractor (with timeout and cancellation), lock again to complete.

use super::{DraftReport, FormSession, SessionError};
use crate::extractors::{ExtractionError, Extractor};
use crate::types::SpecRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Claim on the current extraction slot
#[derive(Debug, Clone)]
pub struct ExtractionTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

impl FormSession {
    /// Start a new extraction, cancelling any in flight
    pub fn begin_extraction(&mut self) -> ExtractionTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
            debug!(session_id = %self.id, generation = self.generation, "Superseded extraction cancelled");
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        ExtractionTicket {
            generation: self.generation,
            token,
        }
    }

    /// Apply an extraction result if it is still current
    ///
    /// A stale reply leaves the record untouched. A failure also leaves the
    /// record untouched and is returned to the caller.
    pub fn complete_extraction(
        &mut self,
        ticket: &ExtractionTicket,
        result: Result<SpecRecord, ExtractionError>,
    ) -> Result<DraftReport, SessionError> {
        if ticket.generation != self.generation {
            warn!(
                session_id = %self.id,
                reply = ticket.generation,
                current = self.generation,
                "Discarding stale extraction reply"
            );
            return Err(SessionError::Stale {
                reply: ticket.generation,
                current: self.generation,
            });
        }

        if ticket.token.is_cancelled() {
            debug!(session_id = %self.id, generation = ticket.generation, "Reply to cancelled extraction dropped");
            return Err(SessionError::Extraction(ExtractionError::Cancelled));
        }

        self.in_flight = None;
        let draft = result.map_err(|e| {
            warn!(session_id = %self.id, error = %e, "Extraction failed");
            e
        })?;
        Ok(self.apply_draft(draft))
    }

    /// Cancel the in-flight extraction, if any
    pub fn cancel_extraction(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            debug!(session_id = %self.id, generation = self.generation, "Extraction cancelled");
        }
    }

    /// Current extraction generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn extraction_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Shared session plus the extractor that feeds it
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<FormSession>>,
    extractor: Arc<dyn Extractor>,
    timeout: Duration,
}

impl SessionHandle {
    pub fn new(session: FormSession, extractor: Arc<dyn Extractor>, timeout: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            extractor,
            timeout,
        }
    }

    /// Lock the session for synchronous edits
    pub async fn lock(&self) -> MutexGuard<'_, FormSession> {
        self.session.lock().await
    }

    /// Extract `raw` and merge the draft into the session
    pub async fn extract(&self, raw: &str) -> Result<DraftReport, SessionError> {
        let ticket = self.session.lock().await.begin_extraction();
        debug!(
            extractor = self.extractor.name(),
            generation = ticket.generation,
            "Extraction started"
        );

        let result = tokio::select! {
            _ = ticket.token.cancelled() => Err(ExtractionError::Cancelled),
            reply = tokio::time::timeout(self.timeout, self.extractor.extract(raw)) => {
                reply.unwrap_or(Err(ExtractionError::Timeout(self.timeout)))
            }
        };

        self.session.lock().await.complete_extraction(&ticket, result)
    }

    /// Cancel whatever extraction is in flight
    pub async fn cancel(&self) {
        self.session.lock().await.cancel_extraction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::mock::MockExtractor;
    use crate::session::{MergePolicy, SessionState};
    use crate::types::{Classification, Composition};
    use crate::vocabulary::{FiberScheme, Vocabulary};

    fn session() -> FormSession {
        FormSession::new(
            Arc::new(Vocabulary::standard(FiberScheme::Legacy)),
            MergePolicy::ThreeWay,
        )
    }

    fn draft(fiber: &str) -> SpecRecord {
        let mut record = SpecRecord::empty(FiberScheme::Legacy);
        record.compositions = vec![Composition::new(fiber, 100)];
        record.classification = Classification::new("PL", "");
        record
    }

    #[test]
    fn test_stale_reply_discarded() {
        let mut s = session();
        let first = s.begin_extraction();
        let second = s.begin_extraction();
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());

        let err = s.complete_extraction(&first, Ok(draft("CO"))).unwrap_err();
        assert!(matches!(err, SessionError::Stale { reply: 1, current: 2 }));
        assert!(s.record().compositions.is_empty());
        assert_eq!(s.state(), SessionState::Empty);

        s.complete_extraction(&second, Ok(draft("NA"))).unwrap();
        assert_eq!(s.record().compositions, vec![Composition::new("NA", 100)]);
        assert!(!s.extraction_in_flight());
    }

    #[test]
    fn test_reply_after_cancel_is_dropped() {
        let mut s = session();
        let ticket = s.begin_extraction();
        s.cancel_extraction();

        let err = s.complete_extraction(&ticket, Ok(draft("CO"))).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Extraction(ExtractionError::Cancelled)
        ));
        assert!(s.record().compositions.is_empty());
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn test_failure_keeps_record() {
        let mut s = session();
        let ticket = s.begin_extraction();
        s.complete_extraction(&ticket, Ok(draft("NA"))).unwrap();
        let before = s.record().clone();

        let ticket = s.begin_extraction();
        let err = s
            .complete_extraction(&ticket, Err(ExtractionError::Api("503".to_string())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Extraction(ExtractionError::Api(_))));
        assert_eq!(s.record(), &before);
    }

    #[tokio::test]
    async fn test_handle_applies_draft() {
        let extractor = Arc::new(MockExtractor {
            result: Ok(draft("NA")),
        });
        let handle = SessionHandle::new(session(), extractor, Duration::from_secs(5));

        let report = handle.extract("Nylon plain").await.unwrap();
        assert!(report.conflicts.is_empty());

        let s = handle.lock().await;
        assert_eq!(s.record().meta.original_text, "Nylon plain");
        assert_eq!(s.state(), SessionState::Drafted);
    }
}
