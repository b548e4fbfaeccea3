use crate::error::{CaptureError, Result};
use crate::time::{Clock, SystemClock};
use crate::transport::message::{TransferMetadata, WireMessage};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;

/// How long an open session may sit without completing before it is
/// considered orphaned and reclaimed by `expire_stale`
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(120);

/// Receiver-side state for one in-flight chunked transfer
#[derive(Debug)]
pub struct TransferSession {
    pub session_id: String,
    pub total_chunks: usize,
    pub metadata: TransferMetadata,
    pub opened_at: u64,
    received: Vec<Option<String>>,
    received_count: usize,
}

impl TransferSession {
    fn new(session_id: String, total_chunks: usize, metadata: TransferMetadata, opened_at: u64) -> Self {
        let mut received = Vec::new();
        received.resize_with(total_chunks, || None);
        Self {
            session_id,
            total_chunks,
            metadata,
            opened_at,
            received,
            received_count: 0,
        }
    }

    /// Store one fragment. Duplicate indices overwrite without double
    /// counting, so replayed data messages keep reassembly idempotent.
    fn store(&mut self, chunk_index: usize, data: String) {
        if self.received[chunk_index].is_none() {
            self.received_count += 1;
        }
        self.received[chunk_index] = Some(data);
    }

    pub fn received_count(&self) -> usize {
        self.received_count
    }

    /// Index of the first missing fragment, if any
    fn first_gap(&self) -> Option<usize> {
        self.received.iter().position(Option::is_none)
    }

    fn join(self) -> String {
        self.received.into_iter().flatten().collect()
    }
}

/// Explicit registry of open sessions, keyed by session id
///
/// Sessions are created on `start` and deleted on `complete` or fatal
/// error; nothing else may hold session state.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: IndexMap<String, TransferSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self, session: TransferSession) {
        self.sessions.insert(session.session_id.clone(), session);
    }

    fn get_mut(&mut self, session_id: &str) -> Option<&mut TransferSession> {
        self.sessions.get_mut(session_id)
    }

    fn close(&mut self, session_id: &str) -> Option<TransferSession> {
        self.sessions.shift_remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferSession> {
        self.sessions.values()
    }
}

/// Observer of transfer side effects; progress is reported after every
/// data message and failures after every fatal validation error
pub trait TransferSubscriber: Send + Sync {
    fn on_progress(&self, session_id: &str, received: usize, total: usize);
    fn on_failure(&self, session_id: &str, reason: &str);
}

/// What handling one wire message produced
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveOutcome {
    /// The message was not part of the chunked protocol
    Ignored,
    /// A session was opened
    Started { session_id: String, total_chunks: usize },
    /// A fragment was stored
    Progress { session_id: String, received: usize, total: usize },
    /// A session completed; `payload` is the exact original serialization
    Reassembled { session_id: String, payload: String },
}

/// Reassembles chunked transfers from the wire
///
/// Owns the session registry outright. Validation failures delete the
/// offending session and surface a human-readable error; other sessions
/// are never touched. There is no retry and no resume: a failed transfer
/// is restarted from scratch by the sender.
pub struct ChunkedReceiver {
    registry: SessionRegistry,
    subscribers: Vec<Arc<dyn TransferSubscriber>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ChunkedReceiver {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_SESSION_TTL)
    }

    /// Create a receiver with an injected clock and session TTL
    pub fn with_clock(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            registry: SessionRegistry::new(),
            subscribers: Vec::new(),
            clock,
            ttl,
        }
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn TransferSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Fractional completion of an open session
    pub fn progress(&self, session_id: &str) -> Option<(usize, usize)> {
        self.registry
            .sessions
            .get(session_id)
            .map(|s| (s.received_count, s.total_chunks))
    }

    /// Feed one wire message through the receiver state machine
    pub fn handle(&mut self, message: WireMessage) -> Result<ReceiveOutcome> {
        match message {
            WireMessage::ChunkedStart { session_id, total_chunks, size_bytes, metadata } => {
                self.handle_start(session_id, total_chunks, size_bytes, metadata)
            }
            WireMessage::ChunkedData { session_id, chunk_index, data, .. } => {
                self.handle_data(session_id, chunk_index, data)
            }
            WireMessage::ChunkedComplete { session_id } => self.handle_complete(session_id),
            _ => Ok(ReceiveOutcome::Ignored),
        }
    }

    fn handle_start(
        &mut self,
        session_id: String,
        total_chunks: usize,
        size_bytes: usize,
        metadata: TransferMetadata,
    ) -> Result<ReceiveOutcome> {
        if self.registry.contains(&session_id) {
            // A replayed start restarts the session from nothing
            log::warn!("Session {} restarted by a second start message", session_id);
            self.registry.close(&session_id);
        }

        log::info!(
            "Opening transfer session {}: {} chunks, {} bytes expected",
            session_id,
            total_chunks,
            size_bytes
        );
        let opened_at = self.clock.now_millis();
        self.registry.open(TransferSession::new(
            session_id.clone(),
            total_chunks,
            metadata,
            opened_at,
        ));

        Ok(ReceiveOutcome::Started { session_id, total_chunks })
    }

    fn handle_data(
        &mut self,
        session_id: String,
        chunk_index: usize,
        data: String,
    ) -> Result<ReceiveOutcome> {
        let Some(session) = self.registry.get_mut(&session_id) else {
            return Err(self.reject_unknown(&session_id));
        };

        if chunk_index >= session.total_chunks {
            let reason = format!(
                "chunk index {} out of range for {} chunks",
                chunk_index, session.total_chunks
            );
            return Err(self.fail_session(&session_id, reason));
        }

        session.store(chunk_index, data);
        let received = session.received_count;
        let total = session.total_chunks;

        log::debug!("Session {}: {}/{} chunks", session_id, received, total);
        for subscriber in &self.subscribers {
            subscriber.on_progress(&session_id, received, total);
        }

        Ok(ReceiveOutcome::Progress { session_id, received, total })
    }

    fn handle_complete(&mut self, session_id: String) -> Result<ReceiveOutcome> {
        let Some(session) = self.registry.get_mut(&session_id) else {
            return Err(self.reject_unknown(&session_id));
        };

        if session.received_count != session.total_chunks {
            let reason = format!(
                "incomplete chunk set: {} of {} received",
                session.received_count, session.total_chunks
            );
            return Err(self.fail_session(&session_id, reason));
        }
        if let Some(gap) = session.first_gap() {
            let reason = format!("chunk {} missing at completion", gap);
            return Err(self.fail_session(&session_id, reason));
        }

        // All slots verified; the session leaves the registry either way
        let session = self
            .registry
            .close(&session_id)
            .ok_or_else(|| CaptureError::UnknownSession(session_id.clone()))?;
        let payload = session.join();

        if let Err(e) = serde_json::from_str::<serde_json::Value>(&payload) {
            let reason = format!(
                "reassembled payload of {} bytes is not valid JSON: {}",
                payload.len(),
                e
            );
            return Err(self.report_failure(&session_id, reason));
        }

        log::info!(
            "Session {} reassembled: {} bytes",
            session_id,
            payload.len()
        );
        Ok(ReceiveOutcome::Reassembled { session_id, payload })
    }

    /// Explicitly discard one open session
    pub fn cancel(&mut self, session_id: &str) -> Result<()> {
        if self.registry.close(session_id).is_none() {
            return Err(CaptureError::UnknownSession(session_id.to_string()));
        }
        log::info!("Session {} cancelled", session_id);
        Ok(())
    }

    /// Reclaim sessions whose start is older than the TTL
    ///
    /// The wire protocol has no cancel message, so an abandoned transfer
    /// orphans receiver state; this is the explicit reclamation path.
    /// Returns the ids of the sessions that were expired.
    pub fn expire_stale(&mut self) -> Vec<String> {
        let now = self.clock.now_millis();
        let ttl_millis = self.ttl.as_millis() as u64;

        let expired: Vec<String> = self
            .registry
            .sessions
            .values()
            .filter(|s| now.saturating_sub(s.opened_at) > ttl_millis)
            .map(|s| s.session_id.clone())
            .collect();

        for session_id in &expired {
            self.registry.close(session_id);
            let reason = format!("session expired after {}s without completing", self.ttl.as_secs());
            log::warn!("Session {}: {}", session_id, reason);
            for subscriber in &self.subscribers {
                subscriber.on_failure(session_id, &reason);
            }
        }

        expired
    }

    fn reject_unknown(&self, session_id: &str) -> CaptureError {
        let reason = format!("no open session '{}'", session_id);
        log::warn!("Rejected message: {}", reason);
        for subscriber in &self.subscribers {
            subscriber.on_failure(session_id, &reason);
        }
        CaptureError::UnknownSession(session_id.to_string())
    }

    fn fail_session(&mut self, session_id: &str, reason: String) -> CaptureError {
        self.registry.close(session_id);
        self.report_failure(session_id, reason)
    }

    fn report_failure(&self, session_id: &str, reason: String) -> CaptureError {
        log::warn!("Session {} failed: {}", session_id, reason);
        for subscriber in &self.subscribers {
            subscriber.on_failure(session_id, &reason);
        }
        CaptureError::TransferFailed {
            session_id: session_id.to_string(),
            reason,
        }
    }
}

impl Default for ChunkedReceiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use std::sync::Mutex;

    fn start(session_id: &str, total_chunks: usize) -> WireMessage {
        WireMessage::ChunkedStart {
            session_id: session_id.into(),
            total_chunks,
            size_bytes: 0,
            metadata: TransferMetadata::default(),
        }
    }

    fn data(session_id: &str, chunk_index: usize, payload: &str) -> WireMessage {
        WireMessage::ChunkedData {
            session_id: session_id.into(),
            chunk_index,
            total_chunks: 0,
            data: payload.into(),
        }
    }

    fn complete(session_id: &str) -> WireMessage {
        WireMessage::ChunkedComplete { session_id: session_id.into() }
    }

    #[test]
    fn test_round_trip_exact_payload() {
        let payload = "{\"answer\": 42, \"text\": \"héllo\"}";
        let fragments: Vec<String> = payload.chars().collect::<Vec<_>>().chunks(7)
            .map(|c| c.iter().collect())
            .collect();

        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", fragments.len())).unwrap();
        for (i, fragment) in fragments.iter().enumerate() {
            receiver.handle(data("s1", i, fragment)).unwrap();
        }

        match receiver.handle(complete("s1")).unwrap() {
            ReceiveOutcome::Reassembled { payload: rebuilt, .. } => assert_eq!(rebuilt, payload),
            other => panic!("expected reassembly, got {:?}", other),
        }
        assert!(receiver.registry().is_empty(), "session must be deleted");
    }

    #[test]
    fn test_out_of_order_chunks() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 3)).unwrap();
        receiver.handle(data("s1", 2, "[3]")).unwrap();
        receiver.handle(data("s1", 0, "[1,")).unwrap();
        receiver.handle(data("s1", 1, "2,")).unwrap();

        match receiver.handle(complete("s1")).unwrap() {
            ReceiveOutcome::Reassembled { payload, .. } => assert_eq!(payload, "[1,2,[3]"),
            other => panic!("expected reassembly, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_chunk_idempotent() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 2)).unwrap();
        receiver.handle(data("s1", 0, "[1,")).unwrap();

        match receiver.handle(data("s1", 0, "[1,")).unwrap() {
            ReceiveOutcome::Progress { received, total, .. } => {
                assert_eq!(received, 1, "duplicate must not double count");
                assert_eq!(total, 2);
            }
            other => panic!("expected progress, got {:?}", other),
        }

        receiver.handle(data("s1", 1, "2]")).unwrap();
        assert!(matches!(
            receiver.handle(complete("s1")).unwrap(),
            ReceiveOutcome::Reassembled { .. }
        ));
    }

    #[test]
    fn test_gap_is_an_error_never_skipped() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 3)).unwrap();
        receiver.handle(data("s1", 0, "a")).unwrap();
        receiver.handle(data("s1", 2, "c")).unwrap();

        let result = receiver.handle(complete("s1"));
        match result {
            Err(CaptureError::TransferFailed { reason, .. }) => {
                assert!(reason.contains("2 of 3"), "reason was: {}", reason);
            }
            other => panic!("expected transfer failure, got {:?}", other),
        }
        assert!(receiver.registry().is_empty(), "failed session must be deleted");
    }

    #[test]
    fn test_unknown_session_rejected_without_side_effects() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("known", 2)).unwrap();
        receiver.handle(data("known", 0, "a")).unwrap();

        assert!(matches!(
            receiver.handle(data("ghost", 0, "x")),
            Err(CaptureError::UnknownSession(_))
        ));
        assert!(matches!(
            receiver.handle(complete("ghost")),
            Err(CaptureError::UnknownSession(_))
        ));

        // The known session is untouched
        assert_eq!(receiver.progress("known"), Some((1, 2)));
        assert_eq!(receiver.registry().len(), 1);
    }

    #[test]
    fn test_out_of_range_index_kills_session() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 2)).unwrap();

        assert!(matches!(
            receiver.handle(data("s1", 5, "x")),
            Err(CaptureError::TransferFailed { .. })
        ));
        assert!(receiver.registry().is_empty());
    }

    #[test]
    fn test_parse_failure_reports_byte_length() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 1)).unwrap();
        receiver.handle(data("s1", 0, "not json at all")).unwrap();

        match receiver.handle(complete("s1")) {
            Err(CaptureError::TransferFailed { reason, .. }) => {
                assert!(reason.contains("15 bytes"), "reason was: {}", reason);
            }
            other => panic!("expected transfer failure, got {:?}", other),
        }
        assert!(receiver.registry().is_empty());
    }

    #[test]
    fn test_thirty_chunk_completion_scenario() {
        let fragment = "x".repeat(100_000);
        let chunks = 30;

        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("big", chunks)).unwrap();

        for i in 0..chunks - 1 {
            let payload = if i == 0 { format!("\"{}", &fragment[1..]) } else { fragment.clone() };
            receiver.handle(data("big", i, &payload)).unwrap();
            assert_eq!(receiver.progress("big"), Some((i + 1, chunks)));
        }

        // Not complete until chunk 29 lands
        assert_eq!(receiver.progress("big"), Some((29, 30)));
        receiver
            .handle(data("big", 29, &format!("{}\"", &fragment[1..])))
            .unwrap();
        assert_eq!(receiver.progress("big"), Some((30, 30)));

        assert!(matches!(
            receiver.handle(complete("big")).unwrap(),
            ReceiveOutcome::Reassembled { .. }
        ));
    }

    #[test]
    fn test_progress_subscriber_notified() {
        #[derive(Default)]
        struct Recorder {
            progress: Mutex<Vec<(usize, usize)>>,
            failures: Mutex<Vec<String>>,
        }
        impl TransferSubscriber for Recorder {
            fn on_progress(&self, _session_id: &str, received: usize, total: usize) {
                self.progress.lock().unwrap().push((received, total));
            }
            fn on_failure(&self, _session_id: &str, reason: &str) {
                self.failures.lock().unwrap().push(reason.to_string());
            }
        }

        let recorder = Arc::new(Recorder::default());
        let mut receiver = ChunkedReceiver::new();
        receiver.subscribe(recorder.clone());

        receiver.handle(start("s1", 2)).unwrap();
        receiver.handle(data("s1", 0, "1")).unwrap();
        receiver.handle(data("s1", 1, "2")).unwrap();

        assert_eq!(*recorder.progress.lock().unwrap(), vec![(1, 2), (2, 2)]);

        let _ = receiver.handle(data("ghost", 0, "x"));
        assert_eq!(recorder.failures.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_ttl_expires_only_stale_sessions() {
        let clock = Arc::new(ManualClock::new(0));
        let mut receiver =
            ChunkedReceiver::with_clock(clock.clone(), Duration::from_secs(120));

        receiver.handle(start("old", 2)).unwrap();
        clock.advance(100_000);
        receiver.handle(start("young", 2)).unwrap();
        clock.advance(30_000); // old: 130s, young: 30s

        let expired = receiver.expire_stale();

        assert_eq!(expired, vec!["old".to_string()]);
        assert!(!receiver.registry().contains("old"));
        assert!(receiver.registry().contains("young"));
    }

    #[test]
    fn test_cancel_discards_session() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 2)).unwrap();

        receiver.cancel("s1").unwrap();
        assert!(receiver.registry().is_empty());
        assert!(matches!(receiver.cancel("s1"), Err(CaptureError::UnknownSession(_))));
    }

    #[test]
    fn test_restarted_session_begins_empty() {
        let mut receiver = ChunkedReceiver::new();
        receiver.handle(start("s1", 2)).unwrap();
        receiver.handle(data("s1", 0, "a")).unwrap();

        receiver.handle(start("s1", 3)).unwrap();
        assert_eq!(receiver.progress("s1"), Some((0, 3)));
    }
}
