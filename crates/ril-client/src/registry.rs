//! In-flight request registry.
//!
//! Requests are keyed by their serial while they wait for a solicited
//! response. The registry owns each [`PendingRequest`] until it is resolved,
//! evicted or drained; all three hand the request back by value, so its
//! completion can only be consumed once.
//!
//! At most one SETUP_DATA_CALL is *tracked* at a time. The tracked slot
//! stores the request's [`RequestId`] as well as its serial, so a slot that
//! outlived its request can never match a newer request that reused the
//! serial.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ril_wire::RequestCode;
use tracing::{debug, trace};

use crate::error::{Result, RilError};
use crate::sink::Completion;

/// Stable identity of a request, unique for the lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request waiting for its response.
#[derive(Debug)]
pub struct PendingRequest {
    /// Registry-assigned identity.
    pub id: RequestId,
    /// Serial sent on the wire.
    pub serial: i32,
    /// Request code, selects the response schema.
    pub command: RequestCode,
    /// Who receives the result.
    pub completion: Completion,
    /// Encoded request frame, kept for diagnostics.
    pub wire: Vec<u8>,
    /// When the request was registered.
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackedRequest {
    id: RequestId,
    serial: i32,
}

/// Registry of in-flight requests.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    pending: HashMap<i32, PendingRequest>,
    tracked_setup: Option<TrackedRequest>,
    next_serial: i32,
    next_id: u64,
}

impl RequestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next free serial.
    ///
    /// Serials count up from 0 and wrap at `i32::MAX`; serials still in
    /// flight are skipped.
    pub fn next_serial(&mut self) -> i32 {
        loop {
            let serial = self.next_serial;
            self.next_serial = if serial == i32::MAX { 0 } else { serial + 1 };
            if !self.pending.contains_key(&serial) {
                return serial;
            }
        }
    }

    /// Register a request under `serial`.
    ///
    /// On `DuplicateSerial` the completion is dropped undelivered; callers
    /// that take serials from [`next_serial`](Self::next_serial) never hit it.
    pub fn register(
        &mut self,
        serial: i32,
        command: RequestCode,
        completion: Completion,
        wire: Vec<u8>,
    ) -> Result<&PendingRequest> {
        use std::collections::hash_map::Entry;

        match self.pending.entry(serial) {
            Entry::Occupied(_) => Err(RilError::DuplicateSerial(serial)),
            Entry::Vacant(slot) => {
                let id = RequestId(self.next_id);
                self.next_id += 1;
                trace!("registered {} {} serial={}", id, command, serial);
                Ok(slot.insert(PendingRequest {
                    id,
                    serial,
                    command,
                    completion,
                    wire,
                    created_at: Instant::now(),
                }))
            }
        }
    }

    /// Remove and return the request with `serial`.
    pub fn resolve(&mut self, serial: i32) -> Result<PendingRequest> {
        let request = self
            .pending
            .remove(&serial)
            .ok_or(RilError::NotFound(serial))?;

        if self.tracked_setup.map(|t| t.id) == Some(request.id) {
            self.tracked_setup = None;
        }

        Ok(request)
    }

    /// Make the request with `serial` the tracked setup request,
    /// superseding any previously tracked one.
    pub fn track_setup(&mut self, serial: i32) -> Result<()> {
        let request = self.pending.get(&serial).ok_or(RilError::NotFound(serial))?;
        let tracked = TrackedRequest {
            id: request.id,
            serial,
        };

        if let Some(previous) = self.tracked_setup.replace(tracked) {
            debug!(
                "setup request {} (serial {}) superseded by {} (serial {})",
                previous.id, previous.serial, tracked.id, serial
            );
        }

        Ok(())
    }

    /// Serial of the tracked setup request, if any.
    pub fn tracked_setup(&self) -> Option<i32> {
        self.tracked_setup.map(|t| t.serial)
    }

    /// Serial and deadline of the tracked setup request.
    pub fn tracked_setup_deadline(&self, timeout: Duration) -> Option<(i32, Instant)> {
        let tracked = self.tracked_setup?;
        let request = self.pending.get(&tracked.serial)?;
        (request.id == tracked.id).then(|| (tracked.serial, request.created_at + timeout))
    }

    /// Evict the tracked setup request if it is still the one with `serial`.
    ///
    /// Returns `None` when the slot is empty, refers to another serial, or
    /// the serial now belongs to a different request.
    pub fn evict_on_timeout(&mut self, serial: i32) -> Option<PendingRequest> {
        let tracked = self.tracked_setup.filter(|t| t.serial == serial)?;

        match self.pending.get(&serial) {
            Some(request) if request.id == tracked.id => {}
            _ => return None,
        }

        self.tracked_setup = None;
        self.pending.remove(&serial)
    }

    /// Remove every pending request, oldest first.
    pub fn drain(&mut self) -> Vec<PendingRequest> {
        self.tracked_setup = None;
        let mut requests: Vec<_> = self.pending.drain().map(|(_, r)| r).collect();
        requests.sort_by_key(|r| r.id);
        requests
    }

    /// Whether `serial` is in flight.
    pub fn contains(&self, serial: i32) -> bool {
        self.pending.contains_key(&serial)
    }

    /// Number of requests in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ResultSink;

    fn register(registry: &mut RequestRegistry, command: RequestCode) -> i32 {
        let serial = registry.next_serial();
        registry
            .register(serial, command, Completion::Caller(ResultSink::discard()), Vec::new())
            .unwrap();
        serial
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = RequestRegistry::new();
        let serial = register(&mut registry, RequestCode::GetCurrentCalls);
        assert!(registry.contains(serial));

        let request = registry.resolve(serial).unwrap();
        assert_eq!(request.command, RequestCode::GetCurrentCalls);
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve(serial), Err(RilError::NotFound(s)) if s == serial));
    }

    #[test]
    fn test_duplicate_serial() {
        let mut registry = RequestRegistry::new();
        let serial = register(&mut registry, RequestCode::RadioPower);
        let err = registry
            .register(serial, RequestCode::RadioPower, Completion::Caller(ResultSink::discard()), Vec::new())
            .unwrap_err();
        assert!(matches!(err, RilError::DuplicateSerial(s) if s == serial));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_serial_skips_in_flight_and_wraps() {
        let mut registry = RequestRegistry::new();
        let first = register(&mut registry, RequestCode::DataCallList);
        assert_eq!(first, 0);

        registry.next_serial = i32::MAX;
        assert_eq!(registry.next_serial(), i32::MAX);
        // 0 is still in flight
        assert_eq!(registry.next_serial(), 1);
    }

    #[test]
    fn test_resolving_tracked_setup_clears_slot() {
        let mut registry = RequestRegistry::new();
        let serial = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(serial).unwrap();
        assert_eq!(registry.tracked_setup(), Some(serial));

        registry.resolve(serial).unwrap();
        assert_eq!(registry.tracked_setup(), None);
        assert!(registry.evict_on_timeout(serial).is_none());
    }

    #[test]
    fn test_track_setup_supersedes() {
        let mut registry = RequestRegistry::new();
        let first = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(first).unwrap();
        let second = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(second).unwrap();

        assert!(registry.evict_on_timeout(first).is_none());
        let evicted = registry.evict_on_timeout(second).unwrap();
        assert_eq!(evicted.serial, second);
        assert_eq!(registry.tracked_setup(), None);
        // The superseded request is still waiting for its response.
        assert!(registry.contains(first));
    }

    #[test]
    fn test_evict_ignores_reused_serial() {
        let mut registry = RequestRegistry::new();
        let serial = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(serial).unwrap();

        // Simulate a stale slot: same serial now belongs to another request.
        let stale = registry.pending.remove(&serial).unwrap();
        registry
            .register(serial, RequestCode::DataCallList, Completion::Caller(ResultSink::discard()), Vec::new())
            .unwrap();
        assert_ne!(registry.pending[&serial].id, stale.id);

        assert!(registry.evict_on_timeout(serial).is_none());
        assert!(registry.contains(serial));
        assert!(registry.tracked_setup_deadline(Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_tracked_deadline() {
        let mut registry = RequestRegistry::new();
        assert!(registry.tracked_setup_deadline(Duration::from_secs(60)).is_none());

        let serial = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(serial).unwrap();
        let (tracked, deadline) = registry.tracked_setup_deadline(Duration::from_secs(60)).unwrap();
        assert_eq!(tracked, serial);
        assert!(deadline > Instant::now());
    }

    #[test]
    fn test_drain_orders_by_age() {
        let mut registry = RequestRegistry::new();
        let a = register(&mut registry, RequestCode::GetCurrentCalls);
        let b = register(&mut registry, RequestCode::SetupDataCall);
        registry.track_setup(b).unwrap();

        let drained: Vec<i32> = registry.drain().into_iter().map(|r| r.serial).collect();
        assert_eq!(drained, vec![a, b]);
        assert!(registry.is_empty());
        assert_eq!(registry.tracked_setup(), None);
    }
}
