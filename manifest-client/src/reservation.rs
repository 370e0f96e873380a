//! Session reservation tracker
//!
//! Client-local set of record ids suppressed from free-bucket results for
//! the rest of the authoring session, whatever the server reports. Nothing
//! here is persisted; the set lives and dies with its `DraftManager`.

use shared::models::RecordId;
use std::collections::HashMap;

/// Why an id is reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReservationReason {
    /// Promoted or imported into the draft by this session
    Drafted,
    /// Rejected at commit time because another session claimed it first
    Conflicted,
    /// Committed in a manifest by this session
    Sealed,
}

impl ReservationReason {
    /// Only ids this session drafted may return to the draft
    pub fn allows_redraft(&self) -> bool {
        matches!(self, Self::Drafted)
    }
}

/// Monotonic id set with explicit release
#[derive(Debug, Default)]
pub struct ReservationTracker {
    reserved: HashMap<RecordId, ReservationReason>,
}

impl ReservationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id drafted by this session. Returns `true` if newly reserved.
    pub fn reserve(&mut self, id: RecordId) -> bool {
        self.reserve_with(id, ReservationReason::Drafted)
    }

    /// Reserve with an explicit reason; an existing reservation is only ever
    /// strengthened (`Drafted` < `Conflicted` < `Sealed`).
    pub fn reserve_with(&mut self, id: RecordId, reason: ReservationReason) -> bool {
        match self.reserved.get_mut(&id) {
            Some(existing) => {
                if reason > *existing {
                    *existing = reason;
                }
                false
            }
            None => {
                self.reserved.insert(id, reason);
                true
            }
        }
    }

    /// Release a drafted id. Conflicted and sealed ids stay reserved.
    pub fn release(&mut self, id: RecordId) -> bool {
        match self.reserved.get(&id) {
            Some(ReservationReason::Drafted) => {
                self.reserved.remove(&id);
                true
            }
            Some(reason) => {
                tracing::debug!(record_id = id, ?reason, "Release refused");
                false
            }
            None => false,
        }
    }

    /// Make reservations permanent for committed ids
    pub fn seal(&mut self, ids: impl IntoIterator<Item = RecordId>) {
        for id in ids {
            self.reserve_with(id, ReservationReason::Sealed);
        }
    }

    pub fn is_reserved(&self, id: RecordId) -> bool {
        self.reserved.contains_key(&id)
    }

    pub fn reason(&self, id: RecordId) -> Option<ReservationReason> {
        self.reserved.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.reserved.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_release() {
        let mut tracker = ReservationTracker::new();
        assert!(tracker.reserve(1));
        assert!(!tracker.reserve(1));
        assert!(tracker.is_reserved(1));

        assert!(tracker.release(1));
        assert!(!tracker.is_reserved(1));
        assert!(!tracker.release(1));
    }

    #[test]
    fn test_conflicted_cannot_be_released() {
        let mut tracker = ReservationTracker::new();
        tracker.reserve(7);
        tracker.reserve_with(7, ReservationReason::Conflicted);

        assert!(!tracker.release(7));
        assert_eq!(tracker.reason(7), Some(ReservationReason::Conflicted));
    }

    #[test]
    fn test_reasons_only_strengthen() {
        let mut tracker = ReservationTracker::new();
        tracker.seal([3]);
        tracker.reserve(3);
        tracker.reserve_with(3, ReservationReason::Conflicted);

        assert_eq!(tracker.reason(3), Some(ReservationReason::Sealed));
        assert!(!tracker.release(3));
        assert!(!ReservationReason::Sealed.allows_redraft());
        assert!(ReservationReason::Drafted.allows_redraft());
    }

    #[test]
    fn test_ids_and_len() {
        let mut tracker = ReservationTracker::new();
        tracker.reserve(1);
        tracker.reserve(2);
        tracker.seal([3]);

        let mut ids: Vec<_> = tracker.ids().collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(tracker.len(), 3);
        assert!(!tracker.is_empty());
    }
}
