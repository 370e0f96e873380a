//! Manifest Draft Manager
//!
//! Holds the ordered, duplicate-free list of records committed to the
//! manifest being authored, its form payload, and the session's
//! [`ReservationTracker`]. Every id in the draft is also reserved; all
//! draft mutations go through this type so the two never drift apart.

use rust_decimal::Decimal;
use shared::models::{CargoRecord, ManifestForm, RecordId};
use shared::response::Pagination;
use std::collections::HashSet;

use crate::error::{ClientResult, ValidationIssue};
use crate::reservation::{ReservationReason, ReservationTracker};

/// Result of merging records into the draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSummary {
    /// Ids appended to the draft, in order
    pub added: Vec<RecordId>,
    /// Records already present in the draft (or repeated in the input)
    pub duplicates: usize,
    /// Ids refused because they were conflicted or sealed earlier
    pub refused: Vec<RecordId>,
}

impl AddSummary {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }
}

/// Authoritative in-progress manifest
#[derive(Debug)]
pub struct DraftManager {
    items: Vec<CargoRecord>,
    form: ManifestForm,
    reservations: ReservationTracker,
    page: u32,
    page_size: u32,
}

impl DraftManager {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            form: ManifestForm::default(),
            reservations: ReservationTracker::new(),
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Merge records into the draft with set semantics, reserving each new id
    pub fn add(&mut self, records: impl IntoIterator<Item = CargoRecord>) -> AddSummary {
        let mut summary = AddSummary::default();
        for record in records {
            if self.contains(record.id) {
                summary.duplicates += 1;
                continue;
            }
            if let Some(reason) = self.reservations.reason(record.id)
                && !reason.allows_redraft()
            {
                tracing::debug!(record_id = record.id, ?reason, "Refusing to re-add record");
                summary.refused.push(record.id);
                continue;
            }
            self.reservations.reserve(record.id);
            summary.added.push(record.id);
            self.items.push(record);
        }
        summary
    }

    /// Remove one record and release its reservation
    pub fn remove(&mut self, id: RecordId) -> ClientResult<CargoRecord> {
        let index = self
            .items
            .iter()
            .position(|r| r.id == id)
            .ok_or(ValidationIssue::NotInDraft(id))?;
        let record = self.items.remove(index);
        self.reservations.release(id);
        self.clamp_page();
        Ok(record)
    }

    /// Wipe the item list. Reservations are kept, so cleared records stay
    /// hidden from the picker until the session ends.
    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 0;
    }

    /// Reset the form payload to its defaults
    pub fn reset_form(&mut self) {
        self.form = ManifestForm::default();
    }

    /// Drop ids the server reported as claimed elsewhere and reserve them
    /// permanently. Returns the ids that were actually in the draft.
    pub fn reject_conflicts(&mut self, ids: &[RecordId]) -> Vec<RecordId> {
        let rejected: HashSet<RecordId> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        self.items.retain(|r| {
            if rejected.contains(&r.id) {
                removed.push(r.id);
                false
            } else {
                true
            }
        });
        for id in ids {
            self.reservations
                .reserve_with(*id, ReservationReason::Conflicted);
        }
        self.clamp_page();
        removed
    }

    /// Seal committed ids and drop them from the draft. Items that were
    /// not part of the commit stay where they are.
    pub fn settle_committed(&mut self, ids: &[RecordId]) {
        let committed: HashSet<RecordId> = ids.iter().copied().collect();
        self.items.retain(|r| !committed.contains(&r.id));
        self.reservations.seal(ids.iter().copied());
        self.clamp_page();
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.items.iter().any(|r| r.id == id)
    }

    /// Whether a free-bucket result for `id` must be hidden
    pub fn is_excluded(&self, id: RecordId) -> bool {
        self.reservations.is_reserved(id) || self.contains(id)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of item weights; missing or non-numeric weights count as zero
    pub fn total_weight(&self) -> Decimal {
        self.items.iter().map(CargoRecord::weight_or_zero).sum()
    }

    pub fn total_pieces(&self) -> u64 {
        self.items.iter().map(|r| r.piece_count as u64).sum()
    }

    pub fn items(&self) -> &[CargoRecord] {
        &self.items
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.items.iter().map(|r| r.id).collect()
    }

    pub fn form(&self) -> &ManifestForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ManifestForm {
        &mut self.form
    }

    pub fn reservations(&self) -> &ReservationTracker {
        &self.reservations
    }

    // ========== Pagination ==========

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size, self.items.len() as u64)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
        self.clamp_page();
    }

    /// Items on the current page
    pub fn page_items(&self) -> &[CargoRecord] {
        &self.items[self.pagination().range()]
    }

    fn clamp_page(&mut self) {
        self.page = self.pagination().page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AssignmentFlag;
    use std::str::FromStr;

    fn record(id: RecordId, weight: Option<&str>) -> CargoRecord {
        CargoRecord {
            id,
            bill_reference: format!("BL-{id}"),
            invoice_reference: None,
            booking_reference: None,
            piece_count: 2,
            weight: weight.map(|w| Decimal::from_str(w).unwrap()),
            shipping_method_label: None,
            destination_label: None,
            created_at: 0,
            lifecycle_status: "Pending".to_string(),
            assignment_flag: AssignmentFlag::Free,
        }
    }

    fn assert_subset(draft: &DraftManager) {
        for id in draft.ids() {
            assert!(draft.reservations().is_reserved(id), "{id} not reserved");
        }
    }

    #[test]
    fn test_add_dedups_and_reserves() {
        let mut draft = DraftManager::new(10);
        let summary = draft.add(vec![record(1, None), record(2, None), record(1, None)]);

        assert_eq!(summary.added, vec![1, 2]);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(draft.count(), 2);
        assert_subset(&draft);

        let summary = draft.add(vec![record(2, None), record(3, None)]);
        assert_eq!(summary.added_count(), 1);
        assert_eq!(draft.ids(), vec![1, 2, 3]);
        assert_subset(&draft);
    }

    #[test]
    fn test_remove_releases() {
        let mut draft = DraftManager::new(10);
        draft.add(vec![record(1, None), record(2, None)]);

        let removed = draft.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(!draft.reservations().is_reserved(1));
        assert!(!draft.is_excluded(1));
        assert!(draft.is_excluded(2));
        assert_subset(&draft);
    }

    #[test]
    fn test_remove_missing_is_validation_error() {
        let mut draft = DraftManager::new(10);
        let err = draft.remove(42).unwrap_err();
        assert_eq!(
            err.validation_issue(),
            Some(&ValidationIssue::NotInDraft(42))
        );
    }

    #[test]
    fn test_clear_keeps_reservations() {
        let mut draft = DraftManager::new(10);
        draft.add(vec![record(1, None), record(2, None)]);
        draft.form_mut().carrier = Some("Maersk".to_string());
        draft.clear();

        assert!(draft.is_empty());
        assert!(draft.is_excluded(1));
        assert!(draft.is_excluded(2));
        assert_eq!(draft.form().carrier.as_deref(), Some("Maersk"));

        // A drafted id may come back after a clear
        let summary = draft.add(vec![record(1, None)]);
        assert_eq!(summary.added, vec![1]);
    }

    #[test]
    fn test_reject_conflicts() {
        let mut draft = DraftManager::new(10);
        draft.add(vec![record(1, None), record(2, None), record(3, None)]);

        let removed = draft.reject_conflicts(&[2]);
        assert_eq!(removed, vec![2]);
        assert_eq!(draft.ids(), vec![1, 3]);
        assert_eq!(
            draft.reservations().reason(2),
            Some(ReservationReason::Conflicted)
        );

        let summary = draft.add(vec![record(2, None)]);
        assert_eq!(summary.refused, vec![2]);
        assert_eq!(draft.ids(), vec![1, 3]);
        assert_subset(&draft);
    }

    #[test]
    fn test_settle_committed_keeps_uncommitted_items() {
        let mut draft = DraftManager::new(10);
        draft.add(vec![record(1, None), record(2, None), record(3, None)]);

        draft.settle_committed(&[1, 3]);

        assert_eq!(draft.ids(), vec![2]);
        assert_eq!(draft.reservations().reason(1), Some(ReservationReason::Sealed));
        assert_eq!(draft.reservations().reason(2), Some(ReservationReason::Drafted));
        assert_subset(&draft);
    }

    #[test]
    fn test_total_weight_treats_missing_as_zero() {
        let mut draft = DraftManager::new(10);
        draft.add(vec![
            record(1, Some("10.5")),
            record(2, None),
            record(3, Some("4")),
        ]);
        assert_eq!(draft.total_weight(), Decimal::from_str("14.5").unwrap());
        assert_eq!(draft.total_pieces(), 6);

        draft.remove(1).unwrap();
        assert_eq!(draft.total_weight(), Decimal::from(4));

        draft.remove(3).unwrap();
        draft.remove(2).unwrap();
        assert_eq!(draft.total_weight(), Decimal::ZERO);
    }

    #[test]
    fn test_page_clamps_when_items_shrink() {
        let mut draft = DraftManager::new(2);
        draft.add((1..=5).map(|id| record(id, None)));
        draft.set_page(2);
        assert_eq!(draft.pagination().page, 2);
        assert_eq!(draft.page_items().len(), 1);

        draft.remove(5).unwrap();
        assert_eq!(draft.pagination().page, 1);
        assert_eq!(draft.page_items().len(), 2);

        draft.set_page(99);
        assert_eq!(draft.pagination().page, 1);
    }
}
