//! Picker Staging Controller
//!
//! Transient multi-select over the picker's free bucket. Selections are
//! keyed by record id and kept in pick order; promoting drains them into
//! the draft.

use shared::models::{CargoRecord, RecordId};
use std::collections::HashMap;

use crate::draft::{AddSummary, DraftManager};
use crate::error::{ClientResult, ValidationIssue};

/// Result of a select-all toggle over the visible page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAll {
    /// Every visible free record is now staged; `n` were newly added
    Selected(usize),
    /// Every visible record was already staged and has been unstaged
    Deselected(usize),
    /// Nothing selectable on the page
    Unchanged,
}

/// Result of moving the staged selection into the draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoteSummary {
    pub staged: usize,
    pub added: usize,
    pub duplicates: usize,
    pub refused: Vec<RecordId>,
}

impl From<(usize, AddSummary)> for PromoteSummary {
    fn from((staged, add): (usize, AddSummary)) -> Self {
        Self {
            staged,
            added: add.added.len(),
            duplicates: add.duplicates,
            refused: add.refused,
        }
    }
}

#[derive(Debug, Default)]
pub struct StagingController {
    order: Vec<RecordId>,
    selected: HashMap<RecordId, CargoRecord>,
}

impl StagingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one record's staged state. Used records cannot be staged.
    ///
    /// Returns whether the record is staged afterwards.
    pub fn toggle_one(&mut self, record: &CargoRecord) -> bool {
        if !record.is_free() {
            tracing::debug!(record_id = record.id, "Ignoring toggle on used record");
            return false;
        }
        if self.selected.remove(&record.id).is_some() {
            self.order.retain(|id| *id != record.id);
            false
        } else {
            self.order.push(record.id);
            self.selected.insert(record.id, record.clone());
            true
        }
    }

    /// Select every free record in `visible`, or deselect them all when
    /// they are already staged. Only the given page is affected.
    pub fn toggle_all_visible(&mut self, visible: &[CargoRecord]) -> ToggleAll {
        let candidates: Vec<&CargoRecord> = visible.iter().filter(|r| r.is_free()).collect();
        if candidates.is_empty() {
            return ToggleAll::Unchanged;
        }

        let all_staged = candidates.iter().all(|r| self.selected.contains_key(&r.id));
        if all_staged {
            for record in &candidates {
                self.selected.remove(&record.id);
            }
            self.order.retain(|id| self.selected.contains_key(id));
            ToggleAll::Deselected(candidates.len())
        } else {
            let mut added = 0;
            for record in candidates {
                if !self.selected.contains_key(&record.id) {
                    self.order.push(record.id);
                    self.selected.insert(record.id, record.clone());
                    added += 1;
                }
            }
            ToggleAll::Selected(added)
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.selected.clear();
    }

    /// Unstage ids that became ineligible (e.g. reserved by another path)
    pub fn retain(&mut self, keep: impl Fn(RecordId) -> bool) {
        self.selected.retain(|id, _| keep(*id));
        self.order.retain(|id| keep(*id));
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Staged ids in pick order
    pub fn ids(&self) -> &[RecordId] {
        &self.order
    }

    /// Move the staged records into the draft and clear the selection
    pub fn promote(&mut self, draft: &mut DraftManager) -> ClientResult<PromoteSummary> {
        if self.is_empty() {
            return Err(ValidationIssue::NothingSelected.into());
        }
        let staged = self.order.len();
        let records: Vec<CargoRecord> = self
            .order
            .drain(..)
            .filter_map(|id| self.selected.remove(&id))
            .collect();
        self.selected.clear();

        let add = draft.add(records);
        tracing::info!(
            staged,
            added = add.added.len(),
            duplicates = add.duplicates,
            "Promoted selection into draft"
        );
        Ok(PromoteSummary::from((staged, add)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AssignmentFlag;

    fn record(id: RecordId, flag: AssignmentFlag) -> CargoRecord {
        CargoRecord {
            id,
            bill_reference: format!("BL-{id}"),
            invoice_reference: None,
            booking_reference: None,
            piece_count: 1,
            weight: None,
            shipping_method_label: None,
            destination_label: None,
            created_at: 0,
            lifecycle_status: "Pending".to_string(),
            assignment_flag: flag,
        }
    }

    fn free(id: RecordId) -> CargoRecord {
        record(id, AssignmentFlag::Free)
    }

    #[test]
    fn test_toggle_one() {
        let mut staging = StagingController::new();
        assert!(staging.toggle_one(&free(1)));
        assert!(staging.is_selected(1));
        assert!(!staging.toggle_one(&free(1)));
        assert!(staging.is_empty());
    }

    #[test]
    fn test_used_record_cannot_be_staged() {
        let mut staging = StagingController::new();
        assert!(!staging.toggle_one(&record(7, AssignmentFlag::Used)));
        assert!(!staging.is_selected(7));
    }

    #[test]
    fn test_toggle_all_visible() {
        let mut staging = StagingController::new();
        let page = vec![free(1), free(2), free(3)];

        staging.toggle_one(&free(2));
        assert_eq!(staging.toggle_all_visible(&page), ToggleAll::Selected(2));
        assert_eq!(staging.len(), 3);

        assert_eq!(staging.toggle_all_visible(&page), ToggleAll::Deselected(3));
        assert!(staging.is_empty());

        assert_eq!(staging.toggle_all_visible(&[]), ToggleAll::Unchanged);
    }

    #[test]
    fn test_toggle_all_leaves_other_pages() {
        let mut staging = StagingController::new();
        staging.toggle_one(&free(10));
        let page = vec![free(1), free(2)];

        staging.toggle_all_visible(&page);
        staging.toggle_all_visible(&page);

        assert_eq!(staging.ids(), &[10]);
    }

    #[test]
    fn test_promote_empty_is_validation_error() {
        let mut staging = StagingController::new();
        let mut draft = DraftManager::new(10);
        let err = staging.promote(&mut draft).unwrap_err();
        assert_eq!(err.validation_issue(), Some(&ValidationIssue::NothingSelected));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_promote_moves_in_pick_order() {
        let mut staging = StagingController::new();
        let mut draft = DraftManager::new(10);
        draft.add(vec![free(2)]);

        staging.toggle_one(&free(3));
        staging.toggle_one(&free(2));
        staging.toggle_one(&free(1));

        let summary = staging.promote(&mut draft).unwrap();
        assert_eq!(summary.staged, 3);
        assert_eq!(summary.added, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(draft.ids(), vec![2, 3, 1]);
        assert!(staging.is_empty());
    }
}
