//! Submission Coordinator
//!
//! Validates the draft, builds the commit payload and reconciles the
//! server's verdict:
//!
//! - **Committed**: committed ids are sealed and leave the draft, the
//!   form resets
//! - **Conflict**: only the rejected ids leave the draft and become
//!   permanently reserved; the rest stay for resubmission
//! - **Failure**: draft and reservations untouched
//!
//! At most one commit may be pending at a time.

use shared::models::{ActingUser, CommitResponse, ManifestPayload, RecordId};
use std::collections::HashSet;

use crate::draft::DraftManager;
use crate::error::{ClientError, ClientResult, ValidationIssue};

/// Reconciled commit result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Committed {
        manifest_id: i64,
        record_count: usize,
    },
    /// Some records were claimed elsewhere; the draft still holds `remaining`
    Conflicted {
        conflict_ids: Vec<RecordId>,
        remaining: usize,
    },
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Committed {
                manifest_id,
                record_count,
            } => format!("Manifest {manifest_id} created with {record_count} records"),
            Self::Conflicted {
                conflict_ids,
                remaining,
            } => format!(
                "{} records were already assigned elsewhere and were removed; {} remain, please submit again",
                conflict_ids.len(),
                remaining
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct SubmissionCoordinator {
    in_flight: Option<String>,
}

impl SubmissionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft and reserve the in-flight slot.
    ///
    /// Nothing is sent here; the caller dispatches the returned payload and
    /// hands the response to [`Self::finish`].
    pub fn begin(
        &mut self,
        draft: &DraftManager,
        operator: Option<&ActingUser>,
    ) -> ClientResult<ManifestPayload> {
        if self.in_flight.is_some() {
            tracing::warn!("Submission rejected, another commit is pending");
            return Err(ClientError::SubmissionInFlight);
        }
        let payload = build_payload(draft, operator)?;
        tracing::info!(
            request_id = %payload.request_id,
            records = payload.record_ids.len(),
            "Submitting manifest"
        );
        self.in_flight = Some(payload.request_id.clone());
        Ok(payload)
    }

    /// Reconcile the commit response into the draft and free the slot
    pub fn finish(
        &mut self,
        payload: &ManifestPayload,
        response: ClientResult<CommitResponse>,
        draft: &mut DraftManager,
    ) -> ClientResult<SubmitOutcome> {
        if self.in_flight.as_deref() != Some(payload.request_id.as_str()) {
            tracing::warn!(request_id = %payload.request_id, "Finishing a commit that was not pending");
            return Err(ClientError::InvalidResponse(format!(
                "commit {} is not the pending submission",
                payload.request_id
            )));
        }
        self.in_flight = None;

        match response? {
            CommitResponse::Committed { manifest_id } => {
                draft.settle_committed(&payload.record_ids);
                draft.reset_form();
                tracing::info!(manifest_id, records = payload.record_ids.len(), "Manifest committed");
                Ok(SubmitOutcome::Committed {
                    manifest_id,
                    record_count: payload.record_ids.len(),
                })
            }
            CommitResponse::Conflict(report) => {
                if report.conflict_ids.is_empty() {
                    return Err(ClientError::InvalidResponse(
                        "conflict response without conflict ids".to_string(),
                    ));
                }
                let submitted: HashSet<RecordId> = payload.record_ids.iter().copied().collect();
                let foreign: Vec<RecordId> = report
                    .conflict_ids
                    .iter()
                    .copied()
                    .filter(|id| !submitted.contains(id))
                    .collect();
                if !foreign.is_empty() {
                    tracing::warn!(?foreign, "Conflict report names ids that were not submitted");
                }

                draft.reject_conflicts(&report.conflict_ids);
                tracing::warn!(
                    conflicts = report.conflict_ids.len(),
                    remaining = draft.count(),
                    "Manifest commit conflicted"
                );
                Ok(SubmitOutcome::Conflicted {
                    conflict_ids: report.conflict_ids,
                    remaining: draft.count(),
                })
            }
        }
    }

    /// Release the in-flight slot without touching the draft
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

fn build_payload(
    draft: &DraftManager,
    operator: Option<&ActingUser>,
) -> ClientResult<ManifestPayload> {
    let form = draft.form();
    let origin_port_id = form
        .origin_port_id
        .ok_or(ValidationIssue::MissingField("origin_port_id"))?;
    let destination_port_id = form
        .destination_port_id
        .ok_or(ValidationIssue::MissingField("destination_port_id"))?;
    let departure_date = form
        .departure_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ValidationIssue::MissingField("departure_date"))?
        .to_string();
    let status_id = form
        .status_id
        .ok_or(ValidationIssue::MissingField("status_id"))?;
    if draft.is_empty() {
        return Err(ValidationIssue::EmptyDraft.into());
    }
    let operator = operator.ok_or(ValidationIssue::MissingOperator)?;

    Ok(ManifestPayload {
        request_id: uuid::Uuid::new_v4().to_string(),
        record_ids: draft.ids(),
        origin_port_id,
        destination_port_id,
        shipping_method_id: form.shipping_method_id,
        departure_date,
        arrival_date: form.arrival_date.clone(),
        status_id,
        carrier: form.carrier.clone(),
        vehicle_number: form.vehicle_number.clone(),
        note: form.note.clone(),
        created_by: operator.user_id,
        branch_id: operator.branch_id,
    })
}
