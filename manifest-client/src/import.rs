//! Bulk Import Reconciler
//!
//! Delegates spreadsheet ingestion to the remote import endpoint and works
//! out which records the batch produced, so they can enter the draft under
//! the same reservation rules as a picker promotion.
//!
//! # Attribution
//!
//! | Response    | Source of records                                   | Outcome     |
//! |-------------|-----------------------------------------------------|-------------|
//! | Returned    | the endpoint's own list, at least one of them new   | `Imported`  |
//! | Unconfirmed | free pool after import minus free pool before       | `Inferred`  |
//! | Unconfirmed | created today with the target status (best effort)  | `Inferred`  |
//! | either      | nothing attributable                                | `NothingNew`|
//!
//! The plan is fully computed before anything touches the draft, so a
//! failure at any step leaves the draft as it was.

use chrono::NaiveDate;
use shared::models::{CargoRecord, ImportContext, ImportResponse, ImportUpload, RecordId};
use std::collections::HashSet;

use crate::draft::DraftManager;
use crate::error::ClientResult;
use crate::pool::{CargoPool, PoolFilter};

/// How an unconfirmed import's records were inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceBasis {
    /// Difference between the free pool before and after the import
    SnapshotDiff,
    /// Created today with the import's target status
    Heuristic,
}

/// Result of merging an import into the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The endpoint confirmed the records
    Imported { added: usize, skipped: usize },
    /// Records were attributed without confirmation from the endpoint
    Inferred { added: usize, basis: InferenceBasis },
    /// Nothing could be attributed to the import; the draft is unchanged
    NothingNew { confirmed: bool },
}

impl ImportOutcome {
    /// Whether the endpoint itself named the imported records
    pub fn is_confirmed(&self) -> bool {
        match self {
            Self::Imported { .. } => true,
            Self::Inferred { .. } => false,
            Self::NothingNew { confirmed } => *confirmed,
        }
    }

    /// Operator-facing summary
    pub fn message(&self) -> String {
        match self {
            Self::Imported { added, skipped: 0 } => format!("Imported {added} records"),
            Self::Imported { added, skipped } => {
                format!("Imported {added} records ({skipped} already in draft or unavailable)")
            }
            Self::Inferred { added, basis } => {
                let how = match basis {
                    InferenceBasis::SnapshotDiff => "new in the pool after import",
                    InferenceBasis::Heuristic => "created today with the import status",
                };
                format!(
                    "Could not confirm which records were imported; added {added} records {how}. Please review."
                )
            }
            Self::NothingNew { confirmed: true } => "Nothing new to add".to_string(),
            Self::NothingNew { confirmed: false } => {
                "Nothing new to add; could not confirm which records were imported".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PlanSource {
    Returned,
    Inferred(InferenceBasis),
    Nothing { confirmed: bool },
}

/// Records attributed to one import, ready to merge
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    records: Vec<CargoRecord>,
    source: PlanSource,
}

impl ImportPlan {
    pub fn records(&self) -> &[CargoRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge every planned record into the draft in one step
    pub fn merge_into(self, draft: &mut DraftManager) -> ImportOutcome {
        let outcome = match self.source {
            PlanSource::Nothing { confirmed } => ImportOutcome::NothingNew { confirmed },
            PlanSource::Returned => {
                let total = self.records.len();
                let summary = draft.add(self.records);
                if summary.added.is_empty() {
                    ImportOutcome::NothingNew { confirmed: true }
                } else {
                    ImportOutcome::Imported {
                        added: summary.added_count(),
                        skipped: total - summary.added_count(),
                    }
                }
            }
            PlanSource::Inferred(basis) => {
                let summary = draft.add(self.records);
                if summary.added.is_empty() {
                    ImportOutcome::NothingNew { confirmed: false }
                } else {
                    ImportOutcome::Inferred {
                        added: summary.added_count(),
                        basis,
                    }
                }
            }
        };
        tracing::info!(?outcome, "Import merged");
        outcome
    }
}

/// Stateless import driver
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportReconciler;

impl ImportReconciler {
    /// Upload a batch and attribute its records.
    ///
    /// `today` is the operator's local date, used by the heuristic path.
    pub async fn reconcile<P>(
        pool: &P,
        upload: &ImportUpload,
        ctx: &ImportContext,
        draft: &DraftManager,
        today: NaiveDate,
    ) -> ClientResult<ImportPlan>
    where
        P: CargoPool + ?Sized,
    {
        let before = pool.query_pool(&PoolFilter::free()).await?;
        tracing::debug!(
            file = %upload.file_name,
            before = before.len(),
            "Uploading import batch"
        );

        match pool.import_batch(upload, ctx).await? {
            ImportResponse::Returned(records) => {
                let source = if records.is_empty() {
                    PlanSource::Nothing { confirmed: true }
                } else {
                    PlanSource::Returned
                };
                Ok(ImportPlan { records, source })
            }
            ImportResponse::Unconfirmed => {
                tracing::warn!(
                    file = %upload.file_name,
                    "Import endpoint returned no records, inferring"
                );
                let after = pool.query_pool(&PoolFilter::free()).await?;
                Ok(infer(before, after, ctx, draft, today))
            }
        }
    }
}

fn infer(
    before: Vec<CargoRecord>,
    after: Vec<CargoRecord>,
    ctx: &ImportContext,
    draft: &DraftManager,
    today: NaiveDate,
) -> ImportPlan {
    let known: HashSet<RecordId> = before.iter().map(|r| r.id).collect();
    let eligible = |r: &CargoRecord| r.is_free() && !draft.contains(r.id);

    let diff: Vec<CargoRecord> = after
        .iter()
        .filter(|r| !known.contains(&r.id) && eligible(r))
        .cloned()
        .collect();
    if !diff.is_empty() {
        return ImportPlan {
            records: diff,
            source: PlanSource::Inferred(InferenceBasis::SnapshotDiff),
        };
    }

    let heuristic: Vec<CargoRecord> = after
        .into_iter()
        .filter(|r| {
            eligible(r)
                && r.created_on() == Some(today)
                && r.has_status(&ctx.target_status)
        })
        .collect();
    if heuristic.is_empty() {
        ImportPlan {
            records: Vec::new(),
            source: PlanSource::Nothing { confirmed: false },
        }
    } else {
        ImportPlan {
            records: heuristic,
            source: PlanSource::Inferred(InferenceBasis::Heuristic),
        }
    }
}
