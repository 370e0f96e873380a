//! Cargo Pool Query Engine
//!
//! Issues filtered queries against the remote pool and splits the result
//! into a selectable free bucket and an informational used bucket.
//!
//! # Sequencing
//!
//! ```text
//! begin(text) ──> SearchTicket{generation} ──fetch(pool, debounce)──> SearchOutcome
//!                                                                      │
//! apply(generation, outcome) <─────────────────────────────────────────┘
//!     ├─ generation == latest → install buckets
//!     └─ otherwise            → drop (stale)
//! ```
//!
//! A ticket that is superseded during its quiet period never reaches the
//! network. Only the most recently issued generation may replace the
//! visible buckets, whatever order responses arrive in.

use futures::future::try_join;
use shared::models::{AssignmentFlag, CargoRecord, RecordId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::ClientResult;
use crate::pool::{CargoPool, PoolFilter};

/// Used matches named individually in the warning note
const WARNING_NAME_LIMIT: usize = 5;

/// Raw query result, before session exclusions are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolSnapshot {
    pub free: Vec<CargoRecord>,
    pub used: Vec<CargoRecord>,
}

/// Visible search result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBuckets {
    /// Assignable records, minus reserved and drafted ids
    pub free_matches: Vec<CargoRecord>,
    /// Already assigned records; shown as a warning, never selectable
    pub used_matches: Vec<CargoRecord>,
}

impl ResultBuckets {
    fn from_snapshot(snapshot: &PoolSnapshot, excluded: impl Fn(RecordId) -> bool) -> Self {
        Self {
            free_matches: snapshot
                .free
                .iter()
                .filter(|r| !excluded(r.id))
                .cloned()
                .collect(),
            used_matches: snapshot.used.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.free_matches.is_empty() && self.used_matches.is_empty()
    }

    /// Warning note for the used bucket, `None` when nothing matched as used
    pub fn used_warning(&self) -> Option<String> {
        if self.used_matches.is_empty() {
            return None;
        }
        let count = self.used_matches.len();
        let names: Vec<&str> = self
            .used_matches
            .iter()
            .take(WARNING_NAME_LIMIT)
            .map(|r| r.bill_reference.as_str())
            .collect();
        let mut note = if count == 1 {
            format!("1 matching record is already assigned: {}", names.join(", "))
        } else {
            format!(
                "{} matching records are already assigned: {}",
                count,
                names.join(", ")
            )
        };
        if count > WARNING_NAME_LIMIT {
            note.push_str(&format!(" and {} more", count - WARNING_NAME_LIMIT));
        }
        Some(note)
    }
}

/// Result of a ticket's fetch
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Fetched(PoolSnapshot),
    /// A newer search was issued during the quiet period; no query was sent
    Superseded,
}

/// What `apply` did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Applied,
    /// Response belonged to an older generation and was dropped
    Stale,
}

/// Handle for one issued search
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    text: String,
    latest: Arc<AtomicU64>,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether no newer search has been issued since this one
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// Wait out the quiet period, then query the pool unless superseded
    pub async fn fetch<P>(&self, pool: &P, debounce: Duration) -> ClientResult<SearchOutcome>
    where
        P: CargoPool + ?Sized,
    {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        if !self.is_current() {
            tracing::debug!(generation = self.generation, "Search superseded before dispatch");
            return Ok(SearchOutcome::Superseded);
        }
        fetch_buckets(pool, &self.text)
            .await
            .map(SearchOutcome::Fetched)
    }
}

/// Query the pool for `text`.
///
/// Empty text lists free records only. Otherwise the free and used queries
/// run concurrently with the same reference filter.
pub async fn fetch_buckets<P>(pool: &P, text: &str) -> ClientResult<PoolSnapshot>
where
    P: CargoPool + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        let free = pool.query_pool(&PoolFilter::free()).await?;
        return Ok(PoolSnapshot {
            free: ensure_filtered(free, "", AssignmentFlag::Free),
            used: Vec::new(),
        });
    }

    let free_filter = PoolFilter::matching(text, AssignmentFlag::Free);
    let used_filter = PoolFilter::matching(text, AssignmentFlag::Used);
    let (free, used) = try_join(
        pool.query_pool(&free_filter),
        pool.query_pool(&used_filter),
    )
    .await?;

    Ok(PoolSnapshot {
        free: ensure_filtered(free, text, AssignmentFlag::Free),
        used: ensure_filtered(used, text, AssignmentFlag::Used),
    })
}

/// Re-filter a response client-side when the remote ignored the text
/// parameter, and drop records from the wrong bucket.
fn ensure_filtered(
    records: Vec<CargoRecord>,
    text: &str,
    assignment: AssignmentFlag,
) -> Vec<CargoRecord> {
    let unfiltered = records.iter().any(|r| !r.matches_reference(text));
    if unfiltered {
        tracing::debug!(
            text,
            bucket = assignment.as_query_value(),
            "Remote filter ignored, filtering client-side"
        );
    }
    records
        .into_iter()
        .filter(|r| r.assignment_flag == assignment)
        .filter(|r| !unfiltered || r.matches_reference(text))
        .collect()
}

/// Search state for one picker search box
#[derive(Debug, Default)]
pub struct QueryEngine {
    latest: Arc<AtomicU64>,
    text: String,
    snapshot: PoolSnapshot,
    buckets: ResultBuckets,
    last_error: Option<String>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new search generation for `text`
    pub fn begin(&mut self, text: impl Into<String>) -> SearchTicket {
        self.text = text.into();
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, text = %self.text, "Search issued");
        SearchTicket {
            generation,
            text: self.text.clone(),
            latest: Arc::clone(&self.latest),
        }
    }

    /// Install a response if it belongs to the latest generation.
    ///
    /// A failed current response keeps the previous buckets and records the
    /// error (see [`Self::last_error`]) before returning it.
    pub fn apply(
        &mut self,
        generation: u64,
        outcome: ClientResult<SearchOutcome>,
        excluded: impl Fn(RecordId) -> bool,
    ) -> ClientResult<ApplyStatus> {
        if generation != self.latest.load(Ordering::Acquire) {
            tracing::warn!(
                generation,
                latest = self.latest.load(Ordering::Acquire),
                "Discarding stale search response"
            );
            return Ok(ApplyStatus::Stale);
        }
        match outcome {
            Ok(SearchOutcome::Fetched(snapshot)) => {
                self.buckets = ResultBuckets::from_snapshot(&snapshot, excluded);
                self.snapshot = snapshot;
                self.last_error = None;
                tracing::debug!(
                    generation,
                    free = self.buckets.free_matches.len(),
                    used = self.buckets.used_matches.len(),
                    "Search applied"
                );
                Ok(ApplyStatus::Applied)
            }
            Ok(SearchOutcome::Superseded) => Ok(ApplyStatus::Stale),
            Err(e) => {
                tracing::warn!(generation, error = %e, "Search failed, keeping previous results");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Recompute the free bucket from the last snapshot after the
    /// session's exclusions changed
    pub fn reapply_exclusions(&mut self, excluded: impl Fn(RecordId) -> bool) {
        self.buckets = ResultBuckets::from_snapshot(&self.snapshot, excluded);
    }

    /// Invalidate outstanding tickets and forget text, results and errors
    pub fn reset(&mut self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
        self.text.clear();
        self.snapshot = PoolSnapshot::default();
        self.buckets = ResultBuckets::default();
        self.last_error = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn buckets(&self) -> &ResultBuckets {
        &self.buckets
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Message of the last failed search, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
