//! Manifest authoring session
//!
//! One operator's in-process state for building a manifest. UI events map
//! one-to-one onto the methods here; nothing persists past `Drop`.
//!
//! Every change to the draft re-filters the picker's free bucket against
//! the session's reservations, then refreshes from the pool when the
//! picker is open. A failed refresh is recorded on the query engine and
//! never undoes the draft change that triggered it.
//!
//! While a commit is pending the draft is frozen: `promote`, `remove`,
//! `import` and `clear_draft` fail with [`ClientError::SubmissionInFlight`]
//! until the commit is finished or abandoned.

use chrono::Local;
use shared::models::{
    ActingUser, CargoRecord, CommitResponse, ImportContext, ImportUpload, ManifestForm,
    ManifestPayload, RecordId, ReferenceKind, ReferenceOption,
};
use shared::response::Pagination;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::draft::DraftManager;
use crate::error::{ClientError, ClientResult, ValidationIssue};
use crate::import::{ImportOutcome, ImportReconciler};
use crate::pool::CargoPool;
use crate::query::{ApplyStatus, QueryEngine, ResultBuckets, SearchOutcome, SearchTicket};
use crate::reference::ReferenceCache;
use crate::reservation::ReservationTracker;
use crate::staging::{PromoteSummary, StagingController, ToggleAll};
use crate::submission::{SubmissionCoordinator, SubmitOutcome};

pub struct AuthoringSession<P: CargoPool + ?Sized> {
    pool: Arc<P>,
    config: ClientConfig,
    operator: Option<ActingUser>,
    query: QueryEngine,
    staging: StagingController,
    draft: DraftManager,
    submission: SubmissionCoordinator,
    references: ReferenceCache,
    picker_open: bool,
    picker_page: u32,
}

impl<P: CargoPool + ?Sized> AuthoringSession<P> {
    pub fn new(pool: Arc<P>, config: ClientConfig) -> Self {
        Self {
            pool,
            draft: DraftManager::new(config.draft_page_size),
            config,
            operator: None,
            query: QueryEngine::new(),
            staging: StagingController::new(),
            submission: SubmissionCoordinator::new(),
            references: ReferenceCache::new(),
            picker_open: false,
            picker_page: 0,
        }
    }

    pub fn with_operator(mut self, operator: ActingUser) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn set_operator(&mut self, operator: Option<ActingUser>) {
        self.operator = operator;
    }

    // ========== Picker ==========

    /// Open the picker and list the free pool
    pub async fn open_picker(&mut self) -> ClientResult<ApplyStatus> {
        self.picker_open = true;
        self.picker_page = 0;
        let ticket = self.begin_search("");
        let outcome = ticket.fetch(&*self.pool, std::time::Duration::ZERO).await;
        self.apply_search(ticket.generation(), outcome)
    }

    /// Close the picker. In-flight searches are discarded and the staged
    /// selection and search text are cleared.
    pub fn close_picker(&mut self) {
        self.picker_open = false;
        self.picker_page = 0;
        self.query.reset();
        self.staging.clear();
        tracing::debug!("Picker closed");
    }

    /// Debounced search; superseded searches resolve to [`ApplyStatus::Stale`]
    pub async fn search(&mut self, text: &str) -> ClientResult<ApplyStatus> {
        if !self.picker_open {
            tracing::debug!("Picker closed, search not sent");
            return Ok(ApplyStatus::Stale);
        }
        let ticket = self.begin_search(text);
        let outcome = ticket.fetch(&*self.pool, self.config.search_debounce()).await;
        self.apply_search(ticket.generation(), outcome)
    }

    /// Issue a search without running it, for callers that drive fetches
    /// concurrently via [`SearchTicket::fetch`] and [`Self::pool`]
    pub fn begin_search(&mut self, text: &str) -> SearchTicket {
        self.picker_page = 0;
        self.query.begin(text)
    }

    pub fn apply_search(
        &mut self,
        generation: u64,
        outcome: ClientResult<SearchOutcome>,
    ) -> ClientResult<ApplyStatus> {
        if !self.picker_open {
            tracing::debug!(generation, "Picker closed, dropping search response");
            return Ok(ApplyStatus::Stale);
        }
        let draft = &self.draft;
        let status = self
            .query
            .apply(generation, outcome, |id| draft.is_excluded(id))?;
        if status == ApplyStatus::Applied {
            self.sync_picker();
        }
        Ok(status)
    }

    /// Re-run the current search immediately
    pub async fn refresh(&mut self) -> ClientResult<ApplyStatus> {
        if !self.picker_open {
            return Ok(ApplyStatus::Stale);
        }
        let text = self.query.text().to_string();
        let page = self.picker_page;
        let ticket = self.query.begin(text);
        let outcome = ticket.fetch(&*self.pool, std::time::Duration::ZERO).await;
        let status = self.apply_search(ticket.generation(), outcome)?;
        self.set_picker_page(page);
        Ok(status)
    }

    /// Stage or unstage a visible free record. Used or unknown ids are
    /// ignored. Returns whether the record is staged afterwards.
    pub fn toggle_one(&mut self, id: RecordId) -> bool {
        match self.query.buckets().free_matches.iter().find(|r| r.id == id) {
            Some(record) => self.staging.toggle_one(record),
            None => {
                tracing::debug!(record_id = id, "Toggle on a record that is not selectable");
                false
            }
        }
    }

    /// Select-all over the current picker page only
    pub fn toggle_all_visible(&mut self) -> ToggleAll {
        let range = self.picker_pagination().range();
        let visible = &self.query.buckets().free_matches[range];
        self.staging.toggle_all_visible(visible)
    }

    pub fn clear_selection(&mut self) {
        self.staging.clear();
    }

    pub fn set_picker_page(&mut self, page: u32) {
        self.picker_page = page;
        self.picker_page = self.picker_pagination().page;
    }

    // ========== Draft ==========

    /// Move the staged selection into the draft
    pub async fn promote(&mut self) -> ClientResult<PromoteSummary> {
        self.ensure_draft_editable()?;
        let summary = self.staging.promote(&mut self.draft)?;
        self.after_draft_change().await;
        Ok(summary)
    }

    /// Remove one record; it becomes selectable again
    pub async fn remove(&mut self, id: RecordId) -> ClientResult<CargoRecord> {
        self.ensure_draft_editable()?;
        let record = self.draft.remove(id)?;
        self.after_draft_change().await;
        Ok(record)
    }

    /// Empty the draft. Cleared records stay reserved for this session.
    pub fn clear_draft(&mut self) -> ClientResult<()> {
        self.ensure_draft_editable()?;
        self.draft.clear();
        Ok(())
    }

    /// Import a spreadsheet and merge the attributable records
    pub async fn import(
        &mut self,
        upload: ImportUpload,
        target_status: impl Into<String>,
    ) -> ClientResult<ImportOutcome> {
        self.ensure_draft_editable()?;
        let operator = self
            .operator
            .clone()
            .ok_or(ValidationIssue::MissingOperator)?;
        let ctx = ImportContext {
            branch_id: operator.branch_id,
            target_status: target_status.into(),
        };

        let plan = ImportReconciler::reconcile(
            &*self.pool,
            &upload,
            &ctx,
            &self.draft,
            Local::now().date_naive(),
        )
        .await?;
        let outcome = plan.merge_into(&mut self.draft);

        crate::audit_log!(
            operator.user_id,
            "import",
            format!("file:{}", upload.file_name),
            outcome.message()
        );
        self.after_draft_change().await;
        Ok(outcome)
    }

    // ========== Submission ==========

    /// Validate, commit and reconcile in one call
    pub async fn submit(&mut self) -> ClientResult<SubmitOutcome> {
        let payload = self.begin_submit()?;
        let response = self.pool.commit_manifest(&payload).await;
        self.finish_submit(&payload, response).await
    }

    /// Validate the draft and claim the in-flight slot
    pub fn begin_submit(&mut self) -> ClientResult<ManifestPayload> {
        self.submission.begin(&self.draft, self.operator.as_ref())
    }

    /// Reconcile a commit response dispatched by the caller
    pub async fn finish_submit(
        &mut self,
        payload: &ManifestPayload,
        response: ClientResult<CommitResponse>,
    ) -> ClientResult<SubmitOutcome> {
        let outcome = self.submission.finish(payload, response, &mut self.draft)?;
        match &outcome {
            SubmitOutcome::Committed {
                manifest_id,
                record_count,
            } => {
                crate::audit_log!(
                    payload.created_by,
                    "commit",
                    format!("manifest:{manifest_id}"),
                    format!("{record_count} records")
                );
                self.close_picker();
            }
            SubmitOutcome::Conflicted { conflict_ids, .. } => {
                crate::audit_log!(
                    payload.created_by,
                    "conflict",
                    format!("request:{}", payload.request_id),
                    format!("{conflict_ids:?}")
                );
                self.after_draft_change().await;
            }
        }
        Ok(outcome)
    }

    /// Release the in-flight slot after a dispatch that never produced a
    /// response (dropped or cancelled). The draft is left as it was.
    pub fn abandon_submit(&mut self) {
        if self.submission.is_in_flight() {
            tracing::warn!("Pending commit abandoned");
        }
        self.submission.abandon();
    }

    // ========== Reference data ==========

    pub async fn reference(&mut self, kind: ReferenceKind) -> ClientResult<&[ReferenceOption]> {
        self.references.get(&*self.pool, kind).await
    }

    pub fn references(&self) -> &ReferenceCache {
        &self.references
    }

    // ========== Accessors ==========

    pub fn pool(&self) -> Arc<P> {
        Arc::clone(&self.pool)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn operator(&self) -> Option<&ActingUser> {
        self.operator.as_ref()
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn search_text(&self) -> &str {
        self.query.text()
    }

    pub fn buckets(&self) -> &ResultBuckets {
        self.query.buckets()
    }

    pub fn used_warning(&self) -> Option<String> {
        self.query.buckets().used_warning()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.query.last_error()
    }

    pub fn picker_pagination(&self) -> Pagination {
        Pagination::new(
            self.picker_page,
            self.config.picker_page_size,
            self.query.buckets().free_matches.len() as u64,
        )
    }

    /// Free matches on the current picker page
    pub fn picker_page_items(&self) -> &[CargoRecord] {
        &self.query.buckets().free_matches[self.picker_pagination().range()]
    }

    pub fn staging(&self) -> &StagingController {
        &self.staging
    }

    pub fn draft(&self) -> &DraftManager {
        &self.draft
    }

    pub fn set_draft_page(&mut self, page: u32) {
        self.draft.set_page(page);
    }

    pub fn form(&self) -> &ManifestForm {
        self.draft.form()
    }

    pub fn form_mut(&mut self) -> &mut ManifestForm {
        self.draft.form_mut()
    }

    pub fn reservations(&self) -> &ReservationTracker {
        self.draft.reservations()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_in_flight()
    }

    // ========== Internal ==========

    fn ensure_draft_editable(&self) -> ClientResult<()> {
        if self.submission.is_in_flight() {
            tracing::warn!("Draft edit rejected, a commit is pending");
            return Err(ClientError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Drop newly excluded ids from the picker and the staged selection
    fn sync_picker(&mut self) {
        let draft = &self.draft;
        self.query.reapply_exclusions(|id| draft.is_excluded(id));
        self.staging.retain(|id| !draft.is_excluded(id));
        self.picker_page = self.picker_pagination().page;
    }

    async fn after_draft_change(&mut self) {
        self.sync_picker();
        if self.picker_open
            && let Err(e) = self.refresh().await
        {
            tracing::warn!(error = %e, "Picker refresh after draft change failed");
        }
    }
}
