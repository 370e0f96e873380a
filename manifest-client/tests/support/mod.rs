//! In-memory cargo pool for driving authoring sessions in tests
#![allow(dead_code)]

use async_trait::async_trait;
use manifest_client::{
    ActingUser, AssignmentFlag, CargoPool, CargoRecord, ClientConfig, ClientError, ClientResult,
    CommitResponse, ConflictReport, ImportContext, ImportResponse, ImportUpload, ManifestPayload,
    PoolFilter, RecordId, ReferenceKind, ReferenceOption,
};
use shared::error::{AppError, ErrorCode};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    records: Vec<CargoRecord>,
    /// Return the whole bucket regardless of the text filter
    ignore_text_filter: bool,
    fail_queries: bool,
    fail_commit: bool,
    fail_import: bool,
    fail_references: bool,
    /// Records the next import creates, and whether the endpoint reports them
    pending_import: Option<(Vec<CargoRecord>, bool)>,
    next_manifest_id: i64,
    query_calls: usize,
    commit_calls: usize,
    import_calls: usize,
    reference_calls: usize,
    committed: Vec<ManifestPayload>,
}

#[derive(Default)]
pub struct MemoryPool {
    state: Mutex<State>,
}

impl MemoryPool {
    pub fn with_records(records: Vec<CargoRecord>) -> Self {
        let pool = Self::default();
        {
            let mut state = pool.state.lock().unwrap();
            state.records = records;
            state.next_manifest_id = 100;
        }
        pool
    }

    /// Simulate another session assigning records first
    pub fn claim(&self, ids: &[RecordId]) {
        let mut state = self.state.lock().unwrap();
        for record in state.records.iter_mut() {
            if ids.contains(&record.id) {
                record.assignment_flag = AssignmentFlag::Used;
            }
        }
    }

    pub fn insert(&self, record: CargoRecord) {
        self.state.lock().unwrap().records.push(record);
    }

    pub fn ignore_text_filter(&self) {
        self.state.lock().unwrap().ignore_text_filter = true;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn fail_commit(&self, fail: bool) {
        self.state.lock().unwrap().fail_commit = fail;
    }

    pub fn fail_import(&self, fail: bool) {
        self.state.lock().unwrap().fail_import = fail;
    }

    pub fn fail_references(&self, fail: bool) {
        self.state.lock().unwrap().fail_references = fail;
    }

    pub fn prepare_import(&self, records: Vec<CargoRecord>, confirmed: bool) {
        self.state.lock().unwrap().pending_import = Some((records, confirmed));
    }

    pub fn query_calls(&self) -> usize {
        self.state.lock().unwrap().query_calls
    }

    pub fn commit_calls(&self) -> usize {
        self.state.lock().unwrap().commit_calls
    }

    pub fn import_calls(&self) -> usize {
        self.state.lock().unwrap().import_calls
    }

    pub fn reference_calls(&self) -> usize {
        self.state.lock().unwrap().reference_calls
    }

    pub fn committed(&self) -> Vec<ManifestPayload> {
        self.state.lock().unwrap().committed.clone()
    }

    pub fn flag_of(&self, id: RecordId) -> Option<AssignmentFlag> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.assignment_flag)
    }
}

fn network_down() -> ClientError {
    ClientError::Server(AppError::new(ErrorCode::NetworkError))
}

#[async_trait]
impl CargoPool for MemoryPool {
    async fn query_pool(&self, filter: &PoolFilter) -> ClientResult<Vec<CargoRecord>> {
        let mut state = self.state.lock().unwrap();
        state.query_calls += 1;
        if state.fail_queries {
            return Err(network_down());
        }
        let text = filter.text.clone().unwrap_or_default();
        let ignore_text = state.ignore_text_filter;
        Ok(state
            .records
            .iter()
            .filter(|r| r.assignment_flag == filter.assignment)
            .filter(|r| ignore_text || r.matches_reference(&text))
            .cloned()
            .collect())
    }

    async fn import_batch(
        &self,
        _upload: &ImportUpload,
        _context: &ImportContext,
    ) -> ClientResult<ImportResponse> {
        let mut state = self.state.lock().unwrap();
        state.import_calls += 1;
        if state.fail_import {
            return Err(ClientError::Server(AppError::import_failed("bad sheet")));
        }
        let (records, confirmed) = state.pending_import.take().unwrap_or_default();
        state.records.extend(records.iter().cloned());
        if confirmed {
            Ok(ImportResponse::Returned(records))
        } else {
            Ok(ImportResponse::Unconfirmed)
        }
    }

    async fn commit_manifest(&self, payload: &ManifestPayload) -> ClientResult<CommitResponse> {
        let mut state = self.state.lock().unwrap();
        state.commit_calls += 1;
        if state.fail_commit {
            return Err(network_down());
        }
        let conflict_ids: Vec<RecordId> = payload
            .record_ids
            .iter()
            .copied()
            .filter(|id| {
                !state
                    .records
                    .iter()
                    .any(|r| r.id == *id && r.assignment_flag == AssignmentFlag::Free)
            })
            .collect();
        if !conflict_ids.is_empty() {
            return Ok(CommitResponse::Conflict(ConflictReport { conflict_ids }));
        }

        for record in state.records.iter_mut() {
            if payload.record_ids.contains(&record.id) {
                record.assignment_flag = AssignmentFlag::Used;
            }
        }
        state.committed.push(payload.clone());
        state.next_manifest_id += 1;
        Ok(CommitResponse::Committed {
            manifest_id: state.next_manifest_id,
        })
    }

    async fn fetch_reference(&self, kind: ReferenceKind) -> ClientResult<Vec<ReferenceOption>> {
        let mut state = self.state.lock().unwrap();
        state.reference_calls += 1;
        if state.fail_references {
            return Err(network_down());
        }
        let names: &[&str] = match kind {
            ReferenceKind::Branches => &["Shenzhen", "Hong Kong"],
            ReferenceKind::Ports => &["Yantian", "Rotterdam", "Felixstowe"],
            ReferenceKind::ShippingMethods => &["Sea", "Air"],
            ReferenceKind::Statuses => &["Draft", "Loaded"],
        };
        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| ReferenceOption {
                id: i as i64 + 1,
                name: name.to_string(),
                is_active: i < 2,
            })
            .collect())
    }
}

pub fn record(id: RecordId, bill: &str, flag: AssignmentFlag) -> CargoRecord {
    CargoRecord {
        id,
        bill_reference: bill.to_string(),
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

pub fn free(id: RecordId, bill: &str) -> CargoRecord {
    record(id, bill, AssignmentFlag::Free)
}

pub fn used(id: RecordId, bill: &str) -> CargoRecord {
    record(id, bill, AssignmentFlag::Used)
}

/// Free records 1..=n with bills BL-<id>
pub fn free_records(n: RecordId) -> Vec<CargoRecord> {
    (1..=n).map(|id| free(id, &format!("BL-{id}"))).collect()
}

pub fn operator() -> ActingUser {
    ActingUser {
        user_id: 7,
        branch_id: 3,
    }
}

/// No debounce so searches resolve immediately
pub fn config() -> ClientConfig {
    ClientConfig::new("http://pool.test").with_search_debounce(0)
}

pub fn fill_form(form: &mut manifest_client::ManifestForm) {
    form.origin_port_id = Some(1);
    form.destination_port_id = Some(2);
    form.departure_date = Some("2024-05-10".to_string());
    form.status_id = Some(1);
}
