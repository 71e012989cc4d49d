//! In-memory `AnalysisApi` for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::core::error::ClientError;
use crate::core::service_client::AnalysisApi;
use crate::types::analysis::AnalysisRecord;
use crate::types::response::{HistoryEntry, UploadOutcome};
use crate::upload::SelectedFile;

type AnalysisResult = Result<AnalysisRecord, ClientError>;

/// Canned responses; analysis fetches can be held open until released
#[derive(Default)]
pub struct FakeApi {
    upload: Mutex<Option<Result<UploadOutcome, ClientError>>>,
    history: Mutex<Option<Result<Vec<HistoryEntry>, ClientError>>>,
    records: Mutex<HashMap<String, AnalysisRecord>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<AnalysisResult>>>,
    panics: Mutex<HashSet<String>>,
    upload_calls: AtomicUsize,
    history_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_upload(&self, result: Result<UploadOutcome, ClientError>) {
        *self.upload.lock().unwrap() = Some(result);
    }

    pub fn set_history(&self, result: Result<Vec<HistoryEntry>, ClientError>) {
        *self.history.lock().unwrap() = Some(result);
    }

    pub fn insert_record(&self, id: &str, record: AnalysisRecord) {
        self.records.lock().unwrap().insert(id.to_string(), record);
    }

    /// Hold the next fetch of `id` until the returned sender fires
    pub fn gate(&self, id: &str) -> oneshot::Sender<AnalysisResult> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(id.to_string(), rx);
        tx
    }

    /// Make every fetch of `id` panic
    pub fn panic_on(&self, id: &str) {
        self.panics.lock().unwrap().insert(id.to_string());
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisApi for FakeApi {
    async fn upload_resume(&self, _file: &SelectedFile) -> Result<UploadOutcome, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ClientError::NetworkFailure("no canned upload".to_string())))
    }

    async fn fetch_analysis(&self, id: &str) -> Result<AnalysisRecord, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.panics.lock().unwrap().contains(id) {
            panic!("fetch of {} blew up", id);
        }
        let gate = self.gates.lock().unwrap().remove(id);
        if let Some(rx) = gate {
            return rx
                .await
                .unwrap_or_else(|_| Err(ClientError::NetworkFailure("gate dropped".to_string())));
        }
        self.records
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::server(Some(404), format!("Analysis {} not found", id)))
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
