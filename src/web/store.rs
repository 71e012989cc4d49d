// src/web/store.rs
//! In-memory analysis store of the stub service

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::analysis::AnalysisRecord;
use crate::types::response::{HistoryAnalysis, HistoryEntry};
use crate::web::types::StoredAnalysis;

#[derive(Debug, Default)]
pub struct AnalysisStore {
    entries: RwLock<Vec<StoredAnalysis>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: &str, filename: &str, record: AnalysisRecord) {
        let mut entries = self.entries.write().await;
        entries.push(StoredAnalysis {
            id: id.to_string(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            record,
        });
        debug!("Stored analysis {} ({} total)", id, entries.len());
    }

    pub async fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.record.clone())
    }

    /// History rows, newest first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .map(|entry| HistoryEntry {
                id: Some(entry.id.clone()),
                name: entry
                    .record
                    .personal_data
                    .as_ref()
                    .and_then(|p| p.name.clone()),
                filename: Some(entry.filename.clone()),
                upload_date: Some(entry.uploaded_at.to_rfc3339()),
                analysis_results: HistoryAnalysis {
                    role_matches: entry.record.role_matches.clone(),
                },
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
