// src/history.rs
//! Past analyses: fetching, summarizing, opening one in the detail view

use chrono::{DateTime, FixedOffset, Locale, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::ClientError;
use crate::core::service_client::AnalysisApi;
use crate::render::{rank_roles, RoleRow, NOT_AVAILABLE};
use crate::types::response::HistoryEntry;

const TOP_ROLES: usize = 3;
const DATE_FORMAT: &str = "%d %B %Y, %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub id: String,
    pub candidate_name: String,
    pub filename: String,
    pub upload_date: String,
    pub top3_roles: Vec<RoleRow>,
}

fn parse_upload_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Locale-aware date and time; the raw text when it cannot be parsed
pub fn format_upload_date(raw: &str, locale: Locale) -> String {
    match parse_upload_date(raw) {
        Some(date) => date.format_localized(DATE_FORMAT, locale).to_string(),
        None => raw.to_string(),
    }
}

/// Table row for one history entry; `None` when the entry cannot be opened
pub fn summarize(entry: &HistoryEntry, locale: Locale) -> Option<HistorySummary> {
    let id = entry.id.clone().filter(|id| !id.is_empty())?;
    let mut top3_roles = rank_roles(&entry.analysis_results.role_matches);
    top3_roles.truncate(TOP_ROLES);

    let text = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    Some(HistorySummary {
        id,
        candidate_name: text(&entry.name),
        filename: text(&entry.filename),
        upload_date: entry
            .upload_date
            .as_deref()
            .map(|raw| format_upload_date(raw, locale))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        top3_roles,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryState {
    Idle,
    Loading,
    Loaded(Vec<HistorySummary>),
    Failed(ClientError),
}

pub struct HistoryFetcher<A: ?Sized> {
    api: Arc<A>,
    locale: Locale,
    state: HistoryState,
}

impl<A: AnalysisApi + ?Sized> HistoryFetcher<A> {
    pub fn new(api: Arc<A>, locale: Locale) -> Self {
        Self {
            api,
            locale,
            state: HistoryState::Idle,
        }
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// Fetch the list of past analyses, replacing what was loaded before
    pub async fn list_history(&mut self) -> Result<&[HistorySummary], ClientError> {
        self.state = HistoryState::Loading;

        match self.api.list_history().await {
            Ok(entries) => {
                let total = entries.len();
                let rows: Vec<HistorySummary> = entries
                    .iter()
                    .filter_map(|entry| summarize(entry, self.locale))
                    .collect();
                if rows.len() < total {
                    warn!("{} history entries without an id were skipped", total - rows.len());
                }
                info!("Loaded {} history rows", rows.len());
                self.state = HistoryState::Loaded(rows);
                Ok(self.rows())
            }
            Err(e) => {
                warn!("History fetch failed: {}", e);
                self.state = HistoryState::Failed(e.clone());
                Err(e)
            }
        }
    }

    pub fn rows(&self) -> &[HistorySummary] {
        match &self.state {
            HistoryState::Loaded(rows) => rows,
            _ => &[],
        }
    }

    /// Identifier to bind in the detail view for a loaded row
    pub fn open(&self, id: &str) -> Option<String> {
        self.rows()
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeApi;
    use crate::types::response::parse_history_body;

    const HISTORY: &str = r#"[
        {"id": 7, "name": "Jane Doe", "filename": "jane.pdf", "upload_date": "2024-03-05T14:07:00Z",
         "analysis_results": {"role_matches": {
            "data_engineer": 55.5, "ml_engineer": 81.27, "ai_manager": 70,
            "data_architect": 70, "research_scientist": 12}}},
        {"name": "No Id", "filename": "x.docx"},
        {"id": "8", "name": "", "filename": "ivan.docx", "upload_date": "yesterday"}
    ]"#;

    #[test]
    fn test_format_upload_date() {
        assert_eq!(
            format_upload_date("2024-03-05T14:07:00Z", Locale::en_US),
            "05 March 2024, 14:07"
        );
        assert_eq!(
            format_upload_date("2024-03-05 14:07:09.123456", Locale::en_US),
            "05 March 2024, 14:07"
        );
        assert_eq!(format_upload_date("yesterday", Locale::en_US), "yesterday");
    }

    #[test]
    fn test_summarize_takes_top_three_stable() {
        let entries = parse_history_body(HISTORY).unwrap();
        let summary = summarize(&entries[0], Locale::en_US).unwrap();
        let keys: Vec<&str> = summary.top3_roles.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["ml_engineer", "ai_manager", "data_architect"]);
        assert_eq!(summary.top3_roles[0].display, "81.3%");
        assert_eq!(summary.candidate_name, "Jane Doe");

        assert!(summarize(&entries[1], Locale::en_US).is_none());

        let summary = summarize(&entries[2], Locale::en_US).unwrap();
        assert_eq!(summary.candidate_name, NOT_AVAILABLE);
        assert_eq!(summary.upload_date, "yesterday");
        assert!(summary.top3_roles.is_empty());
    }

    #[tokio::test]
    async fn test_list_history_and_open() {
        let api = Arc::new(FakeApi::new());
        api.set_history(Ok(parse_history_body(HISTORY).unwrap()));

        let mut fetcher = HistoryFetcher::new(api.clone(), Locale::en_US);
        let rows = fetcher.list_history().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(api.history_calls(), 1);

        assert_eq!(fetcher.open("8"), Some("8".to_string()));
        assert_eq!(fetcher.open("999"), None);
    }

    #[tokio::test]
    async fn test_list_history_failure() {
        let api = Arc::new(FakeApi::new());
        api.set_history(Err(ClientError::NetworkFailure("offline".to_string())));

        let mut fetcher = HistoryFetcher::new(api, Locale::en_US);
        assert!(fetcher.list_history().await.is_err());
        assert!(matches!(fetcher.state(), HistoryState::Failed(_)));
        assert!(fetcher.rows().is_empty());
    }
}
