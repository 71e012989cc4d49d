use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config_manager::UploadMode;
use crate::core::error::ClientError;
use crate::types::analysis::{lenient_text, AnalysisRecord, OrderedMap, Score};

// ===== Service Response Types =====

/// What a successful upload hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The analysis record returned inline
    Record(Box<AnalysisRecord>),
    /// Identifier of a record to fetch from `/api/analysis/{id}`
    Reference(String),
}

impl UploadOutcome {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Record(record) => record.identifier(),
            Self::Reference(id) => Some(id),
        }
    }
}

/// One row of `GET /api/history`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    pub analysis_results: HistoryAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryAnalysis {
    pub role_matches: OrderedMap<Score>,
}

/// Structured error body used by the stub service and understood by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, error_code: &str) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            error_code: Some(error_code.to_string()),
        }
    }
}

fn parse_json(body: &str) -> Result<Value, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::MalformedResult(e.to_string()))
}

/// Message carried by an error payload (`message`, `error` or `detail`)
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Reject `{status: "error"}` payloads that arrive with a success status
fn reject_error_status(value: &Value) -> Result<(), ClientError> {
    if value.get("status").and_then(Value::as_str) == Some("error") {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Analysis failed")
            .to_string();
        return Err(ClientError::server(None, message));
    }
    Ok(())
}

fn record_from_value(value: Value) -> Result<AnalysisRecord, ClientError> {
    if !value.is_object() {
        return Err(ClientError::MalformedResult(
            "expected an analysis object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ClientError::MalformedResult(e.to_string()))
}

/// Interpret a successful `POST /api/upload` body according to the upload mode
pub fn parse_upload_body(body: &str, mode: UploadMode) -> Result<UploadOutcome, ClientError> {
    let value = parse_json(body)?;
    reject_error_status(&value)?;

    match mode {
        UploadMode::Inline => Ok(UploadOutcome::Record(Box::new(record_from_value(value)?))),
        UploadMode::Reference => ["resume_id", "id"]
            .iter()
            .find_map(|key| match value.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .map(UploadOutcome::Reference)
            .ok_or_else(|| {
                ClientError::MalformedResult("upload response carries no identifier".to_string())
            }),
    }
}

/// Interpret a successful `GET /api/analysis/{id}` body
pub fn parse_analysis_body(body: &str) -> Result<AnalysisRecord, ClientError> {
    let value = parse_json(body)?;
    reject_error_status(&value)?;
    record_from_value(value)
}

/// Interpret a successful `GET /api/history` body
pub fn parse_history_body(body: &str) -> Result<Vec<HistoryEntry>, ClientError> {
    match parse_json(body)? {
        Value::Array(rows) => Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<HistoryEntry>(row) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable history row: {}", e);
                    None
                }
            })
            .collect()),
        other => {
            reject_error_status(&other)?;
            Err(ClientError::MalformedResult(
                "expected a list of history entries".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_upload_returns_record() {
        let body = r#"{"id": "r-1", "base_score": 77, "role_fit": {"all_roles": {"ml_engineer": 70}}}"#;
        match parse_upload_body(body, UploadMode::Inline).unwrap() {
            UploadOutcome::Record(record) => {
                assert_eq!(record.identifier(), Some("r-1"));
                assert_eq!(record.base_score.value(), Some(77.0));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_reference_upload_prefers_resume_id() {
        let body = r#"{"resume_id": 17, "id": "other"}"#;
        assert_eq!(
            parse_upload_body(body, UploadMode::Reference).unwrap(),
            UploadOutcome::Reference("17".to_string())
        );
    }

    #[test]
    fn test_reference_upload_without_id_is_malformed() {
        let err = parse_upload_body(r#"{"base_score": 10}"#, UploadMode::Reference).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResult(_)));
    }

    #[test]
    fn test_error_status_payload_is_server_error() {
        let body = r#"{"status": "error", "message": "Failed to parse resume"}"#;
        let err = parse_upload_body(body, UploadMode::Inline).unwrap_err();
        assert_eq!(err, ClientError::server(None, "Failed to parse resume"));
    }

    #[test]
    fn test_non_object_analysis_is_malformed() {
        assert!(matches!(
            parse_analysis_body("[1, 2, 3]"),
            Err(ClientError::MalformedResult(_))
        ));
        assert!(matches!(
            parse_analysis_body("<html>"),
            Err(ClientError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_history_skips_unreadable_rows() {
        let body = r#"[
            {"id": 1, "name": "Jane", "filename": "jane.pdf", "upload_date": "2024-03-05T14:07:00",
             "analysis_results": {"role_matches": {"data_engineer": 55.5}}},
            "garbage",
            {"id": 2}
        ]"#;
        let entries = parse_history_body(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.as_deref(), Some("1"));
        assert!(entries[1].analysis_results.role_matches.is_empty());
    }

    #[test]
    fn test_every_parser_keeps_payload_key_order() {
        let roles = r#"{"data_engineer": 75.0, "ai_manager": 75.0, "business_intelligence_analyst": 75.0}"#;
        let expected = vec!["data_engineer", "ai_manager", "business_intelligence_analyst"];

        let record = parse_analysis_body(&format!(r#"{{"role_fit": {{"all_roles": {}}}}}"#, roles))
            .unwrap();
        assert_eq!(record.role_scores().keys().collect::<Vec<_>>(), expected);

        let body = format!(r#"{{"id": "r-9", "role_matches": {}}}"#, roles);
        match parse_upload_body(&body, UploadMode::Inline).unwrap() {
            UploadOutcome::Record(record) => {
                assert_eq!(record.role_scores().keys().collect::<Vec<_>>(), expected)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let body = format!(r#"[{{"id": 3, "analysis_results": {{"role_matches": {}}}}}]"#, roles);
        let entries = parse_history_body(&body).unwrap();
        assert_eq!(
            entries[0].analysis_results.role_matches.keys().collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_error_message_reads_known_keys() {
        assert_eq!(
            error_message(r#"{"error": "No file part"}"#).as_deref(),
            Some("No file part")
        );
        assert_eq!(error_message("plain text"), None);
    }
}
