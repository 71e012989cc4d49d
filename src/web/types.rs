// src/web/types.rs

use chrono::{DateTime, Utc};
use rocket::form::FromForm;
use rocket::fs::TempFile;

use crate::types::analysis::AnalysisRecord;

/// Multipart upload; clients send the resume as `file` or `resume`
#[derive(FromForm)]
pub struct ResumeUploadForm<'f> {
    pub file: Option<TempFile<'f>>,
    pub resume: Option<TempFile<'f>>,
}

impl<'f> ResumeUploadForm<'f> {
    pub fn into_file(self) -> Option<TempFile<'f>> {
        self.file.or(self.resume)
    }
}

#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub record: AnalysisRecord,
}
