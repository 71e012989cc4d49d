// src/core/service_client.rs
//! HTTP client for the resume analysis service

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::{debug, error, info};

use crate::core::config_manager::{ClientConfig, UploadMode};
use crate::core::error::ClientError;
use crate::types::analysis::AnalysisRecord;
use crate::types::response::{
    error_message, parse_analysis_body, parse_history_body, parse_upload_body, HistoryEntry,
    UploadOutcome,
};
use crate::upload::SelectedFile;
use crate::utils::content_type_for;

const UPLOAD_ENDPOINT: &str = "/api/upload";
const ANALYSIS_PATH: [&str; 2] = ["api", "analysis"];
const HISTORY_ENDPOINT: &str = "/api/history";

/// The three operations the dashboard needs from an analysis backend
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn upload_resume(&self, file: &SelectedFile) -> Result<UploadOutcome, ClientError>;

    async fn fetch_analysis(&self, id: &str) -> Result<AnalysisRecord, ClientError>;

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ClientError>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    upload_field: String,
    upload_mode: UploadMode,
}

impl ServiceClient {
    /// Create new service client with configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_field: config.upload_field.clone(),
            upload_mode: config.upload_mode,
        })
    }

    pub fn upload_mode(&self) -> UploadMode {
        self.upload_mode
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// URL of one analysis; the id is a single encoded path segment
    fn analysis_url(&self, id: &str) -> Result<Url, ClientError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ClientError::server(
                None,
                format!("Invalid analysis id '{}'", id),
            ));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::NetworkFailure(format!("Invalid service URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::NetworkFailure(format!("Service URL {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(ANALYSIS_PATH)
            .push(id);
        Ok(url)
    }

    /// Read the body of a response, turning non-success statuses into `ServerError`
    async fn success_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        debug!("Response status: {}", status);

        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
            error!("Analysis service error {}: {}", status, message);
            Err(ClientError::server(Some(status.as_u16()), message))
        }
    }
}

#[async_trait]
impl AnalysisApi for ServiceClient {
    /// Sends the resume as multipart; receives a record or an id depending on the mode
    async fn upload_resume(&self, file: &SelectedFile) -> Result<UploadOutcome, ClientError> {
        let url = self.url(UPLOAD_ENDPOINT);

        let file_content = tokio::fs::read(file.path()).await.map_err(|e| {
            ClientError::NetworkFailure(format!(
                "Failed to read file {}: {}",
                file.path().display(),
                e
            ))
        })?;

        let part = Part::bytes(file_content)
            .file_name(file.name().to_string())
            .mime_str(content_type_for(file.name()))?;
        let form = Form::new().part(self.upload_field.clone(), part);

        info!("Uploading resume {} to {}", file.name(), url);

        let response = self.client.post(&url).multipart(form).send().await?;
        let body = Self::success_body(response).await?;

        let outcome = parse_upload_body(&body, self.upload_mode)?;
        info!(
            "Upload accepted, analysis id: {}",
            outcome.identifier().unwrap_or("<none>")
        );
        Ok(outcome)
    }

    async fn fetch_analysis(&self, id: &str) -> Result<AnalysisRecord, ClientError> {
        let url = self.analysis_url(id)?;
        debug!("Fetching analysis: {}", url);

        let response = self.client.get(url).send().await?;
        let body = Self::success_body(response).await?;
        parse_analysis_body(&body)
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let url = self.url(HISTORY_ENDPOINT);
        debug!("Fetching history: {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::success_body(response).await?;
        let entries = parse_history_body(&body)?;
        info!("Fetched {} history entries", entries.len());
        Ok(entries)
    }
}
