//! Client for a resume analysis service: upload, render, browse history

pub mod cli;
pub mod core;
pub mod history;
pub mod render;
pub mod result_route;
pub mod types;
pub mod upload;
pub mod utils;
pub mod web;

#[cfg(test)]
mod test_support;

pub use crate::core::{AnalysisApi, ClientConfig, ClientError, ConfigManager, ServiceClient, UploadMode};
pub use history::{HistoryFetcher, HistorySummary};
pub use render::{render, DisplayModel};
pub use result_route::{BindingState, ResultBinding, ResultRoute};
pub use types::{AnalysisRecord, HistoryEntry, UploadOutcome};
pub use upload::{DragEvent, SelectedFile, UploadController, UploadState};
pub use web::{start_stub_server, stub_figment, stub_rocket};
