//! Service access, configuration and the client error taxonomy

pub mod config_manager;
pub mod error;
pub mod service_client;

pub use config_manager::{ClientConfig, ConfigManager, UploadMode};
pub use error::ClientError;
pub use service_client::{AnalysisApi, ServiceClient};
