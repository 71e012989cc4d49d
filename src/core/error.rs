// src/core/error.rs
//! Client-side error taxonomy for the analysis service

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Submission rejected locally, no request was made
    #[error("No file selected")]
    NoFileSelected,

    /// The last upload failed; `retry()` or a new selection comes first
    #[error("Previous upload failed, retry required")]
    RetryRequired,

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Server error: {message}")]
    ServerError { status: Option<u16>, message: String },

    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

impl ClientError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Single message shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::NoFileSelected => "Please choose a resume file first".to_string(),
            Self::RetryRequired => {
                "The last upload failed; retry it or choose another file".to_string()
            }
            Self::NetworkFailure(detail) => {
                format!("Could not reach the analysis service: {}", detail)
            }
            Self::ServerError {
                status: Some(code),
                message,
            } => format!("The analysis service rejected the request ({}): {}", code, message),
            Self::ServerError {
                status: None,
                message,
            } => format!("The analysis service reported an error: {}", message),
            Self::MalformedResult(_) => {
                "The analysis service returned an unreadable result".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResult(err.to_string())
        } else {
            Self::NetworkFailure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_includes_status() {
        let err = ClientError::server(Some(400), "Invalid file type");
        assert_eq!(
            err.user_message(),
            "The analysis service rejected the request (400): Invalid file type"
        );
    }

    #[test]
    fn test_malformed_result_hides_details() {
        let err = ClientError::MalformedResult("expected value at line 1".to_string());
        assert!(!err.user_message().contains("line 1"));
        assert!(err.to_string().contains("line 1"));
    }
}
