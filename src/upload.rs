// src/upload.rs
//! Upload controller: file selection, drag and drop, submission state

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::error::ClientError;
use crate::core::service_client::AnalysisApi;
use crate::types::response::UploadOutcome;
use crate::utils::{content_type_for, get_file_extension};

/// Extensions offered in the file picker; the server has the final word
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".pdf", ".docx"];

/// Value for an `accept` attribute, ".pdf,.docx"
pub fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS.join(",")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    path: PathBuf,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Self { name, path }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.name)
    }

    /// Whether the extension is one of the advertised ones
    pub fn is_advertised_type(&self) -> bool {
        get_file_extension(&self.name)
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&format!(".{}", ext).as_str()))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    FileSelected(SelectedFile),
    Submitting(SelectedFile),
    Succeeded(UploadOutcome),
    Failed {
        file: SelectedFile,
        error: ClientError,
    },
}

/// A drag event as delivered by the UI layer: its type name and dropped files
#[derive(Debug, Clone, PartialEq)]
pub struct DragEvent {
    pub event_type: String,
    pub files: Vec<SelectedFile>,
}

impl DragEvent {
    pub fn new(event_type: impl Into<String>, files: Vec<SelectedFile>) -> Self {
        Self {
            event_type: event_type.into(),
            files,
        }
    }

    pub fn enter() -> Self {
        Self::new("dragenter", Vec::new())
    }

    pub fn over() -> Self {
        Self::new("dragover", Vec::new())
    }

    pub fn leave() -> Self {
        Self::new("dragleave", Vec::new())
    }

    pub fn drop(files: Vec<SelectedFile>) -> Self {
        Self::new("drop", files)
    }
}

struct DragRule {
    event_type: &'static str,
    highlight: bool,
    takes_file: bool,
}

const DRAG_RULES: [DragRule; 4] = [
    DragRule {
        event_type: "dragenter",
        highlight: true,
        takes_file: false,
    },
    DragRule {
        event_type: "dragover",
        highlight: true,
        takes_file: false,
    },
    DragRule {
        event_type: "dragleave",
        highlight: false,
        takes_file: false,
    },
    DragRule {
        event_type: "drop",
        highlight: false,
        takes_file: true,
    },
];

/// What the UI layer should do after a drag event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    /// Suppress the default handling of the event
    pub prevent_default: bool,
    /// A dropped file became the selection
    pub file_selected: bool,
}

/// Identity of one submission, handed back with its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    file: SelectedFile,
    generation: u64,
}

impl UploadTicket {
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

#[derive(Debug)]
pub struct UploadController {
    state: UploadState,
    drop_highlight: bool,
    generation: u64,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
            drop_highlight: false,
            generation: 0,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_drop_highlighted(&self) -> bool {
        self.drop_highlight
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.state {
            UploadState::FileSelected(file) | UploadState::Submitting(file) => Some(file),
            UploadState::Failed { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Choose a file; ignored while a request is in flight or a result is shown
    pub fn select_file(&mut self, file: SelectedFile) -> bool {
        match self.state {
            UploadState::Idle | UploadState::FileSelected(_) | UploadState::Failed { .. } => {
                if !file.is_advertised_type() {
                    warn!(
                        "Selected {} is not one of {}, the server may reject it",
                        file.name(),
                        accept_attribute()
                    );
                }
                debug!("File selected: {}", file.name());
                self.state = UploadState::FileSelected(file);
                true
            }
            _ => {
                debug!("Ignoring file selection in state {:?}", self.state);
                false
            }
        }
    }

    pub fn handle_drag(&mut self, event: &DragEvent) -> DragOutcome {
        let Some(rule) = DRAG_RULES
            .iter()
            .find(|rule| rule.event_type == event.event_type)
        else {
            return DragOutcome {
                prevent_default: false,
                file_selected: false,
            };
        };

        self.drop_highlight = rule.highlight;

        let file_selected = match (rule.takes_file, event.files.first()) {
            (true, Some(file)) => self.select_file(file.clone()),
            _ => false,
        };

        DragOutcome {
            prevent_default: true,
            file_selected,
        }
    }

    /// Move to `Submitting` and hand out the ticket of the request to send.
    ///
    /// `Ok(None)` means a request is already in flight and this call is ignored.
    /// A failed upload has to go through `retry()` or a new selection first.
    pub fn begin_submit(&mut self) -> Result<Option<UploadTicket>, ClientError> {
        match &self.state {
            UploadState::FileSelected(file) => {
                let file = file.clone();
                self.generation += 1;
                self.state = UploadState::Submitting(file.clone());
                Ok(Some(UploadTicket {
                    file,
                    generation: self.generation,
                }))
            }
            UploadState::Submitting(_) => {
                debug!("Submit ignored, upload already in flight");
                Ok(None)
            }
            UploadState::Failed { .. } => Err(ClientError::RetryRequired),
            _ => Err(ClientError::NoFileSelected),
        }
    }

    /// Record the result of an upload. Returns false when `ticket` is not the
    /// request in flight, e.g. after a reset and a new submission.
    pub fn complete(
        &mut self,
        ticket: &UploadTicket,
        result: Result<UploadOutcome, ClientError>,
    ) -> bool {
        let in_flight = matches!(&self.state, UploadState::Submitting(file) if *file == ticket.file);
        if !in_flight || ticket.generation != self.generation {
            debug!(
                "Dropping upload result for {} (generation {}, current {})",
                ticket.file.name(),
                ticket.generation,
                self.generation
            );
            return false;
        }

        let file = ticket.file.clone();
        self.state = match result {
            Ok(outcome) => {
                info!("Upload of {} succeeded", file.name());
                UploadState::Succeeded(outcome)
            }
            Err(error) => {
                warn!("Upload of {} failed: {}", file.name(), error);
                UploadState::Failed { file, error }
            }
        };
        true
    }

    /// Submit the selected file through `api` and wait for the outcome
    pub async fn submit<A>(&mut self, api: &A) -> Result<&UploadState, ClientError>
    where
        A: AnalysisApi + ?Sized,
    {
        if let Some(ticket) = self.begin_submit()? {
            let result = api.upload_resume(ticket.file()).await;
            self.complete(&ticket, result);
        }
        Ok(&self.state)
    }

    /// User-visible message of the last failure
    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            UploadState::Failed { error, .. } => Some(error.user_message()),
            _ => None,
        }
    }

    /// Back to `FileSelected` with the file that failed
    pub fn retry(&mut self) -> bool {
        if let UploadState::Failed { file, .. } = &self.state {
            self.state = UploadState::FileSelected(file.clone());
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.state = UploadState::Idle;
        self.drop_highlight = false;
    }
}
