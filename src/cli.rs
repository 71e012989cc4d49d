// src/cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::core::config_manager::{ConfigManager, ConfigOverlay, UploadMode};
use crate::core::service_client::ServiceClient;
use crate::history::HistoryFetcher;
use crate::render::report::{render_history, render_text};
use crate::render::{render, DisplayModel};
use crate::result_route::{BindingState, ResultRoute};
use crate::types::response::UploadOutcome;
use crate::upload::{SelectedFile, UploadController, UploadState};
use crate::web::start_stub_server;

#[derive(Parser)]
#[command(name = "resume-dash")]
#[command(about = "Upload resumes for analysis and browse the results")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML config file (default: ./resume-dash.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis service
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a resume and show its analysis
    Upload {
        file: PathBuf,
        /// How the service answers the upload
        #[arg(long, value_enum)]
        mode: Option<UploadMode>,
        #[arg(long)]
        json: bool,
    },
    /// Show a stored analysis by id
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// List past analyses
    History {
        /// Open one entry in the detail view
        #[arg(long)]
        open: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run the stub analysis service
    ServeStub {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

fn print_model(model: &DisplayModel, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(model)?);
    } else {
        print!("{}", render_text(model));
    }
    Ok(())
}

async fn show_analysis(client: Arc<ServiceClient>, id: &str, json: bool) -> Result<()> {
    let mut route = ResultRoute::new(client);
    route.set_id(id);

    match route.settle().await {
        BindingState::Loaded { model, .. } => print_model(model, json),
        BindingState::Failed { error, .. } => anyhow::bail!("{}", error.user_message()),
        BindingState::Unbound | BindingState::Loading { .. } => {
            anyhow::bail!("Analysis {} could not be loaded", id)
        }
    }
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    if let Command::ServeStub { port } = cli.command {
        return start_stub_server(port).await;
    }

    let mut config = ConfigManager::load(cli.config.as_deref())?;
    let mode = match &cli.command {
        Command::Upload { mode, .. } => *mode,
        _ => None,
    };
    ConfigOverlay {
        api_base_url: cli.api_url,
        upload_mode: mode,
        ..ConfigOverlay::default()
    }
    .apply(&mut config.client);

    info!(
        "Using analysis service {} ({} environment)",
        config.client.api_base_url, config.environment
    );
    let client = Arc::new(ServiceClient::new(&config.client)?);

    match cli.command {
        Command::Upload { file, json, .. } => {
            if !file.exists() {
                anyhow::bail!("File not found: {}", file.display());
            }

            let mut controller = UploadController::new();
            controller.select_file(SelectedFile::from_path(file));
            info!("Uploading {}", controller.selected_file().map(|f| f.name()).unwrap_or(""));

            let state = controller
                .submit(client.as_ref())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            match state {
                UploadState::Succeeded(UploadOutcome::Record(record)) => {
                    print_model(&render(record), json)
                }
                UploadState::Succeeded(UploadOutcome::Reference(id)) => {
                    let id = id.clone();
                    info!("Upload stored as {}, fetching analysis", id);
                    show_analysis(client, &id, json).await
                }
                _ => anyhow::bail!(
                    "{}",
                    controller
                        .error_message()
                        .unwrap_or_else(|| "Upload did not complete".to_string())
                ),
            }
        }

        Command::Show { id, json } => show_analysis(client, &id, json).await,

        Command::History { open, json } => {
            let mut fetcher = HistoryFetcher::new(client.clone(), config.client.locale());
            let rows = fetcher
                .list_history()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(rows)?);
            } else {
                print!("{}", render_history(rows));
            }

            if let Some(id) = open {
                match fetcher.open(&id) {
                    Some(id) => show_analysis(client, &id, json).await?,
                    None => anyhow::bail!("No history entry with id {}", id),
                }
            }
            Ok(())
        }

        Command::ServeStub { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_with_mode_and_global_flags() {
        let cli = Cli::parse_from([
            "resume-dash",
            "upload",
            "cv.pdf",
            "--mode",
            "reference",
            "--api-url",
            "http://127.0.0.1:9000",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        match cli.command {
            Command::Upload { file, mode, json } => {
                assert_eq!(file, PathBuf::from("cv.pdf"));
                assert_eq!(mode, Some(UploadMode::Reference));
                assert!(!json);
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn test_parse_history_open() {
        let cli = Cli::parse_from(["resume-dash", "history", "--open", "42", "--json"]);
        assert!(matches!(
            cli.command,
            Command::History { open: Some(ref id), json: true } if id == "42"
        ));
    }

    #[test]
    fn test_serve_stub_default_port() {
        let cli = Cli::parse_from(["resume-dash", "serve-stub"]);
        assert!(matches!(cli.command, Command::ServeStub { port: 5000 }));
    }
}
