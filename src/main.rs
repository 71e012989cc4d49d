use anyhow::Result;
use clap::Parser;
use resume_dash::cli::{handle_command, Cli};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    // Reports go to stdout, logs to stderr
    Registry::default()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resume_dash=info,rocket=warn")),
        )
        .init();

    let cli = Cli::parse();
    handle_command(cli).await
}
