use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lore_indexer::config::LogFormat;
use lore_indexer::{Config, Dependencies, IndexingError};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(config: Config) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new(&config).await?;
    let summary = dependencies.orchestrator.run().await?;

    info!(
        repositories = summary.repositories,
        courses = summary.courses,
        indexed = summary.total(),
        "Finished indexing learning resources"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Indexing failed");
            ExitCode::FAILURE
        }
    }
}
