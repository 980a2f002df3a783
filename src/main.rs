use anyhow::{Context, Result};
use regdesk::console::shell::Shell;
use regdesk::core::config::Config;
use regdesk::core::tracing_init::init_tracing;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first run, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        base_url = %config.api.base_url,
        session_path = %config.session.path.display(),
        log_level = %config.logging.level,
        "regdesk starting"
    );

    let mut shell = Shell::new(&config)?;
    shell.run().await
}
