use anyhow::Result;
use clap::Parser;
use smartspeak::app::{run_analyze, run_server};
use smartspeak::cli::{Cli, Commands, ConfigAction, ModelsAction};
use smartspeak::config::Config;
use smartspeak::models::download::{download_model, format_catalog, list_installed_models};
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    let allow_download = !cli.no_download;

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref(), cli.model)?;
            run_server(config, allow_download).await?;
        }
        Some(Commands::Serve { bind }) => {
            let mut config = load_config(cli.config.as_deref(), cli.model)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            run_server(config, allow_download).await?;
        }
        Some(Commands::Analyze { file, no_upload }) => {
            let config = load_config(cli.config.as_deref(), cli.model)?;
            let result = run_analyze(config, &file, !no_upload, allow_download).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Commands::Models { action }) => handle_models_command(action).await?,
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref(), cli.model)?
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load the config file (or defaults), then environment and CLI overrides.
fn load_config(path: Option<&Path>, model: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)
            .map_err(|e| e.context(format!("Failed to load config from {}", path.display())))?,
        None => Config::load_or_default(&Config::default_path())?,
    }
    .with_env_overrides();

    if let Some(model) = model {
        config.stt.model = model;
    }
    Ok(config)
}

async fn handle_models_command(action: ModelsAction) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Available models:");
            for line in format_catalog() {
                println!("  {line}");
            }
            let installed = list_installed_models();
            if !installed.is_empty() {
                println!("\nInstalled: {}", installed.join(", "));
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&name).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn handle_config_command(
    action: ConfigAction,
    path: Option<&Path>,
    model: Option<String>,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let mut config = load_config(path, model)?;
            if config.storage.api_secret.is_some() {
                config.storage.api_secret = Some("********".to_string());
            }
            if config.sentiment.api_token.is_some() {
                config.sentiment.api_token = Some("********".to_string());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
