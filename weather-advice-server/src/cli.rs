use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};
use weather_advice_core::{
    Config, GeminiProvider, ProviderId, VisualCrossingProvider, WeatherService,
};

use weather_advice_server::router;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-advice-server",
    version,
    about = "Weather and clothing advice HTTP service"
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Address to bind; overrides config and HOST.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind; overrides config and PORT.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store a credential in the config file.
    Configure {
        /// "token" for the caller secret, or a provider: "visualcrossing", "gemini".
        target: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Serve { host: None, port: None }) {
            Command::Serve { host, port } => serve(&path, host, port).await,
            Command::Configure { target } => configure(&path, &target),
        }
    }
}

async fn serve(path: &Path, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;
    config.apply_process_env()?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let api_token = config.api_token()?.to_owned();
    let weather = VisualCrossingProvider::new(config.weather_api_key()?.to_owned());

    let gemini_key = config.gemini_api_key().map(str::to_owned);
    if gemini_key.is_none() {
        warn!("no Gemini API key configured, every recommendation will use the fallback text");
    }
    let advisor = GeminiProvider::new(gemini_key, config.gemini_model().to_owned());

    let service = WeatherService::new(
        api_token,
        config.server.unit_group,
        Arc::new(weather),
        Arc::new(advisor),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        %addr,
        unit_group = %config.server.unit_group,
        model = config.gemini_model(),
        "weather advice server listening"
    );

    axum::serve(listener, router(service)).await.context("HTTP server terminated")?;

    Ok(())
}

fn configure(path: &Path, target: &str) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    if target.eq_ignore_ascii_case("token") {
        let token = Password::new("API token callers must send:").prompt()?;
        config.set_api_token(token);
    } else {
        let id = ProviderId::try_from(target)?;
        let key = Password::new(&format!("{id} API key:")).without_confirmation().prompt()?;
        config.set_provider_api_key(id, key);

        if id == ProviderId::Gemini {
            let current = config.gemini_model().to_owned();
            let model = Text::new("Gemini model:").with_default(&current).prompt()?;
            config.set_provider_model(id, model);
        }
    }

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["weather-advice-server"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn serve_accepts_bind_overrides() {
        let cli = Cli::try_parse_from([
            "weather-advice-server",
            "serve",
            "--port",
            "8080",
            "--config",
            "/tmp/advice.toml",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/advice.toml")));
        match cli.command {
            Some(Command::Serve { host, port }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn configure_takes_a_target() {
        let cli = Cli::try_parse_from(["weather-advice-server", "configure", "gemini"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Configure { target }) if target == "gemini"));
    }
}
