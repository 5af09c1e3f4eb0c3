use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skywatch_core::{Config, Credentials, WeatherService, fetch_once, render_panel};
use tokio::sync::mpsc;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skywatch", version, about = "Weather panel CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively configure location, API host and signing credentials.
    Configure,

    /// Fetch once and print the panel.
    Show {
        /// Override the configured location for this call.
        #[arg(long)]
        location: Option<String>,
    },

    /// Keep the panel on screen, refreshed on the configured interval.
    Watch,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location } => show(location).await,
            Command::Watch => watch().await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    config.location = inquire::Text::new("Location (name or id):")
        .with_default(&config.location)
        .prompt()?;
    config.api_base = inquire::Text::new("API base URL:")
        .with_default(&config.api_base)
        .prompt()?;

    let sub = inquire::Text::new("Project id (token subject):").prompt()?;
    let kid = inquire::Text::new("Key id:").prompt()?;
    let key_path = inquire::Text::new("Path to PKCS8 private key (PEM):").prompt()?;
    let private_key = std::fs::read_to_string(&key_path)
        .with_context(|| format!("Failed to read key file: {key_path}"))?;

    config.credentials = Some(Credentials {
        sub,
        kid,
        private_key,
    });
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn show(location: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(location) = location {
        config.location = location;
    }

    let (_, snapshot) = fetch_once(&config).await?;
    print!(
        "{}",
        render_panel(&snapshot, &config.location, config.forecast_days)
    );
    Ok(())
}

async fn watch() -> Result<()> {
    let config = Config::load()?;
    let (tx, mut rx) = mpsc::channel(8);

    let _service = WeatherService::start(&config, tx).await?;
    tracing::info!(location = %config.location, "panel started");

    while let Some(snapshot) = rx.recv().await {
        // Clear the screen so the panel repaints in place.
        print!("\x1b[2J\x1b[H");
        print!(
            "{}",
            render_panel(&snapshot, &config.location, config.forecast_days)
        );
        println!("updated {}", chrono::Local::now().format("%H:%M"));
    }

    Ok(())
}
