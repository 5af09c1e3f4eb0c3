use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use tokio::sync::mpsc;

use crate::{
    auth::TokenIssuer,
    config::Config,
    model::{ResolvedLocation, WeatherSnapshot},
    provider::{WeatherSource, qweather::QWeatherClient},
    scheduler::Refresher,
};

/// The assembled panel backend: signing client, resolved location and the
/// armed refresh timer. Dropping the service stops refreshing.
#[derive(Debug)]
pub struct WeatherService {
    client: Arc<QWeatherClient>,
    location: ResolvedLocation,
    refresher: Refresher,
    updates: mpsc::Sender<WeatherSnapshot>,
}

impl WeatherService {
    /// Run the full startup sequence: credential check, key load, location
    /// resolution, then the timer (whose first cycle fires immediately).
    /// Successful cycles arrive on `updates`; abandoned cycles deliver
    /// nothing.
    pub async fn start(config: &Config, updates: mpsc::Sender<WeatherSnapshot>) -> Result<Self> {
        ensure!(
            config.update_interval_ms > 0,
            "update_interval_ms must be positive"
        );

        let client = Arc::new(build_client(config)?);

        tracing::info!(location = %config.location, "resolving location");
        let location = client
            .resolve(&config.location)
            .await
            .with_context(|| format!("Failed to resolve location {:?}", config.location))?;

        let mut refresher = Refresher::new();
        refresher.start(
            config.update_interval(),
            client.clone(),
            location.clone(),
            updates.clone(),
        );

        Ok(Self {
            client,
            location,
            refresher,
            updates,
        })
    }

    /// Handle a fresh initialization signal: re-resolve the location and
    /// re-arm the timer. The previous timer is cancelled first, so at most
    /// one recurring trigger is ever live. The signing key stays loaded.
    pub async fn reinitialize(&mut self, config: &Config) -> Result<()> {
        ensure!(
            config.update_interval_ms > 0,
            "update_interval_ms must be positive"
        );

        let location = self
            .client
            .resolve(&config.location)
            .await
            .with_context(|| format!("Failed to resolve location {:?}", config.location))?;

        self.location = location.clone();
        self.refresher.start(
            config.update_interval(),
            self.client.clone(),
            location,
            self.updates.clone(),
        );

        Ok(())
    }

    pub fn location(&self) -> &ResolvedLocation {
        &self.location
    }
}

/// One-shot: resolve the configured location and fetch a single snapshot,
/// without arming a timer.
pub async fn fetch_once(config: &Config) -> Result<(ResolvedLocation, WeatherSnapshot)> {
    let client = build_client(config)?;

    let location = client
        .resolve(&config.location)
        .await
        .with_context(|| format!("Failed to resolve location {:?}", config.location))?;

    let snapshot = client
        .fetch_all(&location)
        .await
        .context("Failed to fetch weather snapshot")?;

    Ok((location, snapshot))
}

fn build_client(config: &Config) -> Result<QWeatherClient> {
    let creds = config.credentials()?;
    let api_base = config.api_base()?;

    let mut issuer = TokenIssuer::new(creds.sub.clone(), creds.kid.clone());
    issuer
        .load_key(&creds.private_key)
        .context("Failed to load signing key")?;

    Ok(QWeatherClient::new(api_base, issuer))
}
