use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    model::{ResolvedLocation, WeatherSnapshot},
    provider::WeatherSource,
};

/// Recurring refresh driver.
///
/// At most one timer task is live at a time: starting again cancels the
/// previous one ("last initialization wins"), and dropping the handle
/// stops refreshing entirely. A failed cycle is logged and delivers
/// nothing; the timer keeps running for the next cycle.
#[derive(Debug, Default)]
pub struct Refresher {
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Arm the recurring refresh: one immediate cycle, then one per
    /// `every`. `every` must be non-zero.
    pub fn start(
        &mut self,
        every: Duration,
        source: Arc<dyn WeatherSource>,
        location: ResolvedLocation,
        updates: mpsc::Sender<WeatherSnapshot>,
    ) {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // A cycle outlasting the interval delays to the next due tick
            // instead of stacking concurrent cycles.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                match source.fetch_all(&location).await {
                    Ok(snapshot) => {
                        if updates.send(snapshot).await.is_err() {
                            // Receiver gone, nobody is watching anymore.
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "refresh cycle abandoned");
                    }
                }
            }
        });

        self.handle = Some(handle);
    }

    /// Cancel the active timer, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.stop();
    }
}
