use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::{ScrollMetrics, ScrollRegion};

/// Tunables shared by every bound region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSettings {
    /// Fire once the remaining distance is below this many viewports
    pub threshold_ratio: f64,
    /// Quiet period after the last scroll event before evaluating
    pub debounce: Duration,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.4,
            debounce: Duration::from_millis(150),
        }
    }
}

/// Holds only the latest reported position; older ones are overwritten
struct RegionBinding {
    events: watch::Sender<Option<ScrollMetrics>>,
    task: JoinHandle<()>,
}

/// Debounced near-bottom detection for scrollable regions
///
/// Each attached region gets a background task that collapses bursts of
/// scroll events and calls the region's callback when the settled position
/// is near the end of the content. The trigger holds no business logic.
pub struct ScrollTrigger {
    settings: TriggerSettings,
    regions: HashMap<ScrollRegion, RegionBinding>,
}

impl ScrollTrigger {
    pub fn new(settings: TriggerSettings) -> Self {
        Self {
            settings,
            regions: HashMap::new(),
        }
    }

    /// Binds `on_near_bottom` to `region`, replacing any existing binding
    ///
    /// Must be called from within a Tokio runtime.
    pub fn attach<F, Fut>(&mut self, region: ScrollRegion, on_near_bottom: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.detach(region);

        let (events, rx) = watch::channel(None);
        let settings = self.settings;
        let task = tokio::spawn(async move {
            Self::watch_region(region, settings, rx, on_near_bottom).await;
        });

        self.regions.insert(region, RegionBinding { events, task });
        tracing::debug!(region = %region, "Scroll trigger attached");
    }

    /// Removes the binding for `region`. Returns whether one existed.
    ///
    /// Closing the channel ends the region's task once any running callback
    /// completes.
    pub fn detach(&mut self, region: ScrollRegion) -> bool {
        let removed = self.regions.remove(&region).is_some();
        if removed {
            tracing::debug!(region = %region, "Scroll trigger detached");
        }
        removed
    }

    pub fn is_attached(&self, region: ScrollRegion) -> bool {
        self.regions.contains_key(&region)
    }

    /// Records the region's latest scroll position for its task
    pub fn report(&self, region: ScrollRegion, metrics: ScrollMetrics) -> bool {
        match self.regions.get(&region) {
            Some(binding) => binding.events.send(Some(metrics)).is_ok(),
            None => false,
        }
    }

    async fn watch_region<F, Fut>(
        region: ScrollRegion,
        settings: TriggerSettings,
        mut events: watch::Receiver<Option<ScrollMetrics>>,
        on_near_bottom: F,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        while events.changed().await.is_ok() {
            // Wait for the scroll position to settle
            loop {
                tokio::select! {
                    changed = events.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = tokio::time::sleep(settings.debounce) => break,
                }
            }

            let settled = *events.borrow_and_update();
            let Some(latest) = settled else {
                continue;
            };
            if latest.is_near_bottom(settings.threshold_ratio) {
                tracing::debug!(
                    region = %region,
                    remaining = latest.remaining(),
                    viewport = latest.viewport_size,
                    "Near bottom, triggering load"
                );
                on_near_bottom().await;
            }
        }
        tracing::debug!(region = %region, "Scroll trigger task finished");
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        for (_, binding) in self.regions.drain() {
            binding.task.abort();
        }
    }
}
