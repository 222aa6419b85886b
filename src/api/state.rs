use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::ScrollRegion;
use crate::services::{DiscoveryEngine, ScrollTrigger, TriggerSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: DiscoveryEngine,
    pub triggers: Arc<Mutex<ScrollTrigger>>,
}

impl AppState {
    /// Wraps the engine and binds both scroll regions to their loaders
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(engine: DiscoveryEngine, trigger_settings: TriggerSettings) -> Self {
        let mut triggers = ScrollTrigger::new(trigger_settings);

        let feed_engine = engine.clone();
        triggers.attach(ScrollRegion::Feed, move || {
            let engine = feed_engine.clone();
            async move {
                engine.load_more(None).await;
            }
        });

        let detail_engine = engine.clone();
        triggers.attach(ScrollRegion::Detail, move || {
            let engine = detail_engine.clone();
            async move {
                engine.load_more_related().await;
            }
        });

        Self {
            engine,
            triggers: Arc::new(Mutex::new(triggers)),
        }
    }
}
