use serde::Deserialize;
use std::time::Duration;

use crate::services::{
    DecayPolicy, EngineSettings, FeedSettings, ScoringWeights, SessionSettings, TriggerSettings,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON asset pool; the built-in pool is used when unset
    pub catalog_path: Option<String>,

    /// JSON attribute metadata keyed by media reference
    pub metadata_path: Option<String>,

    #[serde(default = "default_batch_size")]
    pub feed_batch_size: usize,

    #[serde(default = "default_initial_batches")]
    pub initial_batches: usize,

    #[serde(default = "default_latency_ms")]
    pub feed_latency_ms: u64,

    #[serde(default = "default_preload_delay_ms")]
    pub preload_delay_ms: u64,

    /// Fill-load until content reaches this many viewports
    #[serde(default = "default_min_fill_ratio")]
    pub min_fill_ratio: f64,

    #[serde(default = "default_max_fill_rounds")]
    pub max_fill_rounds: usize,

    #[serde(default = "default_batch_size")]
    pub related_batch_size: usize,

    #[serde(default = "default_candidate_window")]
    pub candidate_window: usize,

    #[serde(default = "default_related_cap")]
    pub related_cap: usize,

    #[serde(default = "default_latency_ms")]
    pub related_latency_ms: u64,

    #[serde(default = "default_threshold_ratio")]
    pub trigger_threshold_ratio: f64,

    #[serde(default = "default_debounce_ms")]
    pub trigger_debounce_ms: u64,

    #[serde(default = "default_category_weight")]
    pub category_weight: f64,

    #[serde(default = "default_unit_weight")]
    pub tag_weight: f64,

    #[serde(default = "default_mood_weight")]
    pub mood_weight: f64,

    #[serde(default = "default_unit_weight")]
    pub color_weight: f64,

    #[serde(default = "default_decay_offset")]
    pub decay_offset: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_batch_size() -> usize {
    6
}

fn default_initial_batches() -> usize {
    1
}

fn default_latency_ms() -> u64 {
    600
}

fn default_preload_delay_ms() -> u64 {
    1000
}

fn default_min_fill_ratio() -> f64 {
    1.5
}

fn default_max_fill_rounds() -> usize {
    8
}

fn default_candidate_window() -> usize {
    18
}

fn default_related_cap() -> usize {
    120
}

fn default_threshold_ratio() -> f64 {
    0.4
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_category_weight() -> f64 {
    2.0
}

fn default_mood_weight() -> f64 {
    1.5
}

fn default_unit_weight() -> f64 {
    1.0
}

fn default_decay_offset() -> f64 {
    2.0
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feed_batch_size == 0 {
            anyhow::bail!("FEED_BATCH_SIZE must be at least 1");
        }
        if self.related_batch_size == 0 {
            anyhow::bail!("RELATED_BATCH_SIZE must be at least 1");
        }
        if self.candidate_window == 0 {
            anyhow::bail!("CANDIDATE_WINDOW must be at least 1");
        }
        if self.related_cap < self.related_batch_size {
            anyhow::bail!(
                "RELATED_CAP ({}) must not be smaller than RELATED_BATCH_SIZE ({})",
                self.related_cap,
                self.related_batch_size
            );
        }
        if !(self.min_fill_ratio.is_finite() && self.min_fill_ratio > 0.0) {
            anyhow::bail!("MIN_FILL_RATIO must be positive");
        }
        if !(self.trigger_threshold_ratio.is_finite() && self.trigger_threshold_ratio > 0.0) {
            anyhow::bail!("TRIGGER_THRESHOLD_RATIO must be positive");
        }
        // keeps every history weight within (0, 1]
        if self.decay_offset.is_nan() || self.decay_offset < 1.0 {
            anyhow::bail!("DECAY_OFFSET must be at least 1");
        }
        let weights = [
            self.category_weight,
            self.tag_weight,
            self.mood_weight,
            self.color_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            anyhow::bail!("Similarity weights must be non-negative numbers");
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            weights: ScoringWeights {
                category: self.category_weight,
                tag: self.tag_weight,
                mood: self.mood_weight,
                color: self.color_weight,
            },
            decay: DecayPolicy {
                offset: self.decay_offset,
            },
            feed: FeedSettings {
                batch_size: self.feed_batch_size,
                initial_batches: self.initial_batches,
                latency: Duration::from_millis(self.feed_latency_ms),
                preload_delay: Duration::from_millis(self.preload_delay_ms),
                min_fill_ratio: self.min_fill_ratio,
                max_fill_rounds: self.max_fill_rounds,
            },
            session: SessionSettings {
                related_batch_size: self.related_batch_size,
                candidate_window: self.candidate_window,
                related_cap: self.related_cap,
                latency: Duration::from_millis(self.related_latency_ms),
            },
            trigger: TriggerSettings {
                threshold_ratio: self.trigger_threshold_ratio,
                debounce: Duration::from_millis(self.trigger_debounce_ms),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
