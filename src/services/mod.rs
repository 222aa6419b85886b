pub mod batch_generator;
pub mod catalog;
pub mod detail_navigator;
pub mod engine;
pub mod feed_pager;
pub mod metadata;
pub mod ranker;
pub mod scroll_trigger;
pub mod similarity;

pub use batch_generator::BatchGenerator;
pub use catalog::{CatalogAsset, ContentCatalog};
pub use detail_navigator::{DetailNavigator, SessionSettings};
pub use engine::{DiscoveryEngine, EngineSettings};
pub use feed_pager::{FeedPager, FeedSettings};
pub use metadata::{enrich_catalog, FileMetadata, MetadataSource};
pub use ranker::{DecayPolicy, Ranker};
pub use scroll_trigger::{ScrollTrigger, TriggerSettings};
pub use similarity::ScoringWeights;
