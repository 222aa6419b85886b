use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    models::{
        ContentItem, FeedFilter, FeedLoadOutcome, FeedStatus, ItemId, RegionLayout,
        RelatedLoadOutcome, SessionSnapshot,
    },
};

use super::{
    batch_generator::BatchGenerator,
    catalog::ContentCatalog,
    detail_navigator::{DetailNavigator, RelatedLoadStart, SessionSettings},
    feed_pager::{FeedPager, FeedSettings},
    ranker::{DecayPolicy, Ranker},
    scroll_trigger::TriggerSettings,
    similarity::ScoringWeights,
};

/// Typed settings for every engine component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub weights: ScoringWeights,
    pub decay: DecayPolicy,
    pub feed: FeedSettings,
    pub session: SessionSettings,
    pub trigger: TriggerSettings,
}

/// Mutable engine state; only ever touched in short critical sections
struct EngineState {
    feed: FeedPager,
    feed_generator: BatchGenerator,
    navigator: DetailNavigator,
}

/// The feed and the detail session behind one shared handle
///
/// Locks are never held across the simulated load latency. The in-flight
/// guards on the pager and the session keep a second trigger from starting
/// a duplicate load while the first is suspended.
#[derive(Clone)]
pub struct DiscoveryEngine {
    state: Arc<RwLock<EngineState>>,
    feed_settings: FeedSettings,
    session_settings: SessionSettings,
}

impl DiscoveryEngine {
    /// Creates an engine and seeds the feed with its initial batches
    pub fn new(catalog: Arc<ContentCatalog>, settings: &EngineSettings) -> Self {
        let ranker = Ranker::new(settings.weights, settings.decay);
        let mut feed = FeedPager::new(settings.feed.min_fill_ratio);
        let mut feed_generator = BatchGenerator::new(catalog.clone(), "feed");

        for _ in 0..settings.feed.initial_batches {
            let batch = feed_generator.next_batch(settings.feed.batch_size, feed.issued_ids());
            feed.seed(batch);
        }

        let navigator = DetailNavigator::new(
            BatchGenerator::new(catalog, "related"),
            ranker,
            settings.session.clone(),
        );

        tracing::info!(
            seeded = feed.items().len(),
            batch_size = settings.feed.batch_size,
            "Discovery engine ready"
        );

        Self {
            state: Arc::new(RwLock::new(EngineState {
                feed,
                feed_generator,
                navigator,
            })),
            feed_settings: settings.feed.clone(),
            session_settings: settings.session.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Feed
    // ------------------------------------------------------------------------

    pub async fn items(&self, filter: &FeedFilter) -> Vec<ContentItem> {
        self.state.read().await.feed.filtered(filter)
    }

    pub async fn tags(&self) -> Vec<String> {
        self.state.read().await.feed.tags()
    }

    pub async fn feed_status(&self) -> FeedStatus {
        self.state.read().await.feed.status()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.feed.is_loading()
    }

    pub async fn set_feed_layout(&self, layout: RegionLayout) {
        self.state.write().await.feed.set_layout(layout);
    }

    /// Appends the next batch to the feed
    ///
    /// A no-op while another load is outstanding. After each batch the
    /// known layout is re-checked and further batches are pulled in (up to
    /// `max_fill_rounds`) until the region can scroll.
    pub async fn load_more(&self, layout: Option<RegionLayout>) -> FeedLoadOutcome {
        if let Some(layout) = layout {
            self.set_feed_layout(layout).await;
        }

        let mut appended = 0;
        let mut fill_rounds = 0;

        loop {
            let Some(ticket) = self.state.write().await.feed.begin_load() else {
                if fill_rounds == 0 && appended == 0 {
                    tracing::debug!("Feed load already in flight, ignoring trigger");
                    return FeedLoadOutcome::AlreadyLoading;
                }
                break;
            };

            tracing::debug!(fill_round = fill_rounds, "Loading feed batch");
            tokio::time::sleep(self.feed_settings.latency).await;

            let mut state = self.state.write().await;
            let state = &mut *state;
            let batch = state
                .feed_generator
                .next_batch(self.feed_settings.batch_size, state.feed.issued_ids());
            appended += state.feed.complete_load(ticket, batch);

            if !state.feed.is_underfilled() || fill_rounds >= self.feed_settings.max_fill_rounds {
                break;
            }
            fill_rounds += 1;
            tracing::debug!(
                items = state.feed.items().len(),
                "Feed region still under-filled, loading another batch"
            );
        }

        let total = self.state.read().await.feed.items().len();
        tracing::info!(appended, total, fill_rounds, "Feed batch loaded");

        FeedLoadOutcome::Loaded {
            appended,
            total,
            fill_rounds,
        }
    }

    /// Loads one extra batch after the configured preload delay
    pub fn spawn_preload(&self) -> JoinHandle<()> {
        let engine = self.clone();
        let delay = self.feed_settings.preload_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.load_more(None).await;
        })
    }

    // ------------------------------------------------------------------------
    // Detail session
    // ------------------------------------------------------------------------

    /// Opens a session on a feed item
    pub async fn open(&self, item_id: &ItemId) -> AppResult<SessionSnapshot> {
        let mut state = self.state.write().await;
        let item = state
            .feed
            .find(item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("feed item {}", item_id)))?;
        Ok(state.navigator.open(item))
    }

    /// Drills into an item reachable from the session or the feed
    pub async fn select(&self, item_id: &ItemId) -> AppResult<SessionSnapshot> {
        let mut state = self.state.write().await;
        if !state.navigator.is_open() {
            return Err(AppError::NoActiveSession);
        }

        let item = state
            .navigator
            .find(item_id)
            .or_else(|| state.feed.find(item_id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("item {}", item_id)))?;

        state.navigator.select(item).ok_or(AppError::NoActiveSession)
    }

    /// Steps back; returns `None` once the session has closed
    pub async fn back(&self) -> AppResult<Option<SessionSnapshot>> {
        let mut state = self.state.write().await;
        if !state.navigator.is_open() {
            return Err(AppError::NoActiveSession);
        }
        Ok(state.navigator.back())
    }

    /// Closes the session; the feed is untouched
    pub async fn close(&self) -> bool {
        self.state.write().await.navigator.close()
    }

    pub async fn session(&self) -> Option<SessionSnapshot> {
        self.state.read().await.navigator.snapshot()
    }

    pub async fn focus(&self) -> Option<ContentItem> {
        self.state.read().await.navigator.focus().cloned()
    }

    pub async fn history_depth(&self) -> usize {
        self.state.read().await.navigator.history_depth()
    }

    pub async fn related(&self) -> Vec<ContentItem> {
        self.state.read().await.navigator.related()
    }

    /// Appends the next ranked batch of related items
    ///
    /// The result is discarded if the session changed focus or closed while
    /// the load was suspended.
    pub async fn load_more_related(&self) -> RelatedLoadOutcome {
        let ticket = match self.state.write().await.navigator.begin_related_load() {
            RelatedLoadStart::Started(ticket) => ticket,
            RelatedLoadStart::AlreadyLoading => {
                tracing::debug!("Related load already in flight, ignoring trigger");
                return RelatedLoadOutcome::AlreadyLoading;
            }
            RelatedLoadStart::NoSession => return RelatedLoadOutcome::NoSession,
        };

        let token = ticket.token();
        tokio::time::sleep(self.session_settings.latency).await;

        let outcome = self
            .state
            .write()
            .await
            .navigator
            .complete_related_load(ticket);

        if outcome == RelatedLoadOutcome::Discarded {
            tracing::info!(token = %token, "Related load resolved after session changed; discarded");
        }
        outcome
    }
}
