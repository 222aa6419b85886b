use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use crate::models::{ContentItem, FeedFilter, FeedStatus, ItemId, RegionLayout};

/// Tunables for the primary feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub batch_size: usize,
    pub initial_batches: usize,
    pub latency: Duration,
    pub preload_delay: Duration,
    /// Content must reach this many viewports before fill-loading stops
    pub min_fill_ratio: f64,
    pub max_fill_rounds: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            batch_size: 6,
            initial_batches: 1,
            latency: Duration::from_millis(600),
            preload_delay: Duration::from_millis(1000),
            min_fill_ratio: 1.5,
            max_fill_rounds: 8,
        }
    }
}

/// Proof that the caller holds the feed's single in-flight slot
#[derive(Debug, PartialEq, Eq)]
pub struct FeedLoadTicket(u64);

/// Owns the append-only feed and its in-flight guard
///
/// Loading is split in two phases so the slow part can run without holding
/// the feed: `begin_load` claims the slot (or refuses while a load is
/// outstanding) and `complete_load` appends the batch and frees it.
#[derive(Debug)]
pub struct FeedPager {
    items: Vec<ContentItem>,
    issued_ids: HashSet<ItemId>,
    in_flight: Option<u64>,
    next_ticket: u64,
    layout: Option<RegionLayout>,
    min_fill_ratio: f64,
}

impl FeedPager {
    pub fn new(min_fill_ratio: f64) -> Self {
        Self {
            items: Vec::new(),
            issued_ids: HashSet::new(),
            in_flight: None,
            next_ticket: 0,
            layout: None,
            min_fill_ratio,
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn issued_ids(&self) -> &HashSet<ItemId> {
        &self.issued_ids
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            loading: self.is_loading(),
            item_count: self.items.len(),
            issued_count: self.issued_ids.len(),
        }
    }

    pub fn find(&self, id: &ItemId) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Claims the in-flight slot, or returns `None` if a load is outstanding
    pub fn begin_load(&mut self) -> Option<FeedLoadTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        Some(FeedLoadTicket(ticket))
    }

    /// Appends a batch and releases the in-flight slot
    ///
    /// Returns how many items were appended. Items whose id was already
    /// issued are dropped, so `items` never holds an id twice.
    pub fn complete_load(&mut self, ticket: FeedLoadTicket, batch: Vec<ContentItem>) -> usize {
        if self.in_flight != Some(ticket.0) {
            tracing::warn!(ticket = ticket.0, "Ignoring feed batch for a released load slot");
            return 0;
        }
        self.in_flight = None;

        let incoming = batch.len();
        let before = self.items.len();
        for item in batch {
            if self.issued_ids.insert(item.id().clone()) {
                self.items.push(item);
            }
        }

        let appended = self.items.len() - before;
        if appended < incoming {
            tracing::warn!(
                skipped = incoming - appended,
                "Dropped already-issued items from feed batch"
            );
        }
        appended
    }

    /// Appends a batch outside the async path (start-up seeding)
    pub fn seed(&mut self, batch: Vec<ContentItem>) -> usize {
        match self.begin_load() {
            Some(ticket) => self.complete_load(ticket, batch),
            None => 0,
        }
    }

    pub fn set_layout(&mut self, layout: RegionLayout) {
        self.layout = Some(layout);
    }

    /// True when the known layout would render too little content to scroll
    ///
    /// Without a layout the feed is assumed filled.
    pub fn is_underfilled(&self) -> bool {
        self.layout.is_some_and(|layout| {
            layout.content_size(self.items.len()) < layout.viewport_size * self.min_fill_ratio
        })
    }

    pub fn filtered(&self, filter: &FeedFilter) -> Vec<ContentItem> {
        if filter.is_empty() {
            return self.items.clone();
        }
        self.items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    /// Every attribute value present in the feed, sorted
    pub fn tags(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| item.attributes.values().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
