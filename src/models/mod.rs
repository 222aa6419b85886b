use serde::{Deserialize, Serialize};

pub mod content_item;

pub use content_item::{ContentAttributes, ContentItem, ItemId, MediaRef};

// ============================================================================
// Layout & scroll geometry reported by the presentation layer
// ============================================================================

/// Snapshot of a scrollable region's geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_offset: f64,
    pub viewport_size: f64,
    pub content_size: f64,
}

impl ScrollMetrics {
    /// Distance from the bottom edge of the viewport to the end of the content
    pub fn remaining(&self) -> f64 {
        (self.content_size - (self.scroll_offset + self.viewport_size)).max(0.0)
    }

    /// True once the remaining distance drops below `threshold_ratio` viewports
    pub fn is_near_bottom(&self, threshold_ratio: f64) -> bool {
        self.remaining() < self.viewport_size * threshold_ratio
    }
}

/// Grid layout used to estimate rendered content height for a given item count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionLayout {
    pub viewport_size: f64,
    pub item_extent: f64,
    #[serde(default = "default_columns")]
    pub columns: u32,
}

fn default_columns() -> u32 {
    2
}

impl RegionLayout {
    pub fn content_size(&self, item_count: usize) -> f64 {
        let columns = self.columns.max(1) as usize;
        let rows = item_count.div_ceil(columns);
        rows as f64 * self.item_extent
    }
}

/// Named scroll regions the engine binds triggers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollRegion {
    Feed,
    Detail,
}

impl std::fmt::Display for ScrollRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollRegion::Feed => write!(f, "feed"),
            ScrollRegion::Detail => write!(f, "detail"),
        }
    }
}

// ============================================================================
// Feed views
// ============================================================================

/// Read-only filter over the feed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedFilter {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl FeedFilter {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        let matches_tags =
            self.tags.is_empty() || self.tags.iter().any(|tag| item.has_attribute(tag));

        let matches_query = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                item.caption
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
                    || item
                        .attributes
                        .values()
                        .any(|v| v.to_lowercase().contains(&needle))
            }
        };

        matches_tags && matches_query
    }
}

/// Feed loading state exposed to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedStatus {
    pub loading: bool,
    pub item_count: usize,
    pub issued_count: usize,
}

/// Result of a `load_more` call on the feed
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedLoadOutcome {
    Loaded {
        appended: usize,
        total: usize,
        /// Extra batches pulled in because the region was still under-filled
        fill_rounds: usize,
    },
    AlreadyLoading,
}

// ============================================================================
// Session views
// ============================================================================

/// Monotonically increasing identity of a session's current focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub u64);

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serializable view of an open detail session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub token: SessionToken,
    pub focus: ContentItem,
    pub history_depth: usize,
    /// Number of items deep the user has drilled, counting the focus
    pub depth: usize,
    pub related: Vec<ContentItem>,
    pub loading: bool,
}

/// Result of a `load_more_related` call
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelatedLoadOutcome {
    Loaded { appended: usize, total: usize },
    AlreadyLoading,
    /// The session moved on or closed while the load was in flight
    Discarded,
    NoSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(caption: &str, tags: &[&str]) -> ContentItem {
        ContentItem::new(
            ItemId::new(caption),
            MediaRef::new(format!("ref-{caption}")),
            ContentAttributes::from_parts(&[], tags, &[], &[]),
        )
        .with_caption(caption)
    }

    #[test]
    fn test_remaining_distance() {
        let metrics = ScrollMetrics {
            scroll_offset: 500.0,
            viewport_size: 800.0,
            content_size: 2000.0,
        };
        assert_eq!(metrics.remaining(), 700.0);
        assert!(metrics.is_near_bottom(1.0));
        assert!(!metrics.is_near_bottom(0.5));
    }

    #[test]
    fn test_remaining_never_negative() {
        let metrics = ScrollMetrics {
            scroll_offset: 900.0,
            viewport_size: 800.0,
            content_size: 1000.0,
        };
        assert_eq!(metrics.remaining(), 0.0);
        assert!(metrics.is_near_bottom(0.1));
    }

    #[test]
    fn test_region_layout_content_size() {
        let layout = RegionLayout {
            viewport_size: 800.0,
            item_extent: 300.0,
            columns: 2,
        };
        assert_eq!(layout.content_size(0), 0.0);
        assert_eq!(layout.content_size(5), 900.0);
        assert_eq!(layout.content_size(6), 900.0);
    }

    #[test]
    fn test_scroll_region_serde() {
        let region: ScrollRegion = serde_json::from_str(r#""detail""#).unwrap();
        assert_eq!(region, ScrollRegion::Detail);
        assert_eq!(format!("{}", ScrollRegion::Feed), "feed");
    }

    #[test]
    fn test_filter_by_tag() {
        let filter = FeedFilter {
            tags: vec!["neon".to_string()],
            query: None,
        };
        assert!(filter.matches(&item("Neon lights", &["neon", "vibrant"])));
        assert!(!filter.matches(&item("Vinyl record", &["analog"])));
    }

    #[test]
    fn test_filter_by_query_is_case_insensitive() {
        let filter = FeedFilter {
            tags: vec![],
            query: Some("URBAN".to_string()),
        };
        assert!(filter.matches(&item("Urban night scene", &["city"])));
        assert!(filter.matches(&item("Skyline", &["urban"])));
        assert!(!filter.matches(&item("Vinyl record", &["analog"])));
    }

    #[test]
    fn test_blank_filter_matches_everything() {
        let filter = FeedFilter {
            tags: vec![],
            query: Some("   ".to_string()),
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&item("anything", &[])));
    }

    #[test]
    fn test_load_outcome_serialization() {
        let json = serde_json::to_value(FeedLoadOutcome::AlreadyLoading).unwrap();
        assert_eq!(json["status"], "already_loading");

        let json = serde_json::to_value(RelatedLoadOutcome::Loaded {
            appended: 6,
            total: 12,
        })
        .unwrap();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["appended"], 6);
    }
}
