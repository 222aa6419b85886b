use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Identifier of a content item, unique for the lifetime of a feed or session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque reference to a displayable asset (URL or handle)
///
/// The engine never interprets it beyond equality and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hand-authored attribute tags used for similarity scoring
///
/// Every set defaults to empty when the metadata source omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAttributes {
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub moods: BTreeSet<String>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
}

impl ContentAttributes {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.tags.is_empty()
            && self.moods.is_empty()
            && self.colors.is_empty()
    }

    /// Unions `other` into `self`; existing values are never removed
    pub fn merge(&mut self, other: &ContentAttributes) {
        self.categories.extend(other.categories.iter().cloned());
        self.tags.extend(other.tags.iter().cloned());
        self.moods.extend(other.moods.iter().cloned());
        self.colors.extend(other.colors.iter().cloned());
    }

    /// Iterates over every attribute value across all four sets
    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.categories
            .iter()
            .chain(self.tags.iter())
            .chain(self.moods.iter())
            .chain(self.colors.iter())
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.categories.contains(value)
            || self.tags.contains(value)
            || self.moods.contains(value)
            || self.colors.contains(value)
    }

    /// Convenience builder used by the catalog and tests
    pub fn from_parts(
        categories: &[&str],
        tags: &[&str],
        moods: &[&str],
        colors: &[&str],
    ) -> Self {
        let to_set = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        Self {
            categories: to_set(categories),
            tags: to_set(tags),
            moods: to_set(moods),
            colors: to_set(colors),
        }
    }
}

/// A single item shown in the feed or in a detail session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    id: ItemId,
    media_ref: MediaRef,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub attributes: ContentAttributes,
    pub issued_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(id: ItemId, media_ref: MediaRef, attributes: ContentAttributes) -> Self {
        Self {
            id,
            media_ref,
            caption: None,
            attributes,
            issued_at: Utc::now(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn media_ref(&self) -> &MediaRef {
        &self.media_ref
    }

    /// True when the item carries `value` in any attribute set
    pub fn has_attribute(&self, value: &str) -> bool {
        self.attributes.contains_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        let id = ItemId::new("mountain-42");
        assert_eq!(format!("{}", id), "mountain-42");
    }

    #[test]
    fn test_item_id_serializes_as_plain_string() {
        let id = ItemId::new("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    #[test]
    fn test_missing_attributes_deserialize_as_empty_sets() {
        let attrs: ContentAttributes = serde_json::from_str(r#"{"tags":["neon"]}"#).unwrap();
        assert!(attrs.categories.is_empty());
        assert!(attrs.moods.is_empty());
        assert!(attrs.colors.is_empty());
        assert!(attrs.tags.contains("neon"));
    }

    #[test]
    fn test_item_without_attributes_field() {
        let json = r#"{
            "id": "x",
            "media_ref": "https://example.test/x.jpg",
            "issued_at": "2024-01-01T00:00:00Z"
        }"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert!(item.attributes.is_empty());
        assert_eq!(item.caption, None);
    }

    #[test]
    fn test_identity_is_read_only_and_attributes_merge() {
        let mut item = ContentItem::new(
            ItemId::new("a"),
            MediaRef::new("ref-a"),
            ContentAttributes::from_parts(&["sci-fi"], &[], &[], &[]),
        );
        item.attributes
            .merge(&ContentAttributes::from_parts(&["drama"], &["space"], &[], &[]));

        assert_eq!(item.id(), &ItemId::new("a"));
        assert_eq!(item.media_ref(), &MediaRef::new("ref-a"));
        assert!(item.attributes.categories.contains("sci-fi"));
        assert!(item.attributes.categories.contains("drama"));
        assert!(item.has_attribute("space"));
    }
}
