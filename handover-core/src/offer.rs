//! Embedded reference to the catalog item being exchanged.

use serde::{Deserialize, Serialize};

/// Snapshot of the offered item, owned by the external catalog and
/// embedded by value so transaction views render without a catalog
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRef {
    /// Catalog identifier of the offer.
    pub offer_id: String,

    /// Item title at the time the transaction was created.
    pub title: String,

    /// Free-text condition description ("like new", "worn", ...).
    pub condition: String,

    /// Optional thumbnail URL for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl OfferRef {
    /// Create a new offer reference.
    pub fn new(offer_id: &str, title: &str, condition: &str) -> Self {
        Self {
            offer_id: offer_id.to_string(),
            title: title.to_string(),
            condition: condition.to_string(),
            thumbnail_url: None,
        }
    }

    /// Attach a thumbnail URL.
    pub fn with_thumbnail(mut self, url: &str) -> Self {
        self.thumbnail_url = Some(url.to_string());
        self
    }
}
