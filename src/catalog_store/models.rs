use crate::metadata::Work;
use serde::Serialize;

/// A locally cached work.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub external_id: i64,
    pub title: String,
    /// Season year, 0 when unknown.
    pub year: i32,
    pub image_url: Option<String>,
    pub created: i64,
}

/// Values needed to insert an item, before the store assigns its local id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewItem {
    pub external_id: i64,
    pub title: String,
    pub year: i32,
    pub image_url: Option<String>,
}

impl NewItem {
    /// Maps a provider work to the cached representation.
    ///
    /// An unknown season year is stored as 0, which is how the cache has always recorded
    /// "unknown". A missing or blank image is stored as absent.
    pub fn from_work(work: &Work) -> Self {
        NewItem {
            external_id: work.external_id,
            title: work.title.clone(),
            year: work.season_year.unwrap_or(0),
            image_url: work
                .image_url
                .as_ref()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }
}

/// Aggregates over the reviews of one item.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub review_count: i64,
    /// Mean score, 0 for an item without reviews.
    pub avg_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemWithStats {
    pub item: Item,
    pub stats: ItemStats,
}
