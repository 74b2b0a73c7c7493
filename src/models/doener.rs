use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest comment text the API accepts, in characters.
pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopSource {
    Manual,
    Osm,
}

impl ShopSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopSource::Manual => "manual",
            ShopSource::Osm => "osm",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "osm" => ShopSource::Osm,
            _ => ShopSource::Manual,
        }
    }
}

/// One döner venue. Ratings and comments are embedded, not separate
/// collections; the average rating is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub image: String,
    pub ratings: Vec<i32>,
    pub comments: Vec<Comment>,
    pub source: ShopSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// Reader-side rating average; `None` while the shop is unrated.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: i32 = self.ratings.iter().sum();
        Some(sum as f64 / self.ratings.len() as f64)
    }
}
