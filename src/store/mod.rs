use crate::models::doener::{Comment, Coordinates, Shop, ShopSource};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Write model for inserts. Manual creation and the OSM import both go
/// through this; only imported shops carry a `source_id`.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub image: String,
    pub ratings: Vec<i32>,
    pub comments: Vec<Comment>,
    pub source: ShopSource,
    pub source_id: Option<String>,
}

/// Partial update: `None` fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ShopPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub image: Option<String>,
    pub ratings: Option<Vec<i32>>,
    pub comments: Option<Vec<Comment>>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store seam for shop records. Handlers receive an
/// `Arc<dyn ShopStore>` through application state; every method is a single
/// atomic store operation.
#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Shop>>;
    async fn get(&self, id: i64) -> StoreResult<Shop>;
    async fn create(&self, new: NewShop) -> StoreResult<Shop>;
    async fn update(&self, id: i64, patch: ShopPatch) -> StoreResult<Shop>;
    /// Returns whether a record was actually removed. Deleting an absent id
    /// is not an error.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn add_rating(&self, id: i64, stars: i32) -> StoreResult<Shop>;
    async fn add_comment(&self, id: i64, comment: Comment) -> StoreResult<Shop>;
    async fn remove_comment(&self, id: i64, comment_id: Uuid) -> StoreResult<Shop>;
    /// Set-on-insert upsert keyed by `source_id`: inserts the record when no
    /// shop with that external id exists, leaves any existing record
    /// untouched. Returns whether a new record was inserted.
    async fn insert_if_absent(&self, new: NewShop) -> StoreResult<bool>;
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
