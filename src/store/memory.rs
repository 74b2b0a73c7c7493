//! In-memory implementation of the shop store.
//!
//! Backs local development and tests, and is the fallback backend when no
//! `DATABASE_URL` is configured. State lives in a `HashMap` behind a
//! `tokio::sync::RwLock` and is lost on restart. Each trait method takes the
//! write lock at most once, so individual operations stay atomic with
//! respect to each other, matching what the Postgres backend gets from
//! single statements.

use super::{NewShop, ShopPatch, ShopStore, StoreError, StoreResult};
use crate::models::doener::{Comment, Shop};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct InMemoryStore {
    shops: Arc<RwLock<HashMap<i64, Shop>>>,
    next_id: Arc<RwLock<i64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            shops: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    async fn alloc_id(&self) -> i64 {
        let mut next = self.next_id.write().await;
        let id = *next;
        *next += 1;
        id
    }

    fn materialize(id: i64, new: NewShop) -> Shop {
        let now = Utc::now();
        Shop {
            id,
            name: new.name,
            location: new.location,
            coordinates: new.coordinates,
            image: new.image,
            ratings: new.ratings,
            comments: new.comments,
            source: new.source,
            source_id: new.source_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShopStore for InMemoryStore {
    async fn list(&self) -> StoreResult<Vec<Shop>> {
        let mut shops: Vec<Shop> = self.shops.read().await.values().cloned().collect();
        shops.sort_by_key(|s| s.id);
        Ok(shops)
    }

    async fn get(&self, id: i64) -> StoreResult<Shop> {
        self.shops
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn create(&self, new: NewShop) -> StoreResult<Shop> {
        let id = self.alloc_id().await;
        let mut shops = self.shops.write().await;
        if let Some(source_id) = new.source_id.as_deref() {
            if shops.values().any(|s| s.source_id.as_deref() == Some(source_id)) {
                return Err(StoreError::Conflict("sourceId exists".into()));
            }
        }
        let shop = Self::materialize(id, new);
        shops.insert(id, shop.clone());
        Ok(shop)
    }

    async fn update(&self, id: i64, patch: ShopPatch) -> StoreResult<Shop> {
        let mut shops = self.shops.write().await;
        let shop = shops
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("shop".into()))?;
        if let Some(name) = patch.name {
            shop.name = name;
        }
        if let Some(location) = patch.location {
            shop.location = location;
        }
        if let Some(coordinates) = patch.coordinates {
            shop.coordinates = coordinates;
        }
        if let Some(image) = patch.image {
            shop.image = image;
        }
        if let Some(ratings) = patch.ratings {
            shop.ratings = ratings;
        }
        if let Some(comments) = patch.comments {
            shop.comments = comments;
        }
        shop.updated_at = Utc::now();
        Ok(shop.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.shops.write().await.remove(&id).is_some())
    }

    async fn add_rating(&self, id: i64, stars: i32) -> StoreResult<Shop> {
        let mut shops = self.shops.write().await;
        let shop = shops
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("shop".into()))?;
        shop.ratings.push(stars);
        shop.updated_at = Utc::now();
        Ok(shop.clone())
    }

    async fn add_comment(&self, id: i64, comment: Comment) -> StoreResult<Shop> {
        let mut shops = self.shops.write().await;
        let shop = shops
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("shop".into()))?;
        shop.comments.push(comment);
        shop.updated_at = Utc::now();
        Ok(shop.clone())
    }

    async fn remove_comment(&self, id: i64, comment_id: Uuid) -> StoreResult<Shop> {
        let mut shops = self.shops.write().await;
        let shop = shops
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("shop".into()))?;
        shop.comments.retain(|c| c.id != comment_id);
        shop.updated_at = Utc::now();
        Ok(shop.clone())
    }

    async fn insert_if_absent(&self, new: NewShop) -> StoreResult<bool> {
        let mut shops = self.shops.write().await;
        if let Some(source_id) = new.source_id.as_deref() {
            if shops.values().any(|s| s.source_id.as_deref() == Some(source_id)) {
                return Ok(false);
            }
        }
        // Still under the shops write lock: a concurrent import over the
        // same box cannot observe "absent" twice for one external id.
        let id = self.alloc_id().await;
        shops.insert(id, Self::materialize(id, new));
        Ok(true)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::doener::{Coordinates, ShopSource};

    fn new_shop(name: &str, source_id: Option<&str>) -> NewShop {
        NewShop {
            name: name.to_string(),
            location: String::new(),
            coordinates: Coordinates { lat: 47.0, lng: 8.0 },
            image: String::new(),
            ratings: Vec::new(),
            comments: Vec::new(),
            source: if source_id.is_some() { ShopSource::Osm } else { ShopSource::Manual },
            source_id: source_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let a = store.create(new_shop("A", None)).await.expect("create");
        let b = store.create(new_shop("B", None)).await.expect("create");
        assert!(b.id > a.id);
        assert_eq!(store.list().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn update_keeps_omitted_fields() {
        let store = InMemoryStore::new();
        let shop = store.create(new_shop("A", None)).await.expect("create");
        store.add_rating(shop.id, 5).await.expect("rate");

        let updated = store
            .update(shop.id, ShopPatch { name: Some("B".into()), ..Default::default() })
            .await
            .expect("update");
        assert_eq!(updated.name, "B");
        assert_eq!(updated.ratings, vec![5]);
        assert_eq!(updated.location, shop.location);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryStore::new();
        let shop = store.create(new_shop("A", None)).await.expect("create");
        assert!(store.delete(shop.id).await.expect("delete"));
        assert!(!store.delete(shop.id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn insert_if_absent_is_idempotent_per_source_id() {
        let store = InMemoryStore::new();
        assert!(store.insert_if_absent(new_shop("X", Some("node/1"))).await.expect("first"));
        assert!(!store.insert_if_absent(new_shop("X", Some("node/1"))).await.expect("second"));
        assert_eq!(store.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_source_id() {
        let store = InMemoryStore::new();
        store.create(new_shop("X", Some("node/1"))).await.expect("create");
        let err = store.create(new_shop("Y", Some("node/1"))).await.expect_err("conflict");
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn remove_comment_only_touches_the_matching_id() {
        let store = InMemoryStore::new();
        let shop = store.create(new_shop("A", None)).await.expect("create");
        let keep = Comment {
            id: Uuid::new_v4(),
            user: "eva".into(),
            text: "gut".into(),
            created_at: Utc::now(),
        };
        let removed = Comment { id: Uuid::new_v4(), ..keep.clone() };
        store.add_comment(shop.id, keep.clone()).await.expect("comment");
        store.add_comment(shop.id, removed.clone()).await.expect("comment");

        let updated = store.remove_comment(shop.id, removed.id).await.expect("remove");
        assert_eq!(updated.comments, vec![keep]);
    }
}
