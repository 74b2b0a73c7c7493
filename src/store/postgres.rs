//! Postgres implementation of the shop store.
//!
//! One table, with ratings and comments embedded as JSONB arrays so each
//! mutation stays a single atomic statement. The sparse uniqueness of
//! `source_id` is a partial unique index; the import upsert leans on it via
//! `ON CONFLICT ... DO NOTHING`.

use super::{NewShop, ShopPatch, ShopStore, StoreError, StoreResult};
use crate::models::doener::{Comment, Coordinates, Shop, ShopSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const RETURNED_COLUMNS: &str =
    "id, name, location, lat, lng, image, ratings, comments, source, source_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ShopRow {
    id: i64,
    name: String,
    location: String,
    lat: f64,
    lng: f64,
    image: String,
    ratings: Json<Vec<i32>>,
    comments: Json<Vec<Comment>>,
    source: String,
    source_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Shop {
            id: row.id,
            name: row.name,
            location: row.location,
            coordinates: Coordinates { lat: row.lat, lng: row.lng },
            image: row.image,
            ratings: row.ratings.0,
            comments: row.comments.0,
            source: ShopSource::parse(&row.source),
            source_id: row.source_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and brings the schema up to date with the embedded
    /// migrations.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ShopStore for PgStore {
    async fn list(&self) -> StoreResult<Vec<Shop>> {
        let rows: Vec<ShopRow> = sqlx::query_as(&format!(
            "SELECT {RETURNED_COLUMNS} FROM doener_shops ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Shop::from).collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Shop> {
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            "SELECT {RETURNED_COLUMNS} FROM doener_shops WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shop::from)
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn create(&self, new: NewShop) -> StoreResult<Shop> {
        let row: ShopRow = sqlx::query_as(&format!(
            "INSERT INTO doener_shops (name, location, lat, lng, image, ratings, comments, source, source_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {RETURNED_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.location)
        .bind(new.coordinates.lat)
        .bind(new.coordinates.lng)
        .bind(&new.image)
        .bind(Json(&new.ratings))
        .bind(Json(&new.comments))
        .bind(new.source.as_str())
        .bind(&new.source_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db) = e.as_database_error() {
                if db.code().as_deref() == Some("23505") {
                    return StoreError::Conflict("sourceId exists".into());
                }
            }
            StoreError::Database(e)
        })?;
        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: ShopPatch) -> StoreResult<Shop> {
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            "UPDATE doener_shops SET \
                name = COALESCE($2, name), \
                location = COALESCE($3, location), \
                lat = COALESCE($4, lat), \
                lng = COALESCE($5, lng), \
                image = COALESCE($6, image), \
                ratings = COALESCE($7, ratings), \
                comments = COALESCE($8, comments), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {RETURNED_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.location)
        .bind(patch.coordinates.map(|c| c.lat))
        .bind(patch.coordinates.map(|c| c.lng))
        .bind(patch.image)
        .bind(patch.ratings.map(Json))
        .bind(patch.comments.map(Json))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shop::from)
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM doener_shops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_rating(&self, id: i64, stars: i32) -> StoreResult<Shop> {
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            "UPDATE doener_shops SET \
                ratings = ratings || to_jsonb($2::int4), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {RETURNED_COLUMNS}"
        ))
        .bind(id)
        .bind(stars)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shop::from)
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn add_comment(&self, id: i64, comment: Comment) -> StoreResult<Shop> {
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            "UPDATE doener_shops SET \
                comments = comments || $2, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {RETURNED_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(&comment))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shop::from)
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn remove_comment(&self, id: i64, comment_id: Uuid) -> StoreResult<Shop> {
        // Rebuild the embedded array without the matching element; a miss on
        // the comment id leaves the array as it was.
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            "UPDATE doener_shops SET \
                comments = COALESCE( \
                    (SELECT jsonb_agg(c) FROM jsonb_array_elements(comments) AS c \
                     WHERE c->>'id' <> $2), \
                    '[]'::jsonb), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {RETURNED_COLUMNS}"
        ))
        .bind(id)
        .bind(comment_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Shop::from)
            .ok_or_else(|| StoreError::NotFound("shop".into()))
    }

    async fn insert_if_absent(&self, new: NewShop) -> StoreResult<bool> {
        let inserted: Option<(i64,)> = sqlx::query_as(
            "INSERT INTO doener_shops (name, location, lat, lng, image, ratings, comments, source, source_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (source_id) WHERE source_id IS NOT NULL DO NOTHING \
             RETURNING id",
        )
        .bind(&new.name)
        .bind(&new.location)
        .bind(new.coordinates.lat)
        .bind(new.coordinates.lng)
        .bind(&new.image)
        .bind(Json(&new.ratings))
        .bind(Json(&new.comments))
        .bind(new.source.as_str())
        .bind(&new.source_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(inserted.is_some())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
