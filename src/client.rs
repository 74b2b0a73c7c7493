//! API client mirroring the server surface one method per endpoint, plus a
//! `ShopDirectory` that keeps a local mirror of the shop list and applies
//! mutations optimistically: patch locally, issue the request, and on
//! failure fall back to the pre-patch snapshot.

use crate::dtos::import::ImportOsmResponse;
use crate::models::doener::{Comment, Coordinates, Shop};
use crate::overpass::BoundingBox;
use chrono::Utc;
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Client-side role attached after the toy login. Purely a UI flag; the
/// server enforces nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

/// Hardcoded credential check: `admin`/`admin` and `user`/`user` are the
/// only accepted pairs.
pub fn login(username: &str, password: &str) -> Option<Role> {
    match (username.trim(), password) {
        ("admin", "admin") => Some(Role::Admin),
        ("user", "user") => Some(Role::User),
        _ => None,
    }
}

/// Partial shop payload for create and update calls; absent fields are left
/// out of the request body entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShopDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, message })
    }

    pub async fn list_doener(&self) -> Result<Vec<Shop>, ClientError> {
        let response = self.http.get(self.url("/api/doener")).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn create_doener(&self, draft: &ShopDraft) -> Result<Shop, ClientError> {
        let response = self.http.post(self.url("/api/doener")).json(draft).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn update_doener(&self, id: i64, draft: &ShopDraft) -> Result<Shop, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/doener/{id}")))
            .json(draft)
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn delete_doener(&self, id: i64) -> Result<(), ClientError> {
        let response = self.http.delete(self.url(&format!("/api/doener/{id}"))).send().await?;
        Self::checked(response).await?;
        Ok(())
    }

    pub async fn rate_doener(&self, id: i64, stars: i32) -> Result<Shop, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/doener/{id}/rate")))
            .json(&json!({ "stars": stars }))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn add_comment(&self, id: i64, user: &str, text: &str) -> Result<Shop, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/doener/{id}/comment")))
            .json(&json!({ "user": user, "text": text }))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn delete_comment(&self, id: i64, comment_id: Uuid) -> Result<Shop, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/doener/{id}/comment/{comment_id}")))
            .send()
            .await?;
        Ok(Self::checked(response).await?.json().await?)
    }

    pub async fn import_osm(&self, bbox: &BoundingBox) -> Result<ImportOsmResponse, ClientError> {
        let response = self.http.post(self.url("/api/import/osm")).json(bbox).send().await?;
        Ok(Self::checked(response).await?.json().await?)
    }
}

/// Local mirror of the server's shop list with optimistic mutations.
pub struct ShopDirectory {
    api: ApiClient,
    shops: Vec<Shop>,
}

impl ShopDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self { api, shops: Vec::new() }
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.shops.iter().position(|s| s.id == id)
    }

    fn replace(&mut self, updated: Shop) {
        match self.position(updated.id) {
            Some(i) => self.shops[i] = updated,
            None => self.shops.push(updated),
        }
    }

    /// Full-list load, the "on mount" fetch.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.shops = self.api.list_doener().await?;
        Ok(())
    }

    pub async fn create(&mut self, draft: ShopDraft) -> Result<i64, ClientError> {
        // Creation is not optimistic: the server assigns the id.
        let shop = self.api.create_doener(&draft).await?;
        let id = shop.id;
        self.shops.push(shop);
        Ok(id)
    }

    pub async fn rate(&mut self, id: i64, stars: i32) -> Result<(), ClientError> {
        let snapshot = self.shops.clone();
        if let Some(i) = self.position(id) {
            self.shops[i].ratings.push(stars);
        }
        match self.api.rate_doener(id, stars).await {
            Ok(updated) => {
                self.replace(updated);
                Ok(())
            }
            Err(err) => {
                self.shops = snapshot;
                Err(err)
            }
        }
    }

    pub async fn comment(&mut self, id: i64, user: &str, text: &str) -> Result<(), ClientError> {
        let snapshot = self.shops.clone();
        if let Some(i) = self.position(id) {
            // Placeholder id and timestamp; the confirmed record from the
            // server replaces them.
            self.shops[i].comments.push(Comment {
                id: Uuid::new_v4(),
                user: user.trim().to_string(),
                text: text.trim().to_string(),
                created_at: Utc::now(),
            });
        }
        match self.api.add_comment(id, user, text).await {
            Ok(updated) => {
                self.replace(updated);
                Ok(())
            }
            Err(err) => {
                self.shops = snapshot;
                Err(err)
            }
        }
    }

    pub async fn delete_comment(&mut self, id: i64, comment_id: Uuid) -> Result<(), ClientError> {
        let snapshot = self.shops.clone();
        if let Some(i) = self.position(id) {
            self.shops[i].comments.retain(|c| c.id != comment_id);
        }
        match self.api.delete_comment(id, comment_id).await {
            Ok(updated) => {
                self.replace(updated);
                Ok(())
            }
            Err(err) => {
                self.shops = snapshot;
                Err(err)
            }
        }
    }

    pub async fn update(&mut self, id: i64, draft: ShopDraft) -> Result<(), ClientError> {
        let snapshot = self.shops.clone();
        if let Some(i) = self.position(id) {
            let shop = &mut self.shops[i];
            if let Some(name) = &draft.name {
                shop.name = name.clone();
            }
            if let Some(location) = &draft.location {
                shop.location = location.clone();
            }
            if let Some(coordinates) = draft.coordinates {
                shop.coordinates = coordinates;
            }
            if let Some(image) = &draft.image {
                shop.image = image.clone();
            }
        }
        match self.api.update_doener(id, &draft).await {
            Ok(updated) => {
                self.replace(updated);
                Ok(())
            }
            Err(err) => {
                self.shops = snapshot;
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        let snapshot = self.shops.clone();
        self.shops.retain(|s| s.id != id);
        match self.api.delete_doener(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.shops = snapshot;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_exactly_the_two_hardcoded_pairs() {
        assert_eq!(login("admin", "admin"), Some(Role::Admin));
        assert_eq!(login("user", "user"), Some(Role::User));
        assert_eq!(login(" admin ", "admin"), Some(Role::Admin));
        assert_eq!(login("admin", "wrong"), None);
        assert_eq!(login("admin", " admin "), None);
        assert_eq!(login("", ""), None);
    }

    #[test]
    fn draft_serializes_only_present_fields() {
        let draft = ShopDraft { name: Some("X".into()), ..Default::default() };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, serde_json::json!({ "name": "X" }));
    }
}
