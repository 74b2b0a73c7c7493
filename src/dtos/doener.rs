use crate::error::AppError;
use crate::models::doener::{Comment, Coordinates, ShopSource, MAX_COMMENT_LEN};
use crate::store::{NewShop, ShopPatch};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

// Request bodies are schema-less on the wire; every field deserializes as
// optional and presence is checked here, before the store is touched.

#[derive(Deserialize)]
pub struct CoordinatesBody {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CoordinatesBody {
    fn resolve(self) -> Result<Coordinates, AppError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Coordinates { lat, lng }),
            _ => Err(AppError::validation("coordinates.lat and coordinates.lng are required (numbers)")),
        }
    }
}

/// Comment as a client may embed it in a create/update body. Id and
/// timestamp are assigned server-side when absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub id: Option<Uuid>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CommentBody {
    fn resolve(self) -> Result<Comment, AppError> {
        let (user, text) =
            validated_comment(self.user.as_deref().unwrap_or(""), self.text.as_deref().unwrap_or(""))?;
        Ok(Comment {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            user,
            text,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Deserialize)]
pub struct CreateDoenerRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<CoordinatesBody>,
    pub image: Option<String>,
    pub ratings: Option<Vec<i32>>,
    pub comments: Option<Vec<CommentBody>>,
}

impl CreateDoenerRequest {
    pub fn into_new_shop(self) -> Result<NewShop, AppError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::validation("name is required"))?
            .to_string();
        let coordinates = self
            .coordinates
            .ok_or_else(|| AppError::validation("coordinates are required"))?
            .resolve()?;
        let ratings = self.ratings.unwrap_or_default();
        validate_ratings(&ratings)?;
        let comments = self
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(CommentBody::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewShop {
            name,
            location: self.location.unwrap_or_default(),
            coordinates,
            image: self.image.unwrap_or_default(),
            ratings,
            comments,
            source: ShopSource::Manual,
            source_id: None,
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateDoenerRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<CoordinatesBody>,
    pub image: Option<String>,
    pub ratings: Option<Vec<i32>>,
    pub comments: Option<Vec<CommentBody>>,
}

impl UpdateDoenerRequest {
    /// Partial semantics: only supplied fields make it into the patch, and a
    /// supplied field must still pass the same validation as on create.
    pub fn into_patch(self) -> Result<ShopPatch, AppError> {
        let name = match self.name {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(AppError::validation("name must not be empty"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };
        let coordinates = self.coordinates.map(CoordinatesBody::resolve).transpose()?;
        if let Some(ratings) = &self.ratings {
            validate_ratings(ratings)?;
        }
        let comments = self
            .comments
            .map(|comments| comments.into_iter().map(CommentBody::resolve).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        Ok(ShopPatch {
            name,
            location: self.location,
            coordinates,
            image: self.image,
            ratings: self.ratings,
            comments,
        })
    }
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub stars: Option<f64>,
}

impl RateRequest {
    pub fn stars(&self) -> Result<i32, AppError> {
        let value = self.stars.ok_or_else(|| AppError::validation("stars is required"))?;
        if !value.is_finite() || value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
            return Err(AppError::validation("Invalid rating (1..5)"));
        }
        Ok(value as i32)
    }
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub user: Option<String>,
    pub text: Option<String>,
}

impl CommentRequest {
    pub fn into_comment(self) -> Result<Comment, AppError> {
        let (user, text) =
            validated_comment(self.user.as_deref().unwrap_or(""), self.text.as_deref().unwrap_or(""))?;
        Ok(Comment { id: Uuid::new_v4(), user, text, created_at: Utc::now() })
    }
}

fn validated_comment(user: &str, text: &str) -> Result<(String, String), AppError> {
    let user = user.trim();
    let text = text.trim();
    if user.is_empty() {
        return Err(AppError::validation("user is required"));
    }
    if text.is_empty() {
        return Err(AppError::validation("text is required"));
    }
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::validation("text exceeds 1000 characters"));
    }
    Ok((user.to_string(), text.to_string()))
}

fn validate_ratings(ratings: &[i32]) -> Result<(), AppError> {
    if ratings.iter().any(|r| !(1..=5).contains(r)) {
        return Err(AppError::validation("Invalid rating (1..5)"));
    }
    Ok(())
}
