//! Overpass API integration: query construction, the slice of the response
//! model the import relies on, and extraction of import candidates.

use crate::error::AppError;
use crate::models::doener::{Coordinates, ShopSource};
use crate::store::NewShop;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Amenity/cuisine filters for "is this a döner place".
const AMENITY_PATTERN: &str = "fast_food|restaurant";
const CUISINE_PATTERN: &str = "kebab|doner|dürüm|turkish";

/// Display name used when an element carries no `name` tag.
const NAME_PLACEHOLDER: &str = "Unnamed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Overpass QL: nodes, ways and relations matching the cuisine filters
/// inside the box; `out center` so ways/relations carry a center coordinate.
pub fn build_query(bbox: &BoundingBox) -> String {
    let BoundingBox { south, west, north, east } = *bbox;
    format!(
        "[out:json][timeout:25];\n\
         (\n\
           node[\"amenity\"~\"{AMENITY_PATTERN}\"][\"cuisine\"~\"{CUISINE_PATTERN}\"]({south},{west},{north},{east});\n\
           way[\"amenity\"~\"{AMENITY_PATTERN}\"][\"cuisine\"~\"{CUISINE_PATTERN}\"]({south},{west},{north},{east});\n\
           rel[\"amenity\"~\"{AMENITY_PATTERN}\"][\"cuisine\"~\"{CUISINE_PATTERN}\"]({south},{west},{north},{east});\n\
         );\n\
         out center tags;"
    )
}

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Direct coordinates for nodes, center-derived for ways/relations.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => self.center.as_ref().map(|c| Coordinates { lat: c.lat, lng: c.lon }),
        }
    }

    /// Stable external id, e.g. `node/123456`.
    pub fn external_id(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    fn display_name(&self) -> String {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(NAME_PLACEHOLDER)
            .to_string()
    }

    /// Address line from the element's `addr:*` tags: street + housenumber
    /// space-joined, then postcode and city, empty parts dropped.
    fn address(&self) -> String {
        let street_line = ["addr:street", "addr:housenumber"]
            .iter()
            .filter_map(|k| self.tags.get(*k))
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        let mut parts = vec![street_line];
        for key in ["addr:postcode", "addr:city"] {
            if let Some(value) = self.tags.get(key) {
                parts.push(value.clone());
            }
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" · ")
    }

    /// Import candidate, or `None` when the element has no usable
    /// coordinates.
    pub fn candidate(&self) -> Option<NewShop> {
        let coordinates = self.coordinates()?;
        Some(NewShop {
            name: self.display_name(),
            location: self.address(),
            coordinates,
            image: String::new(),
            ratings: Vec::new(),
            comments: Vec::new(),
            source: ShopSource::Osm,
            source_id: Some(self.external_id()),
        })
    }
}

/// One synchronous Overpass call. Transport errors and non-success statuses
/// both fail the invocation; there is no retry or backoff.
pub async fn fetch_elements(
    http: &reqwest::Client,
    url: &str,
    bbox: &BoundingBox,
) -> Result<Vec<OverpassElement>, AppError> {
    let query = build_query(bbox);
    let response = http
        .post(url)
        .form(&[("data", query.as_str())])
        .send()
        .await
        .map_err(|e| AppError::upstream("OSM import failed", e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::upstream("OSM import failed", format!("Overpass {}", status.as_u16())));
    }

    let body: OverpassResponse = response
        .json()
        .await
        .map_err(|e| AppError::upstream("OSM import failed", e.to_string()))?;
    Ok(body.elements)
}
