// src/state.rs
use crate::config::Config;
use crate::store::ShopStore;
use std::sync::Arc;

/// Shared application state, cloned into every handler. The store handle is
/// the only mutable resource; the HTTP client reuses its connection pool
/// across import runs.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub http: reqwest::Client,
    pub overpass_url: String,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, config: &Config) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            overpass_url: config.overpass_url.clone(),
        }
    }
}
