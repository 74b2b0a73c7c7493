// src/config.rs
use std::net::IpAddr;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub overpass_url: String,
}

impl Config {
    /// Reads configuration from the environment. Call `dotenvy::dotenv()`
    /// first so a local `.env` is picked up.
    pub fn load() -> Self {
        let host = std::env::var("HOST")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or_else(|| "127.0.0.1".parse().unwrap());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let database_url = std::env::var("DATABASE_URL").ok();
        let overpass_url =
            std::env::var("OVERPASS_URL").unwrap_or_else(|_| DEFAULT_OVERPASS_URL.to_string());

        Self { host, port, database_url, overpass_url }
    }
}
