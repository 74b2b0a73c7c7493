// src/main.rs
use doener_backend::config::Config;
use doener_backend::routes;
use doener_backend::state::AppState;
use doener_backend::store::memory::InMemoryStore;
use doener_backend::store::postgres::PgStore;
use doener_backend::store::ShopStore;

use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::fmt::init as tracing_init;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();
    let config = Config::load();

    // Pick the store backend: Postgres when configured, in-memory otherwise
    let store: Arc<dyn ShopStore> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .expect("Failed to connect to database");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend_name(), "store ready");

    let state = AppState::new(store, &config);
    let app = routes::app(state);

    // Try port..port+20 to avoid crash when the address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = config.port.saturating_add(offset);
            let addr = SocketAddr::from((config.host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => {
                    bound = Some((l, addr));
                    break;
                }
                Err(e) => {
                    if offset == 0 {
                        tracing::warn!(%addr, error = %e, "Port in use, trying next");
                    }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!(
                    "Failed to bind to any port starting at {} on {}",
                    config.port,
                    config.host
                );
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}
