// Shared test plumbing: spawn the app (or any helper router) on an
// ephemeral port with graceful shutdown, and build strict-timeout clients so
// a hung server fails the test instead of the run.
#![allow(dead_code)]

use anyhow::{Context, Result};
use doener_backend::routes;
use doener_backend::state::AppState;
use doener_backend::store::memory::InMemoryStore;
use reqwest::{redirect::Policy, Client};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub fn build_test_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(2))
        .no_proxy()
        .redirect(Policy::none())
        .build()
        .context("build test http client")
}

pub async fn wait_for_listen(addr: SocketAddr) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(1);
    loop {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(err) => {
                if Instant::now() >= deadline {
                    return Err(anyhow::anyhow!("server not ready at {addr}: {err}"));
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

pub struct SpawnedRouter {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl SpawnedRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for SpawnedRouter {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_router(router: axum::Router) -> Result<SpawnedRouter> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind test listener")?;
    let addr = listener.local_addr().context("local addr")?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let serve = axum::serve(listener, router.into_make_service());
        let _ = serve
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    wait_for_listen(addr).await?;
    Ok(SpawnedRouter { addr, shutdown: Some(shutdown_tx), _handle: handle })
}

/// App over a fresh in-memory store. The Overpass URL points at a closed
/// port so an unexpected outbound call fails fast.
pub async fn spawn_app() -> Result<SpawnedRouter> {
    spawn_app_with_overpass("http://127.0.0.1:9/unreachable").await
}

pub async fn spawn_app_with_overpass(overpass_url: &str) -> Result<SpawnedRouter> {
    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        http: Client::builder()
            .timeout(Duration::from_secs(2))
            .no_proxy()
            .build()
            .context("build app http client")?,
        overpass_url: overpass_url.to_string(),
    };
    spawn_router(routes::app(state)).await
}
