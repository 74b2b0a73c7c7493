// Inserts a couple of well-known test shops. Wipes the table first, so only
// for local smoke testing.
use doener_backend::models::doener::{Coordinates, ShopSource};
use doener_backend::store::postgres::PgStore;
use doener_backend::store::{NewShop, ShopStore};

fn test_shop(name: &str, location: &str, lat: f64, lng: f64) -> NewShop {
    NewShop {
        name: name.to_string(),
        location: location.to_string(),
        coordinates: Coordinates { lat, lng },
        image: String::new(),
        ratings: Vec::new(),
        comments: Vec::new(),
        source: ShopSource::Manual,
        source_id: None,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::query("DELETE FROM doener_shops")
        .execute(store.pool())
        .await
        .expect("Failed to clear table");

    let shops = [
        test_shop("Döner King", "Bahnhofstrasse 1, Zürich", 47.378, 8.540),
        test_shop("Kebab House", "Langstrasse 50, Zürich", 47.378, 8.540),
    ];
    let count = shops.len();
    for shop in shops {
        store.create(shop).await.expect("Failed to insert test shop");
    }

    tracing::info!(count, "test shops inserted");
}
