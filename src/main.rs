#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use serde_json::{json, Value};

mod auth;
mod config;
mod email;
mod models;
mod rate_limit;
mod routes;
mod store;


use config::{AdminCredentials, Config};
use rate_limit::RateLimiter;
use store::Store;

#[catch(400)]
fn bad_request() -> Json<Value> {
    Json(json!({ "error": "Bad request" }))
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "error": "Unauthorized" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "error": "Invalid request body" }))
}

#[catch(500)]
fn server_error() -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}

/// Create a Store instance for the configured backend.
fn create_store(config: &Config) -> Result<Arc<dyn Store>, String> {
    match config.db_backend.as_str() {
        "mongodb" => {
            let ms = store::mongo::MongoStore::new(&config.mongo_uri, &config.mongo_db)?;
            ms.test_connection()?;
            Ok(Arc::new(ms) as Arc<dyn Store>)
        }
        "sqlite" => {
            let pool = store::sqlite::init_pool(&config.sqlite_path)?;
            Ok(Arc::new(store::sqlite::SqliteStore::new(pool)) as Arc<dyn Store>)
        }
        other => Err(format!("Unknown database backend: {}", other)),
    }
}

fn build_rocket(
    store: Arc<dyn Store>,
    config: Config,
    credentials: Option<AdminCredentials>,
) -> Rocket<Build> {
    rocket::build()
        .manage(store)
        .manage(config)
        .manage(credentials)
        .manage(RateLimiter::new())
        .mount("/api", routes::routes())
        .register(
            "/",
            catchers![bad_request, unauthorized, not_found, unprocessable, server_error],
        )
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = Config::load();

    let store = create_store(&config).expect("Failed to initialize store");
    store
        .run_migrations()
        .expect("Failed to run database migrations");
    // Warm the singleton so the first admin read never races its creation
    store
        .settings_get()
        .expect("Failed to seed site settings");

    let credentials = AdminCredentials::from_config(&config);
    if credentials.is_none() {
        log::warn!("FOLIUM_ADMIN_PASSWORD is not set; admin login is disabled");
    }

    log::info!("Using {} backend", store.db_backend());

    build_rocket(store, config, credentials)
}
