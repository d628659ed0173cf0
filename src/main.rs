#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod category;
mod cors;
mod db;
mod env;
mod error;
mod models;
mod ranking;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{
    api_academy_ranking, api_classify, api_create_academy, api_create_medal, api_delete_academy,
    api_get_academy, api_list_academies, api_list_medals, api_login, api_logout, api_register,
    health,
};
use auth::{
    Sessions, bad_request_api, forbidden_api, internal_error_api, not_found_api,
    unauthorized_api, unprocessable_api,
};
use cors::CorsFairing;
use env::{AppConfig, load_environment};
use rocket::{Build, Rocket, tokio};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use telemetry::{TelemetryFairing, init_tracing};
use tracing::{error, info, warn};

#[launch]
async fn rocket() -> _ {
    let env_error = load_environment().err().map(|e| e.to_string());

    let config = AppConfig::from_env().expect("Invalid configuration");
    init_tracing(&config);

    if let Some(e) = env_error {
        warn!("Failed to load environment files: {}", e);
    }

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    let sessions = config.session_backend.build(&pool);
    info!(backend = ?config.session_backend, "Session store ready");

    let sessions_clone = sessions.clone();

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match sessions_clone.purge_expired().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
        }
    });

    init_rocket(pool, sessions, config).await
}

pub async fn init_rocket(pool: SqlitePool, sessions: Sessions, config: AppConfig) -> Rocket<Build> {
    info!("Starting academy medals service");

    rocket::build()
        .manage(pool)
        .manage(sessions)
        .manage(config)
        .mount(
            "/",
            routes![
                api_register,
                api_login,
                api_logout,
                api_classify,
                api_create_academy,
                api_list_academies,
                api_get_academy,
                api_delete_academy,
                api_create_medal,
                api_list_medals,
                api_academy_ranking,
                health,
                cors::preflight,
            ],
        )
        .register(
            "/",
            catchers![
                bad_request_api,
                unauthorized_api,
                forbidden_api,
                not_found_api,
                unprocessable_api,
                internal_error_api,
            ],
        )
        .attach(TelemetryFairing)
        .attach(CorsFairing)
}
