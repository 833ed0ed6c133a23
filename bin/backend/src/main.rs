//! Match engine server binary.
//!
//! Loads [`rps_core::Config`] from the environment, opens the database
//! connection, and starts the HTTP adapter on `BIND_ADDR`.
#[tokio::main]
async fn main() {
    rps_core::log();
    rps_core::brb();
    let config = rps_core::Config::from_env();
    let db = rps_database::db(&config.database_url).await;
    let registry = rps_registry::Registry::new(db.clone(), config.clone());
    rps_server::run(db, registry, config).await.unwrap();
}
