//! PostgreSQL persistence for the Repository Contract (§4.7).
//!
//! ## Connectivity
//!
//! - [`db()`] — establishes a connection from [`rps_core::Config::database_url`]
//!
//! ## Traits
//!
//! - [`Schema`] — table metadata and DDL generation
//! - [`Repository`] — the five persistence operations the Command Surface
//!   (C8) and Match Registry (C5) depend on, implemented for `Arc<Client>`
mod repository;
mod schema;

pub use repository::MatchSummary;
pub use repository::Repository;
pub use repository::StatsRecord;

use std::sync::Arc;
use tokio_postgres::Client;

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Establishes a database connection and ensures the schema exists.
///
/// # Panics
///
/// Panics if the connection fails — treats an unreachable database as a
/// fatal startup condition rather than a recoverable one.
pub async fn db(database_url: &str) -> Arc<Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(database_url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .batch_execute(schema::CREATE_ALL)
        .await
        .expect("create schema");
    Arc::new(client)
}

/// Table for registered players.
pub const PLAYERS: &str = "players";
/// Table for per-player accumulated statistics.
pub const PLAYER_STATS: &str = "player_stats";
/// Table for matches (in-progress and terminal).
pub const MATCHES: &str = "matches";
/// Table for per-round history within a match.
pub const ROUND_HISTORY: &str = "round_history";

/// Schema metadata for a persisted table: just enough to generate DDL (no
/// COPY/streaming — player/match volumes never warrant binary bulk load).
pub trait Schema {
    fn name() -> &'static str;
    fn creates() -> &'static str;
    fn indices() -> &'static str;
}
