//! HTTP adapter over the Command Surface (C8).
//!
//! ## Submodules
//!
//! - [`dto`] — request/response bodies and the error payload shape
//! - [`handlers`] — one handler per Command Surface operation
//! - [`dispatch`] — the chat-style `/rock` `/paper` `/scissors` command surface

pub mod dispatch;
pub mod dto;
pub mod handlers;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use rps_core::Config;
use rps_registry::Registry;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

#[rustfmt::skip]
pub async fn run(db: Arc<Client>, registry: Arc<Registry>, config: Config) -> Result<(), std::io::Error> {
    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);
    let registry = web::Data::new(registry);
    let db = web::Data::new(db);
    log::info!("starting match engine server on {bind_addr}");
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(config.clone())
            .app_data(registry.clone())
            .app_data(db.clone())
            .route("/health", web::get().to(health))
            .route("/commands", web::post().to(dispatch::handle))
            .service(
                web::scope("/players")
                    .route("", web::post().to(handlers::register))
                    .route("/{player_id}/matches/quick", web::post().to(handlers::create_quick_match))
                    .route("/{player_id}/matches/private", web::post().to(handlers::create_private_match))
                    .route("/{player_id}/matches/join", web::post().to(handlers::join_open_quick_match))
                    .route("/{player_id}/matches/{match_id}/join", web::post().to(handlers::join_match_by_id))
                    .route("/{player_id}/matches/{match_id}/move", web::post().to(handlers::submit_move))
                    .route("/{player_id}/matches/{match_id}", web::get().to(handlers::get_match_view))
                    .route("/{player_id}/matches/{match_id}/cancel", web::post().to(handlers::cancel_match))
                    .route("/{player_id}/stats", web::get().to(handlers::get_player_stats)),
            )
    })
    .workers(4)
    .bind(bind_addr)?
    .run();

    // `rps_core::brb()` flips the interrupted flag on ctrl-c; this just has
    // to notice it and ask the server to stop, which makes it quit accepting
    // new connections and wait for in-flight ones to finish before `.await`
    // below returns.
    let handle = server.handle();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_millis(200));
        loop {
            tick.tick().await;
            if rps_core::interrupted() {
                handle.stop(true).await;
                break;
            }
        }
    });

    server.await
}
