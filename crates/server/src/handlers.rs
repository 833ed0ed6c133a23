//! HTTP handlers for the Command Surface (C8). Each handler extracts path
//! and body parameters, calls exactly one registry/repository operation,
//! and maps the `Result` straight onto a JSON response.
use crate::dto::CreateMatchRequest;
use crate::dto::ErrorBody;
use crate::dto::ErrorResponse;
use crate::dto::RegisterRequest;
use crate::dto::RegisterResponse;
use crate::dto::SubmitMoveRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::http::StatusCode;
use actix_web::web;
use rps_core::Config;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_core::Unique;
use rps_database::Repository;
use rps_domain::Player;
use rps_engine::MatchError;
use rps_engine::decode_move;
use rps_registry::Registry;
use std::sync::Arc;
use tokio_postgres::Client;

fn status_for(err: &MatchError) -> StatusCode {
    use MatchError::*;
    match err {
        InvalidArgument(_) | SelfJoin => StatusCode::BAD_REQUEST,
        NotFound(_) | NoMatchAvailable => StatusCode::NOT_FOUND,
        NotParticipant => StatusCode::FORBIDDEN,
        IllegalState(_) | PlayerBusy | DoubleSubmit | DeadlineExceeded | Conflict => StatusCode::CONFLICT,
        TransientBackend => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(err: MatchError) -> HttpResponse {
    let status = status_for(&err);
    HttpResponse::build(status).json(ErrorResponse {
        error: ErrorBody {
            kind: crate::dto::error_kind(&err),
            message: err.to_string(),
        },
    })
}

fn default_best_of(config: &Config, requested: Option<u32>) -> u32 {
    let best_of = requested.unwrap_or_else(|| config.match_max_best_of.min(5));
    if best_of % 2 == 0 { best_of.saturating_sub(1).max(1) } else { best_of }
}

/// `registerPlayer(extId, displayName)`.
pub async fn register(
    db: web::Data<Arc<Client>>,
    config: web::Data<Config>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    match db.load_player_by_external_id(body.external_id).await {
        Ok(Some(p)) => HttpResponse::Ok().json(to_register_response(&p)),
        Ok(None) => {
            let p = Player::register(body.external_id, body.display_name.clone(), config.rating_seed);
            match db.create_player(&p).await {
                Ok(()) => HttpResponse::Ok().json(to_register_response(&p)),
                Err(e) => error_response(e),
            }
        }
        Err(e) => error_response(e),
    }
}

fn to_register_response(p: &Player) -> RegisterResponse {
    RegisterResponse {
        player_id: p.id(),
        display_name: p.display_name().to_string(),
        rating: p.rating(),
    }
}

/// `createQuickMatch(playerId, bestOf?)`.
pub async fn create_quick_match(
    registry: web::Data<Arc<Registry>>,
    config: web::Data<Config>,
    path: web::Path<uuid::Uuid>,
    body: web::Json<CreateMatchRequest>,
) -> impl Responder {
    let player = PlayerId::from(path.into_inner());
    let best_of = default_best_of(&config, body.best_of);
    match registry.create_quick_match(player, best_of).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `createPrivateMatch(playerId, bestOf?)`.
pub async fn create_private_match(
    registry: web::Data<Arc<Registry>>,
    config: web::Data<Config>,
    path: web::Path<uuid::Uuid>,
    body: web::Json<CreateMatchRequest>,
) -> impl Responder {
    let player = PlayerId::from(path.into_inner());
    let best_of = default_best_of(&config, body.best_of);
    match registry.create_private_match(player, best_of).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `joinOpenQuickMatch(playerId)`.
pub async fn join_open_quick_match(
    registry: web::Data<Arc<Registry>>,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let player = PlayerId::from(path.into_inner());
    match registry.join_open_quick_match(player).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `joinMatchById(playerId, matchId)`.
pub async fn join_match_by_id(
    registry: web::Data<Arc<Registry>>,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl Responder {
    let (player, match_id) = path.into_inner();
    let player = PlayerId::from(player);
    let match_id = MatchId::from(match_id);
    match registry.join_match_by_id(player, match_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `submitMove(playerId, matchId, move)`.
pub async fn submit_move(
    registry: web::Data<Arc<Registry>>,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
    body: web::Json<SubmitMoveRequest>,
) -> impl Responder {
    let (player, match_id) = path.into_inner();
    let player = PlayerId::from(player);
    let match_id = MatchId::from(match_id);
    let mv = match decode_move(&body.mv) {
        Ok(mv) => mv,
        Err(e) => return error_response(e),
    };
    match registry.submit_move(player, match_id, mv).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `getMatchView(playerId, matchId)`.
pub async fn get_match_view(
    registry: web::Data<Arc<Registry>>,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl Responder {
    let (player, match_id) = path.into_inner();
    let player = PlayerId::from(player);
    let match_id = MatchId::from(match_id);
    match registry.get_match_view(player, match_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `getPlayerStats(playerId)`.
pub async fn get_player_stats(registry: web::Data<Arc<Registry>>, path: web::Path<uuid::Uuid>) -> impl Responder {
    let player = PlayerId::from(path.into_inner());
    match registry.get_player_stats(player).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// `cancelMatch(playerId, matchId)`.
pub async fn cancel_match(
    registry: web::Data<Arc<Registry>>,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl Responder {
    let (player, match_id) = path.into_inner();
    let player = PlayerId::from(player);
    let match_id = MatchId::from(match_id);
    match registry.cancel_match(player, match_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}
