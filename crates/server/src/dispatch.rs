//! The chat-style command surface (§6): `/start`, `/play [bestOf]`,
//! `/join [matchId]`, `/rock`, `/paper`, `/scissors`, `/stats`, `/help`.
//!
//! A single text line is parsed and routed onto the same [`Registry`]
//! operations the REST routes call, resolving "my current match" via
//! [`Registry::current_match_for`] so the caller never has to carry a
//! matchId around between moves.
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use rps_core::Config;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_engine::decode_move;
use rps_registry::Registry;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub player_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<rps_engine::MatchView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<rps_engine::StatsView>,
}

impl CommandResponse {
    fn text(message: impl Into<String>) -> Self {
        Self { message: message.into(), view: None, stats: None }
    }
    fn view(message: impl Into<String>, view: rps_engine::MatchView) -> Self {
        Self { message: message.into(), view: Some(view), stats: None }
    }
    fn stats(message: impl Into<String>, stats: rps_engine::StatsView) -> Self {
        Self { message: message.into(), view: None, stats: Some(stats) }
    }
}

const HELP: &str = "\
/start - register or greet
/play [bestOf] - start a quick match, waiting for an opponent
/join [matchId] - join a private match, or the oldest open quick match if omitted
/rock /paper /scissors - submit a move in your current match
/stats - show your win/loss record and rating
/help - show this message";

pub async fn handle(
    registry: web::Data<Arc<Registry>>,
    config: web::Data<Config>,
    body: web::Json<CommandRequest>,
) -> impl Responder {
    let player = PlayerId::from(body.player_id);
    let mut words = body.text.trim().split_whitespace();
    let command = words.next().unwrap_or("");
    let rest: Vec<&str> = words.collect();

    match command {
        "/start" => HttpResponse::Ok().json(CommandResponse::text(
            "Welcome. Use /play to start a quick match or /help for the full command list.",
        )),
        "/help" | "" => HttpResponse::Ok().json(CommandResponse::text(HELP)),
        "/play" => {
            let best_of = rest
                .first()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or_else(|| config.match_max_best_of.min(5));
            match registry.create_quick_match(player, best_of).await {
                Ok(view) => HttpResponse::Ok().json(CommandResponse::view("match created, waiting for an opponent", view)),
                Err(e) => error(e),
            }
        }
        "/join" => {
            let result = match rest.first().and_then(|s| s.parse::<Uuid>().ok()) {
                Some(id) => registry.join_match_by_id(player, MatchId::from(id)).await,
                None => registry.join_open_quick_match(player).await,
            };
            match result {
                Ok(view) => HttpResponse::Ok().json(CommandResponse::view("joined", view)),
                Err(e) => error(e),
            }
        }
        "/rock" | "/paper" | "/scissors" => {
            let Some(match_id) = registry.current_match_for(player).await else {
                return HttpResponse::Ok().json(CommandResponse::text("you are not in a match — use /play or /join first"));
            };
            let mv = decode_move(&command[1..]).expect("command prefix matched a valid move name");
            match registry.submit_move(player, match_id, mv).await {
                Ok(view) => HttpResponse::Ok().json(CommandResponse::view("move submitted", view)),
                Err(e) => error(e),
            }
        }
        "/stats" => match registry.get_player_stats(player).await {
            Ok(stats) => HttpResponse::Ok().json(CommandResponse::stats("stats", stats)),
            Err(e) => error(e),
        },
        other => HttpResponse::Ok().json(CommandResponse::text(format!("unrecognized command: {other} (try /help)"))),
    }
}

fn error(err: rps_engine::MatchError) -> HttpResponse {
    HttpResponse::Ok().json(CommandResponse::text(err.to_string()))
}
