//! Request/response bodies for the HTTP adapter. `MatchView`/`StatsView`
//! themselves live in `rps-engine` and are returned verbatim; everything
//! here is adapter-local input shaping and the error payload (§6).
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub external_id: i64,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub player_id: rps_core::PlayerId,
    pub display_name: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateMatchRequest {
    pub best_of: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMoveRequest {
    #[serde(rename = "move")]
    pub mv: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

/// Maps a [`rps_engine::MatchError`] onto its stable category string (§7:
/// "each kind maps to a stable human-readable category").
pub fn error_kind(err: &rps_engine::MatchError) -> &'static str {
    use rps_engine::MatchError::*;
    match err {
        InvalidArgument(_) => "invalid_argument",
        NotFound(_) => "not_found",
        IllegalState(_) => "illegal_state",
        NotParticipant => "not_participant",
        SelfJoin => "self_join",
        PlayerBusy => "player_busy",
        DoubleSubmit => "double_submit",
        DeadlineExceeded => "deadline_exceeded",
        Conflict => "conflict",
        TransientBackend => "transient_backend",
        NoMatchAvailable => "no_match_available",
    }
}
