/// The closed set of failures a Command Surface operation (C8) or a Match
/// State Machine transition (C4) can produce. Mirrors `ProtocolError` in
/// spirit (a small enum with a `Display` impl, not an `anyhow::Error`) so
/// adapters can pattern-match a failure kind onto their own error channel
/// (HTTP status, chat reply) without string-sniffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Malformed move string, out-of-range `bestOf`, non-odd `bestOf`.
    InvalidArgument(String),
    /// Unknown `matchId` or `playerId`.
    NotFound(String),
    /// Operation not legal in the current match state.
    IllegalState(String),
    /// Player is not a participant in this match.
    NotParticipant,
    /// Player tried to join their own match.
    SelfJoin,
    /// Player already participates in a non-terminal match.
    PlayerBusy,
    /// Player's current-round slot is already filled.
    DoubleSubmit,
    /// Submission arrived after the round deadline.
    DeadlineExceeded,
    /// Optimistic-concurrency clash on a repository save.
    Conflict,
    /// Repository unavailable; no match-state mutation occurred.
    TransientBackend,
    /// No quick match was available to join.
    NoMatchAvailable,
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MatchError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            MatchError::NotFound(what) => write!(f, "not found: {}", what),
            MatchError::IllegalState(msg) => write!(f, "illegal state: {}", msg),
            MatchError::NotParticipant => write!(f, "player is not a participant in this match"),
            MatchError::SelfJoin => write!(f, "a player cannot join their own match"),
            MatchError::PlayerBusy => write!(f, "player is already in a non-terminal match"),
            MatchError::DoubleSubmit => write!(f, "move already submitted this round"),
            MatchError::DeadlineExceeded => write!(f, "submission arrived after the round deadline"),
            MatchError::Conflict => write!(f, "optimistic concurrency conflict"),
            MatchError::TransientBackend => write!(f, "backend temporarily unavailable"),
            MatchError::NoMatchAvailable => write!(f, "no open match is available to join"),
        }
    }
}

impl std::error::Error for MatchError {}

pub type MatchResult<T> = Result<T, MatchError>;
