//! Match lifecycle engine: the state machine owning one match's transitions
//! (C4) and the deadline timer that drives its per-round timeout (C6).
//!
//! ## Submodules
//!
//! - [`state_machine`] — [`Match`] and its lifecycle transitions
//! - [`timer`] — per-match epoch-tagged deadline tracking
//! - [`protocol`] — wire-text to [`rps_domain::Move`] decoding
//! - [`view`] — viewer-restricted read models (`MatchView`, `StatsView`)
//! - [`error`] — the shared failure vocabulary (§7)
mod error;
mod protocol;
mod state_machine;
mod timer;
mod view;

pub use error::MatchError;
pub use error::MatchResult;
pub use protocol::decode_move;
pub use state_machine::Match;
pub use state_machine::MatchMode;
pub use state_machine::MatchState;
pub use state_machine::RoundRecord;
pub use state_machine::Transition;
pub use timer::Timer;
pub use view::match_view;
pub use view::stats_view;
pub use view::MatchView;
pub use view::OpponentView;
pub use view::RoundView;
pub use view::SideView;
pub use view::StatsView;
