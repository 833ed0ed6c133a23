//! Move resolution, rating, and player statistics: the pure, synchronous
//! core consulted by the match engine (C1, C2, C3 of the larger system).

mod mv;
mod player;
mod rating;
mod stats;

pub use mv::resolve;
pub use mv::Move;
pub use mv::Outcome;
pub use player::Player;
pub use rating::apply as apply_rating_delta;
pub use rating::deltas as rating_deltas;
pub use stats::GameResult;
pub use stats::MatchOutcomeForPlayer;
pub use stats::MoveTally;
pub use stats::PlayerStats;
