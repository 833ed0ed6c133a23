use crate::mv::Move;
use rps_core::MatchId;
use rps_core::PlayerId;
use std::time::SystemTime;

/// A player's result in a completed match, from that player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
    Drawn,
}

/// Everything the Stats Accumulator (C3) needs about one player's
/// participation in a completed match. Constructed by the Match State
/// Machine at the terminal transition from `roundHistory`.
#[derive(Debug, Clone)]
pub struct MatchOutcomeForPlayer {
    pub match_id: MatchId,
    pub result: GameResult,
    /// This player's move and whether they won, for every round they played.
    /// Draw rounds contribute a move with `won = false`.
    pub rounds: Vec<(Move, bool)>,
    pub rating_delta: i32,
    pub completed_at: SystemTime,
}

/// Per-move play/win counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveTally {
    pub played: u64,
    pub won: u64,
}

/// One-to-one with [`Player`](crate::player::Player). Mutated only by
/// [`PlayerStats::accumulate`].
#[derive(Debug, Clone)]
pub struct PlayerStats {
    player_id: PlayerId,
    games_played: u64,
    games_won: u64,
    games_lost: u64,
    games_drawn: u64,
    rock: MoveTally,
    paper: MoveTally,
    scissors: MoveTally,
    current_win_streak: u32,
    best_win_streak: u32,
    current_loss_streak: u32,
    worst_loss_streak: u32,
    last_game_at: Option<SystemTime>,
    last_win_at: Option<SystemTime>,
    /// The most recently accumulated match id, for idempotent replay (§4.3).
    last_applied_match_id: Option<MatchId>,
}

impl PlayerStats {
    /// Zero-initialised stats for a player with no recorded games, matching
    /// the repository contract's "returns zero-initialised stats if absent".
    pub fn zero(player_id: PlayerId) -> Self {
        Self {
            player_id,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            games_drawn: 0,
            rock: MoveTally::default(),
            paper: MoveTally::default(),
            scissors: MoveTally::default(),
            current_win_streak: 0,
            best_win_streak: 0,
            current_loss_streak: 0,
            worst_loss_streak: 0,
            last_game_at: None,
            last_win_at: None,
            last_applied_match_id: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        player_id: PlayerId,
        games_played: u64,
        games_won: u64,
        games_lost: u64,
        games_drawn: u64,
        rock: MoveTally,
        paper: MoveTally,
        scissors: MoveTally,
        current_win_streak: u32,
        best_win_streak: u32,
        current_loss_streak: u32,
        worst_loss_streak: u32,
        last_game_at: Option<SystemTime>,
        last_win_at: Option<SystemTime>,
        last_applied_match_id: Option<MatchId>,
    ) -> Self {
        Self {
            player_id,
            games_played,
            games_won,
            games_lost,
            games_drawn,
            rock,
            paper,
            scissors,
            current_win_streak,
            best_win_streak,
            current_loss_streak,
            worst_loss_streak,
            last_game_at,
            last_win_at,
            last_applied_match_id,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }
    pub fn games_played(&self) -> u64 {
        self.games_played
    }
    pub fn games_won(&self) -> u64 {
        self.games_won
    }
    pub fn games_lost(&self) -> u64 {
        self.games_lost
    }
    pub fn games_drawn(&self) -> u64 {
        self.games_drawn
    }
    pub fn tally(&self, mv: Move) -> MoveTally {
        match mv {
            Move::Rock => self.rock,
            Move::Paper => self.paper,
            Move::Scissors => self.scissors,
        }
    }
    pub fn current_win_streak(&self) -> u32 {
        self.current_win_streak
    }
    pub fn best_win_streak(&self) -> u32 {
        self.best_win_streak
    }
    pub fn current_loss_streak(&self) -> u32 {
        self.current_loss_streak
    }
    pub fn worst_loss_streak(&self) -> u32 {
        self.worst_loss_streak
    }
    pub fn last_game_at(&self) -> Option<SystemTime> {
        self.last_game_at
    }
    pub fn last_win_at(&self) -> Option<SystemTime> {
        self.last_win_at
    }
    pub fn last_applied_match_id(&self) -> Option<MatchId> {
        self.last_applied_match_id
    }

    /// Most-played move, for the StatsView's "most-played move" field. `None`
    /// if no games have been played.
    pub fn most_played_move(&self) -> Option<Move> {
        [
            (Move::Rock, self.rock.played),
            (Move::Paper, self.paper.played),
            (Move::Scissors, self.scissors.played),
        ]
        .into_iter()
        .filter(|&(_, n)| n > 0)
        .max_by_key(|&(_, n)| n)
        .map(|(mv, _)| mv)
    }

    /// Win rate as a percentage in `[0, 100]`. `None` with no games played.
    pub fn win_rate(&self) -> Option<f64> {
        if self.games_played == 0 {
            None
        } else {
            Some(100.0 * self.games_won as f64 / self.games_played as f64)
        }
    }

    /// Folds a completed match outcome into these stats (C3). Idempotent per
    /// `matchId`: replaying the same match is a no-op and returns `false`.
    /// A genuinely new match is applied and this returns `true`.
    pub fn accumulate(&mut self, outcome: &MatchOutcomeForPlayer) -> bool {
        if self.last_applied_match_id == Some(outcome.match_id) {
            return false;
        }

        self.games_played += 1;
        match outcome.result {
            GameResult::Won => self.games_won += 1,
            GameResult::Lost => self.games_lost += 1,
            GameResult::Drawn => self.games_drawn += 1,
        }

        for &(mv, won) in &outcome.rounds {
            let tally = match mv {
                Move::Rock => &mut self.rock,
                Move::Paper => &mut self.paper,
                Move::Scissors => &mut self.scissors,
            };
            tally.played += 1;
            if won {
                tally.won += 1;
            }
        }

        match outcome.result {
            GameResult::Won => {
                self.current_win_streak += 1;
                self.current_loss_streak = 0;
                self.best_win_streak = self.best_win_streak.max(self.current_win_streak);
            }
            GameResult::Lost => {
                self.current_loss_streak += 1;
                self.current_win_streak = 0;
                self.worst_loss_streak = self.worst_loss_streak.max(self.current_loss_streak);
            }
            // Draws freeze streaks: neither reset nor extended (§9).
            GameResult::Drawn => {}
        }

        self.last_game_at = Some(outcome.completed_at);
        if let GameResult::Won = outcome.result {
            self.last_win_at = Some(outcome.completed_at);
        }
        self.last_applied_match_id = Some(outcome.match_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(match_id: MatchId, result: GameResult, rounds: Vec<(Move, bool)>) -> MatchOutcomeForPlayer {
        MatchOutcomeForPlayer {
            match_id,
            result,
            rounds,
            rating_delta: 0,
            completed_at: SystemTime::now(),
        }
    }

    #[test]
    fn accumulate_increments_totals() {
        let mut stats = PlayerStats::zero(PlayerId::default());
        let id = MatchId::default();
        let applied = stats.accumulate(&outcome(id, GameResult::Won, vec![(Move::Rock, true)]));
        assert!(applied);
        assert_eq!(stats.games_played(), 1);
        assert_eq!(stats.games_won(), 1);
        assert_eq!(stats.tally(Move::Rock).played, 1);
        assert_eq!(stats.tally(Move::Rock).won, 1);
    }

    #[test]
    fn accumulate_is_idempotent_per_match_id() {
        let mut stats = PlayerStats::zero(PlayerId::default());
        let id = MatchId::default();
        let o = outcome(id, GameResult::Won, vec![(Move::Rock, true)]);
        assert!(stats.accumulate(&o));
        let before = stats.games_played();
        assert!(!stats.accumulate(&o));
        assert_eq!(stats.games_played(), before);
    }

    #[test]
    fn win_streak_resets_on_loss() {
        let mut stats = PlayerStats::zero(PlayerId::default());
        stats.accumulate(&outcome(MatchId::default(), GameResult::Won, vec![]));
        stats.accumulate(&outcome(MatchId::default(), GameResult::Won, vec![]));
        assert_eq!(stats.current_win_streak(), 2);
        stats.accumulate(&outcome(MatchId::default(), GameResult::Lost, vec![]));
        assert_eq!(stats.current_win_streak(), 0);
        assert_eq!(stats.current_loss_streak(), 1);
        assert_eq!(stats.best_win_streak(), 2);
    }

    #[test]
    fn draws_freeze_streaks() {
        let mut stats = PlayerStats::zero(PlayerId::default());
        stats.accumulate(&outcome(MatchId::default(), GameResult::Won, vec![]));
        stats.accumulate(&outcome(MatchId::default(), GameResult::Drawn, vec![]));
        assert_eq!(stats.current_win_streak(), 1);
        assert_eq!(stats.current_loss_streak(), 0);
    }

    #[test]
    fn most_played_move_tracks_histogram() {
        let mut stats = PlayerStats::zero(PlayerId::default());
        stats.accumulate(&outcome(
            MatchId::default(),
            GameResult::Won,
            vec![(Move::Rock, true), (Move::Rock, false), (Move::Paper, false)],
        ));
        assert_eq!(stats.most_played_move(), Some(Move::Rock));
    }
}
