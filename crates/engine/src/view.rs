use crate::state_machine::Match;
use crate::state_machine::MatchMode;
use crate::state_machine::MatchState;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_core::Unique;
use rps_domain::Move;
use rps_domain::Outcome;
use rps_domain::PlayerStats;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Viewer-restricted match snapshot (§6). Constructed fresh from a `Match`
/// for every read; never stored. The opponent's current-round move is never
/// populated unless both slots are filled, enforcing the hiding law (§8).
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchView {
    pub match_id: MatchId,
    pub state: MatchState,
    pub mode: MatchMode,
    pub best_of: u32,
    pub rounds_to_win: u32,
    pub you: SideView,
    pub opponent: OpponentView,
    pub round_history: Vec<RoundView>,
    pub deadline: Option<u64>,
    pub winner_id: Option<PlayerId>,
    pub cancellable: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SideView {
    pub player_id: PlayerId,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_round_move: Option<Move>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OpponentView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub score: u32,
    pub current_round_move_hidden: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoundView {
    pub your_move: Option<Move>,
    pub opponent_move: Option<Move>,
    pub outcome: Outcome,
    pub at: u64,
}

/// Builds the viewer-restricted [`MatchView`] for `viewer`. Panics if
/// `viewer` is not a participant — callers are expected to check
/// `Match::is_participant` (which surfaces as `NotParticipant`) first.
pub fn match_view(m: &Match, viewer: PlayerId) -> MatchView {
    let is_p1 = viewer == m.player1();
    let (your_score, opp_score) = {
        let (p1, p2) = m.score();
        if is_p1 { (p1, p2) } else { (p2, p1) }
    };
    let opponent_id = if is_p1 { m.player2() } else { Some(m.player1()) };

    let your_move = m.slot(viewer);
    let both_in = m.slot(m.player1()).is_some()
        && m.player2().map(|p2| m.slot(p2).is_some()).unwrap_or(false);

    let round_history = m
        .round_history()
        .iter()
        .map(|r| {
            let (your_move, opponent_move) = if is_p1 {
                (r.p1_move, r.p2_move)
            } else {
                (r.p2_move, r.p1_move)
            };
            let outcome = if is_p1 { r.outcome } else { r.outcome.flip() };
            RoundView {
                your_move,
                opponent_move,
                outcome,
                at: to_unix(r.completed_at),
            }
        })
        .collect();

    MatchView {
        match_id: m.id(),
        state: m.state(),
        mode: m.mode(),
        best_of: m.best_of(),
        rounds_to_win: m.rounds_to_win(),
        you: SideView {
            player_id: viewer,
            score: your_score,
            current_round_move: your_move,
        },
        opponent: OpponentView {
            player_id: opponent_id,
            score: opp_score,
            // Only ever reveal if both slots are filled — at that instant
            // the round resolves atomically anyway, so there's nothing left
            // to hide by the time a reader could observe it.
            current_round_move_hidden: !both_in,
        },
        round_history,
        deadline: m.deadline_wall().map(to_unix),
        winner_id: m.winner_id(),
        cancellable: m.state() == MatchState::AwaitingOpponent,
    }
}

/// Player statistics view (§6), with a rating-band rank label. Band
/// thresholds and names are this implementation's choice, recorded in
/// DESIGN.md.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsView {
    pub games_played: u64,
    pub games_won: u64,
    pub games_lost: u64,
    pub games_drawn: u64,
    pub win_rate: Option<f64>,
    pub current_win_streak: u32,
    pub best_win_streak: u32,
    pub current_loss_streak: u32,
    pub worst_loss_streak: u32,
    pub most_played_move: Option<Move>,
    pub rating: i32,
    pub rank: &'static str,
}

pub fn stats_view(stats: &PlayerStats, rating: i32) -> StatsView {
    StatsView {
        games_played: stats.games_played(),
        games_won: stats.games_won(),
        games_lost: stats.games_lost(),
        games_drawn: stats.games_drawn(),
        win_rate: stats.win_rate(),
        current_win_streak: stats.current_win_streak(),
        best_win_streak: stats.best_win_streak(),
        current_loss_streak: stats.current_loss_streak(),
        worst_loss_streak: stats.worst_loss_streak(),
        most_played_move: stats.most_played_move(),
        rating,
        rank: rank_label(rating),
    }
}

fn rank_label(rating: i32) -> &'static str {
    match rating {
        r if r < 1000 => "Bronze",
        r if r < 1400 => "Silver",
        r if r < 1800 => "Gold",
        r if r < 2200 => "Platinum",
        _ => "Diamond",
    }
}

fn to_unix(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::MatchMode;
    use crate::state_machine::Transition;

    #[test]
    fn hides_opponent_move_until_both_submitted() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 3, 5).unwrap();
        m.join(p2, std::time::Duration::from_secs(60)).unwrap();
        m.submit_move(p1, Move::Rock, std::time::Duration::from_secs(60))
            .unwrap();

        let view = match_view(&m, p2);
        assert!(view.opponent.current_round_move_hidden);
        assert!(view.you.current_round_move.is_none());

        let t = m
            .submit_move(p2, Move::Rock, std::time::Duration::from_secs(60))
            .unwrap();
        assert!(matches!(t, Transition::RoundResolved { .. }));
    }

    #[test]
    fn round_history_is_perspective_flipped() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, std::time::Duration::from_secs(60)).unwrap();
        m.submit_move(p1, Move::Rock, std::time::Duration::from_secs(60))
            .unwrap();
        m.submit_move(p2, Move::Scissors, std::time::Duration::from_secs(60))
            .unwrap();

        let p1_view = match_view(&m, p1);
        assert_eq!(p1_view.round_history[0].outcome, Outcome::P1Win);
        let p2_view = match_view(&m, p2);
        assert_eq!(p2_view.round_history[0].outcome, Outcome::P2Win);
    }

    #[test]
    fn rank_label_bands() {
        assert_eq!(rank_label(900), "Bronze");
        assert_eq!(rank_label(1200), "Silver");
        assert_eq!(rank_label(1600), "Gold");
        assert_eq!(rank_label(2000), "Platinum");
        assert_eq!(rank_label(2500), "Diamond");
    }
}
