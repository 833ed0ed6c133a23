use crate::error::MatchError;
use crate::error::MatchResult;
use crate::timer::Timer;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_core::Unique;
use rps_domain::resolve;
use rps_domain::GameResult;
use rps_domain::MatchOutcomeForPlayer;
use rps_domain::Move;
use rps_domain::Outcome;
use std::time::Duration;
use std::time::SystemTime;

/// Visibility / matchmaking channel. `Quick` matches are discoverable via
/// the join queue; `Private` matches require the caller to already know the
/// `matchId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Quick,
    Private,
}

/// The match's lifecycle state (§3). `Completed`, `Cancelled`, and
/// `TimedOut` are terminal — no further mutation is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    AwaitingOpponent,
    AwaitingMoves,
    Completed,
    Cancelled,
    TimedOut,
}

impl MatchState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchState::Completed | MatchState::Cancelled | MatchState::TimedOut
        )
    }
}

/// One resolved (or forfeited) round. A `None` move means that side's slot
/// was empty when the round closed out via a forfeit timeout — the glossary
/// calls this the `⊥` (bottom) value.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub p1_move: Option<Move>,
    pub p2_move: Option<Move>,
    pub outcome: Outcome,
    pub completed_at: SystemTime,
}

/// Tells the caller (the Match Registry, C5) what just happened so it can
/// drive the Timeout Scheduler (C6) and, on a terminal transition, the Stats
/// Accumulator (C3) and Repository Contract (C7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Deadline armed or re-armed; the caller should schedule a firing for
    /// `epoch` at the match's current deadline.
    Armed { epoch: u64 },
    /// A round resolved (decisively or by draw) but the match continues;
    /// a fresh deadline was armed at `epoch`.
    RoundResolved { epoch: u64 },
    /// The match reached a terminal state. No further deadline is armed.
    Terminal,
    /// The event was stale (wrong epoch, or the match had already moved on)
    /// and caused no mutation.
    Ignored,
}

/// The authority on one match's lifecycle (C4). Every public method here is
/// assumed to already be called while holding the match's exclusion lock
/// (§5) — this type itself performs no locking.
///
/// A single owned struct that advances through explicit phases and
/// persists itself on completion; every transition is a discrete,
/// lock-guarded call rather than a continuously-running `run()` loop,
/// since match transitions are request/response operations, not a
/// driven game tree.
/// `Clone` exists so the Match Registry can snapshot a terminal match and
/// release its lock before the repository flush (§5: no blocking I/O while
/// holding a match's lock).
#[derive(Debug, Clone)]
pub struct Match {
    id: MatchId,
    mode: MatchMode,
    best_of: u32,
    rounds_to_win: u32,
    player1: PlayerId,
    player2: Option<PlayerId>,
    state: MatchState,
    p1_move: Option<Move>,
    p2_move: Option<Move>,
    p1_score: u32,
    p2_score: u32,
    round_history: Vec<RoundRecord>,
    timer: Timer,
    /// Wall-clock mirror of the timer's monotonic deadline, for display in
    /// `MatchView` only. The timer itself (§4.6) uses a monotonic clock per
    /// spec; this field carries no authority over transitions.
    deadline_wall: Option<SystemTime>,
    created_at: SystemTime,
    started_at: Option<SystemTime>,
    completed_at: Option<SystemTime>,
    winner_id: Option<PlayerId>,
    version: u64,
}

impl Unique<rps_core::MatchMarker> for Match {
    fn id(&self) -> MatchId {
        self.id
    }
}

impl Match {
    /// `create(p1, mode, bestOf)`. `max_best_of` is the configured
    /// `matchMaxBestOf` policy cap; the absolute ceiling is 11.
    pub fn create(
        player1: PlayerId,
        mode: MatchMode,
        best_of: u32,
        max_best_of: u32,
    ) -> MatchResult<Self> {
        if best_of == 0 || best_of % 2 == 0 || best_of > 11 || best_of > max_best_of {
            return Err(MatchError::InvalidArgument(format!(
                "bestOf must be odd and between 1 and {}",
                max_best_of.min(11)
            )));
        }
        Ok(Self {
            id: MatchId::default(),
            mode,
            best_of,
            rounds_to_win: best_of.div_ceil(2),
            player1,
            player2: None,
            state: MatchState::AwaitingOpponent,
            p1_move: None,
            p2_move: None,
            p1_score: 0,
            p2_score: 0,
            round_history: Vec::new(),
            timer: Timer::new(),
            deadline_wall: None,
            created_at: SystemTime::now(),
            started_at: None,
            completed_at: None,
            winner_id: None,
            version: 0,
        })
    }

    /// `join(p2)`.
    pub fn join(&mut self, player2: PlayerId, move_timeout: Duration) -> MatchResult<Transition> {
        if self.state != MatchState::AwaitingOpponent {
            return Err(MatchError::IllegalState(
                "match is not awaiting an opponent".into(),
            ));
        }
        if player2 == self.player1 {
            return Err(MatchError::SelfJoin);
        }
        self.player2 = Some(player2);
        self.state = MatchState::AwaitingMoves;
        self.started_at = Some(SystemTime::now());
        let epoch = self.timer.arm(move_timeout);
        self.deadline_wall = Some(SystemTime::now() + move_timeout);
        self.version += 1;
        Ok(Transition::Armed { epoch })
    }

    /// `submitMove(playerId, move)`.
    pub fn submit_move(
        &mut self,
        player: PlayerId,
        mv: Move,
        move_timeout: Duration,
    ) -> MatchResult<Transition> {
        if self.state != MatchState::AwaitingMoves {
            return Err(MatchError::IllegalState(
                "match is not awaiting moves".into(),
            ));
        }
        let slot = self.slot_for_mut(player)?;
        if slot.is_some() {
            return Err(MatchError::DoubleSubmit);
        }
        if self.timer.expired() {
            return Err(MatchError::DeadlineExceeded);
        }
        *slot = Some(mv);
        self.version += 1;

        if self.p1_move.is_some() && self.p2_move.is_some() {
            Ok(self.resolve_round(move_timeout))
        } else {
            Ok(Transition::Ignored)
        }
    }

    /// `onDeadline(epoch)`. Stale or superseded epochs are ignored, never
    /// erroring — "ignored if match moved on" (§4.4).
    pub fn on_deadline(&mut self, epoch: u64, move_timeout: Duration) -> Transition {
        if self.state != MatchState::AwaitingMoves || !self.timer.fires(epoch) {
            return Transition::Ignored;
        }
        match (self.p1_move, self.p2_move) {
            (Some(_), Some(_)) => unreachable!("both slots filled resolves immediately"),
            (None, None) => {
                self.state = MatchState::TimedOut;
                self.completed_at = Some(SystemTime::now());
                self.timer.clear();
                self.deadline_wall = None;
                self.version += 1;
                Transition::Terminal
            }
            // Exactly one submitted: the other forfeits the round.
            (p1, p2) => {
                let outcome = if p1.is_some() {
                    Outcome::P1Win
                } else {
                    Outcome::P2Win
                };
                self.close_round(p1, p2, outcome, move_timeout)
            }
        }
    }

    /// `cancel(reason)`.
    /// Cancellation by a participant is only legal while a match has no
    /// opponent yet; once play has started the only way out is the deadline
    /// path or administrative action, not one player unilaterally quitting.
    pub fn cancel(&mut self, _reason: &str) -> MatchResult<()> {
        if self.state != MatchState::AwaitingOpponent {
            return Err(MatchError::IllegalState(
                "matches may only be cancelled by a participant while awaiting an opponent".into(),
            ));
        }
        self.state = MatchState::Cancelled;
        self.timer.clear();
        self.deadline_wall = None;
        self.version += 1;
        Ok(())
    }

    fn slot_for_mut(&mut self, player: PlayerId) -> MatchResult<&mut Option<Move>> {
        if player == self.player1 {
            Ok(&mut self.p1_move)
        } else if self.player2 == Some(player) {
            Ok(&mut self.p2_move)
        } else {
            Err(MatchError::NotParticipant)
        }
    }

    /// Round resolution algorithm (§4.4), invoked once both slots are full.
    fn resolve_round(&mut self, move_timeout: Duration) -> Transition {
        let (p1, p2) = (self.p1_move, self.p2_move);
        let outcome = resolve(p1.expect("checked"), p2.expect("checked"));
        self.close_round(p1, p2, outcome, move_timeout)
    }

    /// Shared tail of a decisive round, a drawn round, and a forfeit: append
    /// history, update score, clear slots, and either re-arm the deadline or
    /// transition to `Completed`.
    fn close_round(
        &mut self,
        p1_move: Option<Move>,
        p2_move: Option<Move>,
        outcome: Outcome,
        move_timeout: Duration,
    ) -> Transition {
        let now = SystemTime::now();
        self.round_history.push(RoundRecord {
            p1_move,
            p2_move,
            outcome,
            completed_at: now,
        });
        self.p1_move = None;
        self.p2_move = None;

        match outcome {
            Outcome::Draw => {
                let epoch = self.timer.arm(move_timeout);
                self.deadline_wall = Some(SystemTime::now() + move_timeout);
                self.version += 1;
                Transition::RoundResolved { epoch }
            }
            Outcome::P1Win | Outcome::P2Win => {
                if outcome == Outcome::P1Win {
                    self.p1_score += 1;
                } else {
                    self.p2_score += 1;
                }
                let winner_score = if outcome == Outcome::P1Win {
                    self.p1_score
                } else {
                    self.p2_score
                };
                self.version += 1;
                if winner_score == self.rounds_to_win {
                    self.state = MatchState::Completed;
                    self.winner_id = Some(if outcome == Outcome::P1Win {
                        self.player1
                    } else {
                        self.player2.expect("awaiting moves implies player2 set")
                    });
                    self.completed_at = Some(now);
                    self.timer.clear();
                    self.deadline_wall = None;
                    Transition::Terminal
                } else {
                    let epoch = self.timer.arm(move_timeout);
                    self.deadline_wall = Some(SystemTime::now() + move_timeout);
                    Transition::RoundResolved { epoch }
                }
            }
        }
    }

    // -- accessors -----------------------------------------------------

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
    pub fn best_of(&self) -> u32 {
        self.best_of
    }
    pub fn rounds_to_win(&self) -> u32 {
        self.rounds_to_win
    }
    pub fn player1(&self) -> PlayerId {
        self.player1
    }
    pub fn player2(&self) -> Option<PlayerId> {
        self.player2
    }
    pub fn state(&self) -> MatchState {
        self.state
    }
    pub fn slot(&self, player: PlayerId) -> Option<Move> {
        if player == self.player1 {
            self.p1_move
        } else if self.player2 == Some(player) {
            self.p2_move
        } else {
            None
        }
    }
    pub fn score(&self) -> (u32, u32) {
        (self.p1_score, self.p2_score)
    }
    pub fn round_history(&self) -> &[RoundRecord] {
        &self.round_history
    }
    /// Monotonic deadline, used by the caller to schedule the next
    /// `onDeadline` firing.
    pub fn deadline(&self) -> Option<tokio::time::Instant> {
        self.timer.deadline()
    }
    /// Wall-clock mirror of the deadline, for display in `MatchView`.
    pub fn deadline_wall(&self) -> Option<SystemTime> {
        self.deadline_wall
    }
    pub fn timer_epoch(&self) -> u64 {
        self.timer.epoch()
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }
    pub fn completed_at(&self) -> Option<SystemTime> {
        self.completed_at
    }
    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner_id
    }
    pub fn version(&self) -> u64 {
        self.version
    }
    pub fn is_participant(&self, player: PlayerId) -> bool {
        player == self.player1 || self.player2 == Some(player)
    }

    /// Whole-match outcome from the P1/P2 perspective, for the Rating
    /// Updater (C2). `None` until the match is `Completed` or `TimedOut`
    /// (and never for `Cancelled`, which carries no rating/stats effect).
    pub fn match_outcome(&self) -> Option<Outcome> {
        match self.state {
            MatchState::Completed => Some(if self.winner_id == Some(self.player1) {
                Outcome::P1Win
            } else {
                Outcome::P2Win
            }),
            MatchState::TimedOut => Some(Outcome::Draw),
            _ => None,
        }
    }

    /// Builds the Stats Accumulator input for `player`, given the rating
    /// delta the caller already computed via `rps_domain::rating_deltas`.
    /// `None` if the match has no stats-relevant outcome yet.
    pub fn outcome_for(&self, player: PlayerId, rating_delta: i32) -> Option<MatchOutcomeForPlayer> {
        let outcome = self.match_outcome()?;
        let is_p1 = player == self.player1;
        let result = match (outcome, is_p1) {
            (Outcome::Draw, _) => GameResult::Drawn,
            (Outcome::P1Win, true) | (Outcome::P2Win, false) => GameResult::Won,
            _ => GameResult::Lost,
        };
        let rounds = self
            .round_history
            .iter()
            .filter_map(|r| {
                let own_move = if is_p1 { r.p1_move } else { r.p2_move };
                own_move.map(|mv| {
                    let won = match (r.outcome, is_p1) {
                        (Outcome::P1Win, true) | (Outcome::P2Win, false) => true,
                        _ => false,
                    };
                    (mv, won)
                })
            })
            .collect();
        Some(MatchOutcomeForPlayer {
            match_id: self.id,
            result,
            rounds,
            rating_delta,
            completed_at: self.completed_at.unwrap_or_else(SystemTime::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> Duration {
        Duration::from_secs(60)
    }

    #[test]
    fn rejects_even_best_of() {
        let err = Match::create(PlayerId::default(), MatchMode::Quick, 2, 11).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_best_of_over_cap() {
        let err = Match::create(PlayerId::default(), MatchMode::Quick, 13, 11).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn scenario_best_of_1_decisive() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, timeout()).unwrap();
        assert_eq!(m.state(), MatchState::AwaitingMoves);
        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        let t = m.submit_move(p2, Move::Scissors, timeout()).unwrap();
        assert_eq!(t, Transition::Terminal);
        assert_eq!(m.state(), MatchState::Completed);
        assert_eq!(m.winner_id(), Some(p1));
        assert_eq!(m.score(), (1, 0));
        assert_eq!(m.round_history().len(), 1);
    }

    #[test]
    fn scenario_best_of_3_with_a_draw() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 3, 5).unwrap();
        m.join(p2, timeout()).unwrap();

        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        m.submit_move(p2, Move::Rock, timeout()).unwrap(); // draw
        assert_eq!(m.score(), (0, 0));
        assert_eq!(m.state(), MatchState::AwaitingMoves);

        m.submit_move(p1, Move::Paper, timeout()).unwrap();
        m.submit_move(p2, Move::Rock, timeout()).unwrap(); // p1 win
        assert_eq!(m.score(), (1, 0));

        m.submit_move(p1, Move::Scissors, timeout()).unwrap();
        m.submit_move(p2, Move::Rock, timeout()).unwrap(); // p2 win
        assert_eq!(m.score(), (1, 1));

        let t = m.submit_move(p1, Move::Rock, timeout()).unwrap();
        let t = match t {
            Transition::Ignored => m.submit_move(p2, Move::Scissors, timeout()).unwrap(),
            other => other,
        };
        assert_eq!(t, Transition::Terminal);
        assert_eq!(m.winner_id(), Some(p1));
        assert_eq!(m.score(), (2, 1));
        assert_eq!(m.round_history().len(), 4);
    }

    #[test]
    fn self_join_rejected() {
        let p1 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        assert_eq!(m.join(p1, timeout()).unwrap_err(), MatchError::SelfJoin);
    }

    #[test]
    fn double_submit_rejected() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, timeout()).unwrap();
        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        let err = m.submit_move(p1, Move::Paper, timeout()).unwrap_err();
        assert_eq!(err, MatchError::DoubleSubmit);
    }

    #[test]
    fn non_participant_rejected() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let stranger = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, timeout()).unwrap();
        let err = m.submit_move(stranger, Move::Rock, timeout()).unwrap_err();
        assert_eq!(err, MatchError::NotParticipant);
    }

    #[test]
    fn forfeit_on_single_submission_timeout() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        let epoch = match m.join(p2, timeout()).unwrap() {
            Transition::Armed { epoch } => epoch,
            _ => panic!(),
        };
        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        let t = m.on_deadline(epoch, timeout());
        assert_eq!(t, Transition::Terminal);
        assert_eq!(m.state(), MatchState::Completed);
        assert_eq!(m.winner_id(), Some(p1));
        assert_eq!(m.round_history().last().unwrap().p2_move, None);
    }

    #[test]
    fn timed_out_when_neither_submits() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        let epoch = match m.join(p2, timeout()).unwrap() {
            Transition::Armed { epoch } => epoch,
            _ => panic!(),
        };
        let t = m.on_deadline(epoch, timeout());
        assert_eq!(t, Transition::Terminal);
        assert_eq!(m.state(), MatchState::TimedOut);
        assert_eq!(m.match_outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn stale_deadline_epoch_is_ignored() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        let stale_epoch = match m.join(p2, timeout()).unwrap() {
            Transition::Armed { epoch } => epoch,
            _ => panic!(),
        };
        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        m.submit_move(p2, Move::Scissors, timeout()).unwrap(); // resolves + re-arms or completes
        assert_eq!(m.on_deadline(stale_epoch, timeout()), Transition::Ignored);
    }

    #[test]
    fn submit_after_deadline_fails() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, Duration::from_millis(0)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let err = m.submit_move(p1, Move::Rock, timeout()).unwrap_err();
        assert_eq!(err, MatchError::DeadlineExceeded);
    }

    #[test]
    fn cancel_only_legal_pre_terminal() {
        let p1 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        assert!(m.cancel("test").is_ok());
        assert_eq!(m.state(), MatchState::Cancelled);
        assert!(m.cancel("test").is_err());
    }

    #[test]
    fn cancel_rejected_once_opponent_has_joined() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        m.join(p2, timeout()).unwrap();
        assert_eq!(m.state(), MatchState::AwaitingMoves);
        assert!(m.cancel("changed my mind").is_err());
        assert_eq!(m.state(), MatchState::AwaitingMoves);
    }

    #[test]
    fn outcome_for_hides_histogram_contribution_of_non_submitter() {
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        let mut m = Match::create(p1, MatchMode::Quick, 1, 5).unwrap();
        let epoch = match m.join(p2, timeout()).unwrap() {
            Transition::Armed { epoch } => epoch,
            _ => panic!(),
        };
        m.submit_move(p1, Move::Rock, timeout()).unwrap();
        m.on_deadline(epoch, timeout());
        let p1_outcome = m.outcome_for(p1, 10).unwrap();
        let p2_outcome = m.outcome_for(p2, -10).unwrap();
        assert_eq!(p1_outcome.rounds, vec![(Move::Rock, true)]);
        assert!(p2_outcome.rounds.is_empty());
    }
}
