//! The Repository Contract (§4.7), implemented directly on `Arc<Client>`:
//! no connection pool abstraction, no query builder, plain parameterized
//! SQL behind named methods.
use crate::MATCHES;
use crate::PLAYERS;
use crate::PLAYER_STATS;
use crate::ROUND_HISTORY;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_core::Unique;
use rps_domain::GameResult;
use rps_domain::Move;
use rps_domain::MoveTally;
use rps_domain::Player;
use rps_domain::PlayerStats;
use rps_engine::Match;
use rps_engine::MatchError;
use rps_engine::MatchResult;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_postgres::Client;

/// `loadStats` plus the row version needed to detect a concurrent write on
/// the following `saveCompletedMatch` (§4.7's optimistic concurrency via
/// `version`).
#[derive(Debug, Clone)]
pub struct StatsRecord {
    pub stats: PlayerStats,
    pub version: i64,
}

/// One row of `listRecentMatchesForPlayer`.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub opponent_id: Option<PlayerId>,
    pub best_of: u32,
    pub final_score: (u32, u32),
    pub result: GameResult,
    pub completed_at: SystemTime,
}

#[allow(async_fn_in_trait)]
pub trait Repository {
    async fn load_player_by_external_id(&self, external_id: i64) -> MatchResult<Option<Player>>;
    /// Loads by internal id, used by the Match Registry when it only has a
    /// `PlayerId` (e.g. finalizing a completed match).
    async fn load_player(&self, player_id: PlayerId) -> MatchResult<Option<Player>>;
    async fn create_player(&self, player: &Player) -> MatchResult<()>;
    /// Returns zero-initialised stats (version 0) if the player has no row yet.
    async fn load_stats(&self, player_id: PlayerId) -> MatchResult<StatsRecord>;
    /// Persists a terminal match, both players' updated ratings, and both
    /// players' updated stats as one logical unit. `expected_versions` are
    /// the `StatsRecord::version` values the caller last loaded; a mismatch
    /// means another writer already applied this match and the caller
    /// should reload and retry (§7's `Conflict` propagation policy).
    #[allow(clippy::too_many_arguments)]
    async fn save_completed_match(
        &self,
        m: &Match,
        p1: &Player,
        p2: &Player,
        p1_stats: &PlayerStats,
        p2_stats: &PlayerStats,
        expected_versions: (i64, i64),
    ) -> MatchResult<()>;
    async fn list_recent_matches_for_player(
        &self,
        player_id: PlayerId,
        limit: u32,
    ) -> MatchResult<Vec<MatchSummary>>;
}

fn pg_err(e: tokio_postgres::Error) -> MatchError {
    log::warn!("database error: {}", e);
    MatchError::TransientBackend
}

impl Repository for Arc<Client> {
    async fn load_player_by_external_id(&self, external_id: i64) -> MatchResult<Option<Player>> {
        let row = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, external_id, display_name, rating, created_at, last_active_at FROM ",
                    PLAYERS,
                    " WHERE external_id = $1"
                ),
                &[&external_id],
            )
            .await
            .map_err(pg_err)?;
        Ok(row.map(|row| {
            Player::from_parts(
                PlayerId::from(row.get::<_, uuid::Uuid>(0)),
                row.get::<_, i64>(1),
                row.get::<_, String>(2),
                row.get::<_, i32>(3),
                row.get::<_, SystemTime>(4),
                row.get::<_, SystemTime>(5),
            )
        }))
    }

    async fn load_player(&self, player_id: PlayerId) -> MatchResult<Option<Player>> {
        let row = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, external_id, display_name, rating, created_at, last_active_at FROM ",
                    PLAYERS,
                    " WHERE id = $1"
                ),
                &[&player_id.inner()],
            )
            .await
            .map_err(pg_err)?;
        Ok(row.map(|row| {
            Player::from_parts(
                PlayerId::from(row.get::<_, uuid::Uuid>(0)),
                row.get::<_, i64>(1),
                row.get::<_, String>(2),
                row.get::<_, i32>(3),
                row.get::<_, SystemTime>(4),
                row.get::<_, SystemTime>(5),
            )
        }))
    }

    async fn create_player(&self, player: &Player) -> MatchResult<()> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                PLAYERS,
                " (id, external_id, display_name, rating, created_at, last_active_at)
                 VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &player.id().inner(),
                &player.external_id(),
                &player.display_name(),
                &player.rating(),
                &player.created_at(),
                &player.last_active_at(),
            ],
        )
        .await
        .map(|_| ())
        .map_err(pg_err)
    }

    async fn load_stats(&self, player_id: PlayerId) -> MatchResult<StatsRecord> {
        let row = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT games_played, games_won, games_lost, games_drawn,
                            rock_played, rock_won, paper_played, paper_won,
                            scissors_played, scissors_won,
                            current_win_streak, best_win_streak,
                            current_loss_streak, worst_loss_streak,
                            last_game_at, last_win_at, last_applied_match_id, version
                     FROM ",
                    PLAYER_STATS,
                    " WHERE player_id = $1"
                ),
                &[&player_id.inner()],
            )
            .await
            .map_err(pg_err)?;

        Ok(match row {
            None => StatsRecord {
                stats: PlayerStats::zero(player_id),
                version: 0,
            },
            Some(row) => StatsRecord {
                stats: PlayerStats::from_parts(
                    player_id,
                    row.get::<_, i64>(0) as u64,
                    row.get::<_, i64>(1) as u64,
                    row.get::<_, i64>(2) as u64,
                    row.get::<_, i64>(3) as u64,
                    MoveTally {
                        played: row.get::<_, i64>(4) as u64,
                        won: row.get::<_, i64>(5) as u64,
                    },
                    MoveTally {
                        played: row.get::<_, i64>(6) as u64,
                        won: row.get::<_, i64>(7) as u64,
                    },
                    MoveTally {
                        played: row.get::<_, i64>(8) as u64,
                        won: row.get::<_, i64>(9) as u64,
                    },
                    row.get::<_, i32>(10) as u32,
                    row.get::<_, i32>(11) as u32,
                    row.get::<_, i32>(12) as u32,
                    row.get::<_, i32>(13) as u32,
                    row.get::<_, Option<SystemTime>>(14),
                    row.get::<_, Option<SystemTime>>(15),
                    row.get::<_, Option<uuid::Uuid>>(16).map(MatchId::from),
                ),
                version: row.get::<_, i64>(17),
            },
        })
    }

    /// Wraps the match row, round history, both ratings, and both stats
    /// rows in one `BEGIN`/`COMMIT` so a mid-sequence failure (e.g. a
    /// version conflict partway through) leaves nothing partially applied
    /// (§4.7: "atomic across match record and both players' stats").
    async fn save_completed_match(
        &self,
        m: &Match,
        p1: &Player,
        p2: &Player,
        p1_stats: &PlayerStats,
        p2_stats: &PlayerStats,
        expected_versions: (i64, i64),
    ) -> MatchResult<()> {
        self.batch_execute("BEGIN").await.map_err(pg_err)?;
        match self
            .save_completed_match_body(m, p1, p2, p1_stats, p2_stats, expected_versions)
            .await
        {
            Ok(()) => {
                self.batch_execute("COMMIT").await.map_err(pg_err)?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = self.batch_execute("ROLLBACK").await {
                    log::warn!("rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn list_recent_matches_for_player(
        &self,
        player_id: PlayerId,
        limit: u32,
    ) -> MatchResult<Vec<MatchSummary>> {
        let rows = self
            .query(
                const_format::concatcp!(
                    "SELECT id, player1_id, player2_id, best_of, winner_id,
                            p1_score, p2_score, completed_at
                     FROM ",
                    MATCHES,
                    " WHERE (player1_id = $1 OR player2_id = $1) AND completed_at IS NOT NULL
                     ORDER BY completed_at DESC
                     LIMIT $2"
                ),
                &[&player_id.inner(), &(limit as i64)],
            )
            .await
            .map_err(pg_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let p1: uuid::Uuid = row.get(1);
                let p2: Option<uuid::Uuid> = row.get(2);
                let is_p1 = p1 == player_id.inner();
                let (own_score, opp_score) = (row.get::<_, i32>(5), row.get::<_, i32>(6));
                let winner: Option<uuid::Uuid> = row.get(4);
                let result = match winner {
                    None => GameResult::Drawn,
                    Some(w) if (w == p1) == is_p1 => GameResult::Won,
                    Some(_) => GameResult::Lost,
                };
                MatchSummary {
                    match_id: MatchId::from(row.get::<_, uuid::Uuid>(0)),
                    opponent_id: if is_p1 {
                        p2.map(PlayerId::from)
                    } else {
                        Some(PlayerId::from(p1))
                    },
                    best_of: row.get::<_, i32>(3) as u32,
                    final_score: if is_p1 {
                        (own_score as u32, opp_score as u32)
                    } else {
                        (opp_score as u32, own_score as u32)
                    },
                    result,
                    completed_at: row.get(7),
                }
            })
            .collect())
    }
}

/// Private helpers shared by `save_completed_match`, kept out of the public
/// trait since they only make sense as part of that larger operation.
trait Internal {
    #[allow(clippy::too_many_arguments)]
    async fn save_completed_match_body(
        &self,
        m: &Match,
        p1: &Player,
        p2: &Player,
        p1_stats: &PlayerStats,
        p2_stats: &PlayerStats,
        expected_versions: (i64, i64),
    ) -> MatchResult<()>;
    async fn upsert_player_rating(&self, player: &Player) -> MatchResult<()>;
    async fn upsert_stats(&self, stats: &PlayerStats, expected_version: i64) -> MatchResult<()>;
}

impl Internal for Arc<Client> {
    async fn save_completed_match_body(
        &self,
        m: &Match,
        p1: &Player,
        p2: &Player,
        p1_stats: &PlayerStats,
        p2_stats: &PlayerStats,
        expected_versions: (i64, i64),
    ) -> MatchResult<()> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                MATCHES,
                " (id, mode, best_of, player1_id, player2_id, state, winner_id,
                    p1_score, p2_score, created_at, started_at, completed_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                 ON CONFLICT (id) DO UPDATE SET
                    state = EXCLUDED.state,
                    winner_id = EXCLUDED.winner_id,
                    p1_score = EXCLUDED.p1_score,
                    p2_score = EXCLUDED.p2_score,
                    completed_at = EXCLUDED.completed_at"
            ),
            &[
                &m.id().inner(),
                &format!("{:?}", m.mode()),
                &(m.best_of() as i32),
                &m.player1().inner(),
                &m.player2().map(|p| p.inner()),
                &format!("{:?}", m.state()),
                &m.winner_id().map(|p| p.inner()),
                &(m.score().0 as i32),
                &(m.score().1 as i32),
                &m.created_at(),
                &m.started_at(),
                &m.completed_at(),
            ],
        )
        .await
        .map_err(pg_err)?;

        for (index, round) in m.round_history().iter().enumerate() {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    ROUND_HISTORY,
                    " (match_id, round_index, p1_move, p2_move, outcome, completed_at)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     ON CONFLICT (match_id, round_index) DO NOTHING"
                ),
                &[
                    &m.id().inner(),
                    &(index as i32),
                    &round.p1_move.map(move_label),
                    &round.p2_move.map(move_label),
                    &format!("{:?}", round.outcome),
                    &round.completed_at,
                ],
            )
            .await
            .map_err(pg_err)?;
        }

        self.upsert_player_rating(p1).await?;
        self.upsert_player_rating(p2).await?;
        self.upsert_stats(p1_stats, expected_versions.0).await?;
        self.upsert_stats(p2_stats, expected_versions.1).await?;
        Ok(())
    }

    async fn upsert_player_rating(&self, player: &Player) -> MatchResult<()> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                PLAYERS,
                " SET rating = $2, last_active_at = $3 WHERE id = $1"
            ),
            &[
                &player.id().inner(),
                &player.rating(),
                &player.last_active_at(),
            ],
        )
        .await
        .map_err(pg_err)?;
        Ok(())
    }

    async fn upsert_stats(&self, stats: &PlayerStats, expected_version: i64) -> MatchResult<()> {
        let rows = self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    PLAYER_STATS,
                    " (player_id, games_played, games_won, games_lost, games_drawn,
                        rock_played, rock_won, paper_played, paper_won,
                        scissors_played, scissors_won,
                        current_win_streak, best_win_streak,
                        current_loss_streak, worst_loss_streak,
                        last_game_at, last_win_at, last_applied_match_id, version)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, 1)
                     ON CONFLICT (player_id) DO UPDATE SET
                        games_played = EXCLUDED.games_played,
                        games_won = EXCLUDED.games_won,
                        games_lost = EXCLUDED.games_lost,
                        games_drawn = EXCLUDED.games_drawn,
                        rock_played = EXCLUDED.rock_played,
                        rock_won = EXCLUDED.rock_won,
                        paper_played = EXCLUDED.paper_played,
                        paper_won = EXCLUDED.paper_won,
                        scissors_played = EXCLUDED.scissors_played,
                        scissors_won = EXCLUDED.scissors_won,
                        current_win_streak = EXCLUDED.current_win_streak,
                        best_win_streak = EXCLUDED.best_win_streak,
                        current_loss_streak = EXCLUDED.current_loss_streak,
                        worst_loss_streak = EXCLUDED.worst_loss_streak,
                        last_game_at = EXCLUDED.last_game_at,
                        last_win_at = EXCLUDED.last_win_at,
                        last_applied_match_id = EXCLUDED.last_applied_match_id,
                        version = ",
                    PLAYER_STATS,
                    ".version + 1
                     WHERE ",
                    PLAYER_STATS,
                    ".version = $19"
                ),
                &[
                    &stats.player_id().inner(),
                    &(stats.games_played() as i64),
                    &(stats.games_won() as i64),
                    &(stats.games_lost() as i64),
                    &(stats.games_drawn() as i64),
                    &(stats.tally(Move::Rock).played as i64),
                    &(stats.tally(Move::Rock).won as i64),
                    &(stats.tally(Move::Paper).played as i64),
                    &(stats.tally(Move::Paper).won as i64),
                    &(stats.tally(Move::Scissors).played as i64),
                    &(stats.tally(Move::Scissors).won as i64),
                    &(stats.current_win_streak() as i32),
                    &(stats.best_win_streak() as i32),
                    &(stats.current_loss_streak() as i32),
                    &(stats.worst_loss_streak() as i32),
                    &stats.last_game_at(),
                    &stats.last_win_at(),
                    &stats.last_applied_match_id().map(|id| id.inner()),
                    &expected_version,
                ],
            )
            .await
            .map_err(pg_err)?;
        if rows == 0 {
            return Err(MatchError::Conflict);
        }
        Ok(())
    }
}

fn move_label(mv: Move) -> &'static str {
    match mv {
        Move::Rock => "rock",
        Move::Paper => "paper",
        Move::Scissors => "scissors",
    }
}
