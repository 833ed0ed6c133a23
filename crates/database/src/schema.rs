//! DDL for the four persisted tables, built with `const_format::concatcp!`
//! rather than a runtime string template.
use crate::MATCHES;
use crate::PLAYERS;
use crate::PLAYER_STATS;
use crate::ROUND_HISTORY;
use crate::Schema;

pub struct Players;
pub struct PlayerStatsTable;
pub struct Matches;
pub struct RoundHistory;

impl Schema for Players {
    fn name() -> &'static str {
        PLAYERS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            PLAYERS,
            " (
                id             UUID PRIMARY KEY,
                external_id    BIGINT NOT NULL UNIQUE,
                display_name   TEXT NOT NULL,
                rating         INTEGER NOT NULL,
                created_at     TIMESTAMPTZ NOT NULL,
                last_active_at TIMESTAMPTZ NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            PLAYERS,
            "_external ON ",
            PLAYERS,
            " (external_id);"
        )
    }
}

impl Schema for PlayerStatsTable {
    fn name() -> &'static str {
        PLAYER_STATS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            PLAYER_STATS,
            " (
                player_id             UUID PRIMARY KEY REFERENCES ",
            PLAYERS,
            "(id) ON DELETE CASCADE,
                games_played          BIGINT NOT NULL DEFAULT 0,
                games_won             BIGINT NOT NULL DEFAULT 0,
                games_lost            BIGINT NOT NULL DEFAULT 0,
                games_drawn           BIGINT NOT NULL DEFAULT 0,
                rock_played           BIGINT NOT NULL DEFAULT 0,
                rock_won              BIGINT NOT NULL DEFAULT 0,
                paper_played          BIGINT NOT NULL DEFAULT 0,
                paper_won             BIGINT NOT NULL DEFAULT 0,
                scissors_played       BIGINT NOT NULL DEFAULT 0,
                scissors_won          BIGINT NOT NULL DEFAULT 0,
                current_win_streak    INTEGER NOT NULL DEFAULT 0,
                best_win_streak       INTEGER NOT NULL DEFAULT 0,
                current_loss_streak   INTEGER NOT NULL DEFAULT 0,
                worst_loss_streak     INTEGER NOT NULL DEFAULT 0,
                last_game_at          TIMESTAMPTZ,
                last_win_at           TIMESTAMPTZ,
                last_applied_match_id UUID,
                version               BIGINT NOT NULL DEFAULT 0
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

impl Schema for Matches {
    fn name() -> &'static str {
        MATCHES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            MATCHES,
            " (
                id           UUID PRIMARY KEY,
                mode         TEXT NOT NULL,
                best_of      INTEGER NOT NULL,
                player1_id   UUID NOT NULL REFERENCES ",
            PLAYERS,
            "(id),
                player2_id   UUID REFERENCES ",
            PLAYERS,
            "(id),
                state        TEXT NOT NULL,
                winner_id    UUID REFERENCES ",
            PLAYERS,
            "(id),
                p1_score     INTEGER NOT NULL DEFAULT 0,
                p2_score     INTEGER NOT NULL DEFAULT 0,
                created_at   TIMESTAMPTZ NOT NULL,
                started_at   TIMESTAMPTZ,
                completed_at TIMESTAMPTZ
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            MATCHES,
            "_p1 ON ",
            MATCHES,
            " (player1_id, completed_at DESC);
             CREATE INDEX IF NOT EXISTS idx_",
            MATCHES,
            "_p2 ON ",
            MATCHES,
            " (player2_id, completed_at DESC);"
        )
    }
}

impl Schema for RoundHistory {
    fn name() -> &'static str {
        ROUND_HISTORY
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            ROUND_HISTORY,
            " (
                match_id     UUID NOT NULL REFERENCES ",
            MATCHES,
            "(id) ON DELETE CASCADE,
                round_index  INTEGER NOT NULL,
                p1_move      TEXT,
                p2_move      TEXT,
                outcome      TEXT NOT NULL,
                completed_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (match_id, round_index)
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

pub const CREATE_ALL: &str = const_format::concatcp!(
    Players::creates(),
    Players::indices(),
    PlayerStatsTable::creates(),
    Matches::creates(),
    Matches::indices(),
    RoundHistory::creates(),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_mentions_its_own_table_name() {
        assert!(Players::creates().contains(PLAYERS));
        assert!(Matches::creates().contains(MATCHES));
        assert!(RoundHistory::creates().contains(ROUND_HISTORY));
    }
}
