/// Process-wide configuration, assembled once at startup from environment
/// variables. Read-only after construction — shared via `Arc<Config>`.
///
/// Each field is read with `env::var(...).ok()`, parsed, and defaulted.
#[derive(Debug, Clone)]
pub struct Config {
    /// Move submission window per round. Default 60s, valid range 10-300s.
    pub move_timeout: std::time::Duration,
    /// Upper bound on `bestOf` a caller may request. Must be odd.
    pub match_max_best_of: u32,
    /// Rating Updater K-factor.
    pub rating_k: f64,
    /// Rating floor; updates never push a player's rating below this.
    pub rating_min: i32,
    /// Rating assigned to newly created players.
    pub rating_seed: i32,
    /// How long a completed match's summary stays in the read-through cache.
    pub completed_match_cache_ttl: std::time::Duration,
    /// Postgres connection string.
    pub database_url: String,
    /// HTTP listen address.
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let move_timeout_secs = Self::env_parse("MOVE_TIMEOUT_SECONDS", 60)
            .clamp(10, 300);
        let mut match_max_best_of = Self::env_parse("MATCH_MAX_BEST_OF", 5);
        if match_max_best_of % 2 == 0 {
            match_max_best_of += 1;
        }
        Self {
            move_timeout: std::time::Duration::from_secs(move_timeout_secs),
            match_max_best_of,
            rating_k: Self::env_parse("RATING_K", 24.0),
            rating_min: Self::env_parse("RATING_MIN", 100),
            rating_seed: Self::env_parse("RATING_SEED", 1200),
            completed_match_cache_ttl: std::time::Duration::from_secs(Self::env_parse(
                "COMPLETED_MATCH_CACHE_TTL_SECONDS",
                300,
            )),
            database_url: std::env::var("DB_URL")
                .unwrap_or_else(|_| "postgres://localhost/rps".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
        }
    }

    fn env_parse<T>(key: &str, default: T) -> T
    where
        T: std::str::FromStr,
    {
        std::env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

impl Default for Config {
    /// Defaults matching the documented environment keys, used in tests and
    /// wherever no environment is available.
    fn default() -> Self {
        Self {
            move_timeout: std::time::Duration::from_secs(60),
            match_max_best_of: 5,
            rating_k: 24.0,
            rating_min: 100,
            rating_seed: 1200,
            completed_match_cache_ttl: std::time::Duration::from_secs(300),
            database_url: "postgres://localhost/rps".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.move_timeout.as_secs(), 60);
        assert_eq!(c.match_max_best_of, 5);
        assert_eq!(c.rating_k, 24.0);
        assert_eq!(c.rating_min, 100);
        assert_eq!(c.rating_seed, 1200);
    }

    #[test]
    fn even_best_of_is_nudged_odd() {
        std::env::set_var("MATCH_MAX_BEST_OF", "6");
        let c = Config::from_env();
        assert_eq!(c.match_max_best_of % 2, 1);
        std::env::remove_var("MATCH_MAX_BEST_OF");
    }
}
