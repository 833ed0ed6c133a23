use rps_core::PlayerId;
use rps_core::Unique;
use std::time::SystemTime;

/// Persistent player identity. Long-lived, loaded lazily, and mutated only
/// by stats accumulation after a completed match.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    /// Stable external identifier (e.g. a chat platform user id).
    external_id: i64,
    display_name: String,
    rating: i32,
    created_at: SystemTime,
    last_active_at: SystemTime,
}

impl Player {
    /// Constructs a freshly registered player, seeded at `rating_seed`.
    pub fn register(external_id: i64, display_name: String, rating_seed: i32) -> Self {
        let now = SystemTime::now();
        Self {
            id: PlayerId::default(),
            external_id,
            display_name,
            rating: rating_seed,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Reconstructs a player from persisted fields (repository hydration).
    pub fn from_parts(
        id: PlayerId,
        external_id: i64,
        display_name: String,
        rating: i32,
        created_at: SystemTime,
        last_active_at: SystemTime,
    ) -> Self {
        Self {
            id,
            external_id,
            display_name,
            rating,
            created_at,
            last_active_at,
        }
    }

    pub fn external_id(&self) -> i64 {
        self.external_id
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn rating(&self) -> i32 {
        self.rating
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn last_active_at(&self) -> SystemTime {
        self.last_active_at
    }

    /// Applies a rating delta computed by the Rating Updater, flooring at
    /// `floor`, and bumps `last_active_at`.
    pub fn apply_rating_delta(&mut self, delta: i32, floor: i32) {
        self.rating = crate::rating::apply(self.rating, delta, floor);
        self.last_active_at = SystemTime::now();
    }
}

impl Unique<rps_core::PlayerMarker> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_seeds_rating() {
        let p = Player::register(42, "ash".into(), 1200);
        assert_eq!(p.rating(), 1200);
        assert_eq!(p.external_id(), 42);
    }

    #[test]
    fn rating_delta_floors() {
        let mut p = Player::register(1, "a".into(), 105);
        p.apply_rating_delta(-20, 100);
        assert_eq!(p.rating(), 100);
    }
}
