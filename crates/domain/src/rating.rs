use crate::mv::Outcome;

/// Logistic scale constant (standard Elo convention): a 400-point rating gap
/// corresponds to a 10x difference in expected score.
const SCALE: f64 = 400.0;

/// Given two ratings and a round outcome, returns signed rating deltas
/// `(d1, d2)`. Zero-sum on decisive outcomes (`d1 + d2 == 0`), both zero on
/// draws. `k` is the configured K-factor; `floor` is the configured rating
/// minimum — the caller applies `(rating + delta).max(floor)`, this function
/// only computes the raw delta.
///
/// Pure, total, no state.
pub fn deltas(rating1: i32, rating2: i32, outcome: Outcome, k: f64) -> (i32, i32) {
    if let Outcome::Draw = outcome {
        return (0, 0);
    }
    let expected1 = expected_score(rating1, rating2);
    let actual1 = match outcome {
        Outcome::P1Win => 1.0,
        Outcome::P2Win => 0.0,
        Outcome::Draw => unreachable!("handled above"),
    };
    let delta1 = (k * (actual1 - expected1)).round() as i32;
    (delta1, -delta1)
}

/// Applies a computed delta to a rating, floored at the configured minimum.
pub fn apply(rating: i32, delta: i32, floor: i32) -> i32 {
    (rating + delta).max(floor)
}

fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    let exponent = (rating_b - rating_a) as f64 / SCALE;
    1.0 / (1.0 + 10f64.powf(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_produce_no_deltas() {
        assert_eq!(deltas(1200, 1400, Outcome::Draw, 24.0), (0, 0));
    }

    #[test]
    fn decisive_outcomes_are_zero_sum() {
        for outcome in [Outcome::P1Win, Outcome::P2Win] {
            let (d1, d2) = deltas(1200, 1300, outcome, 24.0);
            assert_eq!(d1 + d2, 0);
        }
    }

    #[test]
    fn underdog_win_gains_more_than_favorite_win() {
        let (underdog_gain, _) = deltas(1000, 1400, Outcome::P1Win, 24.0);
        let (favorite_gain, _) = deltas(1400, 1000, Outcome::P1Win, 24.0);
        assert!(underdog_gain > favorite_gain);
    }

    #[test]
    fn equal_ratings_split_k_evenly() {
        let (d1, d2) = deltas(1200, 1200, Outcome::P1Win, 24.0);
        assert_eq!(d1, 12);
        assert_eq!(d2, -12);
    }

    #[test]
    fn apply_floors_at_minimum() {
        assert_eq!(apply(105, -20, 100), 100);
        assert_eq!(apply(150, -20, 100), 130);
    }
}
