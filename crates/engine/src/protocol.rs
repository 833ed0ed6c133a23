use crate::error::MatchError;
use rps_domain::Move;

/// Parses a client-provided move string into a [`Move`]. Case-insensitive on
/// input (`rock`, `ROCK`, `Rock` all parse). Centralizes the boundary
/// between wire text and the internal domain type.
pub fn decode_move(s: &str) -> Result<Move, MatchError> {
    Move::try_from(s).map_err(MatchError::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_moves_case_insensitively() {
        assert_eq!(decode_move("rock").unwrap(), Move::Rock);
        assert_eq!(decode_move("PAPER").unwrap(), Move::Paper);
        assert_eq!(decode_move("ScIsSoRs").unwrap(), Move::Scissors);
    }

    #[test]
    fn rejects_unknown_moves() {
        assert!(matches!(
            decode_move("lizard"),
            Err(MatchError::InvalidArgument(_))
        ));
    }
}
