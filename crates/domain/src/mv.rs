/// A player's choice for one round: rock, paper, or scissors.
///
/// Parsing is case-insensitive; display is always lowercase canonical form,
/// matching the wire encoding in the external interface.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// All three moves, used by the move-histogram initializer.
    pub const fn all() -> [Move; 3] {
        [Move::Rock, Move::Paper, Move::Scissors]
    }
}

impl TryFrom<&str> for Move {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "rock" => Ok(Move::Rock),
            "paper" => Ok(Move::Paper),
            "scissors" => Ok(Move::Scissors),
            other => Err(format!("invalid move: {}", other)),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

/// Result of resolving one round: which player won, or a draw.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    P1Win,
    P2Win,
    Draw,
}

impl Outcome {
    /// Swap the perspective: a `P1Win` seen by the other player is a `P2Win`.
    /// `Draw` is self-symmetric.
    pub fn flip(self) -> Self {
        match self {
            Outcome::P1Win => Outcome::P2Win,
            Outcome::P2Win => Outcome::P1Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Outcome::P1Win => write!(f, "p1_win"),
            Outcome::P2Win => write!(f, "p2_win"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Resolves one round: rock beats scissors, scissors beats paper, paper beats
/// rock, equal moves draw. Pure, total, no state.
pub fn resolve(p1: Move, p2: Move) -> Outcome {
    use Move::*;
    match (p1, p2) {
        (a, b) if a == b => Outcome::Draw,
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock) => Outcome::P1Win,
        _ => Outcome::P2Win,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rock_beats_scissors() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::P1Win);
    }

    #[test]
    fn scissors_beats_paper() {
        assert_eq!(resolve(Move::Scissors, Move::Paper), Outcome::P1Win);
    }

    #[test]
    fn paper_beats_rock() {
        assert_eq!(resolve(Move::Paper, Move::Rock), Outcome::P1Win);
    }

    #[test]
    fn equal_moves_draw() {
        for m in Move::all() {
            assert_eq!(resolve(m, m), Outcome::Draw);
        }
    }

    #[test]
    fn symmetry_law() {
        for a in Move::all() {
            for b in Move::all() {
                assert_eq!(resolve(a, b), resolve(b, a).flip());
            }
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Move::try_from("RoCk").unwrap(), Move::Rock);
        assert_eq!(Move::try_from("SCISSORS").unwrap(), Move::Scissors);
        assert!(Move::try_from("lizard").is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for m in Move::all() {
            assert_eq!(Move::try_from(m.to_string().as_str()).unwrap(), m);
        }
    }
}
