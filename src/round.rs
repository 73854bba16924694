use std::fmt;

/// The heading a round is shown under.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundName {
    Final,
    Semifinals,
    Quarterfinals,
    Round(u32),
}

impl RoundName {
    #[must_use]
    pub fn new(round: u32, rounds: u32) -> Self {
        match rounds.checked_sub(round) {
            Some(0) => Self::Final,
            Some(1) => Self::Semifinals,
            Some(2) => Self::Quarterfinals,
            _ => Self::Round(round),
        }
    }
}

impl fmt::Display for RoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final => write!(f, "Final"),
            Self::Semifinals => write!(f, "Semifinals"),
            Self::Quarterfinals => write!(f, "Quarterfinals"),
            Self::Round(round) => write!(f, "Round {round}"),
        }
    }
}
