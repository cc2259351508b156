use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Seat codes around a six-handed table.
///
/// Declaration order is the clockwise seat order starting from the hero's
/// slot at the bottom of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Btn,
    Sb,
    Bb,
    Utg,
    Hj,
    Co,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::Btn,
        Position::Sb,
        Position::Bb,
        Position::Utg,
        Position::Hj,
        Position::Co,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Position::Btn => "BTN",
            Position::Sb => "SB",
            Position::Bb => "BB",
            Position::Utg => "UTG",
            Position::Hj => "HJ",
            Position::Co => "CO",
        }
    }

    /// Clockwise seat slot, 0 being the bottom of the table.
    #[must_use]
    pub fn seat_index(self) -> usize {
        match self {
            Position::Btn => 0,
            Position::Sb => 1,
            Position::Bb => 2,
            Position::Utg => 3,
            Position::Hj => 4,
            Position::Co => 5,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPosition(pub String);

impl fmt::Display for UnknownPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown seat label: {}", self.0)
    }
}

impl std::error::Error for UnknownPosition {}

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Position::ALL
            .into_iter()
            .find(|p| p.label() == upper)
            .ok_or_else(|| UnknownPosition(s.to_owned()))
    }
}

static POSITION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)in\s+([A-Za-z0-9_]+)").expect("position pattern is valid")
});

/// Pulls the hero's seat out of a prompt such as "You have A♠ K♠ in BTN, best move?".
///
/// Only the first "in <token>" match is considered. Returns `None` when the
/// pattern is missing or the token is not a seat label.
#[must_use]
pub fn parse_position(prompt: &str) -> Option<Position> {
    let token = POSITION_TOKEN.captures(prompt)?.get(1)?.as_str();
    token.parse().ok()
}

/// Like [`parse_position`], defaulting to `Position::Btn`.
#[must_use]
pub fn extract_position(prompt: &str) -> Position {
    parse_position(prompt).unwrap_or_else(|| {
        tracing::debug!(prompt, "no hero seat in prompt; using BTN");
        Position::Btn
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_every_recognised_seat() {
        for position in Position::ALL {
            let prompt = format!("You hold Q♥ Q♦ in {}, facing a raise.", position.label());
            assert_eq!(extract_position(&prompt), position);
        }
    }

    #[test]
    fn token_is_case_insensitive() {
        assert_eq!(extract_position("Pocket nines IN utg"), Position::Utg);
        assert_eq!(extract_position("Suited connectors in co"), Position::Co);
    }

    #[test]
    fn unknown_token_defaults_to_button() {
        assert_eq!(extract_position("You are in MP with AJo"), Position::Btn);
        assert_eq!(extract_position("in position with top pair"), Position::Btn);
    }

    #[test]
    fn missing_pattern_defaults_to_button() {
        assert_eq!(extract_position("What is the best play here?"), Position::Btn);
        assert_eq!(extract_position(""), Position::Btn);
    }

    #[test]
    fn only_first_match_counts() {
        assert_eq!(extract_position("Open in HJ, then defend in BB"), Position::Hj);
        // "in" at the end of another word still anchors the first match.
        assert_eq!(extract_position("Begin with AK in SB"), Position::Btn);
    }

    #[test]
    fn parse_position_reports_the_fallback_case() {
        assert_eq!(parse_position("Limp in CO?"), Some(Position::Co));
        assert_eq!(parse_position("Limp in MP?"), None);
        assert_eq!(parse_position("Limp?"), None);
    }

    #[test]
    fn seat_indices_follow_clockwise_order() {
        let indices: Vec<_> = Position::ALL.iter().map(|p| p.seat_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn parses_labels_ignoring_case() {
        assert_eq!("bb".parse::<Position>().unwrap(), Position::Bb);
        assert!("MP".parse::<Position>().is_err());
    }
}
