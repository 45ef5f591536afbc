//! Time control categories used to partition the leaderboard

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Game-pacing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeControl {
    Bullet,
    #[default]
    Blitz,
    Rapid,
    Puzzles,
}

impl TimeControl {
    pub const ALL: [TimeControl; 4] = [Self::Bullet, Self::Blitz, Self::Rapid, Self::Puzzles];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Puzzles => "puzzles",
        }
    }

    /// Column holding the rating for this category.
    ///
    /// Only ever one of these fixed identifiers, so it is safe to splice
    /// into SQL text.
    pub fn rating_column(&self) -> &'static str {
        match self {
            Self::Bullet => "bullet_rating",
            Self::Blitz => "blitz_rating",
            Self::Rapid => "rapid_rating",
            Self::Puzzles => "puzzle_rating",
        }
    }
}

impl FromStr for TimeControl {
    type Err = ValidationError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bullet" => Ok(Self::Bullet),
            "blitz" => Ok(Self::Blitz),
            "rapid" => Ok(Self::Rapid),
            "puzzles" => Ok(Self::Puzzles),
            other => Err(ValidationError::InvalidVariant {
                field: "timeControl",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
