//! Game history records

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// History entries embedded in `GET /users/{userId}`
pub const PROFILE_HISTORY_LIMIT: u32 = 50;

/// History entries returned by `GET /users/{userId}/games`
pub const GAMES_LIST_LIMIT: u32 = 100;

/// Outcome from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl FromStr for GameResult {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "draw" => Ok(Self::Draw),
            other => Err(ValidationError::InvalidVariant {
                field: "result",
                value: other.to_owned(),
            }),
        }
    }
}

/// One finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: Uuid,
    pub opponent_id: Option<String>,
    pub opponent_name: Option<String>,
    /// Free-form; games may use categories outside the leaderboard set
    pub time_control: String,
    pub result: GameResult,
    pub rating_before: Option<i32>,
    pub rating_after: Option<i32>,
    pub played_at: DateTime<Utc>,
}
