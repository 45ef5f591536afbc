//! Leaderboard types

use serde::{Deserialize, Serialize};

use super::{TimeControl, ValidationError};

/// Default number of leaderboard rows
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Maximum number of leaderboard rows per request
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Number of rows to return, clamped to 1..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardLimit(u32);

impl LeaderboardLimit {
    pub fn new(limit: u32) -> Self {
        Self(limit.clamp(1, MAX_LEADERBOARD_LIMIT))
    }

    /// Parse the optional `limit` query value.
    ///
    /// Missing or blank means the default; anything that is not a
    /// non-negative integer is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(s) => s.parse::<u32>().map(Self::new).map_err(|_| {
                ValidationError::InvalidFormat {
                    field: "limit",
                    reason: "must be a non-negative integer",
                }
            }),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for LeaderboardLimit {
    fn default() -> Self {
        Self(DEFAULT_LEADERBOARD_LIMIT)
    }
}

/// Query parameters for `GET /leaderboard`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    pub limit: Option<String>,
    pub time_control: Option<String>,
}

impl LeaderboardParams {
    /// Validate both parameters; the category is checked first.
    pub fn validate(&self) -> Result<(TimeControl, LeaderboardLimit), ValidationError> {
        let time_control = match self.time_control.as_deref() {
            None => TimeControl::default(),
            Some(s) => s.parse()?,
        };
        let limit = LeaderboardLimit::parse(self.limit.as_deref())?;
        Ok((time_control, limit))
    }
}

/// One ranked row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub rating: i32,
    pub games_played: i64,
}
