//! User profile and partial update

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{GameRecord, ValidationError};

const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_BIO_LEN: usize = 500;
const MAX_AVATAR_URL_LEN: usize = 2048;

/// ISO 3166-1 alpha-2, upper case
static COUNTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("invalid country regex"));

/// Per-category ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub bullet: i32,
    pub blitz: i32,
    pub rapid: i32,
    pub puzzles: i32,
}

/// Aggregate results, loaded only when extras are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub games_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

/// User profile as returned by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub ratings: Ratings,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

/// Profile with its most recent games embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWithHistory {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub game_history: Vec<GameRecord>,
}

/// Partial profile update (`PUT /users/{userId}` body)
///
/// Absent fields are left unchanged. Unknown fields are rejected so a
/// client cannot reach columns such as ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl UserPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
            && self.country.is_none()
    }

    /// Check field lengths and formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(ValidationError::Empty { field: "displayName" });
            }
            if name.chars().count() > MAX_DISPLAY_NAME_LEN {
                return Err(ValidationError::TooLong {
                    field: "displayName",
                    max: MAX_DISPLAY_NAME_LEN,
                });
            }
        }

        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                return Err(ValidationError::TooLong {
                    field: "bio",
                    max: MAX_BIO_LEN,
                });
            }
        }

        if let Some(url) = &self.avatar_url {
            if url.len() > MAX_AVATAR_URL_LEN {
                return Err(ValidationError::TooLong {
                    field: "avatarUrl",
                    max: MAX_AVATAR_URL_LEN,
                });
            }
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ValidationError::InvalidFormat {
                    field: "avatarUrl",
                    reason: "must be an http(s) URL",
                });
            }
        }

        if let Some(country) = &self.country {
            if !COUNTRY_RE.is_match(country) {
                return Err(ValidationError::InvalidFormat {
                    field: "country",
                    reason: "must be a two-letter upper-case country code",
                });
            }
        }

        Ok(())
    }
}
