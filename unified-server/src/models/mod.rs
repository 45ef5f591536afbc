//! Domain models
//!
//! Request inputs (`LeaderboardParams`, `UserPatch`, `TimeControl`) are
//! validated before use and report a `ValidationError`, never a panic.
//! Profiles, game records and leaderboard rows come from the database as-is.

pub mod game;
pub mod leaderboard;
pub mod time_control;
pub mod user;
pub mod validation;

pub use game::{GameRecord, GameResult, GAMES_LIST_LIMIT, PROFILE_HISTORY_LIMIT};
pub use leaderboard::{LeaderboardEntry, LeaderboardLimit, LeaderboardParams};
pub use time_control::TimeControl;
pub use user::{ProfileWithHistory, Ratings, UserPatch, UserProfile, UserStats};
pub use validation::ValidationError;
