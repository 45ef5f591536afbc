//! Repository traits and their PostgreSQL implementations
//!
//! Handlers depend on the traits only, so tests substitute in-memory fakes.
//! The PostgreSQL implementations follow these patterns:
//! - Every statement goes through `Database` (slow-query diagnostics)
//! - Aggregates come from JOINs in the same statement (no N+1)
//! - Multi-step writes run inside `Database::transaction`

pub mod games;
pub mod users;

use async_trait::async_trait;

use super::DbError;
use crate::models::{GameRecord, LeaderboardEntry, TimeControl, UserPatch, UserProfile};

pub use games::PgGameHistoryRepository;
pub use users::PgUserRepository;

/// User profiles and rankings
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Top `limit` users ranked by their rating in `time_control`.
    async fn get_leaderboard(
        &self,
        time_control: TimeControl,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, DbError>;

    /// Profile for `user_id`, with aggregate stats when `include_extras`.
    async fn find_by_user_id(
        &self,
        user_id: &str,
        include_extras: bool,
    ) -> Result<Option<UserProfile>, DbError>;

    /// Apply `patch`; `None` when the user does not exist.
    async fn update(&self, user_id: &str, patch: &UserPatch)
        -> Result<Option<UserProfile>, DbError>;
}

/// Finished games per user
#[async_trait]
pub trait GameHistoryRepository: Send + Sync {
    /// Most recent games first, at most `limit`.
    async fn get_game_history(&self, user_id: &str, limit: u32)
        -> Result<Vec<GameRecord>, DbError>;
}
