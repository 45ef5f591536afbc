//! User repository
//!
//! - leaderboard: RANK() window over the category's rating column
//! - find: optional LATERAL join for win/loss/draw aggregates
//! - update: row lock + COALESCE update in one transaction

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::UserRepository;
use crate::db::{Database, DbError, SqlValue};
use crate::models::{LeaderboardEntry, Ratings, TimeControl, UserPatch, UserProfile, UserStats};

const PROFILE_COLUMNS: &str = "u.user_id, u.username, u.display_name, u.avatar_url, u.bio, \
     u.country, u.bullet_rating, u.blitz_rating, u.rapid_rating, u.puzzle_rating, u.created_at";

/// PostgreSQL-backed [`UserRepository`]
#[derive(Clone)]
pub struct PgUserRepository {
    db: Database,
}

impl PgUserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn leaderboard_sql(time_control: TimeControl) -> String {
    let col = time_control.rating_column();
    format!(
        r#"
        SELECT
            RANK() OVER (ORDER BY u.{col} DESC) AS rank,
            u.user_id,
            u.username,
            u.display_name,
            u.avatar_url,
            u.country,
            u.{col} AS rating,
            COUNT(g.id) AS games_played
        FROM users u
        LEFT JOIN game_history g ON g.user_id = u.user_id
        GROUP BY u.user_id
        ORDER BY u.{col} DESC, u.username ASC
        LIMIT $1
        "#
    )
}

fn row_to_entry(row: &PgRow) -> Result<LeaderboardEntry, DbError> {
    Ok(LeaderboardEntry {
        rank: row.try_get("rank")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        avatar_url: row.try_get("avatar_url")?,
        country: row.try_get("country")?,
        rating: row.try_get("rating")?,
        games_played: row.try_get("games_played")?,
    })
}

fn row_to_profile(row: &PgRow, include_extras: bool) -> Result<UserProfile, DbError> {
    let stats = if include_extras {
        Some(UserStats {
            games_played: row.try_get("games_played")?,
            wins: row.try_get("wins")?,
            losses: row.try_get("losses")?,
            draws: row.try_get("draws")?,
        })
    } else {
        None
    };

    Ok(UserProfile {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        avatar_url: row.try_get("avatar_url")?,
        bio: row.try_get("bio")?,
        country: row.try_get("country")?,
        ratings: Ratings {
            bullet: row.try_get("bullet_rating")?,
            blitz: row.try_get("blitz_rating")?,
            rapid: row.try_get("rapid_rating")?,
            puzzles: row.try_get("puzzle_rating")?,
        },
        created_at: row.try_get("created_at")?,
        stats,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_leaderboard(
        &self,
        time_control: TimeControl,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        let rows = self
            .db
            .query(&leaderboard_sql(time_control), &[SqlValue::from(limit)])
            .await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        include_extras: bool,
    ) -> Result<Option<UserProfile>, DbError> {
        let sql = if include_extras {
            format!(
                r#"
                SELECT {PROFILE_COLUMNS}, s.games_played, s.wins, s.losses, s.draws
                FROM users u
                LEFT JOIN LATERAL (
                    SELECT
                        COUNT(*) AS games_played,
                        COUNT(*) FILTER (WHERE g.result = 'win') AS wins,
                        COUNT(*) FILTER (WHERE g.result = 'loss') AS losses,
                        COUNT(*) FILTER (WHERE g.result = 'draw') AS draws
                    FROM game_history g
                    WHERE g.user_id = u.user_id
                ) s ON TRUE
                WHERE u.user_id = $1
                "#
            )
        } else {
            format!("SELECT {PROFILE_COLUMNS} FROM users u WHERE u.user_id = $1")
        };

        let rows = self.db.query(&sql, &[user_id.into()]).await?;
        rows.first()
            .map(|row| row_to_profile(row, include_extras))
            .transpose()
    }

    async fn update(
        &self,
        user_id: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserProfile>, DbError> {
        let params = vec![
            SqlValue::from(user_id),
            SqlValue::from(patch.display_name.clone()),
            SqlValue::from(patch.avatar_url.clone()),
            SqlValue::from(patch.bio.clone()),
            SqlValue::from(patch.country.clone()),
        ];

        self.db
            .transaction(|client| async move {
                let locked = client
                    .query(
                        "SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE",
                        &params[..1],
                    )
                    .await?;
                if locked.is_empty() {
                    return Ok(None);
                }

                let sql = format!(
                    r#"
                    UPDATE users u SET
                        display_name = COALESCE($2, u.display_name),
                        avatar_url = COALESCE($3, u.avatar_url),
                        bio = COALESCE($4, u.bio),
                        country = COALESCE($5, u.country),
                        updated_at = NOW()
                    WHERE u.user_id = $1
                    RETURNING {PROFILE_COLUMNS}
                    "#
                );
                let rows = client.query(&sql, &params).await?;
                rows.first().map(|row| row_to_profile(row, false)).transpose()
            })
            .await
    }
}
