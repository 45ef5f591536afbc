//! Game history repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::GameHistoryRepository;
use crate::db::{Database, DbError, SqlValue};
use crate::models::GameRecord;

/// PostgreSQL-backed [`GameHistoryRepository`]
#[derive(Clone)]
pub struct PgGameHistoryRepository {
    db: Database,
}

impl PgGameHistoryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn row_to_game(row: &PgRow) -> Result<GameRecord, DbError> {
    let result: String = row.try_get("result")?;
    Ok(GameRecord {
        id: row.try_get("id")?,
        opponent_id: row.try_get("opponent_id")?,
        opponent_name: row.try_get("opponent_name")?,
        time_control: row.try_get("time_control")?,
        result: result
            .parse()
            .map_err(|e: crate::models::ValidationError| DbError::Decode(e.to_string()))?,
        rating_before: row.try_get("rating_before")?,
        rating_after: row.try_get("rating_after")?,
        played_at: row.try_get("played_at")?,
    })
}

#[async_trait]
impl GameHistoryRepository for PgGameHistoryRepository {
    async fn get_game_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<GameRecord>, DbError> {
        // Opponent name via JOIN rather than per-row lookups
        let rows = self
            .db
            .query(
                r#"
                SELECT
                    g.id,
                    g.opponent_id,
                    o.username AS opponent_name,
                    g.time_control,
                    g.result,
                    g.rating_before,
                    g.rating_after,
                    g.played_at
                FROM game_history g
                LEFT JOIN users o ON o.user_id = g.opponent_id
                WHERE g.user_id = $1
                ORDER BY g.played_at DESC
                LIMIT $2
                "#,
                &[SqlValue::from(user_id), SqlValue::from(limit)],
            )
            .await?;

        rows.iter().map(row_to_game).collect()
    }
}
