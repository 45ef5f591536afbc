//! In-memory collaborators for router tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use super::server::{build_router, AppState, ServerConfig};
use crate::auth::{AuthError, TokenVerifier};
use crate::cache::{CacheConfig, CacheError, CacheHandle};
use crate::db::{Database, DbConfig, DbError, GameHistoryRepository, UserRepository};
use crate::models::{
    GameRecord, GameResult, LeaderboardEntry, Ratings, TimeControl, UserPatch, UserProfile,
};

pub const ALICE_TOKEN: &str = "tok-alice";
pub const BOB_TOKEN: &str = "tok-bob";

pub fn profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_owned(),
        username: format!("{user_id}_name"),
        display_name: None,
        avatar_url: None,
        bio: None,
        country: None,
        ratings: Ratings {
            bullet: 1200,
            blitz: 1500,
            rapid: 1600,
            puzzles: 1800,
        },
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        stats: None,
    }
}

pub fn games(count: usize) -> Vec<GameRecord> {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| GameRecord {
            id: Uuid::new_v4(),
            opponent_id: Some("bob".into()),
            opponent_name: Some("bob_name".into()),
            time_control: "blitz".into(),
            result: GameResult::Win,
            rating_before: Some(1500),
            rating_after: Some(1508),
            played_at: start - Duration::minutes(i as i64),
        })
        .collect()
}

/// Users keyed by id; counts calls so tests can assert what was touched.
#[derive(Default)]
pub struct FakeUsers {
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    pub leaderboard_calls: Mutex<Vec<(TimeControl, u32)>>,
    pub updates: AtomicUsize,
    pub fail: bool,
}

impl FakeUsers {
    pub fn with(ids: &[&str]) -> Self {
        let profiles = ids.iter().map(|id| (id.to_string(), profile(id))).collect();
        Self {
            profiles: Mutex::new(profiles),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), DbError> {
        if self.fail {
            Err(DbError::Query(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn get_leaderboard(
        &self,
        time_control: TimeControl,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        self.leaderboard_calls.lock().unwrap().push((time_control, limit));
        self.check()?;
        Ok(vec![LeaderboardEntry {
            rank: 1,
            user_id: "alice".into(),
            username: "alice_name".into(),
            display_name: None,
            avatar_url: None,
            country: Some("NO".into()),
            rating: 2850,
            games_played: 42,
        }])
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        _include_extras: bool,
    ) -> Result<Option<UserProfile>, DbError> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }

    async fn update(
        &self,
        user_id: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserProfile>, DbError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        Ok(profiles.get_mut(user_id).map(|p| {
            if let Some(bio) = &patch.bio {
                p.bio = Some(bio.clone());
            }
            if let Some(name) = &patch.display_name {
                p.display_name = Some(name.clone());
            }
            p.clone()
        }))
    }
}

/// Returns `count` games for anyone, regardless of the limit asked for.
#[derive(Default)]
pub struct FakeGames {
    pub count: usize,
    pub calls: Mutex<Vec<(String, u32)>>,
    pub fail: bool,
}

impl FakeGames {
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl GameHistoryRepository for FakeGames {
    async fn get_game_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<GameRecord>, DbError> {
        self.calls.lock().unwrap().push((user_id.to_owned(), limit));
        if self.fail {
            return Err(DbError::Query(sqlx::Error::PoolClosed));
        }
        Ok(games(self.count))
    }
}

/// Fixed token table: alice and bob
#[derive(Default)]
pub struct FakeTokens {
    /// Session store down: every lookup errors
    pub fail: bool,
}

#[async_trait]
impl TokenVerifier for FakeTokens {
    async fn verify(&self, token: &str) -> Result<Option<String>, AuthError> {
        if self.fail {
            return Err(CacheError::ConnectTimeout(std::time::Duration::from_secs(2)).into());
        }
        Ok(match token {
            ALICE_TOKEN => Some("alice".into()),
            BOB_TOKEN => Some("bob".into()),
            _ => None,
        })
    }
}

/// Router over the fakes. Neither the pool nor the cache ever connects.
pub fn app(users: Arc<FakeUsers>, games: Arc<FakeGames>) -> Router {
    app_with_tokens(users, games, FakeTokens::default())
}

pub fn app_with_tokens(users: Arc<FakeUsers>, games: Arc<FakeGames>, tokens: FakeTokens) -> Router {
    let db = Database::connect_lazy(&DbConfig::default()).expect("valid default url");
    let cache = CacheHandle::new(&CacheConfig::default()).expect("valid default cache config");
    let state = AppState {
        db,
        cache,
        users,
        games,
        tokens: Arc::new(tokens),
    };
    build_router(state, &ServerConfig::default())
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn put_json(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
