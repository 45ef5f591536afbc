//! User profile endpoints
//!
//! All routes require a session. Reading a profile is open to any
//! authenticated user; updating it or listing its games requires the
//! caller to be that user.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::{require_auth, AuthUser};
use crate::http::server::AppState;
use crate::models::{
    GameRecord, ProfileWithHistory, UserPatch, UserProfile, GAMES_LIST_LIMIT,
    PROFILE_HISTORY_LIMIT,
};

fn user_not_found(user_id: String) -> ApiError {
    ApiError::NotFound {
        resource: "user",
        id: user_id,
    }
}

/// Most recent games, capped at `limit` whatever the repository returns.
async fn recent_games(
    state: &AppState,
    user_id: &str,
    limit: u32,
) -> Result<Vec<GameRecord>, ApiError> {
    let mut games = state.games.get_game_history(user_id, limit).await?;
    games.truncate(limit as usize);
    Ok(games)
}

/// GET /users/{user_id} - profile with up to 50 recent games
async fn get_profile(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileWithHistory>, ApiError> {
    let profile = state
        .users
        .find_by_user_id(&user_id, true)
        .await?
        .ok_or_else(|| user_not_found(user_id.clone()))?;

    let game_history = recent_games(&state, &user_id, PROFILE_HISTORY_LIMIT).await?;

    Ok(Json(ProfileWithHistory {
        profile,
        game_history,
    }))
}

/// PUT /users/{user_id} - partial profile update, own profile only
async fn update_profile(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(user_id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    // Identity first: a mismatched caller learns nothing about the body
    caller.ensure_is(&user_id)?;

    let Json(patch) = payload.map_err(|e| ApiError::BadRequest {
        message: e.body_text(),
    })?;
    patch.validate()?;

    let profile = if patch.is_empty() {
        state.users.find_by_user_id(&user_id, false).await?
    } else {
        let updated = state.users.update(&user_id, &patch).await?;
        if updated.is_some() {
            tracing::info!(%user_id, "profile updated");
        }
        updated
    };

    let profile = profile.ok_or_else(|| user_not_found(user_id.clone()))?;
    Ok(Json(profile))
}

/// GET /users/{user_id}/games - up to 100 recent games, own history only
async fn list_games(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<GameRecord>>, ApiError> {
    caller.ensure_is(&user_id)?;
    let games = recent_games(&state, &user_id, GAMES_LIST_LIMIT).await?;
    Ok(Json(games))
}

/// User routes, all behind [`require_auth`]
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{user_id}", get(get_profile).put(update_profile))
        .route("/users/{user_id}/games", get(list_games))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::http::test_support::{
        app, app_with_tokens, get, json_body, put_json, FakeGames, FakeTokens, FakeUsers,
        ALICE_TOKEN, BOB_TOKEN,
    };

    #[tokio::test]
    async fn profile_requires_auth() {
        let response = app(Arc::new(FakeUsers::with(&["alice"])), Arc::new(FakeGames::default()))
            .oneshot(get("/users/alice", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Arc::new(FakeUsers::with(&["alice"])), Arc::new(FakeGames::default()))
            .oneshot(get("/users/alice", Some("stolen")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_embeds_at_most_50_games() {
        let games = Arc::new(FakeGames::with_count(80));
        let response = app(Arc::new(FakeUsers::with(&["alice"])), games.clone())
            .oneshot(get("/users/alice", Some(BOB_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            games.calls.lock().unwrap().as_slice(),
            &[("alice".to_string(), 50)]
        );
        let body = json_body(response).await;
        assert_eq!(body["userId"], "alice");
        assert_eq!(body["gameHistory"].as_array().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn missing_profile_is_404_without_history_lookup() {
        let games = Arc::new(FakeGames::with_count(3));
        let response = app(Arc::new(FakeUsers::with(&["alice"])), games.clone())
            .oneshot(get("/users/ghost", Some(ALICE_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(games.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_failure_is_500() {
        let response = app(Arc::new(FakeUsers::failing()), Arc::new(FakeGames::default()))
            .oneshot(get("/users/alice", Some(ALICE_TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn update_own_profile() {
        let users = Arc::new(FakeUsers::with(&["alice"]));
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, r#"{"bio": "1.e4 best by test"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(users.updates.load(Ordering::SeqCst), 1);
        let body = json_body(response).await;
        assert_eq!(body["bio"], "1.e4 best by test");
    }

    #[tokio::test]
    async fn update_other_profile_is_403_without_write() {
        let users = Arc::new(FakeUsers::with(&["alice", "bob"]));
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", BOB_TOKEN, r#"{"bio": "pwned"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(users.updates.load(Ordering::SeqCst), 0);
        assert!(users.profiles.lock().unwrap()["alice"].bio.is_none());
    }

    #[tokio::test]
    async fn mismatch_wins_over_bad_body() {
        let users = Arc::new(FakeUsers::with(&["alice"]));
        let response = app(users, Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", BOB_TOKEN, "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn update_vanished_user_is_404() {
        // Session still valid, row gone
        let users = Arc::new(FakeUsers::with(&[]));
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, r#"{"bio": "hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_patch_is_400_without_write() {
        let users = Arc::new(FakeUsers::with(&["alice"]));
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, r#"{"blitzRating": 3200}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, r#"{"country": "norway"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(users.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_patch_returns_current_profile() {
        let (logs, _guard) = crate::test_logs::capture();
        let users = Arc::new(FakeUsers::with(&["alice"]));
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(users.updates.load(Ordering::SeqCst), 0);
        assert!(!logs.contains("profile updated"));
    }

    #[tokio::test]
    async fn update_failure_is_500() {
        let users = Arc::new(FakeUsers::failing());
        let response = app(users.clone(), Arc::new(FakeGames::default()))
            .oneshot(put_json("/users/alice", ALICE_TOKEN, r#"{"bio": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(users.updates.load(Ordering::SeqCst), 1);
        let body = json_body(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Server error");
    }

    #[tokio::test]
    async fn games_failure_is_500() {
        let games = Arc::new(FakeGames::failing());
        let response = app(Arc::new(FakeUsers::with(&["alice"])), games.clone())
            .oneshot(get("/users/alice/games", Some(ALICE_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(games.calls.lock().unwrap().len(), 1);
        let body = json_body(response).await;
        assert_eq!(body["error"], "internal_error");
    }

    #[tokio::test]
    async fn session_store_failure_is_500_without_lookup() {
        let users = Arc::new(FakeUsers::with(&["alice"]));
        let games = Arc::new(FakeGames::with_count(3));
        let response = app_with_tokens(users, games.clone(), FakeTokens { fail: true })
            .oneshot(get("/users/alice/games", Some(ALICE_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(games.calls.lock().unwrap().is_empty());
        let body = json_body(response).await;
        assert_eq!(body["error"], "internal_error");
    }

    #[tokio::test]
    async fn games_capped_at_100() {
        let games = Arc::new(FakeGames::with_count(150));
        let response = app(Arc::new(FakeUsers::with(&["alice"])), games.clone())
            .oneshot(get("/users/alice/games", Some(ALICE_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(games.calls.lock().unwrap()[0].1, 100);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn games_of_someone_else_is_403() {
        let games = Arc::new(FakeGames::with_count(5));
        let response = app(Arc::new(FakeUsers::with(&["alice"])), games.clone())
            .oneshot(get("/users/alice/games", Some(BOB_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(games.calls.lock().unwrap().is_empty());
    }
}
