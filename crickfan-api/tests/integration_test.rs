/// End-to-end tests against a real PostgreSQL database
///
/// These tests are ignored by default. Run with:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/crickfan_test cargo test -- --ignored
/// ```
mod common;

use axum::http::StatusCode;
use common::{create_user, test_config, valid_team, TestContext, TEST_PASSWORD};
use crickfan_shared::{
    auth::token::generate_reset_token,
    models::{password_reset::PasswordResetToken, user::UserRole},
    provider::types::MatchPoints,
};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore]
async fn test_register_login_logout_lifecycle() {
    let ctx = TestContext::new().await.expect("context");
    let email = format!("new-fan-{}@example.com", Uuid::new_v4());

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": TEST_PASSWORD,
                "full_name": "Rohit Fan",
                "date_of_birth": "1992-04-30",
                "state": "Maharashtra",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["access_token"].is_string());
    assert!(body["user"].get("password_hash").is_none());
    let new_user_id = body["user"]["id"].as_str().expect("id").to_string();

    // Same address, different case
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "email": email.to_uppercase(),
                "password": TEST_PASSWORD,
                "full_name": "Rohit Fan",
                "date_of_birth": "1992-04-30",
                "state": "Maharashtra",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": "Wrong-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = login["access_token"].as_str().expect("access token");
    let refresh = login["refresh_token"].as_str().expect("refresh token");

    let (status, me) = ctx.send("GET", "/v1/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.to_lowercase());

    let (status, refreshed) = ctx
        .send(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["access_token"].is_string());

    let (status, _) = ctx.send("POST", "/v1/auth/logout", Some(access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send("GET", "/v1/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM users WHERE id = $1::uuid")
        .bind(new_user_id)
        .execute(&ctx.db)
        .await
        .expect("delete registered user");
    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_contest_entry_and_settlement() {
    let ctx = TestContext::new().await.expect("context");

    // Regular users cannot sync or create contests
    let (status, _) = ctx
        .send("POST", "/v1/matches/sync", Some(&ctx.user.access_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let contest_id = ctx.create_contest(Some(10)).await;

    let (status, detail) = ctx
        .send("GET", &format!("/v1/matches/{}", ctx.match_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["match"]["id"], ctx.match_id);

    let (status, user_team) = ctx
        .send(
            "POST",
            "/v1/teams",
            Some(&ctx.user.access_token),
            Some(valid_team(contest_id, "i2", "i8")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", user_team);
    assert_eq!(user_team["players"].as_array().map(Vec::len), Some(11));

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/teams",
            Some(&ctx.user.access_token),
            Some(valid_team(contest_id, "i3", "i8")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, admin_team) = ctx
        .send(
            "POST",
            "/v1/teams",
            Some(&ctx.admin.access_token),
            Some(valid_team(contest_id, "a2", "i2")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", admin_team);

    let (status, contest) = ctx
        .send("GET", &format!("/v1/contests/{}", contest_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contest["team_count"], 2);

    let (status, teams) = ctx
        .send(
            "GET",
            &format!("/v1/teams?contest_id={}", contest_id),
            Some(&ctx.user.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teams.as_array().map(Vec::len), Some(1));

    // Another user's team stays private
    let admin_team_uri = format!("/v1/teams/{}", admin_team["id"].as_str().expect("id"));
    let (status, _) = ctx
        .send("GET", &admin_team_uri, Some(&ctx.user.access_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, board) = ctx
        .send(
            "GET",
            &format!("/v1/contests/{}/leaderboard", contest_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["entries"], json!([]));

    let settle_uri = format!("/v1/matches/{}/settle", ctx.match_id);
    let (status, _) = ctx
        .send("POST", &settle_uri, Some(&ctx.admin.access_token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let points: MatchPoints = serde_json::from_value(json!({
        "innings": [
            {
                "inning": "India Inning 1",
                "batting": [
                    { "id": "i2", "name": "India 2", "points": 50 },
                    { "id": "i3", "name": "India 3", "points": 0 }
                ],
                "bowling": [],
                "catching": []
            },
            {
                "inning": "Australia Inning 1",
                "batting": [
                    { "id": "a2", "name": "Australia 2", "points": 30 }
                ],
                "bowling": [
                    { "id": "i8", "name": "India 8", "points": 40 }
                ],
                "catching": []
            }
        ]
    }))
    .expect("points fixture");
    ctx.provider.set_points(points);

    let (status, summary) = ctx
        .send("POST", &settle_uri, Some(&ctx.admin.access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", summary);
    assert_eq!(summary["teams_updated"], 2);
    assert_eq!(summary["contests_ranked"], 1);

    let (status, board) = ctx
        .send(
            "GET",
            &format!("/v1/contests/{}/leaderboard", contest_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // User: 2 x 50 + 1.5 x 40 + 30; admin: 2 x 30 + 1.5 x 50 + 40
    let entries = board["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["team_id"], user_team["id"]);
    assert_eq!(entries[0]["points"].as_f64(), Some(190.0));
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["points"].as_f64(), Some(175.0));

    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_team_rejected_for_player_outside_squad() {
    let ctx = TestContext::new().await.expect("context");
    let contest_id = ctx.create_contest(None).await;

    let mut team = valid_team(contest_id, "i2", "i8");
    team["players"][4]["player_id"] = json!("x99");

    let (status, body) = ctx
        .send("POST", "/v1/teams", Some(&ctx.user.access_token), Some(team))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("x99"));

    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_closed_contest_and_invalid_transition() {
    let ctx = TestContext::new().await.expect("context");
    let contest_id = ctx.create_contest(None).await;
    let status_uri = format!("/v1/contests/{}/status", contest_id);

    let (status, _) = ctx
        .send(
            "POST",
            &status_uri,
            Some(&ctx.user.access_token),
            Some(json!({ "status": "live" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, contest) = ctx
        .send(
            "POST",
            &status_uri,
            Some(&ctx.admin.access_token),
            Some(json!({ "status": "live" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contest["status"], "live");

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/teams",
            Some(&ctx.user.access_token),
            Some(valid_team(contest_id, "i2", "i8")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(
            "POST",
            &status_uri,
            Some(&ctx.admin.access_token),
            Some(json!({ "status": "upcoming" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_password_reset_revokes_sessions() {
    let ctx = TestContext::new().await.expect("context");

    // Unknown addresses get the same answer as known ones
    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/password-reset/request",
            None,
            Some(json!({ "email": "nobody-here@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (token, token_hash) = generate_reset_token();
    PasswordResetToken::create(&ctx.db, ctx.user.user.id, &token_hash)
        .await
        .expect("reset token");

    let new_password = "Reverse-sweep7";
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/password-reset/confirm",
            None,
            Some(json!({ "token": token, "new_password": new_password })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["sessions_revoked"], 1);

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/password-reset/confirm",
            None,
            Some(json!({ "token": token, "new_password": "Another-pass8" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send("GET", "/v1/auth/me", Some(&ctx.user.access_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": ctx.user.user.email, "password": new_password })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_oversized_fields_are_validation_errors() {
    let ctx = TestContext::new().await.expect("context");
    let long_city = "B".repeat(80);

    let (status, body) = ctx
        .send(
            "PATCH",
            "/v1/auth/me",
            Some(&ctx.user.access_token),
            Some(json!({ "city": long_city })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    assert_eq!(body["details"][0]["field"], "city");

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "email": format!("long-city-{}@example.com", Uuid::new_v4()),
                "password": TEST_PASSWORD,
                "full_name": "Long City",
                "date_of_birth": "1992-04-30",
                "state": "Maharashtra",
                "city": long_city,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let contest_id = ctx.create_contest(None).await;
    let mut team = valid_team(contest_id, "i2", "i8");
    team["players"][4]["player_id"] = json!("x".repeat(80));

    let (status, body) = ctx
        .send("POST", "/v1/teams", Some(&ctx.user.access_token), Some(team))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    assert_eq!(body["details"][0]["field"], "players[4].player_id");

    ctx.cleanup().await.expect("cleanup");
}

#[tokio::test]
#[ignore]
async fn test_full_contest_turns_away_entries() {
    let ctx = TestContext::new().await.expect("context");
    let contest_id = ctx.create_contest(Some(2)).await;

    for token in [&ctx.user.access_token, &ctx.admin.access_token] {
        let (status, body) = ctx
            .send("POST", "/v1/teams", Some(token), Some(valid_team(contest_id, "i2", "i8")))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let late = create_user(&ctx.db, &test_config(), UserRole::User)
        .await
        .expect("third user");
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/teams",
            Some(&late.access_token),
            Some(valid_team(contest_id, "i2", "i8")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Contest is full");

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(late.user.id)
        .execute(&ctx.db)
        .await
        .expect("delete third user");
    ctx.cleanup().await.expect("cleanup");
}
