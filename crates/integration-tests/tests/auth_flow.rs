//! End-to-end tests for the email-code sign-in flow.
//!
//! SMTP is unconfigured, so issued codes are read back from the database.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

use velvet_fig_integration_tests::TestContext;

async fn register(ctx: &TestContext, email: &str) -> reqwest::Response {
    ctx.client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({
            "email": email,
            "first_name": "June",
            "last_name": "Ferreira",
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn happy_path_code_exchange_and_logout() {
    let ctx = TestContext::spawn().await;

    let resp = register(&ctx, "june@example.com").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "june@example.com");
    assert_eq!(body["role"], "user");
    assert_eq!(body["email_verified"], false);

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/request-otp"))
        .json(&json!({"email": "june@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let code = ctx.latest_code("june@example.com").await;
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/verify-otp"))
        .json(&json!({"email": "june@example.com", "code": code}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_owned();
    assert!(!token.is_empty());
    assert_eq!(body["user"]["email"], "june@example.com");

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn code_is_single_use() {
    let ctx = TestContext::spawn().await;
    register(&ctx, "once@example.com").await;

    ctx.client
        .post(ctx.url("/api/auth/request-otp"))
        .json(&json!({"email": "once@example.com"}))
        .send()
        .await
        .unwrap();

    let code = ctx.latest_code("once@example.com").await;
    let verify = |code: String| {
        ctx.client
            .post(ctx.url("/api/auth/verify-otp"))
            .json(&json!({"email": "once@example.com", "code": code}))
            .send()
    };

    let first = verify(code.clone()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // The redeemed code is excluded from the lookup, so the retry reads as
    // "no code found"
    let second = verify(code).await.unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "verification failed");
}

#[tokio::test]
async fn wrong_code_increments_attempts_then_correct_code_works() {
    let ctx = TestContext::spawn().await;
    register(&ctx, "retry@example.com").await;

    ctx.client
        .post(ctx.url("/api/auth/request-otp"))
        .json(&json!({"email": "retry@example.com"}))
        .send()
        .await
        .unwrap();

    let code = ctx.latest_code("retry@example.com").await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/verify-otp"))
        .json(&json!({"email": "retry@example.com", "code": wrong}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.latest_code_attempts("retry@example.com").await, 1);

    // No lockout: the correct code still verifies after a mismatch
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/verify-otp"))
        .json(&json!({"email": "retry@example.com", "code": code}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_code_is_rejected_even_when_correct() {
    let ctx = TestContext::spawn().await;
    register(&ctx, "late@example.com").await;

    // Plant an already-expired code directly
    sqlx::query(
        "INSERT INTO login_codes (email, code, expires_at, used, attempts, created_at)
         VALUES ('late@example.com', '123456', ?1, 0, 0, ?2)",
    )
    .bind(Utc::now() - Duration::minutes(1))
    .bind(Utc::now())
    .execute(&ctx.pool)
    .await
    .unwrap();

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/verify-otp"))
        .json(&json!({"email": "late@example.com", "code": "123456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn request_otp_does_not_reveal_unknown_emails() {
    let ctx = TestContext::spawn().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/request-otp"))
        .json(&json!({"email": "stranger@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    // No code row was issued
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM login_codes")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn verification_link_is_single_use() {
    let ctx = TestContext::spawn().await;
    register(&ctx, "fresh@example.com").await;

    let token: String =
        sqlx::query_scalar("SELECT token FROM email_verification_tokens WHERE email = ?1")
            .bind("fresh@example.com")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/auth/verify-email?token={token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "fresh@example.com");

    let verified: bool = sqlx::query_scalar("SELECT email_verified FROM users WHERE email = ?1")
        .bind("fresh@example.com")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert!(verified);

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/auth/verify-email?token={token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let ctx = TestContext::spawn().await;

    let first = register(&ctx, "dup@example.com").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = register(&ctx, "dup@example.com").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = second.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}
