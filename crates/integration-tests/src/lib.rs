//! Integration tests for Velvet Fig.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p velvet-fig-integration-tests
//! ```
//!
//! Each test spawns the real router against a throwaway `SQLite` file on an
//! ephemeral port and drives it over HTTP with `reqwest`. SMTP stays
//! unconfigured, so sign-in codes land in the database (and the logs)
//! instead of a mailbox; tests read them back through the pool.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::SecretString;
use sqlx::SqlitePool;
use uuid::Uuid;

use velvet_fig_core::{Email, UserRole};
use velvet_fig_server::config::ServerConfig;
use velvet_fig_server::db::auth_tokens::AuthTokenRepository;
use velvet_fig_server::db::users::UserRepository;
use velvet_fig_server::models::user::NewUser;
use velvet_fig_server::services::auth::generate_token;
use velvet_fig_server::state::AppState;
use velvet_fig_server::{db, routes};

/// A live server instance plus handles for poking at its database.
pub struct TestContext {
    /// Base URL of the spawned server, e.g. `http://127.0.0.1:49301`.
    pub base_url: String,
    /// HTTP client; carries an `X-Forwarded-For` header so the rate
    /// limiter's IP key extractor always has something to work with.
    pub client: reqwest::Client,
    /// Pool into the same database the server uses.
    pub pool: SqlitePool,
    /// Where uploaded images land.
    pub upload_dir: PathBuf,
}

impl TestContext {
    /// Spawn a fresh server on an ephemeral port with a throwaway database.
    ///
    /// # Panics
    ///
    /// Panics if any part of the environment fails to come up; tests want
    /// loud failures here.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn() -> Self {
        let scratch = std::env::temp_dir().join(format!("velvet-fig-test-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch).await.unwrap();

        let database_url = SecretString::from(format!(
            "sqlite://{}",
            scratch.join("shop.db").display()
        ));
        let pool = db::create_pool(&database_url).await.unwrap();
        db::MIGRATOR.run(&pool).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");
        let upload_dir = scratch.join("uploads");

        let config = ServerConfig {
            database_url,
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            upload_dir: upload_dir.clone(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config, pool.clone()).unwrap();
        let app = routes::app(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("127.0.0.1"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap();

        Self {
            base_url,
            client,
            pool,
            upload_dir,
        }
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// The newest sign-in code stored for an email.
    ///
    /// # Panics
    ///
    /// Panics if no code exists.
    #[allow(clippy::unwrap_used)]
    pub async fn latest_code(&self, email: &str) -> String {
        sqlx::query_scalar(
            "SELECT code FROM login_codes WHERE email = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// The stored attempt counter for the newest code of an email.
    ///
    /// # Panics
    ///
    /// Panics if no code exists.
    #[allow(clippy::unwrap_used)]
    pub async fn latest_code_attempts(&self, email: &str) -> i64 {
        sqlx::query_scalar(
            "SELECT attempts FROM login_codes WHERE email = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// Create an account with the given role and mint a live bearer token
    /// for it, bypassing the email challenge.
    ///
    /// # Panics
    ///
    /// Panics on database failure.
    #[allow(clippy::unwrap_used)]
    pub async fn token_for(&self, email: &str, role: UserRole) -> String {
        let user = UserRepository::new(&self.pool)
            .create(&NewUser {
                email: Email::parse(email).unwrap(),
                first_name: "Test".to_owned(),
                last_name: "Account".to_owned(),
                password_hash: None,
                role,
            })
            .await
            .unwrap();

        let token = generate_token();
        AuthTokenRepository::new(&self.pool)
            .create(user.id, &token, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        token
    }

    /// Shortcut for an admin bearer token.
    pub async fn admin_token(&self) -> String {
        self.token_for("admin@velvetfig.shop", UserRole::Admin).await
    }
}
