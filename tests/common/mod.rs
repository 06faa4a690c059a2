#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tempfile::TempDir;
use yatube::{
    db_helpers::{get_user_by_username, insert_post, PostFields},
    get_random_free_port, init_db, make_router,
    models::Post,
    page_cache::{InMemoryPageCache, ManualClock, PageCacheState},
    run_app, Config, Services, UserResponse, UserWrapper,
};

pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\
\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\
\x00\x00\x00\x2C\x00\x00\x00\x00\
\x02\x00\x01\x00\x00\x02\x02\x0C\
\x0A\x00\x3B";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub page_cache: PageCacheState,
    pub clock: Arc<ManualClock>,
    pub client: Client,
    pub media_root: std::path::PathBuf,
    _dir: TempDir,
}

pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_url = format!("sqlite://{}", dir.path().join("yatube.db").display());
        let pool = init_db(&db_url).await.expect("database");

        let mut config = Config::new(db_url, "test-secret");
        config.media_root = dir.path().join("media");
        let media_root = config.media_root.clone();

        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(InMemoryPageCache::with_clock(
            clock.clone(),
            config.index_cache_capacity,
        ));
        let services = Services::new(pool.clone(), config, cache);
        let page_cache = services.page_cache.clone();

        let (_, addr) = get_random_free_port();
        tokio::spawn(run_app(make_router(services), addr));

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("client");
        let address = format!("http://{addr}");
        for _ in 0..100 {
            if client
                .get(format!("{address}/check_health"))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            pool,
            page_cache,
            clock,
            client,
            media_root,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header("Authorization", format!("Token {token}")),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        Self::with_token(self.client.get(self.url(path)), token)
            .send()
            .await
            .expect("request")
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> T {
        let response = self.get(path, token).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.json().await.expect("json body")
    }

    pub async fn post_form(
        &self,
        path: &str,
        token: Option<&str>,
        form: multipart::Form,
    ) -> Response {
        Self::with_token(self.client.post(self.url(path)), token)
            .multipart(form)
            .send()
            .await
            .expect("request")
    }

    pub async fn post_comment(&self, post_id: i64, token: Option<&str>, text: &str) -> Response {
        Self::with_token(self.client.post(self.url(&format!("/posts/{post_id}/"))), token)
            .form(&[("text", text)])
            .send()
            .await
            .expect("request")
    }

    pub async fn signup(&self, username: &str) -> TestUser {
        let response = self
            .client
            .post(self.url("/auth/signup/"))
            .json(&serde_json::json!({
                "user": {
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct horse",
                }
            }))
            .send()
            .await
            .expect("signup");
        assert_eq!(response.status(), StatusCode::OK);
        let UserWrapper { user } = response
            .json::<UserWrapper<UserResponse>>()
            .await
            .expect("user body");
        let id = get_user_by_username(&self.pool, username)
            .await
            .expect("lookup")
            .expect("user exists")
            .id;
        TestUser {
            id,
            username: user.username,
            token: user.token,
        }
    }

    pub async fn seed_post(&self, author: &TestUser, text: &str, group_id: Option<i64>) -> Post {
        insert_post(
            &self.pool,
            author.id,
            PostFields {
                text: text.to_string(),
                group_id,
                image: None,
            },
        )
        .await
        .expect("seed post")
    }

    /// Inserts a post with a chosen `pub_date`, so ids and dates can disagree.
    pub async fn seed_post_at(
        &self,
        author: &TestUser,
        text: &str,
        group_id: Option<i64>,
        pub_date: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (text, pub_date, author_id, group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(text)
        .bind(pub_date)
        .bind(author.id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .expect("seed dated post")
    }

    pub async fn post_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .expect("count")
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub fn post_form(text: &str, group: Option<&str>) -> multipart::Form {
    let form = multipart::Form::new().text("text", text.to_string());
    match group {
        Some(group) => form.text("group", group.to_string()),
        None => form,
    }
}
