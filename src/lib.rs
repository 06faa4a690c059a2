mod authentication;
pub mod config;
mod data_formats;
pub mod db_helpers;
pub mod errors;
pub mod forms;
mod handlers;
pub mod media;
pub mod models;
pub mod page_cache;
pub mod pagination;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{middleware, routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
use handlers::*;
use media::MediaStore;
use page_cache::{index_page_cache, PageCache, PageCacheState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{
    net::{SocketAddr, TcpListener},
    str::FromStr,
    sync::Arc,
};
use tower_http::trace::TraceLayer;
pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Everything the handlers get injected through request extensions.
#[derive(Clone)]
pub struct Services {
    pub pool: Arc<SqlitePool>,
    pub config: Arc<Config>,
    pub media: MediaStore,
    pub page_cache: PageCacheState,
}

impl Services {
    pub fn new(pool: SqlitePool, config: Config, page_cache: Arc<dyn PageCache>) -> Self {
        let media = MediaStore::new(config.media_root.clone());
        let page_cache = PageCacheState::new(page_cache, config.index_cache_ttl);
        Self {
            pool: Arc::new(pool),
            config: Arc::new(config),
            media,
            page_cache,
        }
    }
}

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    tracing::info!(%address, "listening");
    axum::Server::try_bind(&address)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("Invalid DATABASE_URL {db_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to open database")?;
    tracing::info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Could not bind a free port");
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router(services: Services) -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/auth/signup/", post(register_user))
        .route("/auth/login/", get(login_page).post(login_user))
        .route(
            "/",
            get(index).layer(middleware::from_fn(index_page_cache)),
        )
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route("/profile/:username/follow/", get(profile_follow))
        .route("/profile/:username/unfollow/", get(profile_unfollow))
        .route("/posts/:post_id/", get(post_detail).post(add_comment))
        .route("/posts/:post_id/edit/", get(edit_post_form).post(edit_post))
        .route("/create/", get(create_post_form).post(create_post))
        .route("/follow/", get(follow_index))
        .fallback(not_found)
        .layer(Extension(services.pool))
        .layer(Extension(services.config))
        .layer(Extension(services.media))
        .layer(Extension(services.page_cache))
        .layer(TraceLayer::new_for_http())
}
