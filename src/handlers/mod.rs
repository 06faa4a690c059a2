use axum::{
    http::{StatusCode, Uri},
    Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser, db_helpers::get_user_by_id, errors::RequestError,
    errors::RequestErrorJsonWrapper, models::User, JsonResponse,
};

mod accounts;
mod follows;
mod posts;

pub use accounts::*;
pub use follows::*;
pub use posts::*;

type JsonResult<T> = Result<Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> JsonResponse<RequestErrorJsonWrapper> {
    (
        StatusCode::NOT_FOUND,
        Json(RequestErrorJsonWrapper::new(&format!(
            "URL {} provided was not found",
            uri.path()
        ))),
    )
}

/// Numeric ids in paths; anything else is a page that does not exist.
fn parse_id(raw: &str, what: &'static str) -> Result<i64, RequestError> {
    raw.parse().map_err(|_| RequestError::NotFound(what))
}

fn path_with_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// The signed in user's row. A token for a user that no longer exists counts
/// as not signed in.
async fn current_user(
    pool: &SqlitePool,
    maybe_user: &MaybeUser,
    next: &str,
) -> Result<User, RequestError> {
    let auth = maybe_user.require(next)?;
    get_user_by_id(pool, auth.id)
        .await?
        .ok_or_else(|| RequestError::LoginRequired {
            next: next.to_string(),
        })
}

fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}
