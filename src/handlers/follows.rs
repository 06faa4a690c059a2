use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::Uri,
    response::Redirect,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser,
    data_formats::{FollowFeedView, PostResponse},
    db_helpers::{
        follow_user_in_db, get_user_by_username, list_posts_page, unfollow_user_in_db, PostFilter,
    },
    errors::RequestError,
    pagination::{PageQuery, Paginator},
};

use super::{current_user, path_with_query, profile_url, JsonResult};

// ----------------- Follow Handlers -----------------

pub async fn follow_index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> JsonResult<FollowFeedView> {
    let user = current_user(&pool, &maybe_user, &path_with_query(&uri)).await?;
    let page = list_posts_page(
        &pool,
        PostFilter::FollowedBy(user.id),
        Paginator::default(),
        query.requested(),
    )
    .await?;
    Ok(Json(FollowFeedView {
        page_obj: page.map(PostResponse::from),
    }))
}

pub async fn profile_follow(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    uri: Uri,
    Path(username): Path<String>,
) -> Result<Redirect, RequestError> {
    let user = current_user(&pool, &maybe_user, uri.path()).await?;
    let author = get_user_by_username(&pool, &username)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    if author.id != user.id {
        let created = follow_user_in_db(&pool, user.id, author.id).await?;
        tracing::debug!(user_id = user.id, author_id = author.id, created, "follow");
    }
    Ok(Redirect::to(&profile_url(&author.username)))
}

pub async fn profile_unfollow(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    uri: Uri,
    Path(username): Path<String>,
) -> Result<Redirect, RequestError> {
    let user = current_user(&pool, &maybe_user, uri.path()).await?;
    let author = get_user_by_username(&pool, &username)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let removed = unfollow_user_in_db(&pool, user.id, author.id).await?;
    tracing::debug!(user_id = user.id, author_id = author.id, removed, "unfollow");
    Ok(Redirect::to(&profile_url(&author.username)))
}
