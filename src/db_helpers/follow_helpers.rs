use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Follow};

/// Adds the `user -> author` edge. The UNIQUE(user_id, author_id) index turns a
/// repeat follow into a no-op, so there is no separate existence check.
/// Returns `true` when a new edge was written.
pub async fn follow_user_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `true` when an edge was removed.
pub async fn unfollow_user_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        DELETE FROM follows WHERE user_id = $1 AND author_id = $2
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_follow_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<Option<Follow>, RequestError> {
    let follow = sqlx::query_as::<_, Follow>(
        r#"
        SELECT id, user_id, author_id FROM follows WHERE user_id = $1 AND author_id = $2
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;
    Ok(follow)
}

pub async fn is_following_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    Ok(get_follow_in_db(pool, user_id, author_id).await?.is_some())
}

pub async fn count_follows(pool: &SqlitePool) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
