use chrono::Utc;
use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Comment};

const COMMENT_QUERY: &str = r#"
        SELECT comments.id, comments.post_id, comments.author_id,
               users.username AS author_username, comments.text, comments.created
        FROM   comments
            JOIN users ON users.id = comments.author_id
"#;

pub async fn add_comment_to_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    text: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO comments (post_id, author_id, text, created)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(Utc::now())
    .fetch_one(&mut tx)
    .await?;

    let query = format!("{COMMENT_QUERY} WHERE comments.id = $1");
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(comment)
}

/// Comments in the order they were stored.
pub async fn get_comments_for_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!("{COMMENT_QUERY} WHERE comments.post_id = $1 ORDER BY comments.id");
    let comments = sqlx::query_as::<_, Comment>(&query)
        .bind(post_id)
        .fetch_all(pool)
        .await?;
    Ok(comments)
}

pub async fn count_comments(pool: &SqlitePool) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete_comment_in_db(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
