use sqlx::SqlitePool;

use crate::{data_formats::RegisterRequest, errors::RequestError, models::User};

use super::USER_COLUMNS;

/// `user.password` must already be hashed.
pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "INSERT INTO users (email, username, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&query)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

/// Removes the user together with their posts, comments and follow edges in
/// both directions. Returns `false` when there was no such user.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
