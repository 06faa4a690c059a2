use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Group};

// Groups are managed by ops tooling; the web routes only read them.

pub async fn insert_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, RequestError> {
    let mut tx = pool.begin().await?;
    let group = sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (title, slug, description)
        VALUES ($1, $2, $3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(group)
}

pub async fn get_group_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Group>, RequestError> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(group)
}

pub async fn get_group_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Group>, RequestError> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(group)
}

pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>, RequestError> {
    let groups = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(groups)
}

/// Posts in the group survive with their group reference cleared.
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM post_groups WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
