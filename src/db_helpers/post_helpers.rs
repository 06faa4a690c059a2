use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::Post,
    pagination::{Page, PageWindow, Paginator},
};

const POST_QUERY: &str = r#"
            SELECT posts.id              AS "id",
                   posts.text            AS "text",
                   posts.pub_date        AS "pub_date",
                   posts.image           AS "image",
                   posts.author_id       AS "author_id",
                   users.username        AS "author_username",
                   posts.group_id        AS "group_id",
                   post_groups.slug      AS "group_slug",
                   post_groups.title     AS "group_title"
            FROM   posts
                JOIN users
                    ON users.id = posts.author_id
                LEFT JOIN post_groups
                    ON post_groups.id = posts.group_id
"#;

// $1 group, $2 author, $3 follower. A NULL binding switches the filter off.
const FEED_FILTER: &str = r#"
            WHERE  ( posts.group_id = $1
                    OR $1 IS NULL )
                AND ( posts.author_id = $2
                    OR $2 IS NULL )
                AND ( $3 IS NULL
                    OR posts.author_id IN (SELECT follows.author_id
                                           FROM   follows
                                           WHERE  follows.user_id = $3) )
"#;

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by everyone the given user follows.
    FollowedBy(i64),
}

impl PostFilter {
    fn binds(self) -> (Option<i64>, Option<i64>, Option<i64>) {
        match self {
            PostFilter::All => (None, None, None),
            PostFilter::Group(id) => (Some(id), None, None),
            PostFilter::Author(id) => (None, Some(id), None),
            PostFilter::FollowedBy(id) => (None, None, Some(id)),
        }
    }
}

/// Validated post fields. `author` and `pub_date` are never part of it.
#[derive(Debug, Clone, Default)]
pub struct PostFields {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

pub async fn count_posts(pool: &SqlitePool, filter: PostFilter) -> Result<i64, RequestError> {
    let (group, author, follower) = filter.binds();
    let query = format!("SELECT COUNT(*) FROM posts {FEED_FILTER}");
    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(group)
        .bind(author)
        .bind(follower)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of posts, newest first. Out of range page numbers are clamped.
pub async fn list_posts_page(
    pool: &SqlitePool,
    filter: PostFilter,
    paginator: Paginator,
    requested_page: i64,
) -> Result<Page<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let (group, author, follower) = filter.binds();

    let count_query = format!("SELECT COUNT(*) FROM posts {FEED_FILTER}");
    let count = sqlx::query_scalar::<_, i64>(&count_query)
        .bind(group)
        .bind(author)
        .bind(follower)
        .fetch_one(&mut tx)
        .await?;

    let window: PageWindow = paginator.window(requested_page, count);
    let page_query = format!(
        "{POST_QUERY} {FEED_FILTER} ORDER BY posts.pub_date DESC, posts.id DESC LIMIT $4 OFFSET $5"
    );
    let posts = sqlx::query_as::<_, Post>(&page_query)
        .bind(group)
        .bind(author)
        .bind(follower)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(Page::new(posts, window))
}

pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, RequestError> {
    let query = format!("{POST_QUERY} WHERE posts.id = $1");
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn insert_post(
    pool: &SqlitePool,
    author_id: i64,
    PostFields {
        text,
        group_id,
        image,
    }: PostFields,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO posts (text, pub_date, author_id, group_id, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(Utc::now())
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;

    get_post_by_id(pool, id)
        .await?
        .ok_or(RequestError::ServerError)
}

/// Rewrites text, group and image in place. A `None` image keeps the stored one.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    PostFields {
        text,
        group_id,
        image,
    }: PostFields,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET    text = $1,
               group_id = $2,
               image = COALESCE($3, image)
        WHERE  id = $4
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;

    get_post_by_id(pool, id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))
}

/// Comments on the post go with it.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
