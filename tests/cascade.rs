mod common;

use common::TestApp;
use yatube::db_helpers::{
    add_comment_to_post_in_db, count_comments, count_follows, delete_comment_in_db, delete_group,
    delete_post,
    delete_user, follow_user_in_db, get_comments_for_post_in_db, get_post_by_id, insert_group,
    is_following_in_db,
};

#[tokio::test]
async fn deleting_a_group_keeps_its_posts() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let group = insert_group(&app.pool, "Cats", "cats", "").await.unwrap();
    let post = app.seed_post(&author, "meow", Some(group.id)).await;

    assert!(delete_group(&app.pool, group.id).await.unwrap());

    let survivor = get_post_by_id(&app.pool, post.id).await.unwrap().unwrap();
    assert_eq!(survivor.group_id, None);
    assert_eq!(survivor.group_slug, None);
    assert_eq!(survivor.text, "meow");
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let post = app.seed_post(&author, "doomed", None).await;
    let other = app.seed_post(&author, "kept", None).await;
    add_comment_to_post_in_db(&app.pool, author.id, post.id, "gone")
        .await
        .unwrap();
    add_comment_to_post_in_db(&app.pool, author.id, other.id, "stays")
        .await
        .unwrap();

    assert!(delete_post(&app.pool, post.id).await.unwrap());

    assert_eq!(count_comments(&app.pool).await.unwrap(), 1);
    let left = get_comments_for_post_in_db(&app.pool, other.id).await.unwrap();
    assert_eq!(left[0].text, "stays");
}

#[tokio::test]
async fn deleting_a_user_removes_everything_they_own() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let reader = app.signup("Reader").await;
    let post = app.seed_post(&author, "by author", None).await;
    let reader_post = app.seed_post(&reader, "by reader", None).await;
    add_comment_to_post_in_db(&app.pool, author.id, reader_post.id, "author comment")
        .await
        .unwrap();
    add_comment_to_post_in_db(&app.pool, reader.id, post.id, "on author post")
        .await
        .unwrap();
    follow_user_in_db(&app.pool, author.id, reader.id).await.unwrap();
    follow_user_in_db(&app.pool, reader.id, author.id).await.unwrap();

    assert!(delete_user(&app.pool, author.id).await.unwrap());

    assert!(get_post_by_id(&app.pool, post.id).await.unwrap().is_none());
    assert!(get_post_by_id(&app.pool, reader_post.id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(count_comments(&app.pool).await.unwrap(), 0);
    assert_eq!(count_follows(&app.pool).await.unwrap(), 0);
    assert_eq!(app.post_count().await, 1);
}

#[tokio::test]
async fn store_refuses_self_follow_and_duplicates() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let reader = app.signup("Reader").await;

    assert!(follow_user_in_db(&app.pool, reader.id, author.id).await.unwrap());
    assert!(!follow_user_in_db(&app.pool, reader.id, author.id).await.unwrap());
    assert!(follow_user_in_db(&app.pool, author.id, author.id).await.is_err());
    assert!(is_following_in_db(&app.pool, reader.id, author.id).await.unwrap());
    assert!(!is_following_in_db(&app.pool, author.id, reader.id).await.unwrap());
    assert_eq!(count_follows(&app.pool).await.unwrap(), 1);
}

#[tokio::test]
async fn pub_date_cannot_be_rewritten() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let post = app.seed_post(&author, "dated", None).await;

    let result = sqlx::query("UPDATE posts SET pub_date = '2000-01-01T00:00:00+00:00' WHERE id = $1")
        .bind(post.id)
        .execute(&app.pool)
        .await;
    assert!(result.is_err());
    let unchanged = get_post_by_id(&app.pool, post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.pub_date, post.pub_date);
}

#[tokio::test]
async fn deleting_a_comment_leaves_the_post() {
    let app = TestApp::spawn().await;
    let author = app.signup("Author").await;
    let post = app.seed_post(&author, "post", None).await;
    let comment = add_comment_to_post_in_db(&app.pool, author.id, post.id, "bye")
        .await
        .unwrap();

    assert!(delete_comment_in_db(&app.pool, comment.id).await.unwrap());
    assert!(!delete_comment_in_db(&app.pool, comment.id).await.unwrap());
    assert!(get_post_by_id(&app.pool, post.id).await.unwrap().is_some());
    assert_eq!(count_comments(&app.pool).await.unwrap(), 0);
}
