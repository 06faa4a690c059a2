use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser,
    data_formats::{
        CommentFormView, CommentRequest, GroupChoice, GroupFeedView, IndexView, PostDetailView,
        PostFormData, PostFormView, PostResponse, ProfileView,
    },
    db_helpers::{
        add_comment_to_post_in_db, count_posts, get_comments_for_post_in_db, get_group_by_slug,
        get_post_by_id, get_user_by_username, insert_post, is_following_in_db, list_groups,
        list_posts_page, update_post, PostFields, PostFilter,
    },
    errors::RequestError,
    forms::{CommentInput, FormErrors, PostInput, ValidPost},
    media::MediaStore,
    models::Post,
    pagination::{PageQuery, Paginator},
};

use super::{current_user, parse_id, post_url, profile_url, JsonResult};

// ----------------- Feed Handlers -----------------

pub async fn index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(query): Query<PageQuery>,
) -> JsonResult<IndexView> {
    let page = list_posts_page(&pool, PostFilter::All, Paginator::default(), query.requested())
        .await?;
    Ok(Json(IndexView {
        page_obj: page.map(PostResponse::from),
    }))
}

pub async fn group_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> JsonResult<GroupFeedView> {
    let group = get_group_by_slug(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound("Group not found"))?;
    let page = list_posts_page(
        &pool,
        PostFilter::Group(group.id),
        Paginator::default(),
        query.requested(),
    )
    .await?;
    Ok(Json(GroupFeedView {
        group: group.into(),
        page_obj: page.map(PostResponse::from),
    }))
}

pub async fn profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> JsonResult<ProfileView> {
    let author = get_user_by_username(&pool, &username)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    let page = list_posts_page(
        &pool,
        PostFilter::Author(author.id),
        Paginator::default(),
        query.requested(),
    )
    .await?;

    //? Own profile carries no follow flag at all
    let following = match maybe_user.get_id() {
        Some(id) if id == author.id => None,
        Some(id) => Some(is_following_in_db(&pool, id, author.id).await?),
        None => Some(false),
    };

    Ok(Json(ProfileView {
        username: author.username,
        post_count: page.count,
        page_obj: page.map(PostResponse::from),
        following,
    }))
}

// ----------------- Post Handlers -----------------

pub async fn post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<String>,
) -> JsonResult<PostDetailView> {
    let post_id = parse_id(&post_id, "Post not found")?;
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))?;
    let author_post_count = count_posts(&pool, PostFilter::Author(post.author_id)).await?;
    let comments = get_comments_for_post_in_db(&pool, post.id).await?;

    Ok(Json(PostDetailView {
        post: post.into(),
        author_post_count,
        comments: comments.into_iter().map(Into::into).collect(),
        form: CommentFormView::default(),
    }))
}

async fn render_post_form(
    pool: &SqlitePool,
    form: PostFormData,
    post: Option<Post>,
) -> Result<Response, RequestError> {
    let groups = list_groups(pool)
        .await?
        .into_iter()
        .map(GroupChoice::from)
        .collect();
    Ok(Json(PostFormView {
        form,
        groups,
        is_edit: post.is_some(),
        post: post.map(PostResponse::from),
    })
    .into_response())
}

fn echo_form(input: &PostInput, errors: FormErrors) -> PostFormData {
    PostFormData {
        text: input.text.clone(),
        group: input.group.clone(),
        errors,
    }
}

async fn into_fields(media: &MediaStore, valid: ValidPost) -> Result<PostFields, RequestError> {
    let image = match &valid.image {
        Some(upload) => Some(media.save_post_image(upload).await?),
        None => None,
    };
    Ok(PostFields {
        text: valid.text,
        group_id: valid.group_id,
        image,
    })
}

pub async fn create_post_form(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> Result<Response, RequestError> {
    render_post_form(&pool, PostFormData::default(), None).await
}

pub async fn create_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(media): Extension<MediaStore>,
    maybe_user: MaybeUser,
    multipart: Option<Multipart>,
) -> Result<Response, RequestError> {
    let input = PostInput::from_multipart(multipart).await;
    let valid = match input.clean(&pool).await? {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(?errors, "post form rejected");
            return render_post_form(&pool, echo_form(&input, errors), None).await;
        }
    };

    let author = match current_user(&pool, &maybe_user, "/create/").await {
        Ok(author) => author,
        //? Anonymous submissions only ever see the form again
        Err(RequestError::LoginRequired { .. }) => {
            return render_post_form(&pool, echo_form(&input, FormErrors::default()), None).await
        }
        Err(e) => return Err(e),
    };

    let fields = into_fields(&media, valid).await?;
    let post = insert_post(&pool, author.id, fields).await?;
    tracing::info!(post_id = post.id, author = %author.username, "created post");
    Ok(Redirect::to(&profile_url(&author.username)).into_response())
}

/// Only the author may edit; everyone else is sent back to the post.
fn authorize_edit(maybe_user: &MaybeUser, post: &Post) -> Result<(), RequestError> {
    match maybe_user.get_id() {
        Some(id) if id == post.author_id => Ok(()),
        _ => Err(RequestError::Forbidden {
            redirect_to: post_url(post.id),
        }),
    }
}

async fn editable_post(
    pool: &SqlitePool,
    maybe_user: &MaybeUser,
    post_id: &str,
) -> Result<Post, RequestError> {
    let post_id = parse_id(post_id, "Post not found")?;
    let post = get_post_by_id(pool, post_id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))?;
    authorize_edit(maybe_user, &post)?;
    Ok(post)
}

pub async fn edit_post_form(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<String>,
) -> Result<Response, RequestError> {
    let post = editable_post(&pool, &maybe_user, &post_id).await?;
    let form = PostFormData {
        text: post.text.clone(),
        group: post.group_id.map(|id| id.to_string()),
        errors: FormErrors::default(),
    };
    render_post_form(&pool, form, Some(post)).await
}

pub async fn edit_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(media): Extension<MediaStore>,
    maybe_user: MaybeUser,
    Path(post_id): Path<String>,
    multipart: Option<Multipart>,
) -> Result<Response, RequestError> {
    let post = editable_post(&pool, &maybe_user, &post_id).await?;
    let input = PostInput::from_multipart(multipart).await;
    let valid = match input.clean(&pool).await? {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(post_id = post.id, ?errors, "post edit rejected");
            return render_post_form(&pool, echo_form(&input, errors), Some(post)).await;
        }
    };

    let fields = into_fields(&media, valid).await?;
    let post = update_post(&pool, post.id, fields).await?;
    tracing::info!(post_id = post.id, "edited post");
    Ok(Redirect::to(&post_url(post.id)).into_response())
}

// ----------------- Comment Handlers -----------------

pub async fn add_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    uri: Uri,
    Path(post_id): Path<String>,
    form: Option<Form<CommentRequest>>,
) -> Result<Redirect, RequestError> {
    let author = current_user(&pool, &maybe_user, uri.path()).await?;
    let post_id = parse_id(&post_id, "Post not found")?;
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound("Post not found"))?;

    let input = form
        .map(|Form(request)| CommentInput::from(request))
        .unwrap_or_default();
    match input.clean() {
        Ok(text) => {
            let comment = add_comment_to_post_in_db(&pool, author.id, post.id, &text).await?;
            tracing::info!(comment_id = comment.id, post_id = post.id, "added comment");
        }
        Err(errors) => tracing::debug!(post_id = post.id, ?errors, "comment rejected"),
    }
    Ok(Redirect::to(&post_url(post.id)))
}
