use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forms::FormErrors;
use crate::models::{Comment, Group, Post, User};
use crate::pagination::Page;

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GroupResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentResponse {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

// ----------------- Page View Models -----------------

#[derive(Deserialize, Serialize, Debug)]
pub struct IndexView {
    pub page_obj: Page<PostResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GroupFeedView {
    pub group: GroupResponse,
    pub page_obj: Page<PostResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ProfileView {
    pub username: String,
    pub page_obj: Page<PostResponse>,
    pub post_count: i64,
    /// Absent when the requester is looking at their own profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct CommentFormView {
    pub text: String,
    pub errors: FormErrors,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostDetailView {
    pub post: PostResponse,
    pub author_post_count: i64,
    pub comments: Vec<CommentResponse>,
    pub form: CommentFormView,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct PostFormData {
    pub text: String,
    pub group: Option<String>,
    pub errors: FormErrors,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GroupChoice {
    pub id: i64,
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostFormView {
    pub form: PostFormData,
    pub groups: Vec<GroupChoice>,
    pub is_edit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct FollowFeedView {
    pub page_obj: Page<PostResponse>,
}

impl UserResponse {
    pub fn new(User { username, email, .. }: User, token: String) -> Self {
        UserResponse {
            username,
            email,
            token,
        }
    }
}

impl From<Group> for GroupResponse {
    fn from(
        Group {
            id,
            title,
            slug,
            description,
        }: Group,
    ) -> Self {
        GroupResponse {
            id,
            title,
            slug,
            description,
        }
    }
}

impl From<Group> for GroupChoice {
    fn from(Group { id, title, .. }: Group) -> Self {
        GroupChoice { id, title }
    }
}

impl From<Post> for PostResponse {
    fn from(
        Post {
            id,
            text,
            pub_date,
            image,
            author_username,
            group_slug,
            group_title,
            ..
        }: Post,
    ) -> Self {
        let group = match (group_slug, group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };
        PostResponse {
            id,
            text,
            pub_date,
            author: author_username,
            group,
            image,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(
        Comment {
            id,
            author_username,
            text,
            created,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            author: author_username,
            text,
            created,
        }
    }
}
