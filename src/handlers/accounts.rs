use std::sync::Arc;

use axum::{extract::Query, Extension, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2},
    config::Config,
    data_formats::{LoginQuery, LoginRequest, RegisterRequest, UserResponse, UserWrapper},
    db_helpers::{get_user_by_email, insert_user, is_unique_violation},
    errors::RequestError,
};

use super::JsonResult;

type UserJson = UserWrapper<UserResponse>;

// ----------------- Account Handlers -----------------

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> JsonResult<UserJson> {
    if let Err(errors) = user.validate() {
        let fields = errors.field_errors();
        if fields.contains_key("username") {
            return Err(RequestError::RunTimeError(
                "Username may contain only letters, digits and @/./+/-/_",
            ));
        }
        return Err(RequestError::RunTimeError("Password is required"));
    }
    user.password = hash_password_argon2(user.password)
        .await
        .map_err(|_| RequestError::RunTimeError("Could not register user\nPlease Try again"))?;

    let created = insert_user(&pool, &user).await.map_err(|e| {
        if is_unique_violation(&e) {
            return RequestError::RunTimeError("Username or email already exists");
        }
        e
    })?;
    tracing::info!(user_id = created.id, username = %created.username, "registered user");

    let token = get_jwt_token(created.id, &config.jwt_secret).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
    })?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        created, token,
    ))))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    let user = match get_user_by_email(&pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Email not found")),
    };
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::RunTimeError("Could not login user\nPlease Try again"))?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password"));
    }

    let token = get_jwt_token(user.id, &config.jwt_secret).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
    })?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

/// Where login redirects land. Clients post credentials to the same path.
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<Value> {
    Json(json!({ "next": query.next.unwrap_or_else(|| "/".to_string()) }))
}
