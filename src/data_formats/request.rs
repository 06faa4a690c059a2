use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static USERNAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("username pattern is valid"));

fn username_alphabet(username: &str) -> Result<(), ValidationError> {
    if USERNAME_CHARS.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username_alphabet"))
    }
}

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct RegisterRequest {
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1, max = 150), custom(function = "username_alphabet"))]
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}
