//! Typed form input for the post and comment routes.
//!
//! Each form is parsed into an input struct, then validated into the fields
//! the data store accepts or an ordered list of per-field messages.

use std::collections::BTreeMap;

use axum::{body::Bytes, extract::Multipart};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::{Validate, ValidationErrors};

use crate::{data_formats::CommentRequest, db_helpers::get_group_by_id, errors::RequestError};

pub const TEXT_MAX_CHARS: usize = 1000;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies `validator` failures over as form messages. `text` is the value the
    /// length rule ran against, used to word the message.
    fn add_validation(&mut self, outcome: Result<(), ValidationErrors>, text: &str) {
        let Err(failures) = outcome else {
            return;
        };
        for (field, errors) in failures.field_errors() {
            for error in errors {
                let message = match &*error.code {
                    "length" => length_message(text),
                    _ => error.to_string(),
                };
                self.add(&field.to_string(), message);
            }
        }
    }
}

fn length_message(text: &str) -> String {
    match text.chars().count() {
        0 => REQUIRED.to_string(),
        chars => {
            format!("Ensure this value has at most {TEXT_MAX_CHARS} characters (it has {chars}).")
        }
    }
}

/// An uploaded file part with a non-empty body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text arrives already trimmed.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    pub group: Option<String>,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<Upload>,
}

impl PostInput {
    /// Reads `text`, `group` and `image`. Unknown parts are ignored; a broken
    /// stream keeps whatever was read before it.
    pub async fn from_multipart(multipart: Option<Multipart>) -> Self {
        let mut input = PostInput::default();
        let Some(mut multipart) = multipart else {
            return input;
        };
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "stopped reading post form");
                    break;
                }
            };
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => input.text = field.text().await.unwrap_or_default().trim().to_string(),
                "group" => {
                    let group = field.text().await.unwrap_or_default();
                    input.group = (!group.trim().is_empty()).then(|| group.trim().to_string());
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let bytes = field.bytes().await.unwrap_or_default();
                    if !bytes.is_empty() {
                        input.image = Some(Upload { file_name, bytes });
                    }
                }
                _ => {}
            }
        }
        input
    }

    /// The outer `Result` is a storage failure; the inner one is the form verdict.
    pub async fn clean(
        &self,
        pool: &SqlitePool,
    ) -> Result<Result<ValidPost, FormErrors>, RequestError> {
        let mut errors = FormErrors::default();
        errors.add_validation(self.validate(), &self.text);

        let group_id = match &self.group {
            None => None,
            Some(raw) => {
                let found = match raw.parse::<i64>() {
                    Ok(id) => get_group_by_id(pool, id).await?.map(|group| group.id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add("group", INVALID_CHOICE);
                }
                found
            }
        };

        if let Some(upload) = &self.image {
            if !infer::is_image(&upload.bytes) {
                errors.add("image", INVALID_IMAGE);
            }
        }

        if !errors.is_empty() {
            return Ok(Err(errors));
        }
        Ok(Ok(ValidPost {
            text: self.text.clone(),
            group_id,
            image: self.image.clone(),
        }))
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

impl From<CommentRequest> for CommentInput {
    fn from(CommentRequest { text }: CommentRequest) -> Self {
        CommentInput {
            text: text.trim().to_string(),
        }
    }
}

impl CommentInput {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        errors.add_validation(self.validate(), &self.text);
        if errors.is_empty() {
            Ok(self.text.clone())
        } else {
            Err(errors)
        }
    }
}
