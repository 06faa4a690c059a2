use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;

use crate::forms::Upload;

const POST_IMAGE_DIR: &str = "posts";

/// Writes post images under `<root>/posts/`. Returned paths are relative to `root`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn save_post_image(&self, upload: &Upload) -> std::io::Result<String> {
        let dir = self.root.join(POST_IMAGE_DIR);
        fs::create_dir_all(&dir).await?;
        let name = format!("{}_{}", Uuid::new_v4().simple(), sanitize(&upload.file_name));
        fs::write(dir.join(&name), &upload.bytes).await?;
        Ok(format!("{POST_IMAGE_DIR}/{name}"))
    }
}

fn sanitize(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn sanitize_drops_directories_and_odd_characters() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("my cat.gif"), "my_cat.gif");
        assert_eq!(sanitize(".."), "upload");
        assert_eq!(sanitize(""), "upload");
    }

    #[tokio::test]
    async fn saved_image_lands_under_posts() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        let upload = Upload {
            file_name: "small.gif".to_string(),
            bytes: Bytes::from_static(b"GIF89a"),
        };
        let path = store.save_post_image(&upload).await.unwrap();
        assert!(path.starts_with("posts/"));
        assert!(path.ends_with("_small.gif"));
        let written = std::fs::read(dir.path().join(&path)).unwrap();
        assert_eq!(written, b"GIF89a");
    }
}
