//! HTML page fragments and the layout that wraps them for full page loads.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use tracing::warn;

use crate::error::ApiError;

pub const INDEX_PAGE: &str = "index";
pub const NOT_FOUND_PAGE: &str = "page_not_found";
const LAYOUT_FILE: &str = "layout.html";
const CONTENT_MARKER: &str = "{{ content }}";

/// Reads `{name}.html` fragments from a directory.
#[derive(Clone, Debug)]
pub struct Pages {
    root: PathBuf,
}

/// A rendered page and the status it is served with.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: StatusCode,
    pub html: String,
}

impl Pages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The fragment for `name`, or the not-found fragment with a 404.
    pub async fn fragment(&self, name: &str) -> Result<Rendered, ApiError> {
        if is_page_name(name) {
            if let Some(html) = self.read(&format!("{name}.html")).await? {
                return Ok(Rendered {
                    status: StatusCode::OK,
                    html,
                });
            }
        }
        let html = self
            .read(&format!("{NOT_FOUND_PAGE}.html"))
            .await?
            .unwrap_or_else(|| "<h1>Page not found</h1>".to_string());
        Ok(Rendered {
            status: StatusCode::NOT_FOUND,
            html,
        })
    }

    /// The fragment for `name` placed into the layout.
    pub async fn full(&self, name: &str) -> Result<Rendered, ApiError> {
        let fragment = self.fragment(name).await?;
        let layout = self
            .read(LAYOUT_FILE)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("missing {LAYOUT_FILE}")))?;
        Ok(Rendered {
            status: fragment.status,
            html: layout.replacen(CONTENT_MARKER, &fragment.html, 1),
        })
    }

    async fn read(&self, file: &str) -> Result<Option<String>, ApiError> {
        let path = self.root.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(Some(html)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                warn!("page read failed: {path:?} -> {err}");
                Err(ApiError::Internal(format!("cannot read {file}")))
            }
        }
    }
}

/// Lowercase ascii letters, digits, `-` and `_`; the layout is not a page.
fn is_page_name(name: &str) -> bool {
    !name.is_empty()
        && name != "layout"
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::is_page_name;

    #[test]
    fn page_names_cannot_escape_the_directory() {
        assert!(is_page_name("technologies"));
        assert!(is_page_name("page_not_found"));
        assert!(!is_page_name(""));
        assert!(!is_page_name("layout"));
        assert!(!is_page_name("../secret"));
        assert!(!is_page_name("Index"));
        assert!(!is_page_name("a.html"));
    }
}
