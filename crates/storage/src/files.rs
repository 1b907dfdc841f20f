//! File reference to URL resolution.
//!
//! Binaries (thumbnails, attachments, submitted files) live in external
//! storage; records only carry a file name.

/// Turns a record's file reference into a fetchable URL.
pub trait FileResolver: Send + Sync {
    /// URL of `file` attached to record `record_id` in `collection`.
    fn file_url(&self, collection: &str, record_id: &str, file: &str) -> String;
}

/// Resolver for stores serving files at `{base}/api/files/{collection}/{id}/{file}`.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base_url: String,
}

impl BaseUrlResolver {
    /// Create a resolver for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl FileResolver for BaseUrlResolver {
    fn file_url(&self, collection: &str, record_id: &str, file: &str) -> String {
        format!(
            "{}/api/files/{}/{}/{}",
            self.base_url, collection, record_id, file
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_layout() {
        let r = BaseUrlResolver::new("https://lms.example.org/");
        assert_eq!(
            r.file_url("assignments_submissions", "x1", "answer.zip"),
            "https://lms.example.org/api/files/assignments_submissions/x1/answer.zip"
        );
    }
}
