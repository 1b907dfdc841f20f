//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Names of the collections the engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    /// Modules
    pub modules: String,
    /// Submodules
    pub submodules: String,
    /// Assignments
    pub assignments: String,
    /// Assignment submissions
    pub submissions: String,
    /// Videos
    pub videos: String,
    /// Notes
    pub notes: String,
    /// Announcements
    pub announcements: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            modules: "modules".to_string(),
            submodules: "submodules".to_string(),
            assignments: "assignments".to_string(),
            submissions: "assignments_submissions".to_string(),
            videos: "videos".to_string(),
            notes: "notes".to_string(),
            announcements: "announcements".to_string(),
        }
    }
}

/// Configuration shared by the progress and assignment components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collection names
    pub collections: Collections,

    /// Announcements shown on the dashboard
    pub announcement_limit: usize,

    /// Per-branch timeout for dashboard fetches, in milliseconds (None = wait)
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collections: Collections::default(),
            announcement_limit: 4,
            fetch_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Per-branch fetch timeout.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "collections": { "submissions": "assignments_submisson" }, "fetch_timeout_ms": 2500 }"#,
        )
        .unwrap();
        assert_eq!(config.collections.submissions, "assignments_submisson");
        assert_eq!(config.collections.modules, "modules");
        assert_eq!(config.announcement_limit, 4);
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_default_has_no_timeout() {
        assert!(EngineConfig::default().fetch_timeout().is_none());
    }
}
