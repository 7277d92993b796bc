/// Configuration for opening and saving documents.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options applied by [`Document::open_with`](crate::Document::open_with).
///
/// # Examples
///
/// ```rust
/// use wordml::DocumentConfig;
///
/// let config = DocumentConfig::new()
///     .with_user("reviewer")
///     .with_target_extension("docm");
/// assert_eq!(config.resolved_user(), "reviewer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Package opened when no source path is given; the built-in template when unset
    pub template: Option<PathBuf>,
    /// Identity stamped into "lastModifiedBy" on save
    pub user: Option<String>,
    /// Container suffix accepted by save, without the dot
    pub target_extension: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            template: None,
            user: None,
            target_extension: "docx".to_string(),
        }
    }
}

impl DocumentConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another package as the template for documents opened without a path.
    #[inline]
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[inline]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[inline]
    pub fn with_target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = extension.into();
        self
    }

    /// The configured user, else `USER` / `USERNAME` from the environment,
    /// else `"unknown"`.
    pub fn resolved_user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|user| !user.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
