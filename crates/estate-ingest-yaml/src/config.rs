//! Where community data files live.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "COMMUNITY_DATA_DIR";

/// Data directory used when nothing overrides it, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "../data/communities";

/// Options controlling which files a load pass reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Explicit data directory. Wins over the environment and the default.
    pub data_dir: Option<PathBuf>,
    /// File-name suffixes treated as data files (matched case-sensitively).
    pub extensions: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            extensions: vec![".yml".to_string(), ".yaml".to_string()],
        }
    }
}

impl RepositoryConfig {
    /// Config pinned to one directory.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Config honoring `COMMUNITY_DATA_DIR` when it is set and non-empty.
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Explicit override, else `<cwd>/../data/communities`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(DEFAULT_DATA_DIR)
    }

    pub fn is_data_file(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }
}
