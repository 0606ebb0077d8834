//! Memoized, read-only access to the community collection.
//!
//! A `CommunityRepository` is built once at startup and handed to every
//! consumer by reference. The first successful load is cached for the
//! repository's lifetime; failed loads are not cached, so a later call reads
//! the directory again.

use crate::config::RepositoryConfig;
use crate::error::LoadError;
use crate::loader::load_directory;
use estate_model::CommunityRecord;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug)]
pub struct CommunityRepository {
    config: RepositoryConfig,
    data_dir: PathBuf,
    cache: OnceLock<Vec<CommunityRecord>>,
}

impl CommunityRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        let data_dir = config.resolve_data_dir();
        Self {
            config,
            data_dir,
            cache: OnceLock::new(),
        }
    }

    /// Repository over `COMMUNITY_DATA_DIR` or the default location.
    pub fn from_env() -> Self {
        Self::new(RepositoryConfig::from_env())
    }

    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(RepositoryConfig::with_data_dir(dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// All records, in file-name order.
    ///
    /// Reads the filesystem only until the first success.
    pub fn load_all(&self) -> Result<&[CommunityRecord], LoadError> {
        if let Some(records) = self.cache.get() {
            return Ok(records);
        }
        let loaded = load_directory(&self.data_dir, &self.config)?;
        Ok(self.cache.get_or_init(|| loaded))
    }

    /// Record whose route key is `key`, else whose id is `key`.
    pub fn find_by_key(&self, key: &str) -> Result<Option<&CommunityRecord>, LoadError> {
        let records = self.load_all()?;
        Ok(records
            .iter()
            .find(|r| r.route_key == key)
            .or_else(|| records.iter().find(|r| r.id == key)))
    }

    /// Record with exactly this id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<&CommunityRecord>, LoadError> {
        Ok(self.load_all()?.iter().find(|r| r.id == id))
    }
}
