//! YAML community ingestion
//!
//! Turns a directory of community data files into validated, normalized
//! `CommunityRecord`s:
//! - `validation`: field checks over one raw mapping, reported as structured issues
//! - `normalize`: raw mapping → typed record (route key, image paths, defaults)
//! - `loader`: one pass over a directory, failing atomically on any issue
//! - `repository`: memoized read-only access (`load_all`, `find_by_key`)
//!
//! Issues are only rendered to text at the reporting boundary
//! (`ValidationReport`'s `Display`), so every problem in every file shows up in
//! one message.

pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod repository;
pub mod validation;

pub use config::{RepositoryConfig, DATA_DIR_ENV, DEFAULT_DATA_DIR};
pub use error::{IssueKind, LoadError, ValidationIssue, ValidationReport};
pub use loader::{load_directory, parse_community_file, scan_directory, LoadPass};
pub use normalize::normalize_community;
pub use repository::CommunityRepository;
pub use validation::{matches_date_pattern, validate_community};
