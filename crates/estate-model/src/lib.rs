//! Estate community model
//!
//! Strongly typed community records as produced by the YAML ingester:
//! - `record`: the canonical `CommunityRecord` and its nested blocks
//! - `area`: the closed set of floor-area buckets used by housing layouts
//! - `format`: derived display values (nearest metro, build year, walking time)
//!
//! Records are plain data. Nothing in this crate touches the filesystem.

pub mod area;
pub mod format;
pub mod record;

pub use area::{AreaRange, AreaRangeValue};
pub use record::*;
