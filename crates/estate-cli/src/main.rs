//! Estate CLI
//!
//! Terminal front end for the community catalog:
//! - Checking a data directory (every validation problem at once)
//! - Listing communities with tag/district/area filters and sort orders
//! - Showing one community by route key or id
//! - Comparing 2 to 6 communities side by side

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use estate_catalog::{SortKey, MAX_COMPARE_COUNT};
use estate_ingest_yaml::{CommunityRepository, RepositoryConfig, DATA_DIR_ENV};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod check;
mod views;

#[derive(Parser)]
#[command(name = "estate")]
#[command(author, version, about = "Residential community catalog over a directory of YAML files")]
struct Cli {
    /// Directory holding the community `.yml`/`.yaml` files.
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log loader activity at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate every data file; exits non-zero on any problem.
    Check {
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List communities, newest update first unless another order is given.
    List {
        /// Keep communities carrying any of these tags (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        area: Option<String>,
        /// Sort order: updated|price|metro|build-year
        #[arg(long, default_value = "updated")]
        sort: SortKey,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one community by route key (slug) or id.
    Show {
        key: String,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare communities side by side.
    Compare {
        /// Comma-separated community ids, e.g. `a,b,c` (at most 6 are used).
        ids: String,
        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub(crate) fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown --format `{other}` (expected text|json)")),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "estate={default_level},estate_ingest_yaml={default_level},warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_repository(data_dir: Option<PathBuf>) -> CommunityRepository {
    let config = match data_dir {
        Some(dir) => RepositoryConfig::with_data_dir(dir),
        None => RepositoryConfig::from_env(),
    };
    CommunityRepository::new(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let repo = open_repository(cli.data_dir);

    match cli.command {
        Commands::Check { format } => {
            check::cmd_check(&repo, OutputFormat::parse(&format)?)?;
        }
        Commands::List {
            tags,
            district,
            area,
            sort,
            format,
        } => {
            let query = estate_catalog::ListQuery {
                tags,
                district,
                area,
                sort,
            };
            views::cmd_list(&repo, &query, OutputFormat::parse(&format)?)?;
        }
        Commands::Show { key, format } => {
            views::cmd_show(&repo, &key, OutputFormat::parse(&format)?)?;
        }
        Commands::Compare { ids, format } => {
            let selection = estate_catalog::CompareSelection::parse_ids(&ids);
            if ids.split(',').filter(|s| !s.trim().is_empty()).count() > MAX_COMPARE_COUNT {
                tracing::warn!("only the first {MAX_COMPARE_COUNT} ids are compared");
            }
            views::cmd_compare(&repo, &selection, OutputFormat::parse(&format)?)
                .with_context(|| format!("comparing `{ids}`"))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse_into_a_query() {
        let cli = Cli::parse_from([
            "estate", "list", "--tag", "学区", "--tag", "地铁", "--sort", "build-year",
        ]);
        match cli.command {
            Commands::List { tags, sort, .. } => {
                assert_eq!(tags, vec!["学区", "地铁"]);
                assert_eq!(sort, SortKey::BuildYearDesc);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn output_format_rejects_unknown_values() {
        assert_eq!(OutputFormat::parse(" JSON ").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("yaml").is_err());
    }
}
