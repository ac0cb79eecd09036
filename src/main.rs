use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use release_index::config::{self, IndexConfig};
use release_index::logging::init_logging;
use release_index::release::types::{
    Architecture, HeapSize, ImageType, JvmVariant, Os, Project, ReleaseKind, Vendor,
};
use release_index::release::{
    BinaryFilter, ReleaseFilter, RepositorySnapshot, SortMethod, SortOrder,
};
use release_index::store::import::{import_releases, parse_releases};
use release_index::store::refresh::{read_snapshot, run_refresh_loop};
use release_index::store::{ReleaseDatabase, SnapshotStore};
use release_index::version::{RangeCache, VersionParser};

#[derive(Parser)]
#[command(name = "release-index")]
#[command(version, about = "Index of published release artifacts")]
struct Cli {
    /// JSON configuration file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Release database (defaults to releases.db in the data directory)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a JSON array of releases into the database
    Import {
        file: PathBuf,
        /// Delete stored releases of the imported feature versions missing from the file
        #[arg(long)]
        prune: bool,
    },
    /// Print matching releases as JSON lines
    Query(QueryArgs),
    /// Print the available release lines
    Available,
    /// Print the newest GA binary per platform of a feature version
    Latest {
        feature_version: u32,
        #[command(flatten)]
        binary: BinaryArgs,
    },
    /// Keep refreshing the snapshot from the database until interrupted
    Watch,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    release_type: Option<ReleaseKind>,
    #[arg(long)]
    feature_version: Option<u32>,
    #[arg(long)]
    release_name: Option<String>,
    #[arg(long)]
    vendor: Option<Vendor>,
    /// Keep only LTS (true) or non-LTS (false) release lines
    #[arg(long)]
    lts: Option<bool>,
    /// Maven-style range such as `[11.0.4,17)`; a bare version matches exactly
    #[arg(long)]
    version: Option<String>,
    #[command(flatten)]
    binary: BinaryArgs,
    #[arg(long, default_value = "desc")]
    sort_order: SortOrder,
    #[arg(long, default_value = "version")]
    sort_method: SortMethod,
    #[arg(long, default_value_t = 0)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

#[derive(Args)]
struct BinaryArgs {
    #[arg(long)]
    os: Option<Os>,
    #[arg(long)]
    architecture: Option<Architecture>,
    #[arg(long)]
    image_type: Option<ImageType>,
    #[arg(long)]
    jvm_impl: Option<JvmVariant>,
    #[arg(long)]
    heap_size: Option<HeapSize>,
    #[arg(long)]
    project: Option<Project>,
    /// Keep only binaries updated before this RFC 3339 instant
    #[arg(long)]
    before: Option<DateTime<Utc>>,
}

impl From<BinaryArgs> for BinaryFilter {
    fn from(args: BinaryArgs) -> Self {
        BinaryFilter {
            os: args.os,
            architecture: args.architecture,
            image_type: args.image_type,
            jvm_variant: args.jvm_impl,
            heap_size: args.heap_size,
            project: args.project,
            updated_before: args.before,
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<IndexConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = config::config_path();
            if !default_path.exists() {
                return Ok(IndexConfig::default());
            }
            default_path
        }
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn open_database(path: Option<&Path>) -> anyhow::Result<ReleaseDatabase> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config::db_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    ReleaseDatabase::new(&path).with_context(|| format!("failed to open {}", path.display()))
}

fn print_json_lines<T, I>(items: I) -> anyhow::Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut out = io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut out, &item)?;
        writeln!(out)?;
    }
    Ok(())
}

async fn load_snapshot(
    database: &ReleaseDatabase,
    config: &IndexConfig,
) -> anyhow::Result<RepositorySnapshot> {
    Ok(read_snapshot(database, config).await?)
}

async fn run(cli: Cli, config: IndexConfig) -> anyhow::Result<()> {
    let database = open_database(cli.database.as_deref())?;

    match cli.command {
        Command::Import { file, prune } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let releases = parse_releases(&json, &VersionParser::new())?;
            let untracked = releases
                .iter()
                .filter(|release| !config.feature_versions.contains(&release.feature_version()))
                .count();
            if untracked > 0 {
                warn!(
                    "{} releases belong to feature versions that are not refreshed",
                    untracked
                );
            }
            let summary = import_releases(&database, releases, prune)?;
            print_json_lines([serde_json::json!({
                "upserted": summary.upserted,
                "unchanged": summary.unchanged,
                "removed": summary.removed,
                "last_imported_at": database.last_imported_at()?,
            })])
        }
        Command::Query(args) => {
            let snapshot = load_snapshot(&database, &config).await?;
            let ranges = RangeCache::new();
            let release_filter = ReleaseFilter {
                release_kind: args.release_type,
                feature_version: args.feature_version,
                release_name: args.release_name,
                vendor: args.vendor,
                lts: args.lts,
                version_range: args
                    .version
                    .as_deref()
                    .map(|spec| ranges.create_from_spec(spec))
                    .transpose()?,
                ..ReleaseFilter::new(&config.lts_versions)
            };
            let binary_filter = BinaryFilter::from(args.binary);

            let page: Vec<_> = snapshot
                .get_filtered_releases(
                    &release_filter,
                    &binary_filter,
                    args.sort_order,
                    args.sort_method,
                )
                .skip(args.page.saturating_mul(args.page_size))
                .take(args.page_size)
                .collect();
            print_json_lines(page.iter().map(|release| &**release))
        }
        Command::Available => {
            let snapshot = load_snapshot(&database, &config).await?;
            print_json_lines([snapshot.available_releases(&config.lts_versions)])
        }
        Command::Latest {
            feature_version,
            binary,
        } => {
            let snapshot = load_snapshot(&database, &config).await?;
            print_json_lines(snapshot.latest_binaries(feature_version, &binary.into()))
        }
        Command::Watch => {
            let store = SnapshotStore::default();
            let shutdown = CancellationToken::new();

            let signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping refresh loop");
                }
                signal.cancel();
            });

            run_refresh_loop(&store, &database, &config, shutdown).await;
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let _guard = init_logging(&config::log_path()).context("failed to initialize logging")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config))
}
