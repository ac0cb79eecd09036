//! Loading release documents into the database
//!
//! Documents follow the `Release` JSON layout. `version_data` may be omitted, in which case it is
//! parsed from `release_name`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::release::index::ReleaseIndex;
use crate::release::types::Release;
use crate::store::database::ReleaseDatabase;
use crate::store::error::{ImportError, SourceError};
use crate::store::refresh::plan_sync;
use crate::version::parser::VersionParser;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub upserted: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Parse a JSON array of release documents
pub fn parse_releases(json: &str, parser: &VersionParser) -> Result<Vec<Release>, ImportError> {
    let documents: Vec<Value> = serde_json::from_str(json)?;

    documents
        .into_iter()
        .enumerate()
        .map(|(position, mut document)| {
            if document.get("version_data").is_none() {
                let name = document
                    .get("release_name")
                    .and_then(Value::as_str)
                    .ok_or(ImportError::MissingName(position))?
                    .to_string();
                let version = parser
                    .parse_release_name(&name)
                    .map_err(|source| ImportError::Version { name, source })?;
                document["version_data"] = serde_json::to_value(version)?;
            }
            Ok(serde_json::from_value(document)?)
        })
        .collect()
}

/// Write `releases` to `database`, skipping those already stored with the same `updated_at`
///
/// With `prune`, stored releases of the touched feature versions that are absent from
/// `releases` are deleted.
pub fn import_releases(
    database: &ReleaseDatabase,
    releases: Vec<Release>,
    prune: bool,
) -> Result<ImportSummary, SourceError> {
    let mut by_feature_version: BTreeMap<u32, Vec<Release>> = BTreeMap::new();
    for release in releases {
        by_feature_version
            .entry(release.feature_version())
            .or_default()
            .push(release);
    }

    let mut summary = ImportSummary::default();
    for (feature_version, incoming) in by_feature_version {
        let existing = match database.read_feature_group(feature_version) {
            Ok(group) => group.releases,
            Err(SourceError::NotFound(_)) => ReleaseIndex::default(),
            Err(e) => return Err(e),
        };

        let plan = plan_sync(&existing, &incoming);
        debug!(
            "Feature version {}: {} to upsert, {} stale",
            feature_version,
            plan.upserts.len(),
            plan.removals.len()
        );

        summary.unchanged += incoming.len() - plan.upserts.len();
        summary.upserted += database.upsert_releases(&plan.upserts)?;
        if prune {
            for id in &plan.removals {
                if database.remove_release(id)? {
                    summary.removed += 1;
                }
            }
        }
    }

    info!(
        "Imported releases: {} upserted, {} unchanged, {} removed",
        summary.upserted, summary.unchanged, summary.removed
    );
    Ok(summary)
}
