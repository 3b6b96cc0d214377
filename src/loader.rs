//! Startup bulk load of a zipped JSON dataset.
//!
//! The archive holds `<entity>_<n>.json` shards (`users`, `locations`,
//! `visits`) and one `options` entry. Entries are handled in archive order;
//! shards referencing rows from a later shard fail on the foreign keys.

use chrono::DateTime;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::models::{Location, User, Visit};
use crate::query::Record;
use crate::store;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to read entry {entry}: {source}")]
    Read {
        entry: String,
        source: std::io::Error,
    },
    #[error("malformed entry {entry}: {source}")]
    Parse {
        entry: String,
        source: serde_json::Error,
    },
    #[error("failed to populate from {entry}: {source}")]
    Store {
        entry: String,
        source: sqlx::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Options,
    Users,
    Locations,
    Visits,
    Unknown,
}

/// Classify an archive entry by its file name.
pub fn classify(name: &str) -> EntryKind {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    if stem == "options" {
        return EntryKind::Options;
    }

    match stem.rsplit_once('_') {
        Some(("users", _)) => EntryKind::Users,
        Some(("locations", _)) => EntryKind::Locations,
        Some(("visits", _)) => EntryKind::Visits,
        _ => EntryKind::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataOptions {
    pub timestamp: i64,
    pub kind: String,
}

/// Parse the `"<timestamp>\n<type>\n"` options entry.
pub fn parse_options(text: &str) -> Option<DataOptions> {
    let mut lines = text.lines().map(str::trim);
    let timestamp = lines.next()?.parse().ok()?;
    let kind = lines.next().filter(|kind| !kind.is_empty())?;
    Some(DataOptions {
        timestamp,
        kind: kind.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: usize,
    pub locations: usize,
    pub visits: usize,
    pub skipped: usize,
    pub options: Option<DataOptions>,
}

#[derive(Deserialize)]
struct UsersShard {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct LocationsShard {
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct VisitsShard {
    visits: Vec<Visit>,
}

pub async fn load_archive(pool: &SqlitePool, path: &Path) -> Result<LoadSummary, LoadError> {
    tracing::info!("loading data from {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;
    let mut summary = LoadSummary::default();

    for index in 0..archive.len() {
        let (name, kind, bytes) = read_entry(&mut archive, index)?;

        match kind {
            EntryKind::Options => {
                summary.options = read_options(&name, &bytes);
            }
            EntryKind::Users => {
                let shard: UsersShard = parse(&name, &bytes)?;
                summary.users += populate(pool, &name, &shard.users).await?;
            }
            EntryKind::Locations => {
                let shard: LocationsShard = parse(&name, &bytes)?;
                summary.locations += populate(pool, &name, &shard.locations).await?;
            }
            EntryKind::Visits => {
                let shard: VisitsShard = parse(&name, &bytes)?;
                summary.visits += populate(pool, &name, &shard.visits).await?;
            }
            EntryKind::Unknown => {
                tracing::debug!("skipping archive entry {name}");
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        users = summary.users,
        locations = summary.locations,
        visits = summary.visits,
        skipped = summary.skipped,
        "loaded data from {}",
        path.display()
    );
    Ok(summary)
}

fn read_options(entry: &str, bytes: &[u8]) -> Option<DataOptions> {
    let Some(options) = parse_options(&String::from_utf8_lossy(bytes)) else {
        tracing::warn!("ignoring malformed options entry {entry}");
        return None;
    };

    match DateTime::from_timestamp(options.timestamp, 0) {
        Some(at) => tracing::info!("data generated at {at} with type {}", options.kind),
        None => tracing::info!(
            "data generated at {} with type {}",
            options.timestamp,
            options.kind
        ),
    }
    Some(options)
}

// The zip entry handle is dropped when this returns, before any parsing or
// store work on its contents. Unknown entries are not read at all.
fn read_entry(
    archive: &mut ZipArchive<File>,
    index: usize,
) -> Result<(String, EntryKind, Vec<u8>), LoadError> {
    let mut entry = archive.by_index(index)?;
    let name = entry.name().to_string();
    let kind = if entry.is_dir() {
        EntryKind::Unknown
    } else {
        classify(&name)
    };

    if kind == EntryKind::Unknown {
        return Ok((name, kind, Vec::new()));
    }

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Read {
            entry: name.clone(),
            source,
        })?;
    Ok((name, kind, bytes))
}

fn parse<'a, T: Deserialize<'a>>(entry: &str, bytes: &'a [u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        entry: entry.to_string(),
        source,
    })
}

async fn populate<R: Record>(pool: &SqlitePool, entry: &str, rows: &[R]) -> Result<usize, LoadError> {
    let store_error = |source: sqlx::Error| LoadError::Store {
        entry: entry.to_string(),
        source,
    };

    let mut tx = pool.begin().await.map_err(store_error)?;
    for row in rows {
        store::insert(&mut *tx, row).await.map_err(store_error)?;
    }
    tx.commit().await.map_err(store_error)?;

    tracing::debug!("inserted {} rows from {entry}", rows.len());
    Ok(rows.len())
}
