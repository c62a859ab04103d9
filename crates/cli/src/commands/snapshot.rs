//! Snapshot output and verification.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use storefront_infra::{Database, Snapshot, TableCounts};

/// Serialize every table of `db` as pretty JSON.
pub fn dump(db: &Database) -> anyhow::Result<String> {
    let snapshot = db.snapshot().context("reading tables")?;
    snapshot.to_json().context("serializing snapshot")
}

/// Load a snapshot file and rebuild a database from it, enforcing every
/// constraint. Returns the restored row counts.
pub fn check(path: &Path) -> anyhow::Result<TableCounts> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let snapshot = Snapshot::from_json(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    let db = Database::restore(snapshot)
        .with_context(|| format!("restoring {}", path.display()))?;

    let counts = db.counts()?;
    info!(path = %path.display(), rows = ?counts, "snapshot is consistent");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::seed::demo_database;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("storefront-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn dumped_snapshot_checks_clean() {
        let db = demo_database(2).unwrap();
        let path = temp_file("clean.json", &dump(&db).unwrap());

        let counts = check(&path).unwrap();
        assert_eq!(counts, db.counts().unwrap());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn dangling_reference_fails_the_check() {
        let db = demo_database(1).unwrap();
        let mut snapshot = db.snapshot().unwrap();
        snapshot.collections.clear();
        let path = temp_file("dangling.json", &snapshot.to_json().unwrap());

        let err = check(&path).unwrap_err();
        assert!(format!("{err:#}").contains("references missing row"));
        std::fs::remove_file(path).ok();
    }
}
