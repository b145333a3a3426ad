//! # Persist Module
//!
//! Saving and loading trees as JSON snapshots.
//!
//! A snapshot is an object of top-level entries keyed by name; every entry
//! carries `name`, `path`, `isDir`, `modified`, `size` and `children`.
//! Files written with `modifiedTime` instead of `modified` load too.
//! Child order survives a round trip.

use crate::core::tree::Tree;
use crate::error::{PersistError, ScanError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write `tree` to `path` as pretty-printed JSON
pub fn save_snapshot(tree: &Tree, path: &Path) -> Result<(), PersistError> {
    let io_error = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, tree).map_err(|source| PersistError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;

    tracing::info!("Saved snapshot of {} entries to {}", tree.len(), path.display());
    Ok(())
}

/// Read a tree saved by [`save_snapshot`]
pub fn load_snapshot(path: &Path) -> Result<Tree, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree: Tree = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        PersistError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::info!("Loaded snapshot of {} entries from {}", tree.len(), path.display());
    Ok(tree)
}

/// Where a tree comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    /// A directory to scan
    Directory(PathBuf),
    /// A snapshot file to load
    Snapshot(PathBuf),
}

impl TreeSource {
    /// Directories are scanned, regular files are loaded as snapshots
    pub fn detect(path: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let path = path.into();
        if path.is_dir() {
            Ok(Self::Directory(path))
        } else if path.is_file() {
            Ok(Self::Snapshot(path))
        } else {
            Err(ScanError::DirectoryNotFound { path })
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Snapshot(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Entry;
    use tempfile::TempDir;

    fn sample() -> Tree {
        Tree::from_entries([
            Entry::dir(
                "/data/z-dir",
                [
                    Entry::file("/data/z-dir/b", 2, 20.5),
                    Entry::file("/data/z-dir/a", 1, 10.0),
                ],
            ),
            Entry::file("/data/a-file", 3, 30.0),
        ])
    }

    #[test]
    fn save_then_load_preserves_tree_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");

        save_snapshot(&sample(), &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, sample());
        let children: Vec<_> = loaded.entries()["z-dir"].children.keys().cloned().collect();
        assert_eq!(children, vec!["b", "a"]);
    }

    #[test]
    fn snapshot_uses_camel_case_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");
        save_snapshot(&sample(), &path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"isDir\""));
        assert!(json.contains("\"modified\""));
        assert!(!json.contains("originPath"));
    }

    #[test]
    fn loads_legacy_snapshot_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"{"x": {"name": "x", "path": "/old/x", "isDir": false, "modifiedTime": 12, "size": 4, "children": {}}}"#,
        )
        .unwrap();

        let tree = load_snapshot(&path).unwrap();
        let x = &tree.entries()["x"];

        assert_eq!(x.modified, 12.0);
        assert_eq!(x.size, 4);
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[not a tree").unwrap();

        let err = load_snapshot(&path).unwrap_err();

        assert!(matches!(err, PersistError::Malformed { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let err = load_snapshot(Path::new("/nonexistent/snap.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }

    #[test]
    fn detect_picks_source_kind() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("snap.json");
        std::fs::write(&file, "{}").unwrap();

        assert_eq!(
            TreeSource::detect(dir.path()).unwrap(),
            TreeSource::Directory(dir.path().to_path_buf())
        );
        assert_eq!(TreeSource::detect(&file).unwrap(), TreeSource::Snapshot(file.clone()));
        assert!(TreeSource::detect(dir.path().join("nope")).is_err());
    }
}
