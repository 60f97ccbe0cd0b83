//! # Key Configuration Directory
//!
//! Every `*.yaml` / `*.yml` file in the directory holds one
//! [`SigningMetadata`] document. Other files are ignored.

use crate::domain::SigningMetadata;
use crate::error::{SigningError, SigningResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse every metadata file under `dir`, sorted by path.
pub fn load_metadata_dir(dir: &Path) -> SigningResult<Vec<(PathBuf, SigningMetadata)>> {
    let entries = fs::read_dir(dir).map_err(|source| SigningError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SigningError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let metadata = load_metadata_file(&path)?;
        debug!(path = %path.display(), backend = metadata.backend(), "Loaded signing metadata");
        loaded.push((path, metadata));
    }
    Ok(loaded)
}

pub fn load_metadata_file(path: &Path) -> SigningResult<SigningMetadata> {
    let text = fs::read_to_string(path).map_err(|source| SigningError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    SigningMetadata::from_yaml(&text).map_err(|source| SigningError::InvalidMetadata {
        path: path.to_path_buf(),
        source,
    })
}
