//! Manifest store: load, normalize, and atomically save `manifest.json`.
//!
//! # Lifecycle
//!
//! Every operation loads the whole manifest, mutates it in memory, and (only
//! when asked) saves the whole aggregate back. There are no partial-field
//! updates. Single writer, single process.
//!
//! # Save protocol
//!
//! serialize → `<file>.tmp` sibling → `rename` over the target. The `.tmp` is
//! always in the same directory as the target so the rename never crosses a
//! filesystem; a crash before the rename leaves the previous manifest intact.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{io_err, ManifestError};
use crate::normalize;
use crate::types::Manifest;

/// Default manifest file name, relative to the working directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Load and normalize the manifest at `path`.
///
/// Returns [`ManifestError::NotFound`] if absent and
/// [`ManifestError::Malformed`] (with path and reason) if the file is not
/// JSON, is missing a required top-level field, or a field has the wrong shape.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse(path, &contents)
}

/// Parse manifest text. `path` is only used for error context.
pub fn parse(path: &Path, contents: &str) -> Result<Manifest, ManifestError> {
    let malformed = |reason: String| ManifestError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let raw: Value = serde_json::from_str(contents).map_err(|e| malformed(e.to_string()))?;
    let canonical = normalize::normalize(raw).map_err(malformed)?;
    let manifest: Manifest =
        serde_json::from_value(canonical).map_err(|e| malformed(e.to_string()))?;

    tracing::debug!(
        "loaded manifest {}: {} projects, {} milestones",
        path.display(),
        manifest.projects.len(),
        manifest.milestones.len()
    );
    Ok(manifest)
}

/// Serialize a manifest the way [`save`] writes it (pretty JSON, trailing newline).
pub fn to_json(manifest: &Manifest) -> Result<String, ManifestError> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    Ok(json)
}

/// Atomically replace the manifest at `path`.
pub fn save(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let json = to_json(manifest)?;
    let tmp = tmp_path(path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    tracing::info!("saved manifest {}", path.display());
    Ok(())
}

/// `<path>.tmp`: pure, no I/O.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| MANIFEST_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
