//! Local document reconciliation.
//!
//! ## Protocol
//!
//! 1. Read the current document (absent → empty baseline).
//! 2. Splice the candidate region between its markers.
//! 3. Compare → `Unchanged` if identical.
//! 4. Dry-run → `WouldCreate` / `WouldUpdate` with a unified diff.
//! 5. Write to `<path>.roadmap.tmp`, then rename over the target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use roadmap_renderer::markers;

use crate::diff::{self, normalize_line_endings};
use crate::error::{io_err, SyncError};
use crate::report::Outcome;

/// Current content of `path`, or `None` if it does not exist.
pub fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(normalize_line_endings(&content))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// The document as it should be after reconciliation: `(before, after)`.
pub fn plan(path: &Path, section: &str, body: &str) -> Result<(Option<String>, String), SyncError> {
    let existing = read_existing(path)?;
    let candidate = markers::splice(existing.as_deref().unwrap_or(""), section, body)?;
    Ok((existing, candidate))
}

/// Bring the `section` region of `path` up to date with `body`.
///
/// `label` is the path shown in diff headers.
pub fn reconcile_document(
    path: &Path,
    label: &str,
    section: &str,
    body: &str,
    dry_run: bool,
) -> Result<Outcome, SyncError> {
    let (existing, candidate) = plan(path, section, body)?;

    if existing.as_deref() == Some(candidate.as_str()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(Outcome::Unchanged);
    }

    if dry_run {
        let before = existing.as_deref().unwrap_or("");
        let diff = diff::unified(label, before, &candidate);
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(match existing {
            None => Outcome::WouldCreate { diff },
            Some(_) => Outcome::WouldUpdate { diff },
        });
    }

    atomic_write(path, &candidate)?;
    tracing::info!("wrote: {}", path.display());
    Ok(match existing {
        None => Outcome::Created,
        Some(_) => Outcome::Updated { fields: Vec::new() },
    })
}

/// `<path>.roadmap.tmp`: pure, no I/O.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.roadmap.tmp", path.display()))
}

pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = tmp_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn creates_then_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");

        let first = reconcile_document(&path, "README.md", "overview", "body", false).unwrap();
        assert_eq!(first, Outcome::Created);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<!-- roadmap:begin overview -->\nbody\n<!-- roadmap:end overview -->\n"
        );

        let second = reconcile_document(&path, "README.md", "overview", "body", false).unwrap();
        assert_eq!(second, Outcome::Unchanged);
        assert!(!tmp_path(&path).exists(), "tmp file should be removed after atomic rename");
    }

    #[test]
    fn updates_region_and_keeps_prose() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(
            &path,
            "# Hi\n\n<!-- roadmap:begin overview -->\nold\n<!-- roadmap:end overview -->\n\nbye\n",
        )
        .unwrap();

        let outcome = reconcile_document(&path, "README.md", "overview", "new", false).unwrap();
        assert_eq!(outcome, Outcome::Updated { fields: vec![] });
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Hi\n\n<!-- roadmap:begin overview -->\nnew\n<!-- roadmap:end overview -->\n\nbye\n"
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");

        let outcome = reconcile_document(&path, "README.md", "overview", "body", true).unwrap();
        let diff = outcome.diff().expect("dry-run carries a diff");
        assert!(matches!(outcome, Outcome::WouldCreate { .. }));
        assert!(diff.contains("+++ b/README.md"));
        assert!(diff.contains("+body"));
        assert!(!path.exists());
    }

    #[test]
    fn crlf_line_endings_are_normalized_on_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(
            &path,
            "<!-- roadmap:begin overview -->\r\nbody\r\n<!-- roadmap:end overview -->\r\n",
        )
        .unwrap();

        let outcome = reconcile_document(&path, "README.md", "overview", "body", false).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn marker_mismatch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "<!-- roadmap:begin overview -->\nno end\n").unwrap();
        let err = reconcile_document(&path, "README.md", "overview", "x", false).unwrap_err();
        assert!(matches!(err, SyncError::Render(_)), "got: {err}");
    }
}
