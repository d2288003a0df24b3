//! Manifest store error-message, atomic-write, and validation integration tests.

use assert_fs::prelude::*;
use predicates::prelude::*;
use roadmap_core::{manifest, validate, FindingCode, ManifestError};
use std::fs;

const VALID: &str = r#"{
    "updated": "2025-10-05",
    "projects": [
        {"id": "api", "name": "API", "description": "Backend", "category": "Backend", "repo": "me/api"},
        {"id": "web", "name": "Web", "description": "Frontend", "category": "Frontend", "repo": "me/web"}
    ],
    "milestones": [],
    "progress": {"Backend": 10}
}"#;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_manifest_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = manifest::load(&dir.path().join("manifest.json")).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("manifest not found"));
    assert!(err.to_string().contains("manifest.json"));
}

#[test]
fn load_corrupt_json_returns_malformed_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str("{ \"updated\": \"2025-10-05\", \"projects\": [ ").expect("write");

    let err = manifest::load(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Malformed { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("manifest.json"), "must contain file path, got: {msg}");
}

#[test]
fn load_without_required_field_names_it() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str(r#"{"updated": "2025-10-05", "projects": [], "progress": {}}"#)
        .expect("write");

    let err = manifest::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("milestones"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_cleans_up_tmp_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    let m = manifest::parse(file.path(), VALID).expect("parse");

    manifest::save(file.path(), &m).expect("save");

    file.assert(predicate::path::exists());
    dir.child("manifest.json.tmp").assert(predicate::path::missing());
}

#[test]
fn save_replaces_previous_contents_whole() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str(VALID).expect("write");

    let mut m = manifest::load(file.path()).expect("load");
    m.projects.truncate(1);
    manifest::save(file.path(), &m).expect("save");

    file.assert(predicate::str::contains("\"api\""));
    file.assert(predicate::str::contains("\"web\"").not());
}

#[test]
fn failed_save_leaves_original_untouched() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str(VALID).expect("write");
    let m = manifest::load(file.path()).expect("load");

    // A directory squatting on the tmp path makes the write fail before rename.
    fs::create_dir(dir.path().join("manifest.json.tmp")).expect("mkdir");
    let err = manifest::save(file.path(), &m).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }), "got: {err}");

    file.assert(VALID);
}

// ---------------------------------------------------------------------------
// 3. Load then validate
// ---------------------------------------------------------------------------

#[test]
fn duplicate_identifier_is_fatal_after_load() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str(&VALID.replace("\"id\": \"web\"", "\"id\": \"api\"")).expect("write");

    let m = manifest::load(file.path()).expect("load");
    let result = validate(&m, &[]);
    assert!(result.is_fatal());
    assert!(result.has(FindingCode::DuplicateIdentifier));
    let finding = result.fatal().next().expect("one fatal finding");
    assert_eq!(finding.location, "projects[1]");
}

#[test]
fn every_problem_is_reported_in_one_pass() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("manifest.json");
    file.write_str(
        r#"{
        "updated": "2025-10-05",
        "projects": [
            {"id": "api", "name": "API", "description": "x", "repo": "not a repo"},
            {"id": "api", "name": "API again", "description": "y"}
        ],
        "milestones": [{"title": "t", "category": "Nowhere", "project": "ghost"}],
        "progress": {"Backend": 150}
    }"#,
    )
    .expect("write");

    let m = manifest::load(file.path()).expect("load");
    let result = validate(&m, &[]);
    for code in [
        FindingCode::DuplicateIdentifier,
        FindingCode::InvalidReference,
        FindingCode::InvalidProgress,
        FindingCode::OrphanCategory,
        FindingCode::UnknownProject,
    ] {
        assert!(result.has(code), "missing {code}: {:?}", result.findings);
    }
    assert_eq!(result.warnings().count(), 1);
}
