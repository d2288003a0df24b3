//! Load → save → load must be lossless for every manifest shape we accept.
//!
//! Each `#[case]` is isolated: no shared state.

use roadmap_core::manifest;
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MINIMAL: &str = r#"{
    "updated": "2025-10-05",
    "projects": [],
    "milestones": [],
    "progress": {}
}"#;

const ALL_FIELDS: &str = r#"{
    "updated": "2025-10-05",
    "focus": "Finish the IAM demo",
    "projects": [{
        "id": "flutter-iam",
        "name": "Flutter IAM",
        "description": "Role-based access demo",
        "long_description": "Longer prose kept as an extra field.",
        "category": "Flutter",
        "topics": ["flutter", "rbac"],
        "status": "active",
        "target": "2025-12-01",
        "repo": "Krispy145/flutter-iam",
        "cover_url": "images/flutter-iam/cover.webp"
    }],
    "milestones": [{
        "id": "iam-01",
        "title": "Login screen",
        "category": "Flutter",
        "project": "flutter-iam",
        "due": "2025-11-01",
        "status": "in-progress",
        "notes": {"owner": "me", "estimate": 3}
    }],
    "progress": {"Flutter": 40, "Learning": 12.5},
    "categories": ["Certifications"]
}"#;

const UNICODE: &str = r#"{
    "updated": "2025-10-05",
    "projects": [{
        "id": "アプリ-проект",
        "name": "Émoji 🚀 | pipes & <tags>",
        "description": "日本語・한국어・العربية",
        "status": "archived"
    }],
    "milestones": [{"title": "Étape ✅", "category": "Учёба", "status": "blocked"}],
    "progress": {"Учёба": 5}
}"#;

const LEGACY: &str = r#"{
    "updated": "05/10/2025",
    "repositories": [{
        "name": "secure-ai-api",
        "url": "https://github.com/Krispy145/secure-ai-api",
        "short_description": "FastAPI service",
        "status": "stub"
    }],
    "milestones_flat": [
        {"title": "JWT auth", "repo": "secure-ai-api", "date": "01/11/2025", "status": "todo"}
    ],
    "progress": {"Backend": 30}
}"#;

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("minimal", MINIMAL)]
#[case("all_fields", ALL_FIELDS)]
#[case("unicode_and_unknown_status", UNICODE)]
#[case("legacy_shape", LEGACY)]
fn manifest_roundtrip(#[case] label: &str, #[case] text: &str) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(manifest::MANIFEST_FILE);
    std::fs::write(&path, text).expect("write");

    let first = manifest::load(&path).unwrap_or_else(|e| panic!("[{label}] load failed: {e}"));
    manifest::save(&path, &first).unwrap_or_else(|e| panic!("[{label}] save failed: {e}"));
    let second = manifest::load(&path).unwrap_or_else(|e| panic!("[{label}] reload failed: {e}"));

    assert_eq!(first, second, "[{label}] load(save(load(m))) != load(m)");

    // A second save is byte-identical: the canonical form is a fixed point.
    let once = std::fs::read_to_string(&path).expect("read");
    manifest::save(&path, &second).expect("save again");
    let twice = std::fs::read_to_string(&path).expect("read");
    assert_eq!(once, twice, "[{label}] canonical form drifted");
}

#[test]
fn extras_survive_in_place() {
    let m = manifest::parse(std::path::Path::new("m.json"), ALL_FIELDS).expect("parse");
    assert_eq!(m.extra["focus"], "Finish the IAM demo");
    assert_eq!(m.projects[0].extra["cover_url"], "images/flutter-iam/cover.webp");
    assert_eq!(m.milestones[0].extra["notes"]["estimate"], 3);

    let json = manifest::to_json(&m).expect("json");
    assert!(json.contains("\"long_description\""));
    assert!(json.contains("\"Learning\": 12.5"));
}

#[test]
fn legacy_shape_is_saved_canonically() {
    let m = manifest::parse(std::path::Path::new("m.json"), LEGACY).expect("parse");
    let json = manifest::to_json(&m).expect("json");
    assert!(json.contains("\"projects\""));
    assert!(!json.contains("\"repositories\""));
    assert!(json.contains("\"repo\": \"Krispy145/secure-ai-api\""));
    assert!(json.contains("\"due\": \"2025-11-01\""));
    assert!(json.contains("\"status\": \"scaffolded\""));
}
