//! One-shot normalization of historical manifest shapes.
//!
//! Older manifests used `repositories` instead of `projects`, GitHub URLs
//! instead of `owner/repo` references, `dd/mm/yyyy` dates and a looser status
//! vocabulary. All of that is rewritten here, on the raw JSON value, before
//! typed decoding, so nothing downstream has to branch on shape.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

/// Top-level fields that must be present after aliasing.
pub const REQUIRED_FIELDS: &[&str] = &["updated", "projects", "milestones", "progress"];

/// Category assigned to milestones that never declared one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Rewrite a raw manifest value into the canonical schema.
///
/// Returns a human-readable reason on failure; the store wraps it into
/// `ManifestError::Malformed` together with the file path.
pub fn normalize(mut raw: Value) -> Result<Value, String> {
    let root = raw
        .as_object_mut()
        .ok_or_else(|| "top-level value is not an object".to_string())?;

    rename_key(root, "repositories", "projects");
    rename_key(root, "milestones_flat", "milestones");

    for field in REQUIRED_FIELDS {
        if !root.contains_key(*field) {
            return Err(format!("missing required field `{field}`"));
        }
    }

    normalize_date(root, "updated", "updated")?;
    if !root.contains_key("updated") {
        return Err("missing required field `updated`".to_string());
    }

    let projects = root
        .get_mut("projects")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| "`projects` must be a list".to_string())?;
    for (i, item) in projects.iter_mut().enumerate() {
        let obj = item
            .as_object_mut()
            .ok_or_else(|| format!("projects[{i}] is not an object"))?;
        normalize_project(obj, i)?;
    }

    let milestones = root
        .get_mut("milestones")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| "`milestones` must be a list".to_string())?;
    for (i, item) in milestones.iter_mut().enumerate() {
        let obj = item
            .as_object_mut()
            .ok_or_else(|| format!("milestones[{i}] is not an object"))?;
        normalize_milestone(obj, i)?;
    }

    if !root.get("progress").is_some_and(Value::is_object) {
        return Err("`progress` must be a map of category to percentage".to_string());
    }

    Ok(raw)
}

fn normalize_project(obj: &mut Map<String, Value>, index: usize) -> Result<(), String> {
    let ctx = format!("projects[{index}]");

    if !obj.contains_key("id") {
        let Some(Value::String(slug)) = obj.get("name").cloned() else {
            return Err(format!("{ctx}: needs an `id` or `name`"));
        };
        obj.insert("id".into(), Value::String(slug.clone()));
        obj.insert("name".into(), Value::String(title_case(&slug)));
    }
    if !obj.contains_key("name") {
        if let Some(Value::String(id)) = obj.get("id").cloned() {
            obj.insert("name".into(), Value::String(title_case(&id)));
        }
    }

    if let Some(short) = obj.remove("short_description") {
        if let Some(long) = obj.remove("description") {
            if long != short && !obj.contains_key("long_description") {
                obj.insert("long_description".into(), long);
            }
        }
        obj.insert("description".into(), short);
    }
    if obj.get("description").is_some_and(Value::is_null) {
        obj.remove("description");
    }

    if !obj.contains_key("repo") {
        if let Some(Value::String(url)) = obj.get("url").cloned() {
            let repo = repo_from_url(&url).unwrap_or(url);
            obj.remove("url");
            obj.insert("repo".into(), Value::String(repo));
        }
    }
    drop_null(obj, "repo");
    drop_null(obj, "category");
    if obj.get("topics").is_some_and(Value::is_null) {
        obj.insert("topics".into(), Value::Array(vec![]));
    }

    if let Some(status) = lowercase_string(obj, "status") {
        let canonical = match status.as_str() {
            "stub" => "scaffolded".to_string(),
            "scaffold" => "scaffolded".to_string(),
            "" => "planned".to_string(),
            _ => status,
        };
        obj.insert("status".into(), Value::String(canonical));
    }

    normalize_date(obj, "target", &ctx)
}

fn normalize_milestone(obj: &mut Map<String, Value>, index: usize) -> Result<(), String> {
    let ctx = format!("milestones[{index}]");

    if !obj.contains_key("due") || obj.get("due").is_some_and(Value::is_null) {
        if let Some(date) = obj.remove("date") {
            obj.insert("due".into(), date);
        }
    }
    if !obj.contains_key("project") {
        if let Some(repo) = obj.remove("repo") {
            obj.insert("project".into(), repo);
        }
    }
    drop_null(obj, "project");
    drop_null(obj, "id");

    let needs_category = match obj.get("category") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if needs_category {
        obj.insert("category".into(), Value::String(DEFAULT_CATEGORY.into()));
    }

    if let Some(status) = lowercase_string(obj, "status") {
        let canonical = match status.as_str() {
            "todo" | "" => "planned",
            "in_progress" | "in progress" | "active" => "in-progress",
            other => other,
        };
        obj.insert("status".into(), Value::String(canonical.to_string()));
    }

    normalize_date(obj, "due", &ctx)
}

/// Parse any of the date spellings found in manifests: ISO `yyyy-mm-dd`,
/// `dd/mm/yyyy`, or a full RFC 3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Extract `owner/repo` from a GitHub-style URL.
///
/// `https://github.com/owner/repo(.git)(/)` → `owner/repo`.
pub fn repo_from_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let path = rest.split_once('/').map(|(_, path)| path)?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [owner, repo] => Some(format!("{owner}/{repo}")),
        _ => None,
    }
}

/// `ml-foundations` → `Ml Foundations`.
pub fn title_case(slug: &str) -> String {
    slug.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if obj.contains_key(to) {
        return;
    }
    if let Some(value) = obj.remove(from) {
        obj.insert(to.to_string(), value);
    }
}

fn drop_null(obj: &mut Map<String, Value>, key: &str) {
    if obj.get(key).is_some_and(Value::is_null) {
        obj.remove(key);
    }
}

fn lowercase_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.trim().to_lowercase()),
        _ => None,
    }
}

fn normalize_date(obj: &mut Map<String, Value>, key: &str, ctx: &str) -> Result<(), String> {
    match obj.get(key) {
        None => Ok(()),
        Some(Value::Null) => {
            obj.remove(key);
            Ok(())
        }
        Some(Value::String(s)) if s.trim().is_empty() || s.trim() == "—" => {
            obj.remove(key);
            Ok(())
        }
        Some(Value::String(s)) => {
            let date = parse_date(s)
                .ok_or_else(|| format!("{ctx}: unrecognized date `{s}` in `{key}`"))?;
            obj.insert(key.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
            Ok(())
        }
        Some(other) => Err(format!("{ctx}: `{key}` must be a date string, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_shape_is_rewritten() {
        let raw = json!({
            "updated": "05/10/2025",
            "repositories": [{
                "name": "secure-ai-api",
                "url": "https://github.com/Krispy145/secure-ai-api.git",
                "description": "A long description",
                "short_description": "FastAPI service",
                "status": "Stub",
                "target": "31/12/2025"
            }],
            "milestones_flat": [{
                "title": "JWT auth",
                "repo": "secure-ai-api",
                "date": "2025-11-01",
                "status": "in_progress"
            }],
            "progress": {"backend": 30}
        });

        let out = normalize(raw).expect("normalize");
        assert_eq!(out["updated"], "2025-10-05");

        let project = &out["projects"][0];
        assert_eq!(project["id"], "secure-ai-api");
        assert_eq!(project["name"], "Secure Ai Api");
        assert_eq!(project["description"], "FastAPI service");
        assert_eq!(project["long_description"], "A long description");
        assert_eq!(project["repo"], "Krispy145/secure-ai-api");
        assert_eq!(project["status"], "scaffolded");
        assert_eq!(project["target"], "2025-12-31");
        assert!(project.get("url").is_none());

        let milestone = &out["milestones"][0];
        assert_eq!(milestone["project"], "secure-ai-api");
        assert_eq!(milestone["due"], "2025-11-01");
        assert_eq!(milestone["status"], "in-progress");
        assert_eq!(milestone["category"], DEFAULT_CATEGORY);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let raw = json!({"updated": "2025-01-01", "projects": [], "milestones": []});
        let err = normalize(raw).unwrap_err();
        assert!(err.contains("progress"), "got: {err}");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = normalize(json!([1, 2, 3])).unwrap_err();
        assert!(err.contains("not an object"));
    }

    #[test]
    fn bad_date_names_the_field() {
        let raw = json!({
            "updated": "2025-01-01",
            "projects": [{"id": "x", "target": "next spring"}],
            "milestones": [],
            "progress": {}
        });
        let err = normalize(raw).unwrap_err();
        assert!(err.contains("projects[0]") && err.contains("target"), "got: {err}");
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let raw = json!({
            "updated": "2025-01-01",
            "projects": [],
            "milestones": [{"title": "t", "category": "c", "status": "Blocked"}],
            "progress": {}
        });
        let out = normalize(raw).expect("normalize");
        assert_eq!(out["milestones"][0]["status"], "blocked");
    }

    #[test]
    fn date_spellings() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 5);
        assert_eq!(parse_date("2025-10-05"), expected);
        assert_eq!(parse_date("05/10/2025"), expected);
        assert_eq!(parse_date("2025-10-05T08:30:00Z"), expected);
        assert_eq!(parse_date("October"), None);
    }

    #[test]
    fn repo_urls() {
        assert_eq!(
            repo_from_url("https://github.com/owner/repo/").as_deref(),
            Some("owner/repo")
        );
        assert_eq!(repo_from_url("https://github.com/owner").as_deref(), None);
        assert_eq!(repo_from_url("owner/repo").as_deref(), None);
    }

    #[test]
    fn slug_title_case() {
        assert_eq!(title_case("ml-foundations"), "Ml Foundations");
        assert_eq!(title_case("react_native-chat"), "React Native Chat");
    }
}
