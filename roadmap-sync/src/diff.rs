//! Unified diffs for dry-run output and `roadmap diff`.

use similar::TextDiff;

/// `--- a/<label>` / `+++ b/<label>` unified diff with three lines of context.
/// Empty when the texts are equal.
pub fn unified(label: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    let old_header = format!("a/{label}");
    let new_header = format!("b/{label}");
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
