//! Boundary markers around generated regions.
//!
//! ```text
//! hand-written prose
//! <!-- roadmap:begin overview -->
//! generated body
//! <!-- roadmap:end overview -->
//! more prose
//! ```
//!
//! Only the bytes from the begin marker through the end marker are owned by
//! the tool. Everything outside them is copied through unchanged.

use crate::error::RenderError;

pub fn begin_marker(section: &str) -> String {
    format!("<!-- roadmap:begin {section} -->")
}

pub fn end_marker(section: &str) -> String {
    format!("<!-- roadmap:end {section} -->")
}

const MARKER_OPEN: &str = "<!-- roadmap:";
const MARKER_OPEN_ESCAPED: &str = "&lt;!-- roadmap:";

/// Escape anything in generated text that would read back as a marker.
///
/// Manifest strings end up inside the region verbatim; a title quoting a
/// marker must not split the region on the next run.
pub fn neutralize(body: &str) -> String {
    body.replace(MARKER_OPEN, MARKER_OPEN_ESCAPED)
}

/// The full region (markers included) for `body`.
pub fn region(section: &str, body: &str) -> String {
    format!(
        "{}\n{}\n{}",
        begin_marker(section),
        neutralize(body.trim_end_matches('\n')),
        end_marker(section)
    )
}

/// Byte range of the existing region, or `None` when the document has no
/// markers for `section` at all.
fn locate(document: &str, section: &str) -> Result<Option<(usize, usize)>, RenderError> {
    let begin = begin_marker(section);
    let end = end_marker(section);
    let begins: Vec<usize> = document.match_indices(&begin).map(|(i, _)| i).collect();
    let ends: Vec<usize> = document.match_indices(&end).map(|(i, _)| i).collect();

    let mismatch = |reason: String| RenderError::MarkerMismatch {
        section: section.to_string(),
        reason,
    };

    match (begins.as_slice(), ends.as_slice()) {
        ([], []) => Ok(None),
        ([b], [e]) if b < e => Ok(Some((*b, *e + end.len()))),
        ([_], [_]) => Err(mismatch("end marker precedes begin marker".into())),
        (b, e) if b.len() != e.len() => Err(mismatch(format!(
            "{} begin marker(s) but {} end marker(s)",
            b.len(),
            e.len()
        ))),
        (b, _) => Err(mismatch(format!("region appears {} times", b.len()))),
    }
}

/// Replace the `section` region of `document` with `body`.
///
/// A document without markers gets the region appended after a blank line; an
/// empty document becomes just the region. Splicing the same body twice
/// yields the same bytes.
pub fn splice(document: &str, section: &str, body: &str) -> Result<String, RenderError> {
    let region = region(section, body);
    match locate(document, section)? {
        Some((start, stop)) => {
            let mut out = String::with_capacity(document.len() + region.len());
            out.push_str(&document[..start]);
            out.push_str(&region);
            out.push_str(&document[stop..]);
            Ok(out)
        }
        None if document.is_empty() => Ok(format!("{region}\n")),
        None => {
            let mut out = String::with_capacity(document.len() + region.len() + 2);
            out.push_str(document);
            if !document.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&region);
            out.push('\n');
            Ok(out)
        }
    }
}

/// Current body of the `section` region, if present and well formed.
pub fn extract<'a>(document: &'a str, section: &str) -> Result<Option<&'a str>, RenderError> {
    Ok(locate(document, section)?.map(|(start, stop)| {
        let inner_start = start + begin_marker(section).len();
        let inner_stop = stop - end_marker(section).len();
        document[inner_start..inner_stop].trim_matches('\n')
    }))
}
