//! Progress policy: where the percentages on the badges come from.
//!
//! `Derived` recomputes each category from milestone completion and falls
//! back to the stored value only for categories without milestones. `Stored`
//! uses the manifest's `progress` map verbatim.

use serde::{Deserialize, Serialize};

use crate::types::{Manifest, ProgressSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPolicy {
    #[default]
    Derived,
    Stored,
}

/// Completion ratio per milestone category, rounded half-up to a whole percent.
///
/// Categories come out in stored-summary order first, then any milestone
/// category the summary does not mention, in first-appearance order.
pub fn derive(manifest: &Manifest) -> ProgressSummary {
    let mut labels: Vec<&str> = manifest.progress.iter().map(|(label, _)| label).collect();
    for category in manifest.milestone_categories() {
        if !labels.contains(&category) {
            labels.push(category);
        }
    }

    let mut summary = ProgressSummary::new();
    for label in labels {
        let (done, total) = manifest
            .milestones
            .iter()
            .filter(|m| m.category == label)
            .fold((0u64, 0u64), |(done, total), m| {
                (done + u64::from(m.status.is_done()), total + 1)
            });

        if total > 0 {
            let pct = (done * 100 + total / 2) / total;
            summary.set(label, pct as f64);
        } else if let Some(stored) = manifest.progress.get(label) {
            summary.set(label, stored);
        }
    }
    summary
}

/// The summary to render under `policy`.
pub fn effective(manifest: &Manifest, policy: ProgressPolicy) -> ProgressSummary {
    match policy {
        ProgressPolicy::Derived => derive(manifest),
        ProgressPolicy::Stored => manifest.progress.clone(),
    }
}
