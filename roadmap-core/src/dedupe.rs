//! Merge milestones that were entered twice for the same project.
//!
//! Two milestones are the same when they share an owning project and their
//! titles match after lower-casing and dropping whitespace, `-` and `_`. The
//! first occurrence survives; its empty fields are filled from later copies.

use std::collections::HashMap;

use crate::normalize::DEFAULT_CATEGORY;
use crate::types::{Milestone, MilestoneStatus, ProjectId};

/// One group of duplicates folded into the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub project: Option<ProjectId>,
    pub title: String,
    /// Number of later copies removed.
    pub removed: usize,
}

fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Deduplicate `milestones` in place, keeping stored order of survivors.
pub fn dedupe_milestones(milestones: &mut Vec<Milestone>) -> Vec<Merge> {
    let mut survivors: Vec<Milestone> = Vec::with_capacity(milestones.len());
    let mut index: HashMap<(Option<ProjectId>, String), usize> = HashMap::new();
    let mut merges: Vec<Merge> = Vec::new();

    for milestone in milestones.drain(..) {
        let key = (milestone.project.clone(), title_key(&milestone.title));
        match index.get(&key) {
            Some(&at) => {
                absorb(&mut survivors[at], milestone);
                match merges.iter_mut().find(|m| m.project == key.0 && title_key(&m.title) == key.1) {
                    Some(merge) => merge.removed += 1,
                    None => merges.push(Merge {
                        project: key.0.clone(),
                        title: survivors[at].title.clone(),
                        removed: 1,
                    }),
                }
            }
            None => {
                index.insert(key, survivors.len());
                survivors.push(milestone);
            }
        }
    }

    *milestones = survivors;
    merges
}

fn absorb(keep: &mut Milestone, dup: Milestone) {
    if keep.id.is_none() {
        keep.id = dup.id;
    }
    if keep.due.is_none() {
        keep.due = dup.due;
    }
    if keep.category == DEFAULT_CATEGORY && dup.category != DEFAULT_CATEGORY {
        keep.category = dup.category;
    }
    if keep.status == MilestoneStatus::Planned && dup.status != MilestoneStatus::Planned {
        keep.status = dup.status;
    }
    for (key, value) in dup.extra {
        keep.extra.entry(key).or_insert(value);
    }
}
