//! Remote metadata reconciliation.
//!
//! For each repository: fetch the current description and topics, compare
//! field by field (topics as a set), and update only what differs. A failure
//! is recorded against that repository alone; the batch always completes.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use roadmap_core::types::{ProjectId, RepoRef};
use roadmap_renderer::RemoteMetadata;

use crate::error::RemoteError;
use crate::report::Outcome;
use crate::throttle::Throttle;

/// The hosted-repository API, as far as reconciliation needs it.
pub trait RemoteClient: Send + Sync {
    fn fetch(&self, repo: &RepoRef) -> Result<RemoteMetadata, RemoteError>;
    fn update_description(&self, repo: &RepoRef, description: &str) -> Result<(), RemoteError>;
    fn replace_topics(&self, repo: &RepoRef, topics: &[String]) -> Result<(), RemoteError>;
}

/// One repository to bring in line with its projected metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTask {
    pub project: ProjectId,
    pub repo: RepoRef,
    pub desired: RemoteMetadata,
}

/// A field whose remote value differs from the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Description { from: String, to: String },
    Topics { added: Vec<String>, removed: Vec<String> },
}

impl FieldChange {
    pub fn field(&self) -> &'static str {
        match self {
            FieldChange::Description { .. } => "description",
            FieldChange::Topics { .. } => "topics",
        }
    }

    fn describe(&self) -> String {
        match self {
            FieldChange::Description { from, to } => {
                format!("description: {from:?} -> {to:?}")
            }
            FieldChange::Topics { added, removed } => {
                let mut parts = Vec::new();
                if !added.is_empty() {
                    parts.push(format!("+{}", added.join(" +")));
                }
                if !removed.is_empty() {
                    parts.push(format!("-{}", removed.join(" -")));
                }
                format!("topics: {}", parts.join(" "))
            }
        }
    }
}

/// Differences between `current` and `desired`. Topic order is ignored.
pub fn field_changes(current: &RemoteMetadata, desired: &RemoteMetadata) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if current.description.trim() != desired.description {
        changes.push(FieldChange::Description {
            from: current.description.clone(),
            to: desired.description.clone(),
        });
    }

    let have: BTreeSet<&str> = current.topics.iter().map(String::as_str).collect();
    let want: BTreeSet<&str> = desired.topics.iter().map(String::as_str).collect();
    if have != want {
        changes.push(FieldChange::Topics {
            added: want.difference(&have).map(|s| s.to_string()).collect(),
            removed: have.difference(&want).map(|s| s.to_string()).collect(),
        });
    }
    changes
}

/// Fetch, compare, update. Never panics on remote errors; every failure
/// becomes [`Outcome::Failed`].
pub fn reconcile_one(
    client: &dyn RemoteClient,
    throttle: &Throttle,
    task: &RemoteTask,
    dry_run: bool,
) -> Outcome {
    if task.desired.description.is_empty() {
        return Outcome::Skipped {
            reason: "no description to publish".to_string(),
        };
    }

    let current = match throttle.run(|| client.fetch(&task.repo)) {
        Ok(current) => current,
        Err(e) => return failed(task, "fetch", e),
    };

    let changes = field_changes(&current, &task.desired);
    if changes.is_empty() {
        tracing::debug!("unchanged: {}", task.repo);
        return Outcome::Unchanged;
    }

    if dry_run {
        let diff = changes
            .iter()
            .map(FieldChange::describe)
            .collect::<Vec<_>>()
            .join("\n");
        tracing::info!("[dry-run] would update {}: {}", task.repo, diff);
        return Outcome::WouldUpdate { diff };
    }

    let mut fields = Vec::new();
    for change in &changes {
        let result = match change {
            FieldChange::Description { to, .. } => {
                throttle.run(|| client.update_description(&task.repo, to))
            }
            FieldChange::Topics { .. } => {
                throttle.run(|| client.replace_topics(&task.repo, &task.desired.topics))
            }
        };
        if let Err(e) = result {
            return failed(task, change.field(), e);
        }
        fields.push(change.field().to_string());
    }

    tracing::info!("updated {}: {}", task.repo, fields.join(", "));
    Outcome::Updated { fields }
}

fn failed(task: &RemoteTask, step: &str, error: RemoteError) -> Outcome {
    tracing::warn!("{} ({step}): {error}", task.repo);
    Outcome::Failed {
        cause: format!("{step}: {error}"),
    }
}

/// Reconcile every task on up to `concurrency` scoped worker threads.
///
/// Outcomes are returned in task order regardless of completion order.
pub fn reconcile_all(
    client: &dyn RemoteClient,
    throttle: &Throttle,
    tasks: &[RemoteTask],
    dry_run: bool,
    concurrency: usize,
) -> Vec<Outcome> {
    let workers = concurrency.clamp(1, tasks.len().max(1));
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<Outcome>>> = Mutex::new(vec![None; tasks.len()]);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let Some(task) = tasks.get(i) else { break };
                let outcome = reconcile_one(client, throttle, task, dry_run);
                slots.lock().unwrap_or_else(|e| e.into_inner())[i] = Some(outcome);
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Outcome::Failed {
                cause: "worker exited before reconciling this resource".to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeClient {
        state: Mutex<HashMap<String, RemoteMetadata>>,
        writes: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn with(repo: &str, description: &str, topics: &[&str]) -> Self {
            let client = FakeClient::default();
            client.state.lock().unwrap().insert(
                repo.to_string(),
                RemoteMetadata {
                    description: description.to_string(),
                    topics: topics.iter().map(|t| t.to_string()).collect(),
                },
            );
            client
        }
    }

    impl RemoteClient for FakeClient {
        fn fetch(&self, repo: &RepoRef) -> Result<RemoteMetadata, RemoteError> {
            self.state
                .lock()
                .unwrap()
                .get(&repo.0)
                .cloned()
                .ok_or(RemoteError::NotFound { repo: repo.0.clone() })
        }

        fn update_description(&self, repo: &RepoRef, description: &str) -> Result<(), RemoteError> {
            self.writes.lock().unwrap().push(format!("{repo} description"));
            if let Some(m) = self.state.lock().unwrap().get_mut(&repo.0) {
                m.description = description.to_string();
            }
            Ok(())
        }

        fn replace_topics(&self, repo: &RepoRef, topics: &[String]) -> Result<(), RemoteError> {
            self.writes.lock().unwrap().push(format!("{repo} topics"));
            if let Some(m) = self.state.lock().unwrap().get_mut(&repo.0) {
                m.topics = topics.to_vec();
            }
            Ok(())
        }
    }

    fn task(repo: &str, description: &str, topics: &[&str]) -> RemoteTask {
        RemoteTask {
            project: ProjectId::from(repo.split('/').nth(1).unwrap_or(repo)),
            repo: RepoRef::from(repo),
            desired: RemoteMetadata {
                description: description.to_string(),
                topics: topics.iter().map(|t| t.to_string()).collect(),
            },
        }
    }

    #[test]
    fn topics_compare_as_sets() {
        let current = RemoteMetadata { description: "d".into(), topics: vec!["b".into(), "a".into()] };
        let desired = RemoteMetadata { description: "d".into(), topics: vec!["a".into(), "b".into()] };
        assert!(field_changes(&current, &desired).is_empty());
    }

    #[test]
    fn only_differing_fields_are_written() {
        let client = FakeClient::with("me/api", "Same", &["old"]);
        let outcome = reconcile_one(&client, &Throttle::unlimited(), &task("me/api", "Same", &["new"]), false);
        assert_eq!(outcome, Outcome::Updated { fields: vec!["topics".into()] });
        assert_eq!(*client.writes.lock().unwrap(), ["me/api topics"]);

        let again = reconcile_one(&client, &Throttle::unlimited(), &task("me/api", "Same", &["new"]), false);
        assert_eq!(again, Outcome::Unchanged);
    }

    #[test]
    fn dry_run_reports_field_diff_without_writing() {
        let client = FakeClient::with("me/api", "Old", &["a"]);
        let outcome = reconcile_one(&client, &Throttle::unlimited(), &task("me/api", "New", &["a", "b"]), true);
        let diff = outcome.diff().expect("diff").to_string();
        assert!(diff.contains("description: \"Old\" -> \"New\""), "{diff}");
        assert!(diff.contains("topics: +b"), "{diff}");
        assert!(client.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_description_is_skipped_without_fetching() {
        let client = FakeClient::default();
        let outcome = reconcile_one(&client, &Throttle::unlimited(), &task("me/none", "", &[]), false);
        assert!(matches!(outcome, Outcome::Skipped { .. }));
    }

    #[test]
    fn batch_keeps_task_order_and_isolates_failures() {
        let client = FakeClient::with("me/a", "x", &[]);
        client.state.lock().unwrap().insert("me/c".into(), RemoteMetadata::default());
        let tasks = vec![task("me/a", "x", &[]), task("me/missing", "y", &[]), task("me/c", "z", &[])];

        let outcomes = reconcile_all(&client, &Throttle::unlimited(), &tasks, false, 3);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], Outcome::Unchanged);
        assert!(outcomes[1].is_failure());
        assert_eq!(outcomes[2], Outcome::Updated { fields: vec!["description".into()] });
    }
}
