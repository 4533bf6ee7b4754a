//! Sequential commit of a plan to an agent directory.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use agentdesk_core::{AgentId, BatchId};

use crate::directory::AgentDirectory;
use crate::error::DirectoryError;
use crate::plan::Plan;

/// The append that stopped a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitFailure {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub error: DirectoryError,
}

/// Outcome of committing one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitReport {
    pub batch_id: BatchId,

    /// Buckets in the whole batch, counting those committed by earlier runs.
    pub total_buckets: usize,

    /// Buckets of this batch committed by earlier, aborted runs.
    pub previously_committed: usize,

    /// Agents whose bucket was appended by this run, in commit order.
    pub committed: Vec<AgentId>,

    /// Tasks appended by this run.
    pub tasks_committed: usize,

    /// Set when the commit aborted.
    pub failure: Option<CommitFailure>,

    /// Agents after the failure point that were never contacted.
    pub not_attempted: Vec<AgentId>,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Buckets of the batch committed so far, across all runs.
    pub fn committed_buckets(&self) -> usize {
        self.previously_committed + self.committed.len()
    }

    /// Fraction of the batch committed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        fraction(self.committed_buckets(), self.total_buckets)
    }
}

impl fmt::Display for CommitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            None => write!(
                f,
                "Tasks distributed and saved successfully: {} tasks across {} agents",
                self.tasks_committed, self.total_buckets
            ),
            Some(failure) => write!(
                f,
                "Error: distributed {} of {}, failed at agent {} ({}): {}",
                self.committed_buckets(),
                self.total_buckets,
                failure.agent_name,
                failure.agent_id,
                failure.error
            ),
        }
    }
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    }
}

/// Append every bucket of `plan`, one agent at a time, in plan order.
///
/// `on_progress` receives the cumulative fraction of the whole batch after
/// each successful append, so a resumed plan continues where the aborted run
/// stopped. The first failed append stops the run; buckets already appended
/// stay appended.
pub async fn commit<D, F>(
    directory: &D,
    batch_id: BatchId,
    plan: &Plan,
    mut on_progress: F,
) -> CommitReport
where
    D: AgentDirectory + ?Sized,
    F: FnMut(f64) + Send,
{
    let previous = plan.already_committed();
    let total = plan.total_buckets();
    let mut report = CommitReport {
        batch_id,
        total_buckets: total,
        previously_committed: previous,
        committed: Vec::with_capacity(plan.len()),
        tasks_committed: 0,
        failure: None,
        not_attempted: Vec::new(),
    };

    for (index, bucket) in plan.buckets().iter().enumerate() {
        match directory.append_tasks(&bucket.agent_id, &bucket.tasks).await {
            Ok(()) => {
                report.committed.push(bucket.agent_id.clone());
                report.tasks_committed += bucket.tasks.len();
                info!(
                    batch_id = %report.batch_id,
                    agent_id = %bucket.agent_id,
                    tasks = bucket.tasks.len(),
                    "Tasks assigned to agent"
                );
                on_progress(fraction(previous + index + 1, total));
            }
            Err(error) => {
                warn!(
                    batch_id = %report.batch_id,
                    agent_id = %bucket.agent_id,
                    committed = previous + index,
                    total,
                    error = %error,
                    "Failed to assign tasks, aborting remaining agents"
                );
                report.not_attempted = plan.buckets()[index + 1..]
                    .iter()
                    .map(|b| b.agent_id.clone())
                    .collect();
                report.failure = Some(CommitFailure {
                    agent_id: bucket.agent_id.clone(),
                    agent_name: bucket.agent_name.clone(),
                    error,
                });
                break;
            }
        }
    }

    report
}
