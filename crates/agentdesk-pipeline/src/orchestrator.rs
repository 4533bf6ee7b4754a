//! Upload-and-distribute state machine.
//!
//! ```text
//! Idle -> FileLoaded -> Validated -> Distributing -> Completed
//!                                              \-> Failed -> (retry) Distributing
//! ```
//!
//! A failed ingestion resets to `Idle`. A failed precondition at distribute
//! time leaves the state untouched.

use tracing::{debug, info, info_span, warn, Instrument};

use agentdesk_core::{BatchId, LeadRecord, PipelineState};

use crate::commit::{commit, CommitReport};
use crate::directory::AgentDirectory;
use crate::error::{PipelineError, PlanningError};
use crate::ingest;
use crate::plan::{plan, Plan};

/// Holds one uploaded batch and drives it through planning and commit.
#[derive(Debug, Default)]
pub struct Pipeline {
    state: PipelineState,
    records: Vec<LeadRecord>,
    /// Buckets not yet committed after an aborted run, failing agent first.
    pending: Option<Plan>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Records of the current batch.
    pub fn records(&self) -> &[LeadRecord] {
        &self.records
    }

    /// True when a retry will resume an aborted commit.
    pub fn has_pending_retry(&self) -> bool {
        self.pending.is_some()
    }

    /// Parse and validate a file, replacing any previously loaded batch.
    ///
    /// Returns the number of records loaded. On error nothing is retained
    /// and the pipeline is back at `Idle`.
    pub fn load(&mut self, bytes: &[u8], declared_mime: &str) -> Result<usize, PipelineError> {
        self.records.clear();
        self.pending = None;
        self.transition(PipelineState::FileLoaded);

        match ingest::parse(bytes, declared_mime) {
            Ok(records) => {
                self.records = records;
                self.transition(PipelineState::Validated);
                Ok(self.records.len())
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                self.transition(PipelineState::Idle);
                Err(e.into())
            }
        }
    }

    /// Distribute the loaded batch across a fresh agent snapshot.
    ///
    /// After an aborted commit, the next call resumes with the failing agent
    /// instead of re-planning, so agents that already received their bucket
    /// are not appended to twice.
    pub async fn distribute<D, F>(
        &mut self,
        directory: &D,
        on_progress: F,
    ) -> Result<CommitReport, PipelineError>
    where
        D: AgentDirectory + ?Sized,
        F: FnMut(f64) + Send,
    {
        let batch_id = BatchId::generate();
        let span = info_span!("distribute", batch_id = %batch_id);
        self.distribute_batch(directory, batch_id, on_progress)
            .instrument(span)
            .await
    }

    /// Load a file and distribute it in one call.
    pub async fn distribute_file<D, F>(
        &mut self,
        directory: &D,
        bytes: &[u8],
        declared_mime: &str,
        on_progress: F,
    ) -> Result<CommitReport, PipelineError>
    where
        D: AgentDirectory + ?Sized,
        F: FnMut(f64) + Send,
    {
        self.load(bytes, declared_mime)?;
        self.distribute(directory, on_progress).await
    }

    async fn distribute_batch<D, F>(
        &mut self,
        directory: &D,
        batch_id: BatchId,
        on_progress: F,
    ) -> Result<CommitReport, PipelineError>
    where
        D: AgentDirectory + ?Sized,
        F: FnMut(f64) + Send,
    {
        if self.records.is_empty() {
            warn!(state = %self.state, "Distribute requested with no records loaded");
            return Err(PlanningError::NoRecords.into());
        }

        let plan = match self.pending.take() {
            Some(remaining) => {
                info!(agents = remaining.len(), "Resuming aborted distribution");
                remaining
            }
            None => {
                let agents = directory
                    .list_agents()
                    .await
                    .map_err(PipelineError::Directory)?;
                let plan = plan(&self.records, &agents)?;
                info!(
                    records = self.records.len(),
                    agents = agents.len(),
                    "Distribution planned"
                );
                plan
            }
        };

        self.transition(PipelineState::Distributing);
        let report = commit(directory, batch_id, &plan, on_progress).await;

        if report.is_success() {
            self.records.clear();
            self.transition(PipelineState::Completed);
            Ok(report)
        } else {
            self.pending = Some(plan.remaining_from(report.committed.len()));
            self.transition(PipelineState::Failed);
            Err(PipelineError::Commit(Box::new(report)))
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DirectoryError, IngestError};
    use crate::ingest::CSV_MIME;
    use crate::testing::FakeDirectory;
    use agentdesk_core::{AgentId, TaskAssignment};

    const LEADS: &[u8] = b"FirstName,Phone,Notes\nA,1,n1\nB,2,n2\nC,3,n3\nD,4,n4\nE,5,n5\nF,6,n6\n";

    #[tokio::test]
    async fn test_happy_path() {
        let directory = FakeDirectory::with_agents(2);
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.state(), PipelineState::Idle);

        assert_eq!(pipeline.load(LEADS, CSV_MIME).unwrap(), 6);
        assert_eq!(pipeline.state(), PipelineState::Validated);

        let mut progress = Vec::new();
        let report = pipeline
            .distribute(&directory, |p| progress.push(p))
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(progress, vec![0.5, 1.0]);
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert!(pipeline.records().is_empty());
        assert_eq!(
            directory.tasks_of("agent-1").await,
            vec![
                TaskAssignment::new("A", "1", "n1"),
                TaskAssignment::new("C", "3", "n3"),
                TaskAssignment::new("E", "5", "n5"),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeat_distribute_after_completion_is_noop() {
        let directory = FakeDirectory::with_agents(2);
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();
        pipeline.distribute(&directory, |_| {}).await.unwrap();

        let err = pipeline.distribute(&directory, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Planning(PlanningError::NoRecords)));
        assert_eq!(directory.task_counts().await, vec![3, 3]);
        assert_eq!(directory.list_calls().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_file_resets_to_idle() {
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();

        let err = pipeline
            .load(b"FirstName,Phone,Notes\nA,1,\n", CSV_MIME)
            .unwrap_err();

        assert!(matches!(err, PipelineError::Ingest(IngestError::Validation { .. })));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.records().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_type_surfaces_verbatim() {
        let mut pipeline = Pipeline::new();
        let err = pipeline.load(b"%PDF", "application/pdf").unwrap_err();
        assert_eq!(
            err.to_string(),
            IngestError::UnsupportedFileType("application/pdf".to_string()).to_string()
        );
    }

    #[tokio::test]
    async fn test_no_agents_keeps_state() {
        let directory = FakeDirectory::with_agents(0);
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();

        let err = pipeline.distribute(&directory, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Planning(PlanningError::NoWorkers)));
        assert_eq!(pipeline.state(), PipelineState::Validated);
        assert_eq!(pipeline.records().len(), 6);
        assert!(directory.append_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_state() {
        let directory = FakeDirectory::with_agents(2);
        directory
            .fail_listing(DirectoryError::Unavailable("timeout".into()))
            .await;
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();

        let err = pipeline.distribute(&directory, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Directory(_)));
        assert_eq!(pipeline.state(), PipelineState::Validated);
    }

    #[tokio::test]
    async fn test_empty_upload_reports_nothing_to_distribute() {
        let directory = FakeDirectory::with_agents(2);
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.load(b"FirstName,Phone,Notes\n", CSV_MIME).unwrap(), 0);

        let err = pipeline.distribute(&directory, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Planning(PlanningError::NoRecords)));
        assert_eq!(directory.list_calls().await, 0);
    }

    #[tokio::test]
    async fn test_partial_failure_then_resume() {
        let directory = FakeDirectory::with_agents(3);
        directory.fail_appends_to("agent-2", 1).await;
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();

        let mut progress = Vec::new();
        let err = pipeline
            .distribute(&directory, |p| progress.push(p))
            .await
            .unwrap_err();

        let report = match err {
            PipelineError::Commit(report) => report,
            other => panic!("expected commit failure, got {other:?}"),
        };
        assert_eq!(report.committed, vec![AgentId::new("agent-1")]);
        assert_eq!(report.not_attempted, vec![AgentId::new("agent-3")]);
        assert_eq!(progress, vec![1.0 / 3.0]);
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(pipeline.records().len(), 6);
        assert!(pipeline.has_pending_retry());

        let mut progress = Vec::new();
        let report = pipeline
            .distribute(&directory, |p| progress.push(p))
            .await
            .unwrap();
        assert_eq!(
            report.committed,
            vec![AgentId::new("agent-2"), AgentId::new("agent-3")]
        );
        // Counts refer to the whole batch, not just the resumed remainder.
        assert_eq!(report.total_buckets, 3);
        assert_eq!(report.previously_committed, 1);
        assert_eq!(report.committed_buckets(), 3);
        assert_eq!(progress, vec![2.0 / 3.0, 1.0]);
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert!(!pipeline.has_pending_retry());

        // agent-1 received its bucket exactly once.
        assert_eq!(directory.task_counts().await, vec![2, 2, 2]);
        assert_eq!(directory.list_calls().await, 1);
    }

    #[tokio::test]
    async fn test_new_upload_discards_pending_retry() {
        let directory = FakeDirectory::with_agents(2);
        directory.fail_appends_to("agent-1", 1).await;
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();
        assert!(pipeline.distribute(&directory, |_| {}).await.is_err());
        assert!(pipeline.has_pending_retry());

        pipeline
            .load(b"FirstName,Phone,Notes\nZ,9,n9\n", CSV_MIME)
            .unwrap();
        assert!(!pipeline.has_pending_retry());

        pipeline.distribute(&directory, |_| {}).await.unwrap();
        assert_eq!(directory.task_counts().await, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_resume_against_removed_agent_fails_again() {
        let directory = FakeDirectory::with_agents(2);
        directory.fail_appends_to("agent-2", 1).await;
        let mut pipeline = Pipeline::new();
        pipeline.load(LEADS, CSV_MIME).unwrap();
        assert!(pipeline.distribute(&directory, |_| {}).await.is_err());

        directory.remove_all_agents().await;
        let err = pipeline.distribute(&directory, |_| {}).await.unwrap_err();
        match err {
            PipelineError::Commit(report) => {
                let failure = report.failure.as_ref().unwrap();
                assert!(matches!(failure.error, DirectoryError::NotFound(_)));
            }
            other => panic!("expected commit failure, got {other:?}"),
        }
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert!(pipeline.has_pending_retry());
    }

    #[tokio::test]
    async fn test_distribute_file() {
        let directory = FakeDirectory::with_agents(4);
        let mut pipeline = Pipeline::new();
        let report = pipeline
            .distribute_file(&directory, LEADS, CSV_MIME, |_| {})
            .await
            .unwrap();
        assert_eq!(report.tasks_committed, 6);
        assert_eq!(directory.task_counts().await, vec![2, 2, 1, 1]);
    }
}
