//! engine::pipeline
//!
//! The commit pipeline: turns a flat list of file changes into one new
//! commit on a remote branch.
//!
//! # State machine
//!
//! ```text
//! Idle -> ResolvingIdentity -> ReadingTip -> WritingBlobs
//!      -> BuildingTree -> WritingCommit -> UpdatingBranch -> Done
//! ```
//!
//! `Failed` is terminal and reachable from every state except `Idle` and
//! `Done`. No state is entered twice and no step is retried. A step's error
//! is returned unchanged, with the repository, branch and failing stage
//! attached once they are known.
//!
//! # Atomicity
//!
//! The remote offers no transaction. Blobs, the tree and the commit are
//! unreferenced immutable objects until the final ref update moves the
//! branch, so a failure at any earlier step leaves the branch untouched.
//! Orphaned objects are left for the remote to collect.
//!
//! # Example
//!
//! ```
//! use forge_relay::core::types::FileChange;
//! use forge_relay::engine::{CommitPipeline, CommitRequest, LocalIdentity};
//! use forge_relay::forge::mock::MockForge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_repository("octo", "demo", Some("main"));
//! let local = LocalIdentity::default();
//!
//! let mut pipeline = CommitPipeline::new(&forge, &local);
//! let result = pipeline
//!     .run(CommitRequest {
//!         repo: "demo".into(),
//!         owner: Some("octo".into()),
//!         branch: None,
//!         message: "init".into(),
//!         files: vec![FileChange::new("a.txt", "hello").unwrap()],
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(result.files_changed, 1);
//! # });
//! ```

use serde::Serialize;

use super::error::{OperationError, OperationFailure};
use super::resolve::{BranchSource, IdentityResolver, LocalIdentity};
use super::steps;
use crate::core::config::DEFAULT_BLOB_CONCURRENCY;
use crate::core::types::{BranchRef, FileChange, PipelineResult, RepositoryRef};
use crate::forge::Forge;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    ResolvingIdentity,
    ReadingTip,
    WritingBlobs,
    BuildingTree,
    WritingCommit,
    UpdatingBranch,
    Done,
    Failed,
}

impl PipelineStage {
    /// Whether the pipeline can no longer move.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::ResolvingIdentity => "resolving_identity",
            PipelineStage::ReadingTip => "reading_tip",
            PipelineStage::WritingBlobs => "writing_blobs",
            PipelineStage::BuildingTree => "building_tree",
            PipelineStage::WritingCommit => "writing_commit",
            PipelineStage::UpdatingBranch => "updating_branch",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    /// Repository name, without owner
    pub repo: String,
    /// Owner; resolved when absent
    pub owner: Option<String>,
    /// Target branch; resolved when absent
    pub branch: Option<BranchRef>,
    /// Commit message, passed through verbatim
    pub message: String,
    /// Files to write, in caller order
    pub files: Vec<FileChange>,
}

impl CommitRequest {
    /// Reject malformed input before any network call.
    ///
    /// An empty `files` list is not rejected here: it is the blob step's
    /// `EmptyChangeset` to report.
    pub fn validate(&self) -> Result<(), OperationError> {
        if self.repo.trim().is_empty() {
            return Err(OperationError::InvalidArguments(
                "repo cannot be empty".into(),
            ));
        }
        if self.message.trim().is_empty() {
            return Err(OperationError::InvalidArguments(
                "message cannot be empty".into(),
            ));
        }
        for file in &self.files {
            file.validate()
                .map_err(|e| OperationError::InvalidArguments(e.to_string()))?;
        }
        Ok(())
    }
}

/// Context filled in as the run progresses, attached to any failure.
#[derive(Default)]
struct RunContext {
    repo: Option<RepositoryRef>,
    branch: Option<BranchRef>,
}

/// One commit pipeline run.
///
/// Single use: a pipeline that has reached `Done` or `Failed` refuses to
/// run again.
pub struct CommitPipeline<'a> {
    forge: &'a dyn Forge,
    local: &'a LocalIdentity,
    blob_concurrency: usize,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl<'a> CommitPipeline<'a> {
    pub fn new(forge: &'a dyn Forge, local: &'a LocalIdentity) -> Self {
        Self {
            forge,
            local,
            blob_concurrency: DEFAULT_BLOB_CONCURRENCY,
            stage: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
        }
    }

    /// Cap on simultaneous blob uploads.
    pub fn with_blob_concurrency(mut self, limit: usize) -> Self {
        self.blob_concurrency = limit.max(1);
        self
    }

    /// Current stage.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Run the pipeline to `Done` or `Failed`.
    ///
    /// # Errors
    ///
    /// The failing step's error, with repository, branch and stage
    /// attached where known.
    pub async fn run(
        &mut self,
        request: CommitRequest,
    ) -> Result<PipelineResult, OperationFailure> {
        if self.stage != PipelineStage::Idle {
            return Err(OperationError::InvalidArguments(format!(
                "pipeline already ran (stage: {})",
                self.stage
            ))
            .into());
        }
        request.validate()?;

        let mut ctx = RunContext::default();
        match self.execute(&request, &mut ctx).await {
            Ok(result) => {
                self.advance(PipelineStage::Done);
                tracing::info!(
                    repository = %result.repository,
                    branch = %result.branch,
                    commit = result.commit_sha.as_ref().map(|s| s.short(7)).unwrap_or_default(),
                    files = result.files_changed,
                    "commit created"
                );
                Ok(result)
            }
            Err(error) => {
                let failed_at = self.stage;
                self.advance(PipelineStage::Failed);
                tracing::debug!(
                    stage = %failed_at,
                    kind = error.kind(),
                    error = %error,
                    "pipeline failed"
                );

                let mut failure = OperationFailure::from(error).at_stage(failed_at);
                if let Some(repo) = &ctx.repo {
                    failure = failure.with_repository(repo);
                }
                if let Some(branch) = &ctx.branch {
                    failure = failure.with_branch(branch);
                }
                Err(failure)
            }
        }
    }

    async fn execute(
        &mut self,
        request: &CommitRequest,
        ctx: &mut RunContext,
    ) -> Result<PipelineResult, OperationError> {
        let forge = self.forge;

        self.advance(PipelineStage::ResolvingIdentity);
        let resolver = IdentityResolver::new(forge, self.local);
        let repo = resolver
            .resolve_repository(&request.repo, request.owner.as_deref())
            .await?;
        ctx.repo = Some(repo.clone());

        let resolved = resolver.resolve_branch(&repo, request.branch.as_ref()).await;
        if resolved.source == BranchSource::Fallback {
            tracing::debug!(
                repo = %repo,
                "targeting fallback branch; tip read will confirm it exists"
            );
        }
        let branch = resolved.branch;
        ctx.branch = Some(branch.clone());

        self.advance(PipelineStage::ReadingTip);
        let tip = steps::read_tip(forge, &repo, &branch).await?;

        self.advance(PipelineStage::WritingBlobs);
        let blobs = steps::write_blobs(forge, &repo, &request.files, self.blob_concurrency).await?;

        self.advance(PipelineStage::BuildingTree);
        let tree = steps::build_tree(forge, &repo, &tip.tree_sha, &blobs).await?;

        self.advance(PipelineStage::WritingCommit);
        let commit =
            steps::write_commit(forge, &repo, &request.message, &tree, &tip.commit_sha).await?;

        self.advance(PipelineStage::UpdatingBranch);
        steps::update_branch(forge, &repo, &branch, &commit).await?;

        Ok(PipelineResult::success(&repo, &branch, &commit, &request.files))
    }

    fn advance(&mut self, next: PipelineStage) {
        tracing::debug!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
        self.history.push(next);
    }
}
