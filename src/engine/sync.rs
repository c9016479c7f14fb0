//! engine::sync
//!
//! Read-only branch operations: push, pull and status.
//!
//! Commits made through the pipeline land on the remote branch directly,
//! so `push` has nothing to send. It confirms the branch exists and reports
//! its tip. `pull` and `git_status` read the branch head and its relation
//! to the default branch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{OperationError, OperationFailure};
use super::resolve::{IdentityResolver, LocalIdentity};
use super::steps;
use crate::core::types::{BranchRef, PipelineStatus, RepositoryRef};
use crate::forge::{ChangedFile, CommitSummary, Comparison, Forge, ForgeError};

/// Payload of `push`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushResult {
    pub status: PipelineStatus,
    pub message: String,
    pub repository: String,
    pub branch: String,
    /// Current tip of the branch
    pub commit_sha: String,
    pub timestamp: DateTime<Utc>,
}

/// Payload of `pull`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullResult {
    pub status: PipelineStatus,
    pub commit_sha: String,
    pub html_url: Option<String>,
    pub message: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub files_changed: Vec<ChangedFile>,
    pub repository: String,
    pub branch: String,
    pub timestamp: DateTime<Utc>,
}

/// Head commit as reported by `git_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCommit {
    pub sha: String,
    pub message: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub html_url: Option<String>,
}

/// Payload of `git_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub status: PipelineStatus,
    pub repository: String,
    pub current_branch: String,
    pub default_branch: String,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub last_commit: LastCommit,
    pub files_changed: Vec<ChangedFile>,
    pub timestamp: DateTime<Utc>,
}

/// Confirm `branch` exists and report its tip.
///
/// # Errors
///
/// - `OwnerResolution` if no owner can be found
/// - `BranchNotFound` if the resolved branch does not exist
pub async fn push(
    forge: &dyn Forge,
    local: &LocalIdentity,
    repo: &str,
    owner: Option<&str>,
    branch: Option<&BranchRef>,
) -> Result<PushResult, OperationFailure> {
    let resolver = IdentityResolver::new(forge, local);
    let repo = resolver.resolve_repository(repo, owner).await?;
    let branch = resolver.resolve_branch(&repo, branch).await.branch;

    let tip = steps::read_tip(forge, &repo, &branch)
        .await
        .map_err(|e| context(e, &repo, Some(&branch)))?;

    Ok(PushResult {
        status: PipelineStatus::Success,
        message: format!(
            "Commits created with create_commit are already on {}; nothing to push",
            branch
        ),
        repository: repo.full_name(),
        branch: branch.to_string(),
        commit_sha: tip.commit_sha.to_string(),
        timestamp: Utc::now(),
    })
}

/// Read the latest commit on `branch`.
///
/// # Errors
///
/// - `OwnerResolution` if no owner can be found
/// - `BranchNotFound` if the branch does not exist
/// - `Remote` for any other failure
pub async fn pull(
    forge: &dyn Forge,
    local: &LocalIdentity,
    repo: &str,
    owner: Option<&str>,
    branch: &BranchRef,
) -> Result<PullResult, OperationFailure> {
    let resolver = IdentityResolver::new(forge, local);
    let repo = resolver.resolve_repository(repo, owner).await?;

    let head = branch_head(forge, &repo, branch)
        .await
        .map_err(|e| context(e, &repo, Some(branch)))?;

    Ok(PullResult {
        status: PipelineStatus::Success,
        commit_sha: head.sha,
        html_url: head.html_url,
        message: head.message,
        author: head.author,
        date: head.date,
        files_changed: head.files,
        repository: repo.full_name(),
        branch: branch.to_string(),
        timestamp: Utc::now(),
    })
}

/// Report a branch's head and its divergence from the default branch.
///
/// # Errors
///
/// - `OwnerResolution` if no owner can be found
/// - `BranchNotFound` if the current branch does not exist
/// - `Remote` for any other failure
pub async fn git_status(
    forge: &dyn Forge,
    local: &LocalIdentity,
    repo: &str,
    owner: Option<&str>,
    branch: Option<&BranchRef>,
) -> Result<StatusResult, OperationFailure> {
    let resolver = IdentityResolver::new(forge, local);
    let repo = resolver.resolve_repository(repo, owner).await?;
    let default_branch = resolver.resolve_branch(&repo, None).await.branch;
    let current = branch.cloned().unwrap_or_else(|| default_branch.clone());

    // Head first so a missing branch reports as such, not as a failed compare.
    let head = branch_head(forge, &repo, &current)
        .await
        .map_err(|e| context(e, &repo, Some(&current)))?;

    let comparison = if current == default_branch {
        Comparison::default()
    } else {
        forge
            .compare(&repo, &default_branch, &current)
            .await
            .map_err(|e| context(e.into(), &repo, Some(&current)))?
    };

    Ok(StatusResult {
        status: PipelineStatus::Success,
        repository: repo.full_name(),
        current_branch: current.to_string(),
        default_branch: default_branch.to_string(),
        ahead_by: comparison.ahead_by,
        behind_by: comparison.behind_by,
        last_commit: LastCommit {
            sha: head.sha,
            message: head.message,
            author: head.author,
            date: head.date,
            html_url: head.html_url,
        },
        files_changed: head.files,
        timestamp: Utc::now(),
    })
}

async fn branch_head(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    branch: &BranchRef,
) -> Result<CommitSummary, OperationError> {
    match forge.branch_head(repo, branch).await {
        Ok(head) => Ok(head),
        Err(ForgeError::NotFound(_)) => Err(OperationError::BranchNotFound {
            branch: branch.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn context(
    error: OperationError,
    repo: &RepositoryRef,
    branch: Option<&BranchRef>,
) -> OperationFailure {
    let failure = OperationFailure::from(error).with_repository(repo);
    match branch {
        Some(branch) => failure.with_branch(branch),
        None => failure,
    }
}
