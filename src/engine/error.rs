//! engine::error
//!
//! Error taxonomy for every tool operation.
//!
//! Each step of the commit pipeline raises exactly one of these variants
//! and the orchestrator propagates it unchanged. The only thing added on the
//! way out is context the caller already knows (repository, branch, stage),
//! carried by [`OperationFailure`].

use serde::Serialize;
use thiserror::Error;

use super::pipeline::PipelineStage;
use crate::core::types::{BranchRef, RepositoryRef};
use crate::forge::ForgeError;

/// Errors from tool operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Input failed shape/type validation before any network call.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Every owner source came up empty and the authenticated-user lookup
    /// failed.
    #[error("could not resolve repository owner: {0}")]
    OwnerResolution(ForgeError),

    /// The branch reference has no usable tip.
    #[error("branch '{branch}' not found")]
    BranchNotFound { branch: String },

    /// The tip commit came back without a tree.
    #[error("commit {commit} has no tree")]
    TreeUnavailable { commit: String },

    /// One or more blob uploads failed.
    #[error("failed to upload {}: {message}", .paths.join(", "))]
    BlobUpload { paths: Vec<String>, message: String },

    /// Nothing to commit.
    #[error("no file changes to commit")]
    EmptyChangeset,

    /// The remote did not return a usable tree id.
    #[error("tree construction failed: {0}")]
    TreeConstruction(String),

    /// The remote did not return a usable commit id.
    #[error("commit construction failed: {0}")]
    CommitConstruction(String),

    /// The branch moved between reading its tip and updating it.
    #[error("branch '{branch}' moved during the commit: {message}")]
    ReferenceConflict { branch: String, message: String },

    /// Any other transport or API failure.
    #[error("remote error: {0}")]
    Remote(#[from] ForgeError),
}

impl OperationError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::InvalidArguments(_) => "InvalidArguments",
            OperationError::OwnerResolution(_) => "OwnerResolutionError",
            OperationError::BranchNotFound { .. } => "BranchNotFoundError",
            OperationError::TreeUnavailable { .. } => "TreeUnavailableError",
            OperationError::BlobUpload { .. } => "BlobUploadError",
            OperationError::EmptyChangeset => "EmptyChangesetError",
            OperationError::TreeConstruction(_) => "TreeConstructionError",
            OperationError::CommitConstruction(_) => "CommitConstructionError",
            OperationError::ReferenceConflict { .. } => "ReferenceConflictError",
            OperationError::Remote(_) => "RemoteError",
        }
    }
}

/// An operation error plus the context known when it happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{error}")]
pub struct OperationFailure {
    pub error: OperationError,
    /// `owner/name`, once resolved
    pub repository: Option<String>,
    /// Branch, once resolved
    pub branch: Option<String>,
    /// Pipeline stage that failed (commit pipeline only)
    pub stage: Option<PipelineStage>,
}

impl OperationFailure {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    pub fn with_repository(mut self, repo: &RepositoryRef) -> Self {
        self.repository = Some(repo.full_name());
        self
    }

    pub fn with_branch(mut self, branch: &BranchRef) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn at_stage(mut self, stage: PipelineStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Shape the structured error returned to callers.
    pub fn payload(&self) -> ErrorPayload {
        let paths = match &self.error {
            OperationError::BlobUpload { paths, .. } => Some(paths.clone()),
            _ => None,
        };

        ErrorPayload {
            kind: self.kind(),
            message: self.error.to_string(),
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            stage: self.stage,
            paths,
        }
    }
}

impl From<OperationError> for OperationFailure {
    fn from(error: OperationError) -> Self {
        Self {
            error,
            repository: None,
            branch: None,
            stage: None,
        }
    }
}

impl From<ForgeError> for OperationFailure {
    fn from(error: ForgeError) -> Self {
        OperationError::Remote(error).into()
    }
}

/// Structured error as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}
