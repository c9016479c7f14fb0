//! engine::steps
//!
//! The individual remote writes of a commit, one function per step.
//!
//! Each step takes what the previous one produced and returns a typed
//! record. None of them retry. A missing identifier in a response is
//! treated the same as a failed call: the remote did not give us anything
//! we can build on.

use futures::stream::{self, StreamExt};

use super::error::OperationError;
use crate::core::types::{
    BlobRecord, BranchRef, CommitRecord, FileChange, RepositoryRef, Sha, TreeSnapshot,
};
use crate::forge::{Forge, ForgeError};

/// The branch tip captured at pipeline start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipSnapshot {
    pub commit_sha: Sha,
    pub tree_sha: Sha,
}

/// Read the current tip commit of `branch` and the tree it points at.
///
/// # Errors
///
/// - `BranchNotFound` if the ref does not exist or carries no usable id
/// - `TreeUnavailable` if the tip commit has no usable tree id
/// - `Remote` for any other failure
pub async fn read_tip(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    branch: &BranchRef,
) -> Result<TipSnapshot, OperationError> {
    let not_found = || OperationError::BranchNotFound {
        branch: branch.to_string(),
    };

    let tip = match forge.get_ref(repo, branch).await {
        Ok(tip) => tip,
        Err(ForgeError::NotFound(_)) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let commit_sha = Sha::parse_usable(tip.as_deref()).ok_or_else(not_found)?;

    let commit = forge.get_commit(repo, &commit_sha).await?;
    let tree_sha = Sha::parse_usable(commit.tree_sha.as_deref()).ok_or_else(|| {
        OperationError::TreeUnavailable {
            commit: commit_sha.to_string(),
        }
    })?;

    Ok(TipSnapshot {
        commit_sha,
        tree_sha,
    })
}

/// Upload every file as a blob, at most `concurrency` at a time.
///
/// Records come back in input order. Every upload is attempted even when
/// one fails, so the error names all failing paths at once.
///
/// # Errors
///
/// - `EmptyChangeset` if `files` is empty (nothing is uploaded)
/// - `BlobUpload` if any upload fails or returns no usable id
pub async fn write_blobs(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    files: &[FileChange],
    concurrency: usize,
) -> Result<Vec<BlobRecord>, OperationError> {
    if files.is_empty() {
        return Err(OperationError::EmptyChangeset);
    }

    let results: Vec<Result<Sha, String>> = stream::iter(files)
        .map(|file| async move {
            match forge.create_blob(repo, &file.content).await {
                Ok(sha) => Sha::parse_usable(sha.as_deref())
                    .ok_or_else(|| "remote returned no blob id".to_string()),
                Err(e) => Err(e.to_string()),
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut records = Vec::with_capacity(files.len());
    let mut failed_paths = Vec::new();
    let mut first_message = None;

    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(sha) => records.push(BlobRecord::new(file.path.clone(), sha)),
            Err(message) => {
                tracing::debug!(path = %file.path, error = %message, "blob upload failed");
                failed_paths.push(file.path.clone());
                first_message.get_or_insert(message);
            }
        }
    }

    if !failed_paths.is_empty() {
        return Err(OperationError::BlobUpload {
            paths: failed_paths,
            message: first_message.unwrap_or_default(),
        });
    }
    if records.is_empty() {
        return Err(OperationError::EmptyChangeset);
    }

    Ok(records)
}

/// Write a tree layering `blobs` over `base_tree`.
///
/// Paths not in `blobs` keep their entries from the base tree.
///
/// # Errors
///
/// - `TreeConstruction` if the remote rejects the tree or returns no id
pub async fn build_tree(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    base_tree: &Sha,
    blobs: &[BlobRecord],
) -> Result<TreeSnapshot, OperationError> {
    let sha = forge
        .create_tree(repo, base_tree, blobs)
        .await
        .map_err(|e| OperationError::TreeConstruction(e.to_string()))?;
    let sha = Sha::parse_usable(sha.as_deref())
        .ok_or_else(|| OperationError::TreeConstruction("remote returned no tree id".into()))?;

    Ok(TreeSnapshot {
        sha,
        base_sha: base_tree.clone(),
    })
}

/// Write a commit of `tree` with `parent` as its only parent.
///
/// # Errors
///
/// - `CommitConstruction` if the remote rejects the commit or returns no id
pub async fn write_commit(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    message: &str,
    tree: &TreeSnapshot,
    parent: &Sha,
) -> Result<CommitRecord, OperationError> {
    let commit = forge
        .create_commit(repo, message, &tree.sha, std::slice::from_ref(parent))
        .await
        .map_err(|e| OperationError::CommitConstruction(e.to_string()))?;
    let sha = Sha::parse_usable(commit.sha.as_deref()).ok_or_else(|| {
        OperationError::CommitConstruction("remote returned no commit id".into())
    })?;

    Ok(CommitRecord {
        sha,
        tree_sha: tree.sha.clone(),
        parent_sha: parent.clone(),
        message: message.to_string(),
        html_url: commit.html_url,
    })
}

/// Move `branch` to `commit`, refusing anything but a fast-forward.
///
/// # Errors
///
/// - `ReferenceConflict` if the branch moved since its tip was read
/// - `BranchNotFound` if the branch disappeared
/// - `Remote` for any other failure
pub async fn update_branch(
    forge: &dyn Forge,
    repo: &RepositoryRef,
    branch: &BranchRef,
    commit: &CommitRecord,
) -> Result<(), OperationError> {
    match forge.update_ref(repo, branch, &commit.sha, false).await {
        Ok(()) => Ok(()),
        Err(ForgeError::Conflict(message)) => Err(OperationError::ReferenceConflict {
            branch: branch.to_string(),
            message,
        }),
        Err(ForgeError::NotFound(_)) => Err(OperationError::BranchNotFound {
            branch: branch.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
