//! forge::traits
//!
//! Forge trait definition for reading and writing remote repositories.
//!
//! # Design
//!
//! The `Forge` trait is async because every operation is network I/O.
//! Methods mirror the remote's low-level object model: refs, commits,
//! blobs and trees. Sequencing them into a commit is the engine's job, not
//! the forge's.
//!
//! Methods that create objects return the identifier exactly as the remote
//! reported it (`Option<String>`). Deciding whether that identifier is
//! usable belongs to the caller, which knows which step failed.
//!
//! # Example
//!
//! ```ignore
//! use forge_relay::forge::Forge;
//! use forge_relay::core::types::{BranchRef, RepositoryRef};
//!
//! async fn tip(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     let repo = RepositoryRef::new("octocat", "hello-world").unwrap();
//!     let branch = BranchRef::new("main").unwrap();
//!     if let Some(sha) = forge.get_ref(&repo, &branch).await? {
//!         println!("main is at {}", sha);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{BlobRecord, BranchRef, RepositoryRef, Sha};

/// Errors from forge operations.
///
/// These error types map to common failure modes when talking to the
/// remote's API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A ref update was rejected because it is not a fast-forward.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Repository metadata as returned by the forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    /// Repository name
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Owner login
    pub owner: String,
    pub description: Option<String>,
    /// Web URL
    pub html_url: String,
    /// Server-declared default branch (absent for some empty repositories)
    pub default_branch: Option<String>,
    pub private: bool,
}

/// Request to create a repository.
#[derive(Debug, Clone, Default)]
pub struct CreateRepoRequest {
    /// Organization to create under; `None` creates under the authenticated user
    pub organization: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    /// Create an initial commit so the default branch exists
    pub auto_init: bool,
}

/// A git commit object as read from or written to the forge.
///
/// Identifiers are raw; any of them may be missing if the remote
/// misbehaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitObject {
    pub sha: Option<String>,
    pub tree_sha: Option<String>,
    pub parents: Vec<String>,
    pub html_url: Option<String>,
}

/// A file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
}

/// The head commit of a branch with its metadata and changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub sha: String,
    pub html_url: Option<String>,
    pub message: String,
    pub author: Option<String>,
    /// Author date, as reported by the forge
    pub date: Option<String>,
    pub files: Vec<ChangedFile>,
}

/// How far `head` has diverged from `base`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub ahead_by: u64,
    pub behind_by: u64,
}

/// The Forge trait for interacting with remote hosting services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
/// They hold no per-operation state; two pipelines may share one forge.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Implementations never retry.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Login of the principal the credential belongs to.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` / `AuthFailed` if there is no usable credential
    async fn authenticated_user(&self) -> Result<String, ForgeError>;

    /// List repositories for `owner`, or for the authenticated user if `None`.
    async fn list_repositories(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<RepositoryInfo>, ForgeError>;

    /// Read repository metadata.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository doesn't exist or isn't visible
    async fn get_repository(&self, repo: &RepositoryRef) -> Result<RepositoryInfo, ForgeError>;

    /// Create a repository.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the name is taken or invalid
    async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> Result<RepositoryInfo, ForgeError>;

    /// Read the commit a branch points at.
    ///
    /// Returns `Ok(None)` when the branch does not exist.
    async fn get_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<Option<String>, ForgeError>;

    /// Read a commit object.
    async fn get_commit(&self, repo: &RepositoryRef, sha: &Sha)
        -> Result<CommitObject, ForgeError>;

    /// Upload UTF-8 content as a blob, returning its id.
    async fn create_blob(
        &self,
        repo: &RepositoryRef,
        content: &str,
    ) -> Result<Option<String>, ForgeError>;

    /// Write a tree that layers `entries` over `base_tree`.
    ///
    /// Paths in `entries` are added or replaced; every other path in the
    /// base tree is inherited.
    async fn create_tree(
        &self,
        repo: &RepositoryRef,
        base_tree: &Sha,
        entries: &[BlobRecord],
    ) -> Result<Option<String>, ForgeError>;

    /// Write a commit object. Does not move any ref.
    async fn create_commit(
        &self,
        repo: &RepositoryRef,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<CommitObject, ForgeError>;

    /// Move a branch to `sha`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `force` is false and the move is not a fast-forward
    /// - `NotFound` if the branch doesn't exist
    async fn update_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
        sha: &Sha,
        force: bool,
    ) -> Result<(), ForgeError>;

    /// Read the head commit of a branch, with message, author and files.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch doesn't exist
    async fn branch_head(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<CommitSummary, ForgeError>;

    /// Compare two branches (`base...head`).
    async fn compare(
        &self,
        repo: &RepositoryRef,
        base: &BranchRef,
        head: &BranchRef,
    ) -> Result<Comparison, ForgeError>;
}
