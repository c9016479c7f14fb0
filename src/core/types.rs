//! core::types
//!
//! Strong types for the commit construction pipeline.
//!
//! # Types
//!
//! - [`Sha`] - Remote object identifier (blob, tree or commit)
//! - [`RepositoryRef`] - Owner plus repository name
//! - [`BranchRef`] - Validated branch name
//! - [`FileChange`] - One `(path, content)` pair supplied by the caller
//! - [`BlobRecord`] - An uploaded blob, ready to be placed in a tree
//! - [`TreeSnapshot`] - A newly written tree and the tree it was layered on
//! - [`CommitRecord`] - A newly written commit
//! - [`PipelineResult`] - The payload returned after a successful commit
//!
//! # Lifetime
//!
//! Every value here is scoped to a single operation. Nothing is cached
//! between calls; the remote repository is the only source of truth.
//!
//! # Examples
//!
//! ```
//! use forge_relay::core::types::{BranchRef, RepositoryRef, Sha};
//!
//! let repo = RepositoryRef::new("octocat", "hello-world").unwrap();
//! assert_eq!(repo.full_name(), "octocat/hello-world");
//!
//! let branch = BranchRef::new("feature/docs").unwrap();
//! assert_eq!(branch.as_str(), "feature/docs");
//!
//! assert!(Sha::new("not-a-sha").is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid repository: {0}")]
    InvalidRepository(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidSha(String),

    #[error("invalid file path: {0}")]
    InvalidPath(String),
}

/// A remote object identifier.
///
/// Accepts 40 (SHA-1) or 64 (SHA-256) hex characters, normalized to
/// lowercase.
///
/// # Example
///
/// ```
/// use forge_relay::core::types::Sha;
///
/// let sha = Sha::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(sha.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(sha.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha(String);

impl Sha {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSha` if the string is not a 40 or 64
    /// character hex id.
    pub fn new(sha: impl Into<String>) -> Result<Self, TypeError> {
        let sha = sha.into().to_ascii_lowercase();
        Self::validate(&sha)?;
        Ok(Self(sha))
    }

    /// Parse an optional id returned by the remote.
    ///
    /// Missing, empty and malformed ids all come back as `None`: the remote
    /// did not hand us anything usable.
    pub fn parse_usable(sha: Option<&str>) -> Option<Self> {
        sha.and_then(|s| Self::new(s).ok())
    }

    /// Get an abbreviated form of the id.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    fn validate(sha: &str) -> Result<(), TypeError> {
        if sha.len() != 40 && sha.len() != 64 {
            return Err(TypeError::InvalidSha(format!(
                "expected 40 or 64 hex characters, got {}",
                sha.len()
            )));
        }
        if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidSha(format!("non-hex characters in '{sha}'")));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sha {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Sha> for String {
    fn from(sha: Sha) -> Self {
        sha.0
    }
}

impl AsRef<str> for Sha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository on the remote, identified by owner and name.
///
/// Both parts are non-empty. The owner is resolved once per operation and
/// this value is then reused for every call that operation makes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// User or organization login
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryRef {
    /// Create a new repository reference.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepository` if either part is empty or
    /// contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into().trim().to_string();
        let name = name.into().trim().to_string();

        if owner.is_empty() {
            return Err(TypeError::InvalidRepository("owner cannot be empty".into()));
        }
        if name.is_empty() {
            return Err(TypeError::InvalidRepository("name cannot be empty".into()));
        }
        if owner.contains('/') || name.contains('/') {
            return Err(TypeError::InvalidRepository(format!(
                "'{owner}/{name}' must be given as separate owner and name"
            )));
        }

        Ok(Self { owner, name })
    }

    /// `owner/name`, as the remote displays it.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A validated branch name, scoped to a [`RepositoryRef`] by its caller.
///
/// Applies the subset of Git's refname rules that the remote would
/// otherwise reject with an opaque error.
///
/// # Example
///
/// ```
/// use forge_relay::core::types::BranchRef;
///
/// assert!(BranchRef::new("main").is_ok());
/// assert!(BranchRef::new("release/1.0").is_ok());
/// assert!(BranchRef::new("").is_err());
/// assert!(BranchRef::new("bad..name").is_err());
/// assert!(BranchRef::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchRef(String);

impl BranchRef {
    /// Literal branch used when nothing better is known.
    pub const FALLBACK: &'static str = "main";

    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name breaks refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The literal fallback branch (`main`).
    pub fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name.starts_with('-') || name.starts_with('/') || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(format!(
                "'{name}' cannot start with '-' or start/end with '/'"
            )));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock'".into(),
            ));
        }
        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{pattern}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_ascii_control())
        {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain {c:?}"
            )));
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchRef {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchRef> for String {
    fn from(branch: BranchRef) -> Self {
        branch.0
    }
}

impl AsRef<str> for BranchRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One file to write, relative to the repository root.
///
/// Content is UTF-8 text. Duplicate paths within one request are passed
/// through untouched; the remote's tree merge decides which one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-root-relative path
    pub path: String,
    /// Raw file content
    pub content: String,
}

impl FileChange {
    /// Create a file change, rejecting empty, absolute or escaping paths.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` for paths the remote tree cannot hold.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Result<Self, TypeError> {
        let change = Self {
            path: path.into(),
            content: content.into(),
        };
        change.validate()?;
        Ok(change)
    }

    /// Check that the path is non-empty, repository-relative and stays inside
    /// the repository.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.path.trim().is_empty() {
            return Err(TypeError::InvalidPath("path cannot be empty".into()));
        }
        if self.path.starts_with('/') {
            return Err(TypeError::InvalidPath(format!(
                "'{}' must be relative to the repository root",
                self.path
            )));
        }
        if self.path.split('/').any(|segment| segment == "..") {
            return Err(TypeError::InvalidPath(format!(
                "'{}' must not contain '..' segments",
                self.path
            )));
        }
        Ok(())
    }
}

/// File mode for a regular, non-executable file.
pub const BLOB_MODE: &str = "100644";

/// An uploaded blob, as a tree entry.
///
/// Produced one-to-one from a [`FileChange`] and dropped once the tree is
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobRecord {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: Sha,
}

impl BlobRecord {
    /// A regular-file tree entry for `path`.
    pub fn new(path: impl Into<String>, sha: Sha) -> Self {
        Self {
            path: path.into(),
            mode: BLOB_MODE,
            kind: "blob",
            sha,
        }
    }
}

/// A freshly written tree and the tree it was layered on.
///
/// `base_sha` is the tree of the branch tip captured at pipeline start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub sha: Sha,
    pub base_sha: Sha,
}

/// A freshly written commit. Always exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: Sha,
    pub tree_sha: Sha,
    pub parent_sha: Sha,
    pub message: String,
    /// Web URL of the commit, if the remote returned one
    pub html_url: Option<String>,
}

/// Outcome marker carried in every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Failure,
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStatus::Success => write!(f, "success"),
            PipelineStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Payload returned by a successful `create_commit`.
///
/// Built once, after the branch has moved. Failed runs produce an error
/// instead, never a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub commit_sha: Option<Sha>,
    pub html_url: Option<String>,
    /// `owner/name`
    pub repository: String,
    pub branch: String,
    pub files_changed: usize,
    /// Input paths, in input order
    pub file_paths: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl PipelineResult {
    /// Shape the success payload for a commit that landed on `branch`.
    pub fn success(
        repo: &RepositoryRef,
        branch: &BranchRef,
        commit: &CommitRecord,
        files: &[FileChange],
    ) -> Self {
        Self {
            status: PipelineStatus::Success,
            commit_sha: Some(commit.sha.clone()),
            html_url: commit.html_url.clone(),
            repository: repo.full_name(),
            branch: branch.to_string(),
            files_changed: files.len(),
            file_paths: files.iter().map(|f| f.path.clone()).collect(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1: &str = "abc123def4567890abc123def4567890abc12345";

    mod sha {
        use super::*;

        #[test]
        fn accepts_sha1_and_sha256() {
            assert!(Sha::new(SHA1).is_ok());
            assert!(Sha::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let sha = Sha::new(SHA1.to_uppercase()).unwrap();
            assert_eq!(sha.as_str(), SHA1);
        }

        #[test]
        fn rejects_wrong_length_and_non_hex() {
            assert!(Sha::new("").is_err());
            assert!(Sha::new("abc123").is_err());
            assert!(Sha::new("g".repeat(40)).is_err());
        }

        #[test]
        fn parse_usable_filters_missing_and_malformed() {
            assert!(Sha::parse_usable(None).is_none());
            assert!(Sha::parse_usable(Some("")).is_none());
            assert!(Sha::parse_usable(Some("nope")).is_none());
            assert_eq!(
                Sha::parse_usable(Some(SHA1)).map(String::from),
                Some(SHA1.to_string())
            );
        }

        #[test]
        fn short_clamps_to_length() {
            let sha = Sha::new(SHA1).unwrap();
            assert_eq!(sha.short(7), "abc123d");
            assert_eq!(sha.short(100), SHA1);
        }

        #[test]
        fn serde_roundtrip_validates() {
            let json = format!("\"{SHA1}\"");
            let sha: Sha = serde_json::from_str(&json).unwrap();
            assert_eq!(sha.as_str(), SHA1);
            assert!(serde_json::from_str::<Sha>("\"xyz\"").is_err());
        }
    }

    mod repository_ref {
        use super::*;

        #[test]
        fn full_name_and_display() {
            let repo = RepositoryRef::new("octocat", "hello-world").unwrap();
            assert_eq!(repo.full_name(), "octocat/hello-world");
            assert_eq!(repo.to_string(), "octocat/hello-world");
        }

        #[test]
        fn trims_whitespace() {
            let repo = RepositoryRef::new(" octocat ", "repo\n").unwrap();
            assert_eq!(repo.owner, "octocat");
            assert_eq!(repo.name, "repo");
        }

        #[test]
        fn rejects_empty_parts() {
            assert!(RepositoryRef::new("", "repo").is_err());
            assert!(RepositoryRef::new("owner", "  ").is_err());
        }

        #[test]
        fn rejects_combined_form() {
            assert!(RepositoryRef::new("owner", "owner/repo").is_err());
        }
    }

    mod branch_ref {
        use super::*;

        #[test]
        fn valid_names() {
            for name in ["main", "feature/x", "user@topic", "v1.2.3"] {
                assert!(BranchRef::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn invalid_names() {
            for name in [
                "", "-x", "/x", "x/", "a..b", "a@{b", "a//b", "x.lock", "a b", "a:b", "a\tb",
            ] {
                assert!(BranchRef::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn fallback_is_main() {
            assert_eq!(BranchRef::fallback().as_str(), "main");
        }
    }

    mod file_change {
        use super::*;

        #[test]
        fn rejects_empty_and_absolute_paths() {
            assert!(FileChange::new("", "x").is_err());
            assert!(FileChange::new("   ", "x").is_err());
            assert!(FileChange::new("/etc/passwd", "x").is_err());
        }

        #[test]
        fn rejects_parent_segments() {
            assert!(FileChange::new("../outside.txt", "x").is_err());
            assert!(FileChange::new("docs/../../outside.txt", "x").is_err());
            assert!(FileChange::new("docs/..", "x").is_err());
        }

        #[test]
        fn dots_inside_names_are_fine() {
            assert!(FileChange::new("docs/..notes.md", "x").is_ok());
            assert!(FileChange::new("release..v2/changelog", "x").is_ok());
        }

        #[test]
        fn accepts_nested_paths_and_empty_content() {
            let change = FileChange::new("docs/guide.md", "").unwrap();
            assert_eq!(change.path, "docs/guide.md");
            assert!(change.content.is_empty());
        }
    }

    mod blob_record {
        use super::*;

        #[test]
        fn serializes_as_tree_entry() {
            let record = BlobRecord::new("a.txt", Sha::new(SHA1).unwrap());
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(json["path"], "a.txt");
            assert_eq!(json["mode"], "100644");
            assert_eq!(json["type"], "blob");
            assert_eq!(json["sha"], SHA1);
        }
    }

    mod pipeline_result {
        use super::*;

        #[test]
        fn success_preserves_input_order() {
            let repo = RepositoryRef::new("o", "r").unwrap();
            let branch = BranchRef::new("main").unwrap();
            let sha = Sha::new(SHA1).unwrap();
            let commit = CommitRecord {
                sha: sha.clone(),
                tree_sha: sha.clone(),
                parent_sha: sha,
                message: "msg".into(),
                html_url: Some("https://example.com/c".into()),
            };
            let files = vec![
                FileChange::new("z.txt", "1").unwrap(),
                FileChange::new("a.txt", "2").unwrap(),
            ];

            let result = PipelineResult::success(&repo, &branch, &commit, &files);
            assert_eq!(result.status, PipelineStatus::Success);
            assert_eq!(result.files_changed, 2);
            assert_eq!(result.file_paths, vec!["z.txt", "a.txt"]);
            assert_eq!(result.repository, "o/r");

            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(json["status"], "success");
            assert_eq!(json["commit_sha"], SHA1);
        }
    }
}
