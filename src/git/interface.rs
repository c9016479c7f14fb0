//! git::interface
//!
//! Git interface implementation using git2.
//!
//! Only the reads needed for identity resolution live here: remote URLs and
//! config values. No working-tree state is read or written.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::Internal`]: Any other libgit2 failure
//!
//! # Example
//!
//! ```ignore
//! use forge_relay::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(url) = git.remote_url("origin")? {
//!     println!("origin is {}", url);
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Any other libgit2 failure.
    #[error("git error: {message}")]
    Internal {
        /// Message from libgit2
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(e: git2::Error) -> Self {
        GitError::Internal {
            message: e.message().to_string(),
        }
    }
}

/// A local git repository, opened read-only for metadata.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository. Bare
    /// repositories are accepted; only config is read.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a string config value (repository config layered over
    /// global and system config).
    ///
    /// Returns `None` if the key is unset.
    pub fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        let config = self.repo.config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a remote URL into `(owner, repo)`, for any host.
    ///
    /// The owner is the path segment immediately following the host.
    /// Handles:
    /// - `https://host/owner/repo.git` (and `http://`, `ssh://`, `git://`)
    /// - `https://user@host/owner/repo`
    /// - `git@host:owner/repo.git` and `host:owner/repo.git` (scp-like)
    ///
    /// # Example
    ///
    /// ```
    /// use forge_relay::git::Git;
    ///
    /// assert_eq!(
    ///     Git::parse_remote_url("https://github.com/owner/repo.git"),
    ///     Some(("owner".to_string(), "repo".to_string()))
    /// );
    /// assert_eq!(
    ///     Git::parse_remote_url("git@gitlab.example.com:team/project.git"),
    ///     Some(("team".to_string(), "project".to_string()))
    /// );
    /// assert_eq!(Git::parse_remote_url("/srv/git/repo.git"), None);
    /// ```
    pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
        let url = url.trim();

        // URL form: scheme://[user@]host[:port]/owner/repo[.git]
        if let Some((_, rest)) = url.split_once("://") {
            let (_host, path) = rest.split_once('/')?;
            return Self::parse_owner_repo(path);
        }

        // scp-like form: [user@]host:owner/repo[.git]
        let (host, path) = url.split_once(':')?;
        if host.is_empty() || host.contains('/') {
            return None;
        }
        Self::parse_owner_repo(path)
    }

    /// Parse "owner/repo.git" or "owner/repo" into (owner, repo).
    fn parse_owner_repo(path: &str) -> Option<(String, String)> {
        let path = path.trim_start_matches('/').trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.split_once('/')?;

        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some((owner.to_string(), repo.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_remote_url {
        use super::*;

        fn pair(owner: &str, repo: &str) -> Option<(String, String)> {
            Some((owner.to_string(), repo.to_string()))
        }

        #[test]
        fn https_with_git_suffix() {
            assert_eq!(
                Git::parse_remote_url("https://github.com/octocat/hello-world.git"),
                pair("octocat", "hello-world")
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                Git::parse_remote_url("https://github.com/octocat/hello-world"),
                pair("octocat", "hello-world")
            );
        }

        #[test]
        fn https_with_credentials_and_port() {
            assert_eq!(
                Git::parse_remote_url("https://x-token@git.example.com:8443/team/svc.git"),
                pair("team", "svc")
            );
        }

        #[test]
        fn ssh_scp_form() {
            assert_eq!(
                Git::parse_remote_url("git@github.com:octocat/hello-world.git"),
                pair("octocat", "hello-world")
            );
        }

        #[test]
        fn scp_form_without_user() {
            assert_eq!(
                Git::parse_remote_url("github.com:octocat/hello-world.git"),
                pair("octocat", "hello-world")
            );
        }

        #[test]
        fn ssh_url_form() {
            assert_eq!(
                Git::parse_remote_url("ssh://git@github.com/octocat/hello-world.git"),
                pair("octocat", "hello-world")
            );
        }

        #[test]
        fn non_github_hosts_supported() {
            assert_eq!(
                Git::parse_remote_url("git@gitlab.com:group/project.git"),
                pair("group", "project")
            );
        }

        #[test]
        fn local_paths_rejected() {
            assert!(Git::parse_remote_url("/srv/git/repo.git").is_none());
            assert!(Git::parse_remote_url("../repo").is_none());
        }

        #[test]
        fn missing_segments_rejected() {
            assert!(Git::parse_remote_url("https://github.com/").is_none());
            assert!(Git::parse_remote_url("https://github.com/owner").is_none());
            assert!(Git::parse_remote_url("git@github.com:owner").is_none());
            assert!(Git::parse_remote_url("not a url").is_none());
        }

        #[test]
        fn repo_with_dots() {
            assert_eq!(
                Git::parse_remote_url("git@github.com:owner/repo.name.git"),
                pair("owner", "repo.name")
            );
        }
    }

    mod git_error {
        use super::*;

        #[test]
        fn error_display_formatting() {
            let err = GitError::NotARepo {
                path: PathBuf::from("/tmp/nowhere"),
            };
            assert!(err.to_string().contains("/tmp/nowhere"));

            let err = GitError::Internal {
                message: "locked".into(),
            };
            assert_eq!(err.to_string(), "git error: locked");
        }
    }
}
