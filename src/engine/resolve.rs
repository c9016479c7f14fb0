//! engine::resolve
//!
//! Identity Resolver: decides which owner and branch an operation targets
//! when the caller leaves them out.
//!
//! # Owner
//!
//! Sources are tried in priority order, first non-empty value wins:
//!
//! 1. Explicit argument
//! 2. Owner segment of the local `origin` remote URL
//! 3. Local git `user.name`
//! 4. Login of the authenticated API principal
//!
//! Only a failure of the last source is fatal (`OwnerResolutionError`).
//!
//! # Branch
//!
//! 1. Explicit argument
//! 2. The repository's server-declared default branch
//! 3. The literal `main`
//!
//! Branch resolution never fails. The literal fallback is a guess: when
//! the metadata read fails and the real default branch is not called
//! `main`, the operation targets the wrong branch. Callers find out at the
//! tip read (`BranchNotFoundError`) or, worse, by committing to an
//! unrelated `main`. The `source` field of [`ResolvedBranch`] exposes the
//! guess so callers can flag it.
//!
//! Nothing is cached: every operation resolves afresh.

use std::path::Path;

use serde::Serialize;

use super::error::OperationError;
use crate::core::types::{BranchRef, RepositoryRef};
use crate::forge::Forge;
use crate::git::Git;

/// Owner and user name read from the local git repository.
///
/// A plain snapshot so resolution never holds a libgit2 handle across an
/// await point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Owner segment of the `origin` remote URL
    pub remote_owner: Option<String>,
    /// `user.name` from git config
    pub user_name: Option<String>,
}

impl LocalIdentity {
    /// Remote consulted for the owner.
    pub const REMOTE: &'static str = "origin";

    /// Read identity hints from the repository containing `path`.
    ///
    /// Never fails: a missing repository, remote or config key just leaves
    /// the corresponding hint empty.
    pub fn discover(path: &Path) -> Self {
        let git = match Git::open(path) {
            Ok(git) => git,
            Err(e) => {
                tracing::debug!(error = %e, "no local repository for identity hints");
                return Self::default();
            }
        };

        let remote_owner = git
            .remote_url(Self::REMOTE)
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "failed to read origin remote");
                None
            })
            .and_then(|url| Git::parse_remote_url(&url))
            .map(|(owner, _)| owner);

        let user_name = git.config_string("user.name").unwrap_or_else(|e| {
            tracing::debug!(error = %e, "failed to read user.name");
            None
        });

        Self {
            remote_owner,
            user_name,
        }
    }
}

/// Where a resolved owner came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerSource {
    Explicit,
    GitRemote,
    GitUserName,
    AuthenticatedUser,
}

/// An owner and the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOwner {
    pub owner: String,
    pub source: OwnerSource,
}

/// Where a resolved branch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchSource {
    Explicit,
    DefaultBranch,
    /// The literal `main`, used because the default branch could not be read
    Fallback,
}

/// A branch and the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    pub branch: BranchRef,
    pub source: BranchSource,
}

/// Resolves owner and branch for one operation.
pub struct IdentityResolver<'a> {
    forge: &'a dyn Forge,
    local: &'a LocalIdentity,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(forge: &'a dyn Forge, local: &'a LocalIdentity) -> Self {
        Self { forge, local }
    }

    /// Resolve the repository owner.
    ///
    /// # Errors
    ///
    /// `OwnerResolution` if no local source yields a value and the
    /// authenticated-user lookup fails.
    pub async fn resolve_owner(
        &self,
        explicit: Option<&str>,
    ) -> Result<ResolvedOwner, OperationError> {
        let local_sources = [
            (OwnerSource::Explicit, explicit),
            (OwnerSource::GitRemote, self.local.remote_owner.as_deref()),
            (OwnerSource::GitUserName, self.local.user_name.as_deref()),
        ];

        for (source, value) in local_sources {
            if let Some(owner) = value.map(str::trim).filter(|v| !v.is_empty()) {
                tracing::debug!(owner, ?source, "resolved owner");
                return Ok(ResolvedOwner {
                    owner: owner.to_string(),
                    source,
                });
            }
        }

        let owner = self
            .forge
            .authenticated_user()
            .await
            .map_err(OperationError::OwnerResolution)?;
        tracing::debug!(owner = %owner, "resolved owner from authenticated user");

        Ok(ResolvedOwner {
            owner,
            source: OwnerSource::AuthenticatedUser,
        })
    }

    /// Resolve the owner and combine it with `name`.
    ///
    /// # Errors
    ///
    /// - `InvalidArguments` if `name` is empty or the pair is malformed
    /// - `OwnerResolution` as for [`resolve_owner`](Self::resolve_owner)
    pub async fn resolve_repository(
        &self,
        name: &str,
        explicit_owner: Option<&str>,
    ) -> Result<RepositoryRef, OperationError> {
        if name.trim().is_empty() {
            return Err(OperationError::InvalidArguments(
                "repo cannot be empty".into(),
            ));
        }

        let owner = self.resolve_owner(explicit_owner).await?;
        RepositoryRef::new(owner.owner, name)
            .map_err(|e| OperationError::InvalidArguments(e.to_string()))
    }

    /// Resolve the target branch. Never fails.
    pub async fn resolve_branch(
        &self,
        repo: &RepositoryRef,
        explicit: Option<&BranchRef>,
    ) -> ResolvedBranch {
        if let Some(branch) = explicit {
            return ResolvedBranch {
                branch: branch.clone(),
                source: BranchSource::Explicit,
            };
        }

        let declared = match self.forge.get_repository(repo).await {
            Ok(info) => info.default_branch.and_then(|b| BranchRef::new(b).ok()),
            Err(e) => {
                tracing::debug!(repo = %repo, error = %e, "default branch lookup failed");
                None
            }
        };

        match declared {
            Some(branch) => ResolvedBranch {
                branch,
                source: BranchSource::DefaultBranch,
            },
            None => {
                tracing::warn!(
                    repo = %repo,
                    fallback = BranchRef::FALLBACK,
                    "default branch unknown, falling back to literal branch name"
                );
                ResolvedBranch {
                    branch: BranchRef::fallback(),
                    source: BranchSource::Fallback,
                }
            }
        }
    }
}
