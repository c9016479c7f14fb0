//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps a miniature object store in memory: content-addressed
//! blobs, flat path-to-blob trees, commits and branch refs. Ref updates are
//! fast-forward checked exactly like the real remote, so the commit pipeline
//! can be exercised end to end without a network.
//!
//! Failure scenarios are configured up front:
//! - [`FailOn`] makes one operation return an error
//! - [`OmitField`] makes the remote "forget" to return an identifier
//! - [`MockForge::simulate_concurrent_push`] moves a branch behind the
//!   pipeline's back, between its tip read and its ref update
//!
//! # Example
//!
//! ```
//! use forge_relay::forge::mock::MockForge;
//! use forge_relay::forge::Forge;
//! use forge_relay::core::types::{BranchRef, RepositoryRef};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_repository("octocat", "hello-world", Some("main"));
//! let repo = RepositoryRef::new("octocat", "hello-world").unwrap();
//! let branch = BranchRef::new("main").unwrap();
//!
//! let tip = forge.get_ref(&repo, &branch).await.unwrap();
//! assert!(tip.is_some());
//! # });
//! ```

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{
    ChangedFile, CommitObject, CommitSummary, Comparison, CreateRepoRequest, Forge, ForgeError,
    RepositoryInfo,
};
use crate::core::types::{BlobRecord, BranchRef, RepositoryRef, Sha};

/// Default authenticated login.
pub const MOCK_USER: &str = "mock-user";

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Authenticated login (`None` = no credential).
    user: Option<String>,
    /// Repositories by `owner/name`.
    repos: HashMap<String, MockRepo>,
    /// Objects are global, like a content-addressed store.
    blobs: HashMap<String, String>,
    trees: HashMap<String, BTreeMap<String, String>>,
    commits: HashMap<String, MockCommit>,
    /// Makes otherwise identical commits distinct.
    commit_counter: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Identifier the remote will leave out of its responses.
    omit: Option<OmitField>,
    /// Branch to advance behind the caller's back on the next commit write.
    concurrent_push: Option<String>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct MockRepo {
    info: RepositoryInfo,
    refs: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct MockCommit {
    tree: Option<String>,
    parents: Vec<String>,
    message: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail authenticated_user with the given error.
    AuthenticatedUser(ForgeError),
    /// Fail get_repository with the given error.
    GetRepository(ForgeError),
    /// Fail get_ref with the given error.
    GetRef(ForgeError),
    /// Fail get_commit with the given error.
    GetCommit(ForgeError),
    /// Fail create_blob for content containing the marker.
    CreateBlobContaining(String, ForgeError),
    /// Fail create_tree with the given error.
    CreateTree(ForgeError),
    /// Fail create_commit with the given error.
    CreateCommit(ForgeError),
    /// Fail update_ref with the given error.
    UpdateRef(ForgeError),
    /// Fail compare with the given error.
    Compare(ForgeError),
}

/// Identifier the mock should leave out of its responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmitField {
    /// `get_commit` returns no tree id.
    CommitTree,
    /// `create_blob` returns no id.
    BlobSha,
    /// `create_tree` returns no id.
    TreeSha,
    /// `create_commit` returns no id.
    CommitSha,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    AuthenticatedUser,
    ListRepositories {
        owner: Option<String>,
    },
    GetRepository {
        repo: String,
    },
    CreateRepository {
        name: String,
        organization: Option<String>,
    },
    GetRef {
        repo: String,
        branch: String,
    },
    GetCommit {
        sha: String,
    },
    CreateBlob {
        content: String,
    },
    CreateTree {
        base_tree: String,
        paths: Vec<String>,
    },
    CreateCommit {
        message: String,
        tree: String,
        parents: Vec<String>,
    },
    UpdateRef {
        branch: String,
        sha: String,
        force: bool,
    },
    BranchHead {
        branch: String,
    },
    Compare {
        base: String,
        head: String,
    },
}

impl MockForge {
    /// Create an empty mock forge authenticated as [`MOCK_USER`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                user: Some(MOCK_USER.to_string()),
                repos: HashMap::new(),
                blobs: HashMap::new(),
                trees: HashMap::new(),
                commits: HashMap::new(),
                commit_counter: 0,
                fail_on: None,
                omit: None,
                concurrent_push: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Set (or clear) the authenticated login.
    pub fn with_user(self, login: Option<&str>) -> Self {
        self.lock().user = login.map(String::from);
        self
    }

    /// Add a repository.
    ///
    /// With `default_branch = Some(name)` the repository gets an initial
    /// commit containing `README.md` on that branch. With `None` it is
    /// empty and declares no default branch.
    pub fn with_repository(self, owner: &str, name: &str, default_branch: Option<&str>) -> Self {
        {
            let mut inner = self.lock();
            let mut refs = HashMap::new();
            if let Some(branch) = default_branch {
                let blob = inner.put_blob("# readme\n");
                let tree = inner.put_tree(BTreeMap::from([("README.md".to_string(), blob)]));
                let commit = inner.put_commit(Some(tree), Vec::new(), "Initial commit");
                refs.insert(branch.to_string(), commit);
            }

            let info = RepositoryInfo {
                name: name.to_string(),
                full_name: format!("{}/{}", owner, name),
                owner: owner.to_string(),
                description: None,
                html_url: format!("https://github.com/{}/{}", owner, name),
                default_branch: default_branch.map(String::from),
                private: false,
            };
            inner.repos.insert(info.full_name.clone(), MockRepo { info, refs });
        }
        self
    }

    /// Create a branch pointing at the current tip of `from`.
    pub fn with_branch(self, owner: &str, name: &str, branch: &str, from: &str) -> Self {
        {
            let mut inner = self.lock();
            let key = format!("{}/{}", owner, name);
            if let Some(repo) = inner.repos.get_mut(&key) {
                if let Some(tip) = repo.refs.get(from).cloned() {
                    repo.refs.insert(branch.to_string(), tip);
                }
            }
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use forge_relay::forge::mock::{MockForge, FailOn};
    /// use forge_relay::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreateTree(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Configure the mock to leave an identifier out of its responses.
    pub fn omit(self, field: OmitField) -> Self {
        self.lock().omit = Some(field);
        self
    }

    /// Advance `branch` with a foreign commit the next time a commit is
    /// written, as if another client pushed while the pipeline was running.
    pub fn simulate_concurrent_push(&self, branch: &str) {
        self.lock().concurrent_push = Some(branch.to_string());
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.lock();
        inner.fail_on = None;
        inner.omit = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of blob uploads attempted.
    pub fn blob_uploads(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::CreateBlob { .. }))
            .count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Current tip of a branch (for test verification).
    pub fn branch_tip(&self, owner: &str, name: &str, branch: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .repos
            .get(&format!("{}/{}", owner, name))
            .and_then(|r| r.refs.get(branch).cloned())
    }

    /// Content of `path` as seen from the tip of `branch`.
    pub fn file_at(&self, owner: &str, name: &str, branch: &str, path: &str) -> Option<String> {
        let inner = self.lock();
        let tip = inner
            .repos
            .get(&format!("{}/{}", owner, name))?
            .refs
            .get(branch)?;
        let tree = inner.commits.get(tip)?.tree.as_ref()?;
        let blob = inner.trees.get(tree)?.get(path)?;
        inner.blobs.get(blob).cloned()
    }

    /// Parent ids of a commit (for test verification).
    pub fn commit_parents(&self, sha: &str) -> Option<Vec<String>> {
        self.lock().commits.get(sha).map(|c| c.parents.clone())
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        // A panic in one test thread must not cascade into every other assertion
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an operation and check whether it should fail.
    fn enter(&self, op: MockOperation) -> Result<MutexGuard<'_, MockForgeInner>, ForgeError> {
        let mut inner = self.lock();
        let failure = inner.failure_for(&op);
        inner.operations.push(op);
        match failure {
            Some(err) => Err(err),
            None => Ok(inner),
        }
    }
}

impl MockForgeInner {
    fn failure_for(&self, op: &MockOperation) -> Option<ForgeError> {
        match (&self.fail_on, op) {
            (Some(FailOn::AuthenticatedUser(e)), MockOperation::AuthenticatedUser) => {
                Some(e.clone())
            }
            (Some(FailOn::GetRepository(e)), MockOperation::GetRepository { .. }) => {
                Some(e.clone())
            }
            (Some(FailOn::GetRef(e)), MockOperation::GetRef { .. }) => Some(e.clone()),
            (Some(FailOn::GetCommit(e)), MockOperation::GetCommit { .. }) => Some(e.clone()),
            (
                Some(FailOn::CreateBlobContaining(marker, e)),
                MockOperation::CreateBlob { content },
            ) if content.contains(marker.as_str()) => Some(e.clone()),
            (Some(FailOn::CreateTree(e)), MockOperation::CreateTree { .. }) => Some(e.clone()),
            (Some(FailOn::CreateCommit(e)), MockOperation::CreateCommit { .. }) => {
                Some(e.clone())
            }
            (Some(FailOn::UpdateRef(e)), MockOperation::UpdateRef { .. }) => Some(e.clone()),
            (Some(FailOn::Compare(e)), MockOperation::Compare { .. }) => Some(e.clone()),
            _ => None,
        }
    }

    fn repo(&self, repo: &RepositoryRef) -> Result<&MockRepo, ForgeError> {
        self.repos
            .get(&repo.full_name())
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))
    }

    fn repo_mut(&mut self, repo: &RepositoryRef) -> Result<&mut MockRepo, ForgeError> {
        self.repos
            .get_mut(&repo.full_name())
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))
    }

    fn put_blob(&mut self, content: &str) -> String {
        let sha = digest(&["blob", content]);
        self.blobs.insert(sha.clone(), content.to_string());
        sha
    }

    fn put_tree(&mut self, entries: BTreeMap<String, String>) -> String {
        let flat: Vec<String> = entries.iter().map(|(p, s)| format!("{p}:{s}")).collect();
        let mut parts = vec!["tree"];
        parts.extend(flat.iter().map(String::as_str));
        let sha = digest(&parts);
        self.trees.insert(sha.clone(), entries);
        sha
    }

    fn put_commit(&mut self, tree: Option<String>, parents: Vec<String>, message: &str) -> String {
        self.commit_counter += 1;
        let counter = self.commit_counter.to_string();
        let tree_part = tree.clone().unwrap_or_default();
        let mut parts = vec!["commit", counter.as_str(), tree_part.as_str(), message];
        parts.extend(parents.iter().map(String::as_str));
        let sha = digest(&parts);
        self.commits.insert(
            sha.clone(),
            MockCommit {
                tree,
                parents,
                message: message.to_string(),
            },
        );
        sha
    }

    /// Files that differ between a commit's tree and its first parent's.
    fn changed_files(&self, sha: &str) -> Vec<ChangedFile> {
        let empty = BTreeMap::new();
        let commit = self.commits.get(sha);
        let parent = commit
            .and_then(|c| c.parents.first())
            .and_then(|p| self.commits.get(p));
        let after = self.tree_of(commit).unwrap_or(&empty);
        let before = self.tree_of(parent).unwrap_or(&empty);

        after
            .iter()
            .filter_map(|(path, blob)| {
                let status = match before.get(path) {
                    None => "added",
                    Some(old) if old != blob => "modified",
                    Some(_) => return None,
                };
                Some(ChangedFile {
                    filename: path.clone(),
                    status: status.to_string(),
                    additions: self.blobs.get(blob).map_or(0, |c| c.lines().count() as u64),
                    deletions: 0,
                })
            })
            .collect()
    }

    fn tree_of(&self, commit: Option<&MockCommit>) -> Option<&BTreeMap<String, String>> {
        commit
            .and_then(|c| c.tree.as_ref())
            .and_then(|t| self.trees.get(t))
    }

    /// Is `ancestor` reachable from `descendant` through first parents?
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut current = Some(descendant.to_string());
        while let Some(sha) = current {
            if sha == ancestor {
                return true;
            }
            current = self
                .commits
                .get(&sha)
                .and_then(|c| c.parents.first().cloned());
        }
        false
    }

    fn first_parent_depth(&self, from: &str, stop: &str) -> u64 {
        let mut depth = 0;
        let mut current = Some(from.to_string());
        while let Some(sha) = current {
            if sha == stop {
                break;
            }
            depth += 1;
            current = self
                .commits
                .get(&sha)
                .and_then(|c| c.parents.first().cloned());
        }
        depth
    }
}

/// Content-address `parts` with SHA-256.
fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn authenticated_user(&self) -> Result<String, ForgeError> {
        let inner = self.enter(MockOperation::AuthenticatedUser)?;
        inner.user.clone().ok_or(ForgeError::AuthRequired)
    }

    async fn list_repositories(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<RepositoryInfo>, ForgeError> {
        let inner = self.enter(MockOperation::ListRepositories {
            owner: owner.map(String::from),
        })?;
        let owner = match owner {
            Some(o) => o.to_string(),
            None => inner.user.clone().ok_or(ForgeError::AuthRequired)?,
        };

        let mut repos: Vec<RepositoryInfo> = inner
            .repos
            .values()
            .filter(|r| r.info.owner == owner)
            .map(|r| r.info.clone())
            .collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(repos)
    }

    async fn get_repository(&self, repo: &RepositoryRef) -> Result<RepositoryInfo, ForgeError> {
        let inner = self.enter(MockOperation::GetRepository {
            repo: repo.full_name(),
        })?;
        Ok(inner.repo(repo)?.info.clone())
    }

    async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> Result<RepositoryInfo, ForgeError> {
        let owner = {
            let inner = self.enter(MockOperation::CreateRepository {
                name: request.name.clone(),
                organization: request.organization.clone(),
            })?;
            match &request.organization {
                Some(org) => org.clone(),
                None => inner.user.clone().ok_or(ForgeError::AuthRequired)?,
            }
        };

        let full_name = format!("{}/{}", owner, request.name);
        if self.lock().repos.contains_key(&full_name) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "name already exists on this account".into(),
            });
        }

        let default_branch = request.auto_init.then_some("main");
        let forge = self
            .clone()
            .with_repository(&owner, &request.name, default_branch);

        let mut inner = forge.lock();
        let repo = inner
            .repos
            .get_mut(&full_name)
            .ok_or_else(|| ForgeError::NotFound(full_name.clone()))?;
        repo.info.description = request.description;
        repo.info.private = request.private;
        Ok(repo.info.clone())
    }

    async fn get_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<Option<String>, ForgeError> {
        let inner = self.enter(MockOperation::GetRef {
            repo: repo.full_name(),
            branch: branch.to_string(),
        })?;
        Ok(inner.repo(repo)?.refs.get(branch.as_str()).cloned())
    }

    async fn get_commit(
        &self,
        repo: &RepositoryRef,
        sha: &Sha,
    ) -> Result<CommitObject, ForgeError> {
        let inner = self.enter(MockOperation::GetCommit {
            sha: sha.to_string(),
        })?;
        inner.repo(repo)?;

        let commit = inner
            .commits
            .get(sha.as_str())
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", sha)))?;
        let tree_sha = match inner.omit {
            Some(OmitField::CommitTree) => None,
            _ => commit.tree.clone(),
        };

        Ok(CommitObject {
            sha: Some(sha.to_string()),
            tree_sha,
            parents: commit.parents.clone(),
            html_url: Some(format!("{}/commit/{}", inner.repo(repo)?.info.html_url, sha)),
        })
    }

    async fn create_blob(
        &self,
        repo: &RepositoryRef,
        content: &str,
    ) -> Result<Option<String>, ForgeError> {
        let mut inner = self.enter(MockOperation::CreateBlob {
            content: content.to_string(),
        })?;
        inner.repo(repo)?;

        let sha = inner.put_blob(content);
        Ok(match inner.omit {
            Some(OmitField::BlobSha) => None,
            _ => Some(sha),
        })
    }

    async fn create_tree(
        &self,
        repo: &RepositoryRef,
        base_tree: &Sha,
        entries: &[BlobRecord],
    ) -> Result<Option<String>, ForgeError> {
        let mut inner = self.enter(MockOperation::CreateTree {
            base_tree: base_tree.to_string(),
            paths: entries.iter().map(|e| e.path.clone()).collect(),
        })?;
        inner.repo(repo)?;

        let mut tree = inner
            .trees
            .get(base_tree.as_str())
            .cloned()
            .ok_or_else(|| ForgeError::ApiError {
                status: 422,
                message: format!("base_tree {} does not exist", base_tree),
            })?;
        for entry in entries {
            if !inner.blobs.contains_key(entry.sha.as_str()) {
                return Err(ForgeError::ApiError {
                    status: 422,
                    message: format!("blob {} does not exist", entry.sha),
                });
            }
            tree.insert(entry.path.clone(), entry.sha.to_string());
        }

        let sha = inner.put_tree(tree);
        Ok(match inner.omit {
            Some(OmitField::TreeSha) => None,
            _ => Some(sha),
        })
    }

    async fn create_commit(
        &self,
        repo: &RepositoryRef,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<CommitObject, ForgeError> {
        let mut inner = self.enter(MockOperation::CreateCommit {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        })?;
        let html_url = inner.repo(repo)?.info.html_url.clone();

        if !inner.trees.contains_key(tree.as_str()) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("tree {} does not exist", tree),
            });
        }

        let parent_ids: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        let sha = inner.put_commit(Some(tree.to_string()), parent_ids.clone(), message);

        if let Some(branch) = inner.concurrent_push.take() {
            let foreign_parent = inner
                .repo(repo)?
                .refs
                .get(&branch)
                .cloned()
                .into_iter()
                .collect();
            let foreign =
                inner.put_commit(Some(tree.to_string()), foreign_parent, "concurrent push");
            inner.repo_mut(repo)?.refs.insert(branch, foreign);
        }

        Ok(CommitObject {
            sha: match inner.omit {
                Some(OmitField::CommitSha) => None,
                _ => Some(sha.clone()),
            },
            tree_sha: Some(tree.to_string()),
            parents: parent_ids,
            html_url: Some(format!("{}/commit/{}", html_url, sha)),
        })
    }

    async fn update_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
        sha: &Sha,
        force: bool,
    ) -> Result<(), ForgeError> {
        let mut inner = self.enter(MockOperation::UpdateRef {
            branch: branch.to_string(),
            sha: sha.to_string(),
            force,
        })?;

        let current = inner
            .repo(repo)?
            .refs
            .get(branch.as_str())
            .cloned()
            .ok_or_else(|| ForgeError::NotFound("Reference does not exist".into()))?;

        if !inner.commits.contains_key(sha.as_str()) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".into(),
            });
        }
        if !force && !inner.is_ancestor(&current, sha.as_str()) {
            return Err(ForgeError::Conflict("Update is not a fast forward".into()));
        }

        inner
            .repo_mut(repo)?
            .refs
            .insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    async fn branch_head(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<CommitSummary, ForgeError> {
        let inner = self.enter(MockOperation::BranchHead {
            branch: branch.to_string(),
        })?;
        let mock_repo = inner.repo(repo)?;
        let tip = mock_repo
            .refs
            .get(branch.as_str())
            .ok_or_else(|| ForgeError::NotFound(format!("No commit found for SHA: {}", branch)))?;
        let commit = inner
            .commits
            .get(tip)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", tip)))?;

        Ok(CommitSummary {
            sha: tip.clone(),
            html_url: Some(format!("{}/commit/{}", mock_repo.info.html_url, tip)),
            message: commit.message.clone(),
            author: inner.user.clone(),
            date: Some("2024-01-01T00:00:00Z".to_string()),
            files: inner.changed_files(tip),
        })
    }

    async fn compare(
        &self,
        repo: &RepositoryRef,
        base: &BranchRef,
        head: &BranchRef,
    ) -> Result<Comparison, ForgeError> {
        let inner = self.enter(MockOperation::Compare {
            base: base.to_string(),
            head: head.to_string(),
        })?;
        let mock_repo = inner.repo(repo)?;
        let tip = |b: &BranchRef| {
            mock_repo
                .refs
                .get(b.as_str())
                .cloned()
                .ok_or_else(|| ForgeError::NotFound(format!("branch {}", b)))
        };
        let base_tip = tip(base)?;
        let head_tip = tip(head)?;

        // First-parent histories are enough for the linear commits this
        // mock produces
        let comparison = if inner.is_ancestor(&base_tip, &head_tip) {
            Comparison {
                ahead_by: inner.first_parent_depth(&head_tip, &base_tip),
                behind_by: 0,
            }
        } else if inner.is_ancestor(&head_tip, &base_tip) {
            Comparison {
                ahead_by: 0,
                behind_by: inner.first_parent_depth(&base_tip, &head_tip),
            }
        } else {
            Comparison {
                ahead_by: inner.first_parent_depth(&head_tip, ""),
                behind_by: inner.first_parent_depth(&base_tip, ""),
            }
        };
        Ok(comparison)
    }
}
