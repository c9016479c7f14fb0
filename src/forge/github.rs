//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. Commit
//! construction goes through the low-level git data endpoints
//! (`/git/refs`, `/git/commits`, `/git/blobs`, `/git/trees`); repository
//! metadata, branch heads and comparisons go through the regular
//! repository endpoints.
//!
//! # Authentication
//!
//! A single static token, read once at startup. Requests are never retried:
//! a 401 surfaces as `ForgeError::AuthFailed`.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry for rate limits (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use forge_relay::forge::github::GitHubForge;
//! use forge_relay::forge::Forge;
//!
//! let forge = GitHubForge::new("ghp_xxx");
//! let login = forge.authenticated_user().await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    ChangedFile, CommitObject, CommitSummary, Comparison, CreateRepoRequest, Forge, ForgeError,
    RepositoryInfo,
};
use crate::core::config::{Config, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
use crate::core::types::{BlobRecord, BranchRef, RepositoryRef, Sha};

/// GitHub forge implementation.
///
/// Holds only the HTTP client and credential; the repository is passed to
/// each call so one forge serves every operation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token or app token
    token: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
    /// User-Agent header value
    user_agent: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &!self.token.is_empty())
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge for github.com.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (e.g., `https://github.example.com/api/v3`)
    /// and for pointing tests at a local mock server.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Create a forge from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            ..Self::with_api_base(config.token.clone(), config.api_base.clone())
        }
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let agent = HeaderValue::from_str(&self.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(USER_AGENT, agent);
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repo: &RepositoryRef, path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name)
        } else {
            format!(
                "{}/repos/{}/{}/{}",
                self.api_base, repo.owner, repo.name, path
            )
        }
    }

    /// Attach headers, send, and decode a JSON body.
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ForgeError> {
        let response = request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // Extract permission headers before consuming response body.
        // GitHub Apps use X-Accepted-GitHub-Permissions, classic OAuth uses
        // X-Accepted-OAuth-Scopes.
        let headers = response.headers();
        let required_permissions = header_string(headers, "X-Accepted-GitHub-Permissions");
        let required_scopes = header_string(headers, "X-Accepted-OAuth-Scopes");
        let granted_scopes = header_string(headers, "X-OAuth-Scopes");
        let rate_exhausted =
            header_string(headers, "X-RateLimit-Remaining").as_deref() == Some("0");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_exhausted => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);

                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                } else if let Some(scopes) = required_scopes.filter(|s| !s.is_empty()) {
                    err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                    if let Some(granted) = granted_scopes {
                        err_msg.push_str(&format!(" [granted: {}]", granted));
                    }
                }

                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn authenticated_user(&self) -> Result<String, ForgeError> {
        let url = format!("{}/user", self.api_base);
        let user: GitHubUser = self.send(self.client.get(&url)).await?;
        Ok(user.login)
    }

    async fn list_repositories(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<RepositoryInfo>, ForgeError> {
        let url = match owner {
            Some(owner) => format!(
                "{}/users/{}/repos?per_page=100&sort=updated",
                self.api_base, owner
            ),
            None => format!("{}/user/repos?per_page=100&sort=updated", self.api_base),
        };

        let repos: Vec<GitHubRepository> = self.send(self.client.get(&url)).await?;
        Ok(repos.into_iter().map(Into::into).collect())
    }

    async fn get_repository(&self, repo: &RepositoryRef) -> Result<RepositoryInfo, ForgeError> {
        let url = self.repo_url(repo, "");
        let info: GitHubRepository = self.send(self.client.get(&url)).await?;
        Ok(info.into())
    }

    async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> Result<RepositoryInfo, ForgeError> {
        let url = match &request.organization {
            Some(org) => format!("{}/orgs/{}/repos", self.api_base, org),
            None => format!("{}/user/repos", self.api_base),
        };

        let body = CreateRepoBody {
            name: &request.name,
            description: request.description.as_deref(),
            private: request.private,
            auto_init: request.auto_init,
        };

        let info: GitHubRepository = self.send(self.client.post(&url).json(&body)).await?;
        Ok(info.into())
    }

    async fn get_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<Option<String>, ForgeError> {
        let url = self.repo_url(repo, &format!("git/ref/heads/{}", branch));

        match self.send::<GitHubGitRef>(self.client.get(&url)).await {
            Ok(git_ref) => Ok(git_ref.object.and_then(|o| o.sha)),
            Err(ForgeError::NotFound(_)) => Ok(None),
            // An empty repository has no refs at all
            Err(ForgeError::ApiError { status: 409, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_commit(
        &self,
        repo: &RepositoryRef,
        sha: &Sha,
    ) -> Result<CommitObject, ForgeError> {
        let url = self.repo_url(repo, &format!("git/commits/{}", sha));
        let commit: GitHubGitCommit = self.send(self.client.get(&url)).await?;
        Ok(commit.into())
    }

    async fn create_blob(
        &self,
        repo: &RepositoryRef,
        content: &str,
    ) -> Result<Option<String>, ForgeError> {
        let url = self.repo_url(repo, "git/blobs");
        let body = CreateBlobBody {
            content,
            encoding: "utf-8",
        };

        let blob: GitHubSha = self.send(self.client.post(&url).json(&body)).await?;
        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        repo: &RepositoryRef,
        base_tree: &Sha,
        entries: &[BlobRecord],
    ) -> Result<Option<String>, ForgeError> {
        let url = self.repo_url(repo, "git/trees");
        let body = CreateTreeBody {
            base_tree: base_tree.as_str(),
            tree: entries,
        };

        let tree: GitHubSha = self.send(self.client.post(&url).json(&body)).await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        repo: &RepositoryRef,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<CommitObject, ForgeError> {
        let url = self.repo_url(repo, "git/commits");
        let body = CreateCommitBody {
            message,
            tree: tree.as_str(),
            parents: parents.iter().map(Sha::as_str).collect(),
        };

        let commit: GitHubGitCommit = self.send(self.client.post(&url).json(&body)).await?;
        Ok(commit.into())
    }

    async fn update_ref(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
        sha: &Sha,
        force: bool,
    ) -> Result<(), ForgeError> {
        let url = self.repo_url(repo, &format!("git/refs/heads/{}", branch));
        let body = UpdateRefBody {
            sha: sha.as_str(),
            force,
        };

        // GitHub answers 422 "Update is not a fast forward" when the branch
        // moved underneath us
        match self
            .send::<serde_json::Value>(self.client.patch(&url).json(&body))
            .await
        {
            Ok(_) => Ok(()),
            Err(ForgeError::ApiError {
                status: 409 | 422,
                message,
            }) => Err(ForgeError::Conflict(message)),
            Err(e) => Err(e),
        }
    }

    async fn branch_head(
        &self,
        repo: &RepositoryRef,
        branch: &BranchRef,
    ) -> Result<CommitSummary, ForgeError> {
        let url = self.repo_url(repo, &format!("commits/{}", branch));

        match self.send::<GitHubCommitDetail>(self.client.get(&url)).await {
            Ok(detail) => Ok(detail.into()),
            // "No commit found for SHA: <branch>"
            Err(ForgeError::ApiError {
                status: 409 | 422,
                message,
            }) => Err(ForgeError::NotFound(message)),
            Err(e) => Err(e),
        }
    }

    async fn compare(
        &self,
        repo: &RepositoryRef,
        base: &BranchRef,
        head: &BranchRef,
    ) -> Result<Comparison, ForgeError> {
        let url = self.repo_url(repo, &format!("compare/{}...{}", base, head));
        let comparison: GitHubComparison = self.send(self.client.get(&url)).await?;
        Ok(Comparison {
            ahead_by: comparison.ahead_by,
            behind_by: comparison.behind_by,
        })
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a repository.
#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    private: bool,
    auto_init: bool,
}

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody<'a> {
    content: &'a str,
    encoding: &'a str,
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: &'a [BlobRecord],
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
}

/// Request body for moving a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Authenticated user.
#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

/// Any object that only matters for its id (blob, tree).
#[derive(Deserialize)]
struct GitHubSha {
    sha: Option<String>,
}

/// `GET /git/ref/heads/{branch}` response.
#[derive(Deserialize)]
struct GitHubGitRef {
    object: Option<GitHubSha>,
}

/// Git data API commit.
#[derive(Deserialize)]
struct GitHubGitCommit {
    sha: Option<String>,
    tree: Option<GitHubSha>,
    #[serde(default)]
    parents: Vec<GitHubSha>,
    html_url: Option<String>,
}

impl From<GitHubGitCommit> for CommitObject {
    fn from(gh: GitHubGitCommit) -> Self {
        CommitObject {
            sha: gh.sha,
            tree_sha: gh.tree.and_then(|t| t.sha),
            parents: gh.parents.into_iter().filter_map(|p| p.sha).collect(),
            html_url: gh.html_url,
        }
    }
}

/// Repository response (subset).
#[derive(Deserialize)]
struct GitHubRepository {
    name: String,
    full_name: String,
    owner: GitHubUser,
    description: Option<String>,
    html_url: String,
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
}

impl From<GitHubRepository> for RepositoryInfo {
    fn from(gh: GitHubRepository) -> Self {
        RepositoryInfo {
            name: gh.name,
            full_name: gh.full_name,
            owner: gh.owner.login,
            description: gh.description,
            html_url: gh.html_url,
            default_branch: gh.default_branch,
            private: gh.private,
        }
    }
}

/// `GET /commits/{ref}` response (subset).
#[derive(Deserialize)]
struct GitHubCommitDetail {
    sha: String,
    html_url: Option<String>,
    commit: GitHubCommitBody,
    #[serde(default)]
    files: Vec<GitHubCommitFile>,
}

#[derive(Deserialize)]
struct GitHubCommitBody {
    message: String,
    author: Option<GitHubCommitAuthor>,
}

#[derive(Deserialize)]
struct GitHubCommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct GitHubCommitFile {
    filename: String,
    status: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

impl From<GitHubCommitDetail> for CommitSummary {
    fn from(gh: GitHubCommitDetail) -> Self {
        let (author, date) = match gh.commit.author {
            Some(a) => (a.name, a.date),
            None => (None, None),
        };

        CommitSummary {
            sha: gh.sha,
            html_url: gh.html_url,
            message: gh.commit.message,
            author,
            date,
            files: gh
                .files
                .into_iter()
                .map(|f| ChangedFile {
                    filename: f.filename,
                    status: f.status,
                    additions: f.additions,
                    deletions: f.deletions,
                })
                .collect(),
        }
    }
}

/// `GET /compare/{base}...{head}` response (subset).
#[derive(Deserialize)]
struct GitHubComparison {
    ahead_by: u64,
    behind_by: u64,
}
