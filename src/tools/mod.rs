//! tools
//!
//! The tool surface: argument parsing, validation and dispatch to the
//! engine or directly to the forge.
//!
//! Arguments are checked for shape before any network call. Anything that
//! fails here is `InvalidArguments`, including an unknown tool name. An
//! empty `files` list is well-formed and left for the pipeline to reject.

pub mod definitions;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use definitions::ToolDefinition;

use crate::core::config::DEFAULT_BLOB_CONCURRENCY;
use crate::core::types::{BranchRef, FileChange, PipelineResult};
use crate::engine::{
    self, CommitPipeline, CommitRequest, IdentityResolver, LocalIdentity, OperationError,
    OperationFailure, PullResult, PushResult, StatusResult,
};
use crate::forge::{CreateRepoRequest, Forge, RepositoryInfo};

/// Where local identity hints come from.
#[derive(Debug, Clone)]
enum IdentitySource {
    /// Read from the repository containing this directory, on every call
    Discover(PathBuf),
    /// Fixed hints
    Fixed(LocalIdentity),
}

/// Successful tool output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Commit(PipelineResult),
    Push(PushResult),
    Pull(PullResult),
    Status(StatusResult),
    Repositories(RepositoryList),
    Repository(RepositoryInfo),
}

/// Payload of `list_repositories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryList {
    pub repositories: Vec<RepositoryInfo>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
struct CreateCommitArgs {
    repo: String,
    message: String,
    files: Vec<FileChange>,
    owner: Option<String>,
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchArgs {
    repo: String,
    owner: Option<String>,
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullArgs {
    repo: String,
    branch: String,
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetRepoArgs {
    repo: String,
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateRepoArgs {
    name: String,
    description: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default = "default_auto_init")]
    auto_init: bool,
    owner: Option<String>,
}

fn default_auto_init() -> bool {
    true
}

/// Dispatches tool calls against one forge.
pub struct Toolbox {
    forge: Arc<dyn Forge>,
    identity: IdentitySource,
    blob_concurrency: usize,
}

impl Toolbox {
    /// Toolbox reading local identity hints from the repository at `workdir`.
    pub fn new(forge: Arc<dyn Forge>, workdir: PathBuf) -> Self {
        Self {
            forge,
            identity: IdentitySource::Discover(workdir),
            blob_concurrency: DEFAULT_BLOB_CONCURRENCY,
        }
    }

    /// Toolbox with fixed identity hints instead of a local repository.
    pub fn with_identity(forge: Arc<dyn Forge>, identity: LocalIdentity) -> Self {
        Self {
            forge,
            identity: IdentitySource::Fixed(identity),
            blob_concurrency: DEFAULT_BLOB_CONCURRENCY,
        }
    }

    pub fn with_blob_concurrency(mut self, limit: usize) -> Self {
        self.blob_concurrency = limit.max(1);
        self
    }

    /// Every tool this toolbox answers.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        definitions::all()
    }

    /// Invoke tool `name` with JSON `arguments`.
    ///
    /// # Errors
    ///
    /// `InvalidArguments` for unknown tools or malformed arguments, or the
    /// operation's own error.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput, OperationFailure> {
        tracing::debug!(tool = name, "tool call");
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        match name {
            definitions::CREATE_COMMIT => self.create_commit(parse(arguments)?).await,
            definitions::PUSH => self.push(parse(arguments)?).await,
            definitions::PULL => self.pull(parse(arguments)?).await,
            definitions::GIT_STATUS => self.git_status(parse(arguments)?).await,
            definitions::LIST_REPOSITORIES => self.list_repositories(parse(arguments)?).await,
            definitions::GET_REPOSITORY => self.get_repository(parse(arguments)?).await,
            definitions::CREATE_REPOSITORY => self.create_repository(parse(arguments)?).await,
            other => {
                Err(OperationError::InvalidArguments(format!("unknown tool: {}", other)).into())
            }
        }
    }

    async fn local_identity(&self) -> LocalIdentity {
        match &self.identity {
            IdentitySource::Discover(path) => {
                // libgit2 reads are synchronous; keep them off the runtime workers.
                let path = path.clone();
                match tokio::task::spawn_blocking(move || LocalIdentity::discover(&path)).await {
                    Ok(identity) => identity,
                    Err(e) => {
                        tracing::warn!(error = %e, "local identity discovery panicked");
                        LocalIdentity::default()
                    }
                }
            }
            IdentitySource::Fixed(identity) => identity.clone(),
        }
    }

    async fn create_commit(&self, args: CreateCommitArgs) -> Result<ToolOutput, OperationFailure> {
        let request = CommitRequest {
            repo: args.repo,
            owner: non_empty(args.owner),
            branch: branch_arg(args.branch)?,
            message: args.message,
            files: args.files,
        };

        let local = self.local_identity().await;
        let mut pipeline = CommitPipeline::new(self.forge.as_ref(), &local)
            .with_blob_concurrency(self.blob_concurrency);
        pipeline.run(request).await.map(ToolOutput::Commit)
    }

    async fn push(&self, args: BranchArgs) -> Result<ToolOutput, OperationFailure> {
        let branch = branch_arg(args.branch)?;
        let local = self.local_identity().await;
        engine::push(
            self.forge.as_ref(),
            &local,
            &args.repo,
            args.owner.as_deref(),
            branch.as_ref(),
        )
        .await
        .map(ToolOutput::Push)
    }

    async fn pull(&self, args: PullArgs) -> Result<ToolOutput, OperationFailure> {
        let branch = branch_arg(Some(args.branch))?.ok_or_else(|| {
            OperationFailure::from(OperationError::InvalidArguments(
                "branch cannot be empty".into(),
            ))
        })?;
        let local = self.local_identity().await;
        engine::pull(
            self.forge.as_ref(),
            &local,
            &args.repo,
            args.owner.as_deref(),
            &branch,
        )
        .await
        .map(ToolOutput::Pull)
    }

    async fn git_status(&self, args: BranchArgs) -> Result<ToolOutput, OperationFailure> {
        let branch = branch_arg(args.branch)?;
        let local = self.local_identity().await;
        engine::git_status(
            self.forge.as_ref(),
            &local,
            &args.repo,
            args.owner.as_deref(),
            branch.as_ref(),
        )
        .await
        .map(ToolOutput::Status)
    }

    async fn list_repositories(&self, args: ListArgs) -> Result<ToolOutput, OperationFailure> {
        let owner = non_empty(args.owner);
        let repositories = self.forge.list_repositories(owner.as_deref()).await?;
        Ok(ToolOutput::Repositories(RepositoryList {
            count: repositories.len(),
            repositories,
        }))
    }

    async fn get_repository(&self, args: GetRepoArgs) -> Result<ToolOutput, OperationFailure> {
        let local = self.local_identity().await;
        let resolver = IdentityResolver::new(self.forge.as_ref(), &local);
        let repo = resolver
            .resolve_repository(&args.repo, args.owner.as_deref())
            .await?;

        self.forge
            .get_repository(&repo)
            .await
            .map(ToolOutput::Repository)
            .map_err(|e| OperationFailure::from(e).with_repository(&repo))
    }

    async fn create_repository(
        &self,
        args: CreateRepoArgs,
    ) -> Result<ToolOutput, OperationFailure> {
        if args.name.trim().is_empty() {
            return Err(OperationError::InvalidArguments("name cannot be empty".into()).into());
        }

        let organization = match non_empty(args.owner) {
            Some(owner) => {
                let user = self.forge.authenticated_user().await?;
                (owner != user).then_some(owner)
            }
            None => None,
        };

        let info = self
            .forge
            .create_repository(CreateRepoRequest {
                organization,
                name: args.name,
                description: non_empty(args.description),
                private: args.private,
                auto_init: args.auto_init,
            })
            .await?;
        tracing::info!(repository = %info.full_name, "repository created");
        Ok(ToolOutput::Repository(info))
    }
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, OperationFailure> {
    serde_json::from_value(arguments)
        .map_err(|e| OperationError::InvalidArguments(e.to_string()).into())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn branch_arg(branch: Option<String>) -> Result<Option<BranchRef>, OperationFailure> {
    non_empty(branch)
        .map(|b| BranchRef::new(b).map_err(|e| OperationError::InvalidArguments(e.to_string())))
        .transpose()
        .map_err(OperationFailure::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockForge, MockOperation, MOCK_USER};
    use serde_json::json;

    fn toolbox(forge: &MockForge) -> Toolbox {
        Toolbox::with_identity(Arc::new(forge.clone()), LocalIdentity::default())
    }

    mod arguments {
        use super::*;

        #[tokio::test]
        async fn unknown_tool_is_invalid_arguments() {
            let forge = MockForge::new();
            let failure = toolbox(&forge).call("rebase", json!({})).await.unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
            assert!(failure.to_string().contains("rebase"));
        }

        #[tokio::test]
        async fn missing_required_field_is_rejected_without_network() {
            let forge = MockForge::new();
            let failure = toolbox(&forge)
                .call("create_commit", json!({ "repo": "demo", "files": [] }))
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
            assert!(forge.operations().is_empty());
        }

        #[tokio::test]
        async fn wrong_type_is_rejected() {
            let forge = MockForge::new();
            let failure = toolbox(&forge)
                .call("pull", json!({ "repo": 7, "branch": "main" }))
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
        }

        #[tokio::test]
        async fn invalid_branch_name_is_rejected() {
            let forge = MockForge::new();
            let failure = toolbox(&forge)
                .call("push", json!({ "repo": "demo", "branch": "bad..name" }))
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
            assert!(forge.operations().is_empty());
        }

        #[tokio::test]
        async fn absolute_file_path_is_rejected() {
            let forge = MockForge::new();
            let failure = toolbox(&forge)
                .call(
                    "create_commit",
                    json!({
                        "repo": "demo",
                        "message": "m",
                        "files": [{ "path": "/etc/passwd", "content": "x" }]
                    }),
                )
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
        }

        #[tokio::test]
        async fn escaping_file_path_is_rejected_before_any_call() {
            let forge = MockForge::new().with_repository("octo", "demo", Some("main"));
            let failure = toolbox(&forge)
                .call(
                    "create_commit",
                    json!({
                        "repo": "demo",
                        "owner": "octo",
                        "message": "m",
                        "files": [{ "path": "docs/../../escape.txt", "content": "x" }]
                    }),
                )
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "InvalidArguments");
            assert!(forge.operations().is_empty());
        }

        #[tokio::test]
        async fn empty_files_reach_the_pipeline() {
            let forge = MockForge::new().with_repository("octo", "demo", Some("main"));
            let failure = toolbox(&forge)
                .call(
                    "create_commit",
                    json!({ "repo": "demo", "owner": "octo", "message": "m", "files": [] }),
                )
                .await
                .unwrap_err();
            assert_eq!(failure.kind(), "EmptyChangesetError");
            assert_eq!(forge.blob_uploads(), 0);
        }
    }

    mod repositories {
        use super::*;

        #[tokio::test]
        async fn list_counts_repositories() {
            let forge = MockForge::new()
                .with_repository(MOCK_USER, "a", Some("main"))
                .with_repository(MOCK_USER, "b", None)
                .with_repository("someone-else", "c", None);

            let output = toolbox(&forge)
                .call("list_repositories", Value::Null)
                .await
                .unwrap();
            match output {
                ToolOutput::Repositories(list) => {
                    assert_eq!(list.count, 2);
                    assert_eq!(list.repositories[0].name, "a");
                }
                other => panic!("unexpected output: {other:?}"),
            }
        }

        #[tokio::test]
        async fn get_resolves_owner_from_authenticated_user() {
            let forge = MockForge::new().with_repository(MOCK_USER, "demo", Some("trunk"));

            let output = toolbox(&forge)
                .call("get_repository", json!({ "repo": "demo" }))
                .await
                .unwrap();
            let value = serde_json::to_value(output).unwrap();
            assert_eq!(value["full_name"], "mock-user/demo");
            assert_eq!(value["default_branch"], "trunk");
        }

        #[tokio::test]
        async fn create_under_other_owner_targets_organization() {
            let forge = MockForge::new();

            toolbox(&forge)
                .call("create_repository", json!({ "name": "svc", "owner": "acme" }))
                .await
                .unwrap();
            assert!(forge.operations().contains(&MockOperation::CreateRepository {
                name: "svc".into(),
                organization: Some("acme".into()),
            }));
            assert!(forge.branch_tip("acme", "svc", "main").is_some());
        }

        #[tokio::test]
        async fn create_under_self_is_personal() {
            let forge = MockForge::new();

            toolbox(&forge)
                .call(
                    "create_repository",
                    json!({ "name": "mine", "owner": MOCK_USER, "auto_init": false }),
                )
                .await
                .unwrap();
            assert!(forge.operations().contains(&MockOperation::CreateRepository {
                name: "mine".into(),
                organization: None,
            }));
            assert!(forge.branch_tip(MOCK_USER, "mine", "main").is_none());
        }
    }
}
