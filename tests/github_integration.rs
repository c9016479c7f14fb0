//! Integration tests for the GitHub forge.
//!
//! These run the real HTTP client against a local wiremock server standing
//! in for the GitHub REST API. Live GitHub API tests are behind the
//! `live_github_tests` feature flag.

use forge_relay::core::types::{BranchRef, FileChange, RepositoryRef};
use forge_relay::engine::{CommitPipeline, CommitRequest, LocalIdentity, OperationError};
use forge_relay::forge::github::GitHubForge;
use forge_relay::forge::{Forge, ForgeError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIP: &str = "1111111111111111111111111111111111111111";
const BASE_TREE: &str = "2222222222222222222222222222222222222222";
const BLOB: &str = "3333333333333333333333333333333333333333";
const NEW_TREE: &str = "4444444444444444444444444444444444444444";
const NEW_COMMIT: &str = "5555555555555555555555555555555555555555";

fn repo() -> RepositoryRef {
    RepositoryRef::new("octo", "demo").unwrap()
}

fn repository_json(default_branch: &str) -> serde_json::Value {
    json!({
        "name": "demo",
        "full_name": "octo/demo",
        "owner": { "login": "octo" },
        "description": null,
        "html_url": "https://github.com/octo/demo",
        "default_branch": default_branch,
        "private": false
    })
}

/// Mount the read half of the pipeline: metadata, ref and tip commit.
async fn mount_tip(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_json("main")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": TIP, "type": "commit" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/octo/demo/git/commits/{}", TIP)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": TIP,
            "tree": { "sha": BASE_TREE },
            "parents": []
        })))
        .mount(server)
        .await;
}

/// Mount the object writes of the pipeline.
async fn mount_writes(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/git/blobs"))
        .and(body_partial_json(json!({ "encoding": "utf-8" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": BLOB })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/git/trees"))
        .and(body_partial_json(json!({
            "base_tree": BASE_TREE,
            "tree": [{ "path": "a.txt", "mode": "100644", "type": "blob", "sha": BLOB }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": NEW_TREE })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/git/commits"))
        .and(body_partial_json(json!({
            "message": "init",
            "tree": NEW_TREE,
            "parents": [TIP]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": NEW_COMMIT,
            "tree": { "sha": NEW_TREE },
            "parents": [{ "sha": TIP }],
            "html_url": format!("https://github.com/octo/demo/commit/{}", NEW_COMMIT)
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn commit_request() -> CommitRequest {
    CommitRequest {
        repo: "demo".into(),
        owner: Some("octo".into()),
        branch: None,
        message: "init".into(),
        files: vec![FileChange::new("a.txt", "hello").unwrap()],
    }
}

// =============================================================================
// Commit Pipeline over HTTP
// =============================================================================

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn full_commit_round() {
        let server = MockServer::start().await;
        mount_tip(&server).await;
        mount_writes(&server).await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octo/demo/git/refs/heads/main"))
            .and(body_partial_json(json!({ "sha": NEW_COMMIT, "force": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": { "sha": NEW_COMMIT, "type": "commit" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let local = LocalIdentity::default();
        let result = CommitPipeline::new(&forge, &local)
            .run(commit_request())
            .await
            .unwrap();

        assert_eq!(result.commit_sha.unwrap().as_str(), NEW_COMMIT);
        assert_eq!(
            result.html_url.as_deref(),
            Some("https://github.com/octo/demo/commit/5555555555555555555555555555555555555555")
        );
        assert_eq!(result.branch, "main");
        assert_eq!(result.files_changed, 1);
    }

    #[tokio::test]
    async fn non_fast_forward_is_reference_conflict() {
        let server = MockServer::start().await;
        mount_tip(&server).await;
        mount_writes(&server).await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octo/demo/git/refs/heads/main"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Update is not a fast forward"
            })))
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let local = LocalIdentity::default();
        let failure = CommitPipeline::new(&forge, &local)
            .run(commit_request())
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            OperationError::ReferenceConflict {
                branch: "main".into(),
                message: "Update is not a fast forward".into(),
            }
        );
    }

    #[tokio::test]
    async fn missing_ref_is_branch_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/git/ref/heads/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found"
            })))
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let local = LocalIdentity::default();
        let mut request = commit_request();
        request.branch = Some(BranchRef::new("gone").unwrap());

        let failure = CommitPipeline::new(&forge, &local)
            .run(request)
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), "BranchNotFoundError");
    }

    #[tokio::test]
    async fn metadata_failure_falls_back_to_main() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let local = LocalIdentity::default();
        let failure = CommitPipeline::new(&forge, &local)
            .run(commit_request())
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            OperationError::BranchNotFound {
                branch: "main".into()
            }
        );
    }

    #[tokio::test]
    async fn unauthorized_user_lookup_is_owner_resolution_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("bad-token", server.uri());
        let local = LocalIdentity::default();
        let mut request = commit_request();
        request.owner = None;

        let failure = CommitPipeline::new(&forge, &local)
            .run(request)
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), "OwnerResolutionError");
    }
}

// =============================================================================
// Client Behavior
// =============================================================================

mod client {
    use super::*;

    #[tokio::test]
    async fn sends_bearer_token_and_api_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("x-github-api-version", "2022-11-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
            .expect(1)
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        assert_eq!(forge.authenticated_user().await.unwrap(), "octo");
    }

    #[tokio::test]
    async fn exhausted_rate_limit_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("X-RateLimit-Remaining", "0")
                    .set_body_json(json!({ "message": "API rate limit exceeded" })),
            )
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        assert_eq!(
            forge.get_repository(&repo()).await,
            Err(ForgeError::RateLimited)
        );
    }

    #[tokio::test]
    async fn empty_repository_ref_reads_as_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Git Repository is empty."
            })))
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let branch = BranchRef::new("main").unwrap();
        assert_eq!(forge.get_ref(&repo(), &branch).await, Ok(None));
    }

    #[tokio::test]
    async fn branch_head_reads_commit_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/commits/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": TIP,
                "html_url": "https://github.com/octo/demo/commit/1111",
                "commit": {
                    "message": "Initial commit",
                    "author": { "name": "Octo Cat", "date": "2024-01-01T00:00:00Z" }
                },
                "files": [
                    { "filename": "README.md", "status": "added", "additions": 1, "deletions": 0 }
                ]
            })))
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let branch = BranchRef::new("main").unwrap();
        let head = forge.branch_head(&repo(), &branch).await.unwrap();

        assert_eq!(head.sha, TIP);
        assert_eq!(head.message, "Initial commit");
        assert_eq!(head.author.as_deref(), Some("Octo Cat"));
        assert_eq!(head.files.len(), 1);
        assert_eq!(head.files[0].filename, "README.md");
    }

    #[tokio::test]
    async fn create_repository_under_organization() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orgs/acme/repos"))
            .and(body_partial_json(json!({ "name": "demo", "auto_init": true })))
            .respond_with(ResponseTemplate::new(201).set_body_json(repository_json("main")))
            .expect(1)
            .mount(&server)
            .await;

        let forge = GitHubForge::with_api_base("test-token", server.uri());
        let info = forge
            .create_repository(forge_relay::forge::CreateRepoRequest {
                organization: Some("acme".into()),
                name: "demo".into(),
                auto_init: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(info.default_branch.as_deref(), Some("main"));
    }
}

// =============================================================================
// Live GitHub Tests (require the live_github_tests feature and a real token)
// =============================================================================

#[cfg(feature = "live_github_tests")]
mod live {
    use super::*;

    #[tokio::test]
    async fn authenticated_user_resolves() {
        let token = std::env::var("GITHUB_TOKEN").expect("GITHUB_TOKEN must be set");
        let forge = GitHubForge::new(token);
        let login = forge.authenticated_user().await.unwrap();
        assert!(!login.is_empty());
    }
}
