//! tools::definitions
//!
//! Static tool descriptions with JSON Schemas for their arguments.

use serde::Serialize;
use serde_json::{json, Value};

/// One tool as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub const CREATE_COMMIT: &str = "create_commit";
pub const PUSH: &str = "push";
pub const PULL: &str = "pull";
pub const GIT_STATUS: &str = "git_status";
pub const LIST_REPOSITORIES: &str = "list_repositories";
pub const GET_REPOSITORY: &str = "get_repository";
pub const CREATE_REPOSITORY: &str = "create_repository";

fn owner_property() -> Value {
    json!({
        "type": "string",
        "description": "Repository owner. Defaults to the origin remote owner, git user.name, then the authenticated user"
    })
}

fn repo_property() -> Value {
    json!({ "type": "string", "description": "Repository name, without owner" })
}

/// Every tool, in advertised order.
pub fn all() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CREATE_COMMIT,
            description: "Commit file changes directly to a remote branch. The branch must exist; \
                          the new commit's parent is the branch tip at the start of the call.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": repo_property(),
                    "message": { "type": "string", "description": "Commit message" },
                    "files": {
                        "type": "array",
                        "description": "Files to write, as repository-relative paths with UTF-8 content",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "content": { "type": "string" }
                            },
                            "required": ["path", "content"]
                        }
                    },
                    "owner": owner_property(),
                    "branch": {
                        "type": "string",
                        "description": "Target branch. Defaults to the repository's default branch"
                    }
                },
                "required": ["repo", "message", "files"]
            }),
        },
        ToolDefinition {
            name: PUSH,
            description: "Confirm a branch exists on the remote. Commits from create_commit are \
                          already on the branch, so nothing is transferred.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": repo_property(),
                    "owner": owner_property(),
                    "branch": { "type": "string" }
                },
                "required": ["repo"]
            }),
        },
        ToolDefinition {
            name: PULL,
            description: "Read the latest commit on a remote branch with its changed files.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": repo_property(),
                    "branch": { "type": "string" },
                    "owner": owner_property()
                },
                "required": ["repo", "branch"]
            }),
        },
        ToolDefinition {
            name: GIT_STATUS,
            description: "Report a branch's head commit and how far it has diverged from the \
                          default branch.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": repo_property(),
                    "owner": owner_property(),
                    "branch": {
                        "type": "string",
                        "description": "Branch to inspect. Defaults to the default branch"
                    }
                },
                "required": ["repo"]
            }),
        },
        ToolDefinition {
            name: LIST_REPOSITORIES,
            description: "List repositories of a user, or of the authenticated user.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "User to list. Defaults to the authenticated user" }
                }
            }),
        },
        ToolDefinition {
            name: GET_REPOSITORY,
            description: "Fetch repository metadata.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo": repo_property(),
                    "owner": owner_property()
                },
                "required": ["repo"]
            }),
        },
        ToolDefinition {
            name: CREATE_REPOSITORY,
            description: "Create a repository under the authenticated user or an organization.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "private": { "type": "boolean", "default": false },
                    "auto_init": {
                        "type": "boolean",
                        "default": true,
                        "description": "Create an initial commit so the default branch exists"
                    },
                    "owner": {
                        "type": "string",
                        "description": "Organization to create under, when it differs from the authenticated user"
                    }
                },
                "required": ["name"]
            }),
        },
    ]
}
