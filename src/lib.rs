//! forge-relay - commit to remote GitHub repositories through a tool interface
//!
//! forge-relay exposes a small set of tools (create_commit, push, pull,
//! git_status and repository listing/creation) over line-delimited
//! JSON-RPC on stdio, so a calling agent can write commits without speaking
//! the GitHub API itself.
//!
//! # Architecture
//!
//! - [`cli`] - Process entry: flags, logging, configuration
//! - [`server`] - JSON-RPC framing and method dispatch
//! - [`tools`] - Tool argument parsing and dispatch
//! - [`engine`] - Commit pipeline, identity resolution, branch reads
//! - [`forge`] - Abstraction over the remote's object API (GitHub, mock)
//! - [`git`] - Read-only access to the local repository for identity hints
//! - [`core`] - Domain types and configuration
//!
//! # Correctness Invariants
//!
//! 1. A commit's only parent is the branch tip read at the start of the call
//! 2. The branch ref update is never forced; a moved branch is a conflict
//! 3. A failed call leaves the branch where it was
//! 4. Callers get a complete result or a single structured error

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod server;
pub mod tools;
