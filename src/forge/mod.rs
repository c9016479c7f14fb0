//! forge
//!
//! Abstraction over the remote hosting service's object API.
//!
//! # Architecture
//!
//! The `Forge` trait exposes the remote's primitives (refs, commits, blobs,
//! trees, repository metadata). It knows nothing about pipelines: the
//! [`crate::engine`] sequences these calls and decides what a missing
//! identifier means.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use forge_relay::forge::{github::GitHubForge, Forge};
//!
//! let forge = GitHubForge::new(token);
//! let repos = forge.list_repositories(None).await?;
//! for repo in repos {
//!     println!("{}", repo.full_name);
//! }
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
