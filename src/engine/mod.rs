//! engine
//!
//! Orchestrates remote write and read operations over a [`Forge`].
//!
//! # Architecture
//!
//! ```text
//! resolve -> read tip -> write blobs -> build tree -> write commit -> update branch
//! ```
//!
//! - [`resolve`]: owner and branch resolution from explicit arguments, local
//!   git hints and remote metadata
//! - [`steps`]: one function per remote step, each with its own error
//! - [`pipeline`]: the commit state machine that sequences the steps
//! - [`sync`]: read-only push, pull and status
//! - [`error`]: the error taxonomy shared by all operations
//!
//! # Invariants
//!
//! - Owner and branch are resolved exactly once per operation
//! - The only externally visible mutation is the final ref update, which is
//!   never forced
//! - No step is retried and no state is cached between operations
//!
//! [`Forge`]: crate::forge::Forge

pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod steps;
pub mod sync;

pub use error::{ErrorPayload, OperationError, OperationFailure};
pub use pipeline::{CommitPipeline, CommitRequest, PipelineStage};
pub use resolve::{
    BranchSource, IdentityResolver, LocalIdentity, OwnerSource, ResolvedBranch, ResolvedOwner,
};
pub use sync::{git_status, pull, push, LastCommit, PullResult, PushResult, StatusResult};
