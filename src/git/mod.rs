//! git
//!
//! Single interface for local Git reads.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the local repository. No other
//! module imports `git2`. It is consulted for one thing: guessing the
//! repository owner from the `origin` remote or `user.name` when the caller
//! did not supply one.
//!
//! # Invariants
//!
//! - Read-only: nothing here writes refs, objects or config
//! - Absence of a repository is not an error for callers; they fall through
//!   to the next identity source

mod interface;

pub use interface::{Git, GitError};
