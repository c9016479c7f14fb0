//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Sha, RepositoryRef, BranchRef, FileChange, etc.
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing keeps malformed ids and names out of the pipeline
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
