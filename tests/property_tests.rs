//! Property-based tests for core domain types and the commit pipeline.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use forge_relay::core::types::{BranchRef, FileChange, Sha};
use forge_relay::engine::{CommitPipeline, CommitRequest, LocalIdentity};
use forge_relay::forge::mock::MockForge;
use forge_relay::git::Git;

/// Strategy for owner and repository path segments.
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9_-]{0,20}"
}

/// Strategy for host names.
fn host() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}(\\.[a-z]{2,5}){1,2}"
}

/// Strategy for repository-relative file paths.
fn file_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..4)
        .prop_map(|parts| format!("{}.txt", parts.join("/")))
}

proptest! {
    /// The owner is the segment after the host, in URL form.
    #[test]
    fn url_remote_owner(
        scheme in prop_oneof![Just("https"), Just("http"), Just("ssh"), Just("git")],
        host in host(),
        owner in segment(),
        repo in segment(),
        suffix in prop_oneof![Just(""), Just(".git")],
    ) {
        let url = format!("{}://{}/{}/{}{}", scheme, host, owner, repo, suffix);
        prop_assert_eq!(Git::parse_remote_url(&url), Some((owner, repo)));
    }

    /// The owner is the segment after the colon, in scp-like form.
    #[test]
    fn scp_remote_owner(
        host in host(),
        owner in segment(),
        repo in segment(),
        user in prop_oneof![Just(""), Just("git@")],
    ) {
        let url = format!("{}{}:{}/{}.git", user, host, owner, repo);
        prop_assert_eq!(Git::parse_remote_url(&url), Some((owner, repo)));
    }

    /// Parsing never panics on arbitrary input.
    #[test]
    fn remote_url_parse_total(url in ".*") {
        let _ = Git::parse_remote_url(&url);
    }

    /// Object ids are normalized to lowercase.
    #[test]
    fn sha_normalized(sha in "[0-9a-fA-F]{40}") {
        let parsed = Sha::new(sha.clone()).unwrap();
        prop_assert_eq!(parsed.as_str(), sha.to_ascii_lowercase());
    }

    /// Ids of the wrong length are rejected.
    #[test]
    fn sha_length_enforced(sha in "[0-9a-f]{1,39}") {
        prop_assert!(Sha::new(sha).is_err());
    }

    /// Simple slash-separated names are valid branches.
    #[test]
    fn branch_names_accepted(parts in prop::collection::vec("[a-z0-9][a-z0-9_-]{0,10}", 1..4)) {
        let name = parts.join("/");
        prop_assert!(BranchRef::new(name).is_ok());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// files_changed equals the input length and file_paths echoes the
    /// input order, whatever order uploads complete in.
    #[test]
    fn commit_reports_input_files_in_order(
        paths in prop::collection::vec(file_path(), 1..12),
        concurrency in 1usize..6,
    ) {
        let forge = MockForge::new().with_repository("octo", "demo", Some("main"));
        let local = LocalIdentity::default();
        let files: Vec<FileChange> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| FileChange::new(p.clone(), format!("content {}", i)).unwrap())
            .collect();

        let result = tokio_test::block_on(
            CommitPipeline::new(&forge, &local)
                .with_blob_concurrency(concurrency)
                .run(CommitRequest {
                    repo: "demo".into(),
                    owner: Some("octo".into()),
                    branch: None,
                    message: "prop".into(),
                    files,
                }),
        )
        .unwrap();

        prop_assert_eq!(result.files_changed, paths.len());
        prop_assert_eq!(result.file_paths, paths);
        prop_assert_eq!(forge.blob_uploads(), result.files_changed);
    }
}
