//! Property-based tests for the GitHub wire types.

use proptest::prelude::*;
use serde_json::json;

use tally_github::Commit;

/// Strategy for git names, including characters that need JSON escaping.
fn git_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _\\-\\.\"\\\\éü]{0,30}"
}

/// Strategy for RFC 3339 timestamps with `Z` or a numeric offset.
fn timestamp() -> impl Strategy<Value = String> {
    (
        1990_u32..2100,
        1_u32..=12,
        1_u32..=28,
        0_u32..24,
        prop_oneof![Just("Z".to_string()), "[+-](0[0-9]|1[0-2]):(00|30)"],
    )
        .prop_map(|(y, mo, d, h, offset)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:00:00{offset}"))
}

proptest! {
    /// Any commit listing entry decodes and exposes its committer data.
    #[test]
    fn test_commit_decodes_with_arbitrary_names(
        sha in "[0-9a-f]{40}",
        committer in git_name(),
        author in git_name(),
        date in timestamp(),
    ) {
        let value = json!({
            "sha": sha,
            "commit": {
                "message": "change",
                "committer": { "name": committer, "date": date },
                "author": { "name": author, "date": "2000-01-01T00:00:00Z" }
            }
        });

        let commit: Commit = serde_json::from_value(value).expect("Should deserialize");

        prop_assert_eq!(&commit.sha, &sha);
        prop_assert_eq!(commit.committer_name(), committer.as_str());
        prop_assert_eq!(commit.author_name(), author.as_str());
        prop_assert_eq!(commit.date(), Some(date.as_str()));
    }

    /// Missing signature blocks never fail decoding.
    #[test]
    fn test_commit_without_signatures_decodes(sha in "[0-9a-f]{7,40}") {
        let value = json!({ "sha": sha, "commit": { "message": "" } });

        let commit: Commit = serde_json::from_value(value).expect("Should deserialize");

        prop_assert_eq!(commit.committer_name(), "");
        prop_assert_eq!(commit.author_name(), "");
        prop_assert!(commit.date().is_none());
    }
}
