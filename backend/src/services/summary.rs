//! Summary Formatter

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::BucketKey;

/// Render counts as `"<bucket>: <count> commits\n"` lines in bucket order.
///
/// Zero counts are skipped; an empty mapping renders as an empty string.
pub fn format_summary(counts: &BTreeMap<BucketKey, u64>) -> String {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(String::new(), |mut out, (bucket, count)| {
            let _ = writeln!(out, "{bucket}: {count} commits");
            out
        })
}
