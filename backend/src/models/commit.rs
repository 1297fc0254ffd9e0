//! Commit model and bucketing types

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One commit as seen by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit SHA, unique per commit object
    pub id: String,
    /// RFC 3339 committer date as received
    pub timestamp: String,
    pub committer_name: String,
    pub author_name: String,
}

impl CommitRecord {
    pub fn new(id: &str, timestamp: &str, committer_name: &str, author_name: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            committer_name: committer_name.to_string(),
            author_name: author_name.to_string(),
        }
    }

    /// Parse the timestamp. An explicit offset (`Z` or `+hh:mm`) is required.
    pub fn parse_timestamp(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(self.timestamp.trim())
    }

    /// Whether `identity` committed or authored this commit.
    pub fn is_attributed_to(&self, identity: &str) -> bool {
        self.committer_name == identity || self.author_name == identity
    }
}

/// Calendar unit commits are counted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Year,
    Date,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "date" | "day" => Ok(Self::Date),
            _ => Err(format!(
                "Invalid granularity: {s}. Valid values are: year, date"
            )),
        }
    }
}

impl Granularity {
    /// Bucket for a commit instant, taken in the commit's own offset.
    pub fn bucket(&self, timestamp: &DateTime<FixedOffset>) -> BucketKey {
        match self {
            Self::Year => BucketKey::Year(timestamp.year()),
            Self::Date => BucketKey::Date(timestamp.date_naive()),
        }
    }
}

/// Key commits are counted under. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Year(i32),
    Date(NaiveDate),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}
