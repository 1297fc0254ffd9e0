pub mod aggregation;
pub mod enumerator;
pub mod github;
pub mod paginator;
pub mod summary;
pub mod tally;


pub use aggregation::{
    AggregationEngine, AggregationError, AggregationOptions, AggregationReport, AggregationState,
    RecordOutcome,
};
pub use enumerator::RepositoryEnumerator;
pub use github::{GitHubApi, REPOSITORIES_PER_PAGE};
pub use paginator::{COMMITS_PER_PAGE, CommitPaginator, PaginationEnd, RepositoryCommits};
pub use summary::format_summary;
pub use tally::CommitTallyService;
