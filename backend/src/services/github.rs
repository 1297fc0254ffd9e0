//! GitHub access seam
//!
//! The aggregation services talk to GitHub through `GitHubApi` so the real
//! SDK client and the scripted mock are interchangeable.

use async_trait::async_trait;
#[cfg(test)]
use tally_github::testing::MockGitHubClient;
use tally_github::{Commit, Error, GitHubClient};

use crate::models::{CommitRecord, Repository};

/// Repositories requested per listing page (GitHub's maximum)
pub const REPOSITORIES_PER_PAGE: u32 = 100;

#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Trade an OAuth authorization code for an access token.
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<String, Error>;

    /// Login name of the token's owner
    async fn resolve_identity(&self, token: &str) -> Result<String, Error>;

    /// One page of the repositories the user owns or collaborates on,
    /// forks included. An empty page means the listing is exhausted.
    async fn list_repositories(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, Error>;

    /// One page of a repository's commits, newest first.
    async fn list_commits(
        &self,
        repository: &Repository,
        page: u32,
        per_page: u32,
        token: &str,
    ) -> Result<Vec<CommitRecord>, Error>;

    /// Authorize page URL for the web flow
    fn authorize_url(&self, client_id: &str, scope: &str) -> Result<String, Error>;
}

fn to_repository(repo: tally_github::Repository) -> Repository {
    Repository {
        name: repo.name,
        owner_login: repo.owner.login,
        is_fork: repo.fork,
    }
}

fn to_record(commit: &Commit) -> CommitRecord {
    CommitRecord {
        id: commit.sha.clone(),
        timestamp: commit.date().unwrap_or_default().to_string(),
        committer_name: commit.committer_name().to_string(),
        author_name: commit.author_name().to_string(),
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<String, Error> {
        let token = self
            .oauth()
            .exchange_code(client_id, client_secret, code)
            .await?;
        Ok(token.access_token)
    }

    async fn resolve_identity(&self, token: &str) -> Result<String, Error> {
        Ok(self.users().authenticated(token).await?.login)
    }

    async fn list_repositories(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, Error> {
        let repos = self
            .repos()
            .list_for_authenticated_user(token, page, per_page)
            .await?;
        Ok(repos.into_iter().map(to_repository).collect())
    }

    async fn list_commits(
        &self,
        repository: &Repository,
        page: u32,
        per_page: u32,
        token: &str,
    ) -> Result<Vec<CommitRecord>, Error> {
        let commits = self
            .commits()
            .list(&repository.owner_login, &repository.name, page, per_page, token)
            .await?;
        Ok(commits.iter().map(to_record).collect())
    }

    fn authorize_url(&self, client_id: &str, scope: &str) -> Result<String, Error> {
        self.oauth().authorize_url(client_id, scope)
    }
}

#[cfg(test)]
#[async_trait]
impl GitHubApi for MockGitHubClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<String, Error> {
        let token = self.oauth().exchange_code(client_id, client_secret, code)?;
        Ok(token.access_token)
    }

    async fn resolve_identity(&self, token: &str) -> Result<String, Error> {
        Ok(self.users().authenticated(token)?.login)
    }

    async fn list_repositories(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, Error> {
        let repos = self
            .repos()
            .list_for_authenticated_user(token, page, per_page)?;
        Ok(repos.into_iter().map(to_repository).collect())
    }

    async fn list_commits(
        &self,
        repository: &Repository,
        page: u32,
        per_page: u32,
        token: &str,
    ) -> Result<Vec<CommitRecord>, Error> {
        let commits =
            self.commits()
                .list(&repository.owner_login, &repository.name, page, per_page, token)?;
        Ok(commits.iter().map(to_record).collect())
    }

    fn authorize_url(&self, client_id: &str, scope: &str) -> Result<String, Error> {
        Ok(format!(
            "{}/login/oauth/authorize?client_id={client_id}&scope={scope}",
            tally_github::DEFAULT_OAUTH_URL
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_github::testing::{mock_commit, mock_repository, MockResponse};

    #[tokio::test]
    async fn test_mock_conversion_to_models() {
        let mock = MockGitHubClient::new();
        mock.repos().configure_list(MockResponse::with_data(vec![
            mock_repository("alice", "tools", false),
            mock_repository("alice", "linux", true),
        ]));
        mock.commits().configure_pages(
            "alice",
            "tools",
            vec![MockResponse::with_data(vec![mock_commit(
                "a1",
                "2023-05-01T10:00:00Z",
                "alice",
                "bob",
            )])],
        );

        let repos = mock.list_repositories("t", 1, 100).await.unwrap();
        assert_eq!(repos, vec![
            Repository::new("alice", "tools", false),
            Repository::new("alice", "linux", true),
        ]);

        let records = mock.list_commits(&repos[0], 1, 100, "t").await.unwrap();
        assert_eq!(records, vec![CommitRecord::new(
            "a1",
            "2023-05-01T10:00:00Z",
            "alice",
            "bob"
        )]);
    }

    #[tokio::test]
    async fn test_mock_exchange_and_identity() {
        let mock = MockGitHubClient::new();

        let token = mock.exchange_code("id", "secret", "abc").await.unwrap();
        assert_eq!(token, "mock-token-abc");
        assert_eq!(mock.resolve_identity(&token).await.unwrap(), "mock-user");
    }
}
