//! Typed client for the platform's pull-request endpoints.

use serde::de::DeserializeOwned;

use crate::api::{ApiIssueEvent, ApiPull, ApiReview, ApiReviewComment, RepoSlug};
use crate::error::FetchError;
use crate::transport::Transport;

/// The platform serves list endpoints in pages of 30; a shorter page
/// (including an empty one) is the last.
pub const PAGE_SIZE: usize = 30;

pub struct GitHubClient<'a> {
    transport: &'a dyn Transport,
    api_base: String,
}

impl<'a> GitHubClient<'a> {
    pub fn new(transport: &'a dyn Transport, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            transport,
            api_base,
        }
    }

    /// All open pull requests for a repository.
    pub fn open_pulls(&self, repo: &RepoSlug) -> Result<Vec<ApiPull>, FetchError> {
        let base = format!(
            "{}/repos/{}/{}/pulls",
            self.api_base, repo.owner, repo.repo
        );
        self.fetch_paged(&base)
    }

    /// The issue-event feed for one pull request.
    pub fn issue_events(
        &self,
        repo: &RepoSlug,
        number: u64,
    ) -> Result<Vec<ApiIssueEvent>, FetchError> {
        let base = format!(
            "{}/repos/{}/{}/issues/{number}/events",
            self.api_base, repo.owner, repo.repo
        );
        self.fetch_paged(&base)
    }

    /// Reviews submitted on one pull request.
    pub fn reviews(&self, repo: &RepoSlug, number: u64) -> Result<Vec<ApiReview>, FetchError> {
        let base = format!(
            "{}/repos/{}/{}/pulls/{number}/reviews",
            self.api_base, repo.owner, repo.repo
        );
        self.fetch_paged(&base)
    }

    /// Comments attached to one review.
    pub fn review_comments(
        &self,
        repo: &RepoSlug,
        number: u64,
        review_id: u64,
    ) -> Result<Vec<ApiReviewComment>, FetchError> {
        let base = format!(
            "{}/repos/{}/{}/pulls/{number}/reviews/{review_id}/comments",
            self.api_base, repo.owner, repo.repo
        );
        self.fetch_paged(&base)
    }

    /// Walks pages until a short page marks the end of the collection.
    fn fetch_paged<T: DeserializeOwned>(&self, base: &str) -> Result<Vec<T>, FetchError> {
        let mut collected = Vec::new();
        let mut page = 1;

        loop {
            let url = paged_url(base, page);
            let batch: Vec<T> = self.get_json(&url)?;
            let batch_len = batch.len();
            collected.extend(batch);

            if batch_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.transport.get(url)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn paged_url(base: &str, page: usize) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}per_page={PAGE_SIZE}&page={page}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;
    use serde_json::json;

    fn event_page(count: usize) -> String {
        let items: Vec<serde_json::Value> = (0..count)
            .map(|n| {
                json!({
                    "event": "assigned",
                    "actor": {"login": format!("user{n}")},
                    "created_at": "2024-03-01T09:00:00Z"
                })
            })
            .collect();
        serde_json::to_string(&items).expect("serialize fixture")
    }

    fn slug() -> RepoSlug {
        RepoSlug::parse("hpcc-systems/HPCC-Platform").expect("fixture slug")
    }

    #[test]
    fn short_page_ends_the_walk() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/issues/7/events?per_page=30&page=1",
            &event_page(2),
        );

        let client = GitHubClient::new(&transport, "https://api.example");
        let events = client.issue_events(&slug(), 7).expect("fetch");

        assert_eq!(events.len(), 2);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn full_page_fetches_the_next_one() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/issues/7/events?per_page=30&page=1",
            &event_page(30),
        );
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/issues/7/events?per_page=30&page=2",
            &event_page(3),
        );

        let client = GitHubClient::new(&transport, "https://api.example");
        let events = client.issue_events(&slug(), 7).expect("fetch");

        assert_eq!(events.len(), 33);
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn empty_page_ends_the_walk() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/issues/7/events?per_page=30&page=1",
            "[]",
        );

        let client = GitHubClient::new(&transport, "https://api.example");
        let events = client.issue_events(&slug(), 7).expect("fetch");

        assert!(events.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/pulls?per_page=30&page=1",
            "[]",
        );

        let client = GitHubClient::new(&transport, "https://api.example/");
        let pulls = client.open_pulls(&slug()).expect("fetch");
        assert!(pulls.is_empty());
    }

    #[test]
    fn review_comment_url_nests_the_review_id() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/pulls/7/reviews/42/comments?per_page=30&page=1",
            "[]",
        );

        let client = GitHubClient::new(&transport, "https://api.example");
        let comments = client.review_comments(&slug(), 7, 42).expect("fetch");
        assert!(comments.is_empty());
    }

    #[test]
    fn undecodable_body_reports_the_url() {
        let transport = FakeTransport::new();
        transport.enqueue(
            "https://api.example/repos/hpcc-systems/HPCC-Platform/pulls?per_page=30&page=1",
            "<html>rate limited</html>",
        );

        let client = GitHubClient::new(&transport, "https://api.example");
        let err = client.open_pulls(&slug()).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(err.to_string().contains("per_page=30&page=1"));
    }
}
