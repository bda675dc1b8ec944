//! Wire shapes for the platform's REST responses.
//!
//! Fields the pipeline never reads stay undeclared; serde drops them.
//! Optionals reflect what the feed actually omits in the wild: actors on
//! events from deleted accounts, submission times on pending reviews,
//! bodies on approve-without-comment reviews.

use anyhow::Result;
use serde::Deserialize;

/// Repository slug `<owner>/<repo>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let Some((owner, repo)) = trimmed.split_once('/') else {
            anyhow::bail!("invalid repo slug '{trimmed}': expected <owner>/<repo>");
        };

        if owner.is_empty() || repo.is_empty() {
            anyhow::bail!("invalid repo slug '{trimmed}': expected <owner>/<repo>");
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

/// One open pull request from the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPull {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: ApiUser,
    pub base: ApiBase,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBase {
    #[serde(rename = "ref")]
    pub target_ref: String,
}

/// One record from the issue-events feed. The feed carries dozens of event
/// kinds; the collector keeps only the assignment ones.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiIssueEvent {
    #[serde(default)]
    pub actor: Option<ApiUser>,
    pub event: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One review on a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReview {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    /// Absent while the review is still pending.
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// One comment nested under a review.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReviewComment {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// When present, supersedes `created_at` as the mention timestamp.
    #[serde(default)]
    pub modified_at: Option<String>,
}
