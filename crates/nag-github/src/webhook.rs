//! Pull-request webhook payloads and the tracker-link gate.

use serde::Deserialize;

use nag_core::identity::Identity;
use nag_core::tracker::IssueKeyPattern;

use crate::api::ApiUser;

/// The slice of a `pull_request` webhook delivery the linker reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub action: String,
    pub pull_request: WebhookPull,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPull {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: ApiUser,
    pub base: WebhookBase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBase {
    pub repo: WebhookRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRepo {
    pub name: String,
    pub owner: ApiUser,
}

/// A pull request that should be linked to the tracker issue its title
/// names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub issue_key: String,
    pub pull_number: u64,
    pub pull_url: String,
    pub author: Identity,
    pub repo_full_name: String,
}

impl WebhookPayload {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Decides whether this delivery warrants a tracker update.
    ///
    /// Only `opened` and `reopened` deliveries qualify, and only when the
    /// pull title carries a recognizable issue key. Everything else is
    /// silently uninteresting.
    #[must_use]
    pub fn link_request(&self, keys: &IssueKeyPattern) -> Option<LinkRequest> {
        if self.action != "opened" && self.action != "reopened" {
            return None;
        }

        let key = keys.find(&self.pull_request.title)?;
        Some(LinkRequest {
            issue_key: key.to_string(),
            pull_number: self.pull_request.number,
            pull_url: self.pull_request.html_url.clone(),
            author: Identity::from(self.pull_request.user.login.clone()),
            repo_full_name: format!(
                "{}/{}",
                self.pull_request.base.repo.owner.login, self.pull_request.base.repo.name
            ),
        })
    }
}
