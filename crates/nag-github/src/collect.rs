//! Builds the ownership timeline for one pull request.

use tracing::{debug, warn};

use nag_core::event::{EventKind, TimelineEvent};
use nag_core::identity::Identity;
use nag_core::mention::mention_events;
use nag_core::summary::ChangeRequest;

use crate::api::{ApiPull, RepoSlug};
use crate::client::GitHubClient;
use crate::error::FetchError;
use crate::time::parse_instant;

/// Fetches assignment events and review mentions for one pull request and
/// merges them into a single time-ordered stream.
///
/// Individually malformed records (missing actor, missing or unparseable
/// timestamp) are logged and dropped; one bad record must not sink the
/// whole pull request.
pub fn fetch_timeline(
    client: &GitHubClient<'_>,
    repo: &RepoSlug,
    number: u64,
) -> Result<Vec<TimelineEvent>, FetchError> {
    let mut timeline = assignment_events(client, repo, number)?;
    timeline.extend(review_mentions(client, repo, number)?);
    // Stable sort keeps arrival order within the same instant.
    timeline.sort_by_key(|event| event.at);
    Ok(timeline)
}

fn assignment_events(
    client: &GitHubClient<'_>,
    repo: &RepoSlug,
    number: u64,
) -> Result<Vec<TimelineEvent>, FetchError> {
    let mut events = Vec::new();

    for record in client.issue_events(repo, number)? {
        let kind = match record.event.as_str() {
            "assigned" => EventKind::Assigned,
            "unassigned" => EventKind::Unassigned,
            // The feed also carries labeled, closed, referenced and
            // friends; none of them move ownership.
            _ => continue,
        };

        let Some(actor) = record.actor else {
            warn!(number, kind = %kind, "feed event has no actor; skipping");
            continue;
        };
        let Some(raw_at) = record.created_at else {
            warn!(number, kind = %kind, actor = %actor.login, "feed event has no timestamp; skipping");
            continue;
        };
        let Ok(at) = parse_instant(&raw_at) else {
            warn!(number, raw = %raw_at, "unparseable event timestamp; skipping");
            continue;
        };

        events.push(TimelineEvent::new(actor.login, kind, at));
    }

    Ok(events)
}

fn review_mentions(
    client: &GitHubClient<'_>,
    repo: &RepoSlug,
    number: u64,
) -> Result<Vec<TimelineEvent>, FetchError> {
    let mut events = Vec::new();

    for review in client.reviews(repo, number)? {
        let Some(raw_submitted) = review.submitted_at else {
            // Pending reviews carry no timestamp and are visible only to
            // their author.
            debug!(number, review = review.id, "review not yet submitted; skipping");
            continue;
        };
        let Ok(submitted_at) = parse_instant(&raw_submitted) else {
            warn!(number, review = review.id, raw = %raw_submitted, "unparseable review timestamp; skipping");
            continue;
        };

        if let Some(body) = &review.body {
            events.extend(mention_events(body, submitted_at));
        }

        for comment in client.review_comments(repo, number, review.id)? {
            let Some(raw_at) = comment.modified_at.or(comment.created_at) else {
                warn!(number, review = review.id, "review comment has no timestamp; skipping");
                continue;
            };
            let Ok(at) = parse_instant(&raw_at) else {
                warn!(number, review = review.id, raw = %raw_at, "unparseable comment timestamp; skipping");
                continue;
            };
            events.extend(mention_events(&comment.body, at));
        }
    }

    Ok(events)
}

/// Converts a raw pull into the pipeline's change-request record.
///
/// Returns `None` when the creation timestamp cannot be decoded; a pull
/// with no age is unreportable. A missing or unparseable update timestamp
/// falls back to the creation time.
pub fn change_request(repo_label: &str, pull: &ApiPull) -> Option<ChangeRequest> {
    let created_at = match parse_instant(&pull.created_at) {
        Ok(at) => at,
        Err(_) => {
            warn!(
                repo = repo_label,
                number = pull.number,
                raw = %pull.created_at,
                "unparseable creation timestamp; dropping pull"
            );
            return None;
        }
    };

    let last_modified_at = match &pull.updated_at {
        Some(raw) => parse_instant(raw).unwrap_or_else(|_| {
            warn!(
                repo = repo_label,
                number = pull.number,
                raw = %raw,
                "unparseable update timestamp; using creation time"
            );
            created_at
        }),
        None => created_at,
    };

    Some(ChangeRequest {
        repo: repo_label.to_string(),
        number: pull.number,
        url: pull.html_url.clone(),
        target_ref: pull.base.target_ref.clone(),
        title: pull.title.clone(),
        creator: Identity::from(pull.user.login.clone()),
        created_at,
        last_modified_at,
    })
}
