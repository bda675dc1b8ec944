//! Change-request metadata and the per-request summary record.

use crate::identity::Identity;
use crate::ownership::Resolution;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one open change-request, as reported by the platform.
///
/// Read-only input to the resolution pipeline. `repo` is the configured
/// repository label, not the platform slug; digests group and display by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub repo: String,
    pub number: u64,
    pub url: String,
    /// Branch the request wants to merge into.
    pub target_ref: String,
    pub title: String,
    pub creator: Identity,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

/// One change-request's resolved state for a single polling cycle.
///
/// Consumed immediately by digest aggregation; never persisted. A fresh
/// summary is produced on each cycle rather than updated incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub repo: String,
    pub number: u64,
    pub url: String,
    pub target_ref: String,
    pub title: String,
    pub owner: Identity,
    pub creator: Identity,
    /// Everyone else the timeline touched, first-seen order, owner excluded.
    pub others: Vec<Identity>,
    pub age: TimeDelta,
    pub idle: TimeDelta,
}

/// Combine metadata with a resolution into a summary.
///
/// `age = now - created_at`; `idle = now - effective_last_modified`.
/// Deterministic given `now`; callers pass the cycle's single clock reading
/// so every summary in a digest measures against the same instant.
#[must_use]
pub fn build_summary(request: &ChangeRequest, resolution: &Resolution, now: DateTime<Utc>) -> Summary {
    Summary {
        repo: request.repo.clone(),
        number: request.number,
        url: request.url.clone(),
        target_ref: request.target_ref.clone(),
        title: request.title.clone(),
        owner: resolution.verdict.owner.clone(),
        creator: request.creator.clone(),
        others: resolution.verdict.others.clone(),
        age: now - request.created_at,
        idle: now - resolution.effective_last_modified,
    }
}
