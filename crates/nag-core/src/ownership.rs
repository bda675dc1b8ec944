//! Attention-ownership resolution: the fold at the center of every digest.
//!
//! Given one change-request's metadata and its time-sorted event stream,
//! derive who should act next, who else is on the hook, and how stale the
//! request really is. Pure; callers own the clock and the network.

use crate::event::{EventKind, TimelineEvent};
use crate::identity::{AliasTable, Identity};
use crate::summary::ChangeRequest;
use chrono::{DateTime, Utc};

/// Final attention verdict for one change-request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipVerdict {
    /// Who should act next.
    pub owner: Identity,
    /// Every other identity the timeline touched, first-seen order, creator
    /// first. Never contains `owner`.
    pub others: Vec<Identity>,
}

/// Verdict plus the activity-derived modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub verdict: OwnershipVerdict,
    /// Later of the final event time and the platform-reported
    /// last-modified time. An event after the platform's own timestamp
    /// extends the idle baseline.
    pub effective_last_modified: DateTime<Utc>,
}

/// Fold a time-sorted event stream into an ownership verdict.
///
/// Ownership follows a three-tier fallback: a standing assignment wins;
/// failing that, the most recent mention; failing that, the creator. Every
/// identity is rewritten through `aliases` before it participates in any
/// comparison. `events` must already be sorted by timestamp (stably, so
/// same-instant events keep discovery order).
#[must_use]
pub fn resolve_ownership(
    request: &ChangeRequest,
    events: &[TimelineEvent],
    aliases: &AliasTable,
) -> Resolution {
    let creator = aliases.canonical(request.creator.as_str());

    let mut owner: Option<Identity> = None;
    let mut last_mentioned: Option<Identity> = None;
    let mut last_event_at = request.created_at;
    let mut touched: Vec<Identity> = vec![creator.clone()];

    for event in events {
        let actor = aliases.canonical(event.actor.as_str());
        match event.kind {
            EventKind::Unassigned => owner = None,
            EventKind::Assigned => owner = Some(actor.clone()),
            EventKind::Mentioned => last_mentioned = Some(actor.clone()),
        }
        if !touched.contains(&actor) {
            touched.push(actor);
        }
        last_event_at = event.at;
    }

    let owner = owner.or(last_mentioned).unwrap_or(creator);
    touched.retain(|identity| *identity != owner);

    Resolution {
        verdict: OwnershipVerdict {
            owner,
            others: touched,
        },
        effective_last_modified: last_event_at.max(request.last_modified_at),
    }
}
