//! Timeline events distilled from a change-request's activity feed.
//!
//! The ownership fold only understands three kinds. `assigned` and
//! `unassigned` arrive from the platform's issue-events feed; `mentioned` is
//! synthesized locally from `@handle` scans over review and comment bodies.
//! String forms match the platform's lowercase feed values.

use crate::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three event kinds that participate in ownership resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Attention handed to the recorded actor.
    Assigned,
    /// Standing assignment released; ownership falls back to mentions or the
    /// creator.
    Unassigned,
    /// The actor was `@`-mentioned in a review or comment body.
    Mentioned,
}

/// Error returned when parsing an unknown event kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event kind '{}': expected one of assigned, unassigned, mentioned",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventKind {}

impl EventKind {
    /// All known kinds in feed order.
    pub const ALL: [Self; 3] = [Self::Assigned, Self::Unassigned, Self::Mentioned];

    /// Return the platform's lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Mentioned => "mentioned",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(Self::Assigned),
            "unassigned" => Ok(Self::Unassigned),
            "mentioned" => Ok(Self::Mentioned),
            _ => Err(UnknownEventKind { raw: s.to_string() }),
        }
    }
}

// Custom serde: serialize as the lowercase feed string.
impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One normalized activity record.
///
/// Immutable once created. Ordering key is `at`; the collector sorts stably,
/// so same-instant events keep their discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub actor: Identity,
    pub kind: EventKind,
    pub at: DateTime<Utc>,
}

impl TimelineEvent {
    #[must_use]
    pub fn new(actor: impl Into<Identity>, kind: EventKind, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            kind,
            at,
        }
    }
}
