//! `@handle` scanning over free-text review and comment bodies.

use crate::event::{EventKind, TimelineEvent};
use crate::identity::Identity;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// `@` followed by one or more word characters. Trailing punctuation is
/// naturally excluded; `@alice.` yields `alice`, `@a_b` yields `a_b`, and a
/// hyphen ends the match.
static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention pattern must compile"));

/// Yield every mentioned handle in `text`, in match order.
///
/// Duplicates are preserved as separate items; the ownership fold collapses
/// them into one `touched` entry later.
pub fn mentions(text: &str) -> impl Iterator<Item = Identity> + '_ {
    MENTION_PATTERN
        .captures_iter(text)
        .map(|caps| Identity::from(&caps[1]))
}

/// Wrap each mention in `text` as a [`EventKind::Mentioned`] event at `at`.
///
/// Lazy: nothing is scanned until the returned iterator is drained, so
/// callers can chain it over many bodies without intermediate allocation.
pub fn mention_events(
    text: &str,
    at: DateTime<Utc>,
) -> impl Iterator<Item = TimelineEvent> + '_ {
    mentions(text).map(move |actor| TimelineEvent::new(actor, EventKind::Mentioned, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    fn handles(text: &str) -> Vec<String> {
        mentions(text).map(|id| id.as_str().to_string()).collect()
    }

    #[test]
    fn extracts_mentions_in_order_with_duplicates() {
        assert_eq!(
            handles("ping @alice and @bob, cc @alice"),
            vec!["alice", "bob", "alice"]
        );
    }

    #[test]
    fn underscores_and_digits_are_word_characters() {
        assert_eq!(handles("@dev_ops7 please look"), vec!["dev_ops7"]);
    }

    #[test]
    fn hyphen_ends_a_handle() {
        // \w does not cover '-'; the platform allows hyphenated logins but
        // the legacy pattern never matched past them, and the alias table is
        // the sanctioned fix-up for handles this splits.
        assert_eq!(handles("@bob-hpcc"), vec!["bob"]);
    }

    #[test]
    fn punctuation_adjacent_mentions_still_match() {
        assert_eq!(handles("(@carol), @dave."), vec!["carol", "dave"]);
    }

    #[test]
    fn text_without_mentions_yields_nothing() {
        assert_eq!(handles("no handles here, just email@ example"), Vec::<String>::new());
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(mentions("").next().is_none());
    }

    #[test]
    fn mention_events_carry_kind_and_timestamp() {
        let events: Vec<TimelineEvent> = mention_events("@alice @bob", at()).collect();
        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.kind, EventKind::Mentioned);
            assert_eq!(event.at, at());
        }
        assert_eq!(events[0].actor, Identity::new("alice"));
        assert_eq!(events[1].actor, Identity::new("bob"));
    }

    #[test]
    fn mention_events_is_lazy() {
        let mut iter = mention_events("@a @b @c", at());
        assert_eq!(iter.next().map(|e| e.actor), Some(Identity::new("a")));
        // Dropping the iterator here scans no further bodies.
    }
}
