//! Tracker-side rules for linking a freshly opened change-request.
//!
//! Everything here is decision, not transport: given a snapshot of the
//! tracker issue and the pull request that names it, work out whether the
//! link may happen, what the tracker collaborator must mutate, and the
//! comment to post back on the change-request. The REST calls that carry
//! the mutations out stay with the collaborator.

use crate::identity::{AliasTable, Identity};
use regex::Regex;

/// Tracker statuses that still accept a new pull-request link.
pub const ACTIVE_STATUSES: [&str; 5] =
    ["Active", "Open", "New", "Discussing", "Awaiting Information"];

/// Matcher for issue keys of the configured tracker projects.
///
/// Compiles to `(KEY1|KEY2|...)-[0-9]+` with each key regex-escaped. With no
/// projects configured nothing ever matches.
#[derive(Debug, Clone)]
pub struct IssueKeyPattern {
    regex: Option<Regex>,
}

impl IssueKeyPattern {
    #[must_use]
    pub fn new<S: AsRef<str>>(projects: &[S]) -> Self {
        let regex = if projects.is_empty() {
            None
        } else {
            let keys = projects
                .iter()
                .map(|p| regex::escape(p.as_ref()))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("({keys})-[0-9]+")).expect("escaped key pattern must compile"))
        };
        Self { regex }
    }

    /// First issue key in `text`, if any.
    #[must_use]
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str())
    }
}

/// Snapshot of the tracker issue a link decision runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIssue {
    pub key: String,
    pub status: String,
    pub assignee: Option<Identity>,
    /// Current value of the linked-pull-request field.
    pub linked_pull: Option<String>,
}

/// Workflow steps the collaborator runs, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move a not-yet-active issue into the active, scheduled state.
    AssignAndSchedule,
    /// Record that a pull request now backs the issue.
    AttachPullRequest,
}

impl Transition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssignAndSchedule => "assign-and-schedule",
            Self::AttachPullRequest => "attach-pull-request",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutations required for a happy-path link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// Assign the issue to the pull author first; `None` when already
    /// assigned (to a matching user).
    pub assign_to: Option<Identity>,
    /// Value to write into the linked-pull-request field.
    pub link_url: String,
    pub transitions: Vec<Transition>,
}

/// Outcome of [`evaluate_link`]: the comment to post back on the
/// change-request, and the mutations to perform when a link is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub comment: String,
    /// `None` when a gate declined the link; the comment says which.
    pub plan: Option<LinkPlan>,
}

/// Decide whether `issue` may be linked to the pull request at `pull_url`.
///
/// Three gates, checked in order: the issue must be in an active-like
/// status, the link field must be unset, and an existing assignee must
/// case-insensitively match the pull author. The author's handle is
/// rewritten through `aliases` before the match.
#[must_use]
pub fn evaluate_link(
    issue: &TrackerIssue,
    pull_url: &str,
    user: &Identity,
    browse_url: &str,
    aliases: &AliasTable,
) -> LinkOutcome {
    let user = aliases.canonical(user.as_str());
    let header = format!("{browse_url}{}\n", issue.key);

    if !ACTIVE_STATUSES.contains(&issue.status.as_str()) {
        return LinkOutcome {
            comment: header + "Jira not updated (state was not active or new)",
            plan: None,
        };
    }
    if issue.linked_pull.is_some() {
        return LinkOutcome {
            comment: header + "Jira not updated (pull request already registered)",
            plan: None,
        };
    }
    if let Some(assignee) = &issue.assignee {
        if assignee.as_str().to_lowercase() != user.as_str().to_lowercase() {
            return LinkOutcome {
                comment: header + "Jira not updated (user does not match)",
                plan: None,
            };
        }
    }

    let mut transitions = Vec::with_capacity(2);
    if issue.status != "Active" {
        transitions.push(Transition::AssignAndSchedule);
    }
    transitions.push(Transition::AttachPullRequest);

    LinkOutcome {
        comment: header + "Jira updated",
        plan: Some(LinkPlan {
            assign_to: issue.assignee.is_none().then(|| user.clone()),
            link_url: pull_url.to_string(),
            transitions,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSE: &str = "https://track.example.com/browse/";

    fn issue(status: &str, assignee: Option<&str>, linked: Option<&str>) -> TrackerIssue {
        TrackerIssue {
            key: "HPCC-31415".to_string(),
            status: status.to_string(),
            assignee: assignee.map(Identity::new),
            linked_pull: linked.map(str::to_string),
        }
    }

    fn evaluate(issue: &TrackerIssue, user: &str) -> LinkOutcome {
        evaluate_link(
            issue,
            "https://github.example/platform/pull/77",
            &Identity::new(user),
            BROWSE,
            &AliasTable::default(),
        )
    }

    #[test]
    fn inactive_status_declines() {
        let outcome = evaluate(&issue("Resolved", None, None), "alice");
        assert_eq!(
            outcome.comment,
            format!("{BROWSE}HPCC-31415\nJira not updated (state was not active or new)")
        );
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn existing_link_declines() {
        let outcome = evaluate(
            &issue("Open", None, Some("https://github.example/platform/pull/12")),
            "alice",
        );
        assert!(outcome.comment.ends_with("(pull request already registered)"));
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn mismatched_assignee_declines() {
        let outcome = evaluate(&issue("Open", Some("bob"), None), "alice");
        assert!(outcome.comment.ends_with("(user does not match)"));
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn assignee_match_is_case_insensitive() {
        let outcome = evaluate(&issue("Open", Some("Alice"), None), "alice");
        assert!(outcome.comment.ends_with("Jira updated"));
        let plan = outcome.plan.expect("link allowed");
        assert_eq!(plan.assign_to, None);
    }

    #[test]
    fn unassigned_issue_gets_assigned_to_author() {
        let outcome = evaluate(&issue("New", None, None), "alice");
        let plan = outcome.plan.expect("link allowed");
        assert_eq!(plan.assign_to, Some(Identity::new("alice")));
        assert_eq!(plan.link_url, "https://github.example/platform/pull/77");
    }

    #[test]
    fn non_active_status_schedules_before_attaching() {
        let outcome = evaluate(&issue("New", None, None), "alice");
        let plan = outcome.plan.expect("link allowed");
        assert_eq!(
            plan.transitions,
            vec![Transition::AssignAndSchedule, Transition::AttachPullRequest]
        );
    }

    #[test]
    fn active_status_only_attaches() {
        let outcome = evaluate(&issue("Active", None, None), "alice");
        let plan = outcome.plan.expect("link allowed");
        assert_eq!(plan.transitions, vec![Transition::AttachPullRequest]);
    }

    #[test]
    fn author_alias_applies_before_the_match() {
        let mut aliases = AliasTable::default();
        aliases.insert("dehilsterlexis", "dehilster");

        let outcome = evaluate_link(
            &issue("Open", Some("Dehilster"), None),
            "https://github.example/platform/pull/77",
            &Identity::new("dehilsterlexis"),
            BROWSE,
            &aliases,
        );
        assert!(outcome.comment.ends_with("Jira updated"));
    }

    #[test]
    fn comment_always_leads_with_the_browse_link() {
        let outcome = evaluate(&issue("Active", None, None), "alice");
        assert!(outcome.comment.starts_with("https://track.example.com/browse/HPCC-31415\n"));
    }

    #[test]
    fn key_pattern_finds_first_key() {
        let pattern = IssueKeyPattern::new(&["HPCC", "HH", "IDE", "EPE", "ML", "ODBC"]);
        assert_eq!(
            pattern.find("HPCC-31415 Fix reader (see ML-99)"),
            Some("HPCC-31415")
        );
        assert_eq!(pattern.find("IDE-7: tidy"), Some("IDE-7"));
        assert_eq!(pattern.find("no key here"), None);
    }

    #[test]
    fn key_pattern_requires_digits() {
        let pattern = IssueKeyPattern::new(&["HPCC"]);
        assert_eq!(pattern.find("HPCC- pending"), None);
    }

    #[test]
    fn empty_project_list_matches_nothing() {
        let pattern = IssueKeyPattern::new::<&str>(&[]);
        assert_eq!(pattern.find("HPCC-31415"), None);
    }

    #[test]
    fn project_keys_are_escaped() {
        let pattern = IssueKeyPattern::new(&["A+B"]);
        assert_eq!(pattern.find("A+B-12"), Some("A+B-12"));
        assert_eq!(pattern.find("AAB-12"), None);
    }

    #[test]
    fn transition_names_are_stable() {
        assert_eq!(Transition::AssignAndSchedule.to_string(), "assign-and-schedule");
        assert_eq!(Transition::AttachPullRequest.as_str(), "attach-pull-request");
    }
}
