//! `nag link-check` — decide what a `pull_request` webhook delivery should
//! do to the tracker issue its title names.
//!
//! The decision runs entirely offline: the delivery comes from a file and
//! the tracker issue's state from flags, so operators can replay a delivery
//! and see the verdict before wiring anything up to post it.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use nag_core::identity::Identity;
use nag_core::tracker::{IssueKeyPattern, TrackerIssue, evaluate_link};
use nag_github::webhook::WebhookPayload;

use crate::cmd::report::load_run_config;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct LinkCheckArgs {
    /// Path to a pull_request webhook delivery (JSON).
    #[arg(long, value_name = "PATH")]
    pub payload: PathBuf,

    /// Tracker status of the issue named in the pull title.
    #[arg(long, value_name = "STATUS", default_value = "Open")]
    pub status: String,

    /// Tracker assignee of that issue, if any.
    #[arg(long, value_name = "USER")]
    pub assignee: Option<String>,

    /// Pull-request URL already recorded on the issue, if any.
    #[arg(long, value_name = "URL")]
    pub linked_pull: Option<String>,
}

#[derive(Debug, Serialize)]
struct LinkCheckOutput {
    action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_key: Option<String>,
    linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assign_to: Option<String>,
    transitions: Vec<String>,
}

pub fn run_link_check(
    args: &LinkCheckArgs,
    config_flag: Option<&Path>,
    output: OutputMode,
) -> Result<()> {
    let config = load_run_config(config_flag, output)?;

    let raw = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;
    let payload = WebhookPayload::parse(&raw)
        .with_context(|| format!("Failed to decode {}", args.payload.display()))?;

    let keys = IssueKeyPattern::new(&config.tracker.projects);
    let Some(request) = payload.link_request(&keys) else {
        let result = LinkCheckOutput {
            action: payload.action.clone(),
            issue_key: None,
            linked: false,
            comment: None,
            assign_to: None,
            transitions: Vec::new(),
        };
        return render(output, &result, |r, w| {
            writeln!(
                w,
                "nothing to link: action '{}' with no matching issue key",
                r.action
            )
        });
    };

    let issue = TrackerIssue {
        key: request.issue_key.clone(),
        status: args.status.clone(),
        assignee: args.assignee.as_deref().map(Identity::from),
        linked_pull: args.linked_pull.clone(),
    };
    let outcome = evaluate_link(
        &issue,
        &request.pull_url,
        &request.author,
        &config.tracker.browse_url,
        &config.aliases,
    );

    let result = LinkCheckOutput {
        action: payload.action.clone(),
        issue_key: Some(request.issue_key),
        linked: outcome.plan.is_some(),
        comment: Some(outcome.comment),
        assign_to: outcome
            .plan
            .as_ref()
            .and_then(|plan| plan.assign_to.as_ref())
            .map(ToString::to_string),
        transitions: outcome
            .plan
            .as_ref()
            .map(|plan| plan.transitions.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
    };

    render(output, &result, |r, w| {
        if let Some(comment) = &r.comment {
            writeln!(w, "{comment}")?;
        }
        if r.linked {
            if let Some(assign_to) = &r.assign_to {
                writeln!(w, "assign: {assign_to}")?;
            }
            writeln!(w, "transitions: {}", r.transitions.join(", "))?;
        }
        Ok(())
    })
}
