//! `nag report` — poll the configured repositories, resolve ownership for
//! every open pull request, and print per-recipient digests.
//!
//! A failed repository is logged and skipped; a failed pull request is
//! logged and skipped; the digest covers whatever survived the cycle.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

use nag_core::config::{Config, load_config, resolve_config_path};
use nag_core::digest::deliver_digests;
use nag_core::error::ErrorCode;
use nag_core::identity::Identity;
use nag_core::ownership::resolve_ownership;
use nag_core::summary::{Summary, build_summary};
use nag_github::api::RepoSlug;
use nag_github::client::GitHubClient;
use nag_github::collect::{change_request, fetch_timeline};
use nag_github::transport::UreqTransport;

use crate::output::{CliError, OutputMode, render_error, render_mode};
use crate::render::{ReportSink, write_pretty, write_text};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report for a single configured recipient instead of everyone.
    #[arg(long = "for", value_name = "RECIPIENT")]
    pub recipient: Option<String>,

    /// Restrict processing to specific pull numbers (repeatable).
    #[arg(long = "pull", value_name = "NUMBER")]
    pub pulls: Vec<u64>,
}

/// Resolve and load the config, rendering structured errors on failure.
pub(crate) fn load_run_config(flag: Option<&Path>, output: OutputMode) -> Result<Config> {
    let path = match resolve_config_path(flag) {
        Ok(path) => path,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigMissing, err.to_string()),
            )?;
            anyhow::bail!("{err}");
        }
    };

    match load_config(&path) {
        Ok(config) => Ok(config),
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            Err(err)
        }
    }
}

pub fn run_report(args: &ReportArgs, config_flag: Option<&Path>, output: OutputMode) -> Result<()> {
    let config = load_run_config(config_flag, output)?;
    if let Err(err) = config.validate() {
        render_error(
            output,
            &CliError::from_code(ErrorCode::ConfigIncomplete, err.to_string()),
        )?;
        anyhow::bail!("{err}");
    }

    let recipients = match select_recipients(&config, args.recipient.as_deref()) {
        Ok(recipients) => recipients,
        Err(error) => {
            render_error(output, &error)?;
            anyhow::bail!("{}", error.message);
        }
    };

    let token = config
        .github
        .token
        .clone()
        .or_else(|| std::env::var("GITHUB_TOKEN").ok());
    let transport = UreqTransport::new(token);
    let client = GitHubClient::new(&transport, &config.github.api_base);

    // One clock reading per cycle, so every digest measures age and idle
    // against the same instant.
    let now = Utc::now();
    let restriction = restriction_set(&config, args);
    let summaries = collect_summaries(&client, &config, &restriction, now);

    let mut sink = ReportSink::new(&config);
    deliver_digests(&summaries, &recipients, &mut sink)?;

    render_mode(output, sink.reports.as_slice(), write_text, write_pretty)
}

/// `--for` narrows delivery to one configured recipient; an unknown name is
/// fatal rather than silently producing an empty digest.
fn select_recipients(config: &Config, requested: Option<&str>) -> Result<Vec<Identity>, CliError> {
    match requested {
        Some(raw) => {
            let identity = Identity::from(raw);
            if config.recipient_email(&identity).is_some() {
                Ok(vec![identity])
            } else {
                Err(CliError::from_code(
                    ErrorCode::UnknownRecipient,
                    format!("recipient '{raw}' is not listed under [recipients]"),
                ))
            }
        }
        None => Ok(config.recipient_identities()),
    }
}

fn restriction_set(config: &Config, args: &ReportArgs) -> BTreeSet<u64> {
    config
        .options
        .pulls
        .iter()
        .chain(&args.pulls)
        .copied()
        .collect()
}

fn collect_summaries(
    client: &GitHubClient<'_>,
    config: &Config,
    restriction: &BTreeSet<u64>,
    now: DateTime<Utc>,
) -> Vec<Summary> {
    let mut summaries = Vec::new();

    for (label, raw_slug) in &config.repositories {
        let slug = match RepoSlug::parse(raw_slug) {
            Ok(slug) => slug,
            Err(err) => {
                warn!(repo = %label, error = %err, "bad repository slug; skipping");
                continue;
            }
        };

        let pulls = match client.open_pulls(&slug) {
            Ok(pulls) => pulls,
            Err(err) => {
                warn!(repo = %label, error = %err, "pull list fetch failed; skipping repository");
                continue;
            }
        };
        info!(repo = %label, open = pulls.len(), "processing repository");

        for pull in pulls {
            if !restriction.is_empty() && !restriction.contains(&pull.number) {
                continue;
            }
            if config.options.verbose {
                info!(repo = %label, number = pull.number, title = %pull.title, "processing pull");
            }

            let Some(request) = change_request(label, &pull) else {
                continue;
            };

            let timeline = match fetch_timeline(client, &slug, pull.number) {
                Ok(events) => events,
                Err(err) => {
                    warn!(repo = %label, number = pull.number, error = %err, "timeline fetch failed; skipping pull");
                    continue;
                }
            };

            debug!(repo = %label, number = pull.number, events = timeline.len(), "resolving ownership");
            let resolution = resolve_ownership(&request, &timeline, &config.aliases);
            summaries.push(build_summary(&request, &resolution, now));
        }
    }

    summaries
}
