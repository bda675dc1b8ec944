//! Digest rendering: JSON rows, the classic fixed-width text body, and the
//! pretty terminal layout.
//!
//! The text body reproduces the digest format operators have piped to mail
//! for years: three sections, each a heading plus a fixed-width table. New
//! consumers should prefer JSON.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

use nag_core::config::Config;
use nag_core::digest::{Digest, DigestSink};
use nag_core::summary::Summary;
use nag_core::tracker::IssueKeyPattern;

use crate::output::pretty_section;

const OWNED_HEADING: &str =
    "The following pull requests appear to be waiting for your attention:";
const CREATED_HEADING: &str =
    "The following pull requests created by you appear to be awaiting attention from someone else:";
const ALL_HEADING: &str = "The full list of pull requests is as follows:";

/// One pull request as it appears in a rendered digest.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub repo: String,
    pub number: u64,
    pub owner: String,
    pub creator: String,
    pub age_days: i64,
    pub idle_days: i64,
    pub target_ref: String,
    pub url: String,
    pub title: String,
    /// Browse link for the tracker issue named in the title, when the
    /// tracker section is configured and a key matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_url: Option<String>,
}

impl ReportRow {
    fn from_summary(summary: &Summary, keys: &IssueKeyPattern, browse_url: &str) -> Self {
        let tracker_url = if browse_url.is_empty() {
            None
        } else {
            keys.find(&summary.title)
                .map(|key| format!("{browse_url}{key}"))
        };

        Self {
            repo: summary.repo.clone(),
            number: summary.number,
            owner: summary.owner.to_string(),
            creator: summary.creator.to_string(),
            age_days: summary.age.num_days(),
            idle_days: summary.idle.num_days(),
            target_ref: summary.target_ref.clone(),
            url: summary.url.clone(),
            title: summary.title.clone(),
            tracker_url,
        }
    }
}

/// One recipient's digest, fully resolved for output.
#[derive(Debug, Clone, Serialize)]
pub struct DigestReport {
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub owned: Vec<ReportRow>,
    pub created: Vec<ReportRow>,
    pub all: Vec<ReportRow>,
}

impl DigestReport {
    #[must_use]
    pub fn assemble(digest: &Digest<'_>, config: &Config, keys: &IssueKeyPattern) -> Self {
        let browse_url = config.tracker.browse_url.as_str();
        let rows = |bucket: &[&Summary]| {
            bucket
                .iter()
                .map(|summary| ReportRow::from_summary(summary, keys, browse_url))
                .collect()
        };

        Self {
            recipient: digest.recipient.to_string(),
            email: config.recipient_email(&digest.recipient).map(str::to_string),
            owned: rows(&digest.owned),
            created: rows(&digest.created),
            all: rows(&digest.all),
        }
    }
}

/// Sink that resolves each delivered digest into a [`DigestReport`].
///
/// Collecting instead of printing keeps JSON output a single document no
/// matter how many recipients a run covers.
pub struct ReportSink<'c> {
    config: &'c Config,
    keys: IssueKeyPattern,
    pub reports: Vec<DigestReport>,
}

impl<'c> ReportSink<'c> {
    #[must_use]
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            keys: IssueKeyPattern::new(&config.tracker.projects),
            reports: Vec::new(),
        }
    }
}

impl DigestSink for ReportSink<'_> {
    fn deliver(&mut self, digest: &Digest<'_>) -> Result<()> {
        self.reports
            .push(DigestReport::assemble(digest, self.config, &self.keys));
        Ok(())
    }
}

/// Write the classic text body for every report.
///
/// With a single recipient the output is exactly the mailable body; with
/// several, each body is preceded by a `To:` line naming its recipient.
pub fn write_text(reports: &[DigestReport], w: &mut dyn Write) -> io::Result<()> {
    for (index, report) in reports.iter().enumerate() {
        if reports.len() > 1 {
            if index > 0 {
                writeln!(w)?;
            }
            let address = report.email.as_deref().unwrap_or(&report.recipient);
            writeln!(w, "To: {address}")?;
            writeln!(w)?;
        }
        write_text_body(report, w)?;
    }
    Ok(())
}

fn write_text_body(report: &DigestReport, w: &mut dyn Write) -> io::Result<()> {
    if !report.owned.is_empty() {
        writeln!(w, "{OWNED_HEADING}")?;
        write_text_table(&report.owned, w)?;
    }
    if !report.created.is_empty() {
        writeln!(w, "{CREATED_HEADING}")?;
        write_text_table(&report.created, w)?;
    }
    writeln!(w, "{ALL_HEADING}")?;
    write_text_table(&report.all, w)
}

fn write_text_table(rows: &[ReportRow], w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{:<16} {:<5} {:<5} {:<16} {:<60} {}",
        "Owner", "Age", "Idle", "Target", "URL", "Title"
    )?;
    for row in rows {
        writeln!(
            w,
            "{:<16} {:<5} {:<5} {:<16} {:<60} {}",
            row.owner, row.age_days, row.idle_days, row.target_ref, row.url, row.title
        )?;
    }
    writeln!(w)
}

/// Write the pretty terminal layout for every report.
pub fn write_pretty(reports: &[DigestReport], w: &mut dyn Write) -> io::Result<()> {
    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            writeln!(w)?;
        }
        let banner = match &report.email {
            Some(email) => format!("Pull requests for {} <{email}>", report.recipient),
            None => format!("Pull requests for {}", report.recipient),
        };
        pretty_section(w, &banner)?;

        write_pretty_bucket(w, "Waiting for your attention", &report.owned, false)?;
        write_pretty_bucket(
            w,
            "Created by you, awaiting someone else",
            &report.created,
            false,
        )?;
        write_pretty_bucket(w, "All open pull requests", &report.all, true)?;
    }
    Ok(())
}

fn write_pretty_bucket(
    w: &mut dyn Write,
    heading: &str,
    rows: &[ReportRow],
    always: bool,
) -> io::Result<()> {
    if rows.is_empty() && !always {
        return Ok(());
    }

    writeln!(w, "{heading}:")?;
    if rows.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for row in rows {
        writeln!(w, "  #{} [{}] {}", row.number, row.target_ref, row.title)?;
        writeln!(
            w,
            "        owner {} (age {}d, idle {}d)",
            row.owner, row.age_days, row.idle_days
        )?;
        writeln!(w, "        {}", row.url)?;
        if let Some(tracker_url) = &row.tracker_url {
            writeln!(w, "        {tracker_url}")?;
        }
    }
    writeln!(w)
}
