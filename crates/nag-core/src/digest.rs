//! Per-recipient digest assembly over a cycle's summaries.

use crate::identity::Identity;
use crate::summary::Summary;
use anyhow::Result;

/// One recipient's view of the cycle: three buckets over the same summaries.
///
/// `owned` holds requests the recipient must act on, `created` the ones they
/// opened but no longer own, and `all` every summary in the cycle. Buckets
/// borrow the summaries; nothing here mutates or copies them.
#[derive(Debug, Clone)]
pub struct Digest<'a> {
    pub recipient: Identity,
    pub owned: Vec<&'a Summary>,
    pub created: Vec<&'a Summary>,
    pub all: Vec<&'a Summary>,
}

/// Collaborator that renders or transmits a finished digest.
///
/// The aggregation layer treats delivery purely as a sink; a failed delivery
/// aborts the remaining recipients and surfaces to the caller.
pub trait DigestSink {
    fn deliver(&mut self, digest: &Digest<'_>) -> Result<()>;
}

/// Build the digest for a single recipient.
#[must_use]
pub fn build_digest<'a>(summaries: &'a [Summary], recipient: &Identity) -> Digest<'a> {
    let mut ordered: Vec<&Summary> = summaries.iter().collect();
    ordered.sort_by(|a, b| a.target_ref.cmp(&b.target_ref));
    partition(&ordered, recipient)
}

/// Sort once, then hand each recipient's digest to the sink in turn.
pub fn deliver_digests(
    summaries: &[Summary],
    recipients: &[Identity],
    sink: &mut dyn DigestSink,
) -> Result<()> {
    let mut ordered: Vec<&Summary> = summaries.iter().collect();
    ordered.sort_by(|a, b| a.target_ref.cmp(&b.target_ref));

    for recipient in recipients {
        sink.deliver(&partition(&ordered, recipient))?;
    }
    Ok(())
}

fn partition<'a>(ordered: &[&'a Summary], recipient: &Identity) -> Digest<'a> {
    let mut owned = Vec::new();
    let mut created = Vec::new();
    let mut all = Vec::with_capacity(ordered.len());

    for summary in ordered {
        if summary.owner == *recipient {
            owned.push(*summary);
        } else if summary.creator == *recipient {
            created.push(*summary);
        }
        all.push(*summary);
    }

    Digest {
        recipient: recipient.clone(),
        owned,
        created,
        all,
    }
}
