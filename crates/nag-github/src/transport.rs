//! HTTP transport seam: one trait, one real implementation, one fake.

use crate::error::FetchError;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const OVERALL_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Smallest surface over HTTP GET that the client needs, so tests can swap
/// the network out for canned bodies.
pub trait Transport {
    /// Fetch `url` and return the response body.
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Production transport: a blocking `ureq` agent with bounded timeouts,
/// the platform's standard headers, and a short linear-backoff retry so a
/// single flaky request cannot stall the whole run.
pub struct UreqTransport {
    agent: ureq::Agent,
    token: Option<String>,
}

impl UreqTransport {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(OVERALL_TIMEOUT)
            .build();
        Self { agent, token }
    }

    fn send(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "nag");

        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = request.call().map_err(|err| match err {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            err @ ureq::Error::Transport(_) => FetchError::Transport {
                url: url.to_string(),
                source: Box::new(err),
            },
        })?;

        response.into_string().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            match self.send(url) {
                Ok(body) => return Ok(body),
                Err(err) if attempt < MAX_ATTEMPTS && err.is_retryable() => {
                    tracing::warn!(url, attempt, error = %err, "platform request failed; retrying");
                    std::thread::sleep(RETRY_DELAY * attempt);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Canned-response transport for tests. Each URL maps to a FIFO queue of
/// bodies or error statuses; requests are recorded for assertion.
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<String, u16>>>>,
    requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, url: &str, body: &str) {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(Ok(body.to_string()));
    }

    pub fn enqueue_status(&self, url: &str, status: u16) {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(Err(status));
    }

    /// Every URL requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());

        let queued = self
            .responses
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        match queued {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            // Unprepared URL reads as a 404 so tests fail loudly instead of
            // hanging on a missing fixture.
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_replays_bodies_in_fifo_order() {
        let fake = FakeTransport::new();
        fake.enqueue("https://api.example/a", "[1]");
        fake.enqueue("https://api.example/a", "[2]");

        assert_eq!(fake.get("https://api.example/a").expect("first"), "[1]");
        assert_eq!(fake.get("https://api.example/a").expect("second"), "[2]");
    }

    #[test]
    fn fake_errors_on_unprepared_urls() {
        let fake = FakeTransport::new();
        let err = fake.get("https://api.example/missing").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn fake_records_requests() {
        let fake = FakeTransport::new();
        fake.enqueue("https://api.example/a", "[]");
        let _ = fake.get("https://api.example/a");
        let _ = fake.get("https://api.example/b");

        assert_eq!(
            fake.requests(),
            vec!["https://api.example/a", "https://api.example/b"]
        );
    }

    #[test]
    fn fake_surfaces_queued_statuses() {
        let fake = FakeTransport::new();
        fake.enqueue_status("https://api.example/a", 502);
        let err = fake.get("https://api.example/a").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
    }
}
