//! Image retrieval.
//!
//! The [`Fetcher`] trait is the seam between the pipeline and the network:
//! production runs use [`HttpFetcher`], tests use the in-memory
//! [`MockFetcher`](tests::MockFetcher).
//!
//! [`HttpFetcher`] sends a `HEAD` probe before the `GET`. The probe only
//! supplies a size hint for the body buffer, capped at
//! [`MAX_PREALLOCATION`]; servers that reject `HEAD` are still fetched
//! normally. The `GET` itself must succeed with a 2xx status.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the body buffer reserved from a `HEAD` `Content-Length`.
/// Larger bodies still download, the buffer just grows as it reads.
pub const MAX_PREALLOCATION: usize = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Image '{0}' has no url")]
    MissingUrl(String),
    #[error("GET {url} returned HTTP {code}")]
    Status { url: String, code: u16 },
    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("IO error reading response body: {0}")]
    Io(#[from] std::io::Error),
}

/// Retrieves the raw bytes behind a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher backed by a shared `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// `timeout` bounds each whole request. `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }

    /// `Content-Length` reported by a `HEAD` request, if any.
    fn probe(&self, url: &str) -> Option<usize> {
        let response = self.agent.head(url).call().ok()?;
        response.header("Content-Length")?.parse().ok()
    }
}

fn capacity_hint(probed: Option<usize>) -> usize {
    probed.unwrap_or(0).min(MAX_PREALLOCATION)
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let size_hint = capacity_hint(self.probe(url));

        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => FetchError::Status {
                url: url.to_string(),
                code,
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;

        let mut body = Vec::with_capacity(size_hint);
        response.into_reader().read_to_end(&mut body)?;
        Ok(body)
    }
}
