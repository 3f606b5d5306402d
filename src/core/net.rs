// src/core/net.rs

// Blocking HTTP GET. One request per call, no retries.

use std::time::Duration;

use tracing::debug;

use crate::config::consts::{REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::error::{Error, FetchError};

/// Anything that can turn a URL into a response body.
pub trait Fetch {
    /// Issue exactly one GET for `url`. Non-2xx, transport and decode
    /// failures are all `FetchError`s.
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "GET");
        let transport = |source| FetchError::Transport { url: s!(url), source };

        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: s!(url), status: status.as_u16() });
        }
        resp.text().map_err(transport)
    }
}
