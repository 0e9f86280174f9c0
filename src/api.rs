// API client module: a small blocking HTTP client that creates option banks
// on the remote API, one request per bank, strictly in order.

use crate::bank::{OptionBank, RunResult};
use crate::error::{ConfigError, SubmitError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error, info};

/// Header carrying the access token on every request.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// API client that holds a reqwest blocking client, the endpoint banks are
/// POSTed to and, baked into the client's default headers, the access token.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// Build a client for `endpoint`. `timeout` bounds each request; a
    /// request that exceeds it is reported as a transport failure.
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .default_headers(Self::auth_headers(token)?)
            .timeout(timeout)
            .build()
            .map_err(ConfigError::Client)?;
        Ok(ApiClient {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn auth_headers(token: &str) -> Result<HeaderMap, ConfigError> {
        let mut value = HeaderValue::from_str(token)
            .map_err(|e| ConfigError::InvalidToken(e.to_string()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Create one bank. Any status of 300 or above is a failure; its body is
    /// logged and kept on the error.
    pub fn create_bank(&self, bank: &OptionBank) -> Result<(), SubmitError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(bank)
            .send()
            .map_err(|source| SubmitError::Transport {
                bank: bank.name.clone(),
                source,
            })?;

        let status = res.status();
        if status.as_u16() >= 300 {
            let body = res.text().unwrap_or_default();
            error!(bank = %bank.name, status = status.as_u16(), "CREATE failed");
            error!("{}", body);
            return Err(SubmitError::Api {
                bank: bank.name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        debug!(bank = %bank.name, status = status.as_u16(), "bank created");
        Ok(())
    }

    /// Submit every bank in order, stopping at the first failure.
    pub fn submit_banks(&self, banks: &[OptionBank]) -> RunResult {
        self.submit_banks_with(banks, |_, _| {})
    }

    /// Like [`submit_banks`](Self::submit_banks), calling `on_attempt` with
    /// the bank's index before each request is sent.
    pub fn submit_banks_with<F>(&self, banks: &[OptionBank], mut on_attempt: F) -> RunResult
    where
        F: FnMut(usize, &OptionBank),
    {
        let mut result = RunResult::default();
        for (index, bank) in banks.iter().enumerate() {
            on_attempt(index, bank);
            if let Err(err) = self.create_bank(bank) {
                result.failure = Some(err);
                return result;
            }
            result.succeeded.push(bank.name.clone());
        }
        info!("Created {} option bank(s)", result.succeeded.len());
        result
    }
}
