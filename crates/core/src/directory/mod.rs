//! External HIS patient directory.
//!
//! [`HisDirectoryClient`] asks the remote HIS first and falls back to the built-in sample
//! patients in [`fixtures`] when the remote call fails for any reason. Remote failures are
//! logged and never reach the caller; only "absent from both" is reported, as
//! [`MiddlewareError::NotFound`].

pub mod fixtures;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};

use crate::config::CoreConfig;
use crate::models::PatientRecord;
use crate::{MiddlewareError, MiddlewareResult};

pub use fixtures::{fixture_lookup, fixtures};

/// Lookup of a single patient by national ID or passport ID.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Fails with [`MiddlewareError::NotFound`] when no source knows the identifier.
    async fn fetch(&self, identifier: &str) -> MiddlewareResult<PatientRecord>;
}

/// Why the remote step produced no record. Internal to the client; always absorbed into the
/// fixture fallback.
#[derive(Debug, thiserror::Error)]
enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("response body could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("identifier cannot be used as a URL path segment")]
    InvalidUrl,
}

/// Upper bound on the error body kept for logging.
const MAX_LOGGED_BODY: usize = 256;

#[derive(Clone, Debug)]
pub struct HisDirectoryClient {
    http: reqwest::Client,
    base_url: Url,
    remote_enabled: bool,
}

impl HisDirectoryClient {
    /// Build a client for `base_url` with a per-request `timeout`.
    ///
    /// With `remote_enabled` false the client answers from fixtures only.
    pub fn new(base_url: Url, timeout: Duration, remote_enabled: bool) -> MiddlewareResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            remote_enabled,
        })
    }

    pub fn from_config(cfg: &CoreConfig) -> MiddlewareResult<Self> {
        Self::new(
            cfg.his_api_base_url().clone(),
            cfg.his_api_timeout(),
            cfg.his_api_enabled(),
        )
    }

    /// `{base_url}/patient/search/{identifier}`, with the identifier encoded as one segment.
    fn search_url(&self, identifier: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl)?
            .pop_if_empty()
            .extend(["patient", "search", identifier]);
        Ok(url)
    }

    async fn fetch_remote(&self, identifier: &str) -> Result<PatientRecord, UpstreamError> {
        let url = self.search_url(identifier)?;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_LOGGED_BODY {
                let mut cut = MAX_LOGGED_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(UpstreamError::Status { status, body });
        }

        response
            .json::<PatientRecord>()
            .await
            .map_err(UpstreamError::Decode)
    }
}

#[async_trait]
impl PatientDirectory for HisDirectoryClient {
    async fn fetch(&self, identifier: &str) -> MiddlewareResult<PatientRecord> {
        if self.remote_enabled {
            match self.fetch_remote(identifier).await {
                Ok(record) => {
                    tracing::debug!(patient_hn = %record.patient_hn, "HIS returned patient");
                    return Ok(record);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "HIS lookup failed, falling back to fixture data");
                }
            }
        }

        fixture_lookup(identifier).ok_or(MiddlewareError::NotFound)
    }
}
