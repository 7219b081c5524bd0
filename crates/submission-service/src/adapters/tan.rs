//! HTTP client for the TAN verification service.
//!
//! `POST {base_url}/version/v1/tan/verify` with `{"tan": "<uuid>"}`.
//! A 2xx answer means the TAN is valid and has now been consumed; 404 means
//! it is unknown or already used. Anything else is an error.

use crate::domain::config::VerificationConfig;
use crate::domain::error::ServiceError;
use crate::ports::outbound::{TanVerificationError, TanVerifier};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct TanRequest<'a> {
    tan: &'a str,
}

/// `TanVerifier` backed by the verification server's REST API.
#[derive(Debug, Clone)]
pub struct HttpTanVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpTanVerifier {
    pub fn new(config: &VerificationConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            verify_url: config.verify_url(),
        })
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }
}

#[async_trait]
impl TanVerifier for HttpTanVerifier {
    async fn verify_tan(&self, tan: &str) -> Result<bool, TanVerificationError> {
        // TANs are UUIDs; anything else can never verify
        if Uuid::parse_str(tan.trim()).is_err() {
            debug!("TAN is not a UUID, rejecting without a remote call");
            return Ok(false);
        }

        let response = self
            .client
            .post(&self.verify_url)
            .json(&TanRequest { tan: tan.trim() })
            .send()
            .await
            .map_err(|e| TanVerificationError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                warn!(status = status.as_u16(), "Unexpected verification service status");
                Err(TanVerificationError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}
