//! Request preconditions resolved once from the HTTP headers.

use axum::http::{header, HeaderMap};
use thiserror::Error;

/// Media type of the protobuf request body.
pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";

/// Header carrying the TAN.
pub const AUTHORIZATION_HEADER: &str = "cwa-authorization";

/// Header marking decoy requests ("1") and real ones ("0").
pub const FAKE_HEADER: &str = "cwa-fake";

/// Missing or malformed precondition headers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("missing Content-Type header")]
    MissingContentType,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("missing cwa-authorization header")]
    MissingAuthorization,

    #[error("missing cwa-fake header")]
    MissingFakeFlag,

    #[error("cwa-fake must be \"0\" or \"1\", got {0:?}")]
    InvalidFakeFlag(String),
}

/// Typed view of the submission headers.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmissionHeaders {
    pub tan: String,
    pub fake: bool,
}

impl SubmissionHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, HeaderError> {
        let content_type = header_str(headers, header::CONTENT_TYPE.as_str())
            .ok_or(HeaderError::MissingContentType)?;
        if !is_protobuf(content_type) {
            return Err(HeaderError::UnsupportedContentType(content_type.to_string()));
        }

        let fake = match header_str(headers, FAKE_HEADER) {
            Some("1") => true,
            Some("0") => false,
            Some(other) => return Err(HeaderError::InvalidFakeFlag(other.to_string())),
            None => return Err(HeaderError::MissingFakeFlag),
        };

        let tan = header_str(headers, AUTHORIZATION_HEADER)
            .ok_or(HeaderError::MissingAuthorization)?
            .to_string();

        Ok(Self { tan, fake })
    }
}

// The TAN is a credential; keep it out of logs.
impl std::fmt::Debug for SubmissionHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionHeaders")
            .field("tan", &"<redacted>")
            .field("fake", &self.fake)
            .finish()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Media type comparison ignoring parameters and case.
fn is_protobuf(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case(CONTENT_TYPE_PROTOBUF))
        .unwrap_or(false)
}
