use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token does not have the header.payload.signature structure")]
    MalformedStructure,

    #[error("token payload is not valid base64url: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("token payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("token payload has no usable exp claim")]
    MissingExpiry,
}

/// Claims the client actually looks at. Everything else in the payload is
/// ignored rather than rejected.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Decoded view of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Parse a raw bearer token without verifying its signature.
///
/// Only the middle segment is decoded; the header and signature are checked
/// for presence, nothing more.
pub fn parse_token(raw: &str) -> Result<TokenInfo, TokenError> {
    let mut segments = raw.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::MalformedStructure);
    };

    let decoded = URL_SAFE_NO_PAD.decode(payload)?;
    let claims: Claims = serde_json::from_slice(&decoded)?;
    let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;
    let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::MissingExpiry)?;
    Ok(TokenInfo { expires_at })
}
