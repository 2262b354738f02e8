//! TC3-HMAC-SHA256 request signing for Tencent Cloud API 3.0.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::errors::ScfError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";
const TERMINATOR: &str = "tc3_request";

/// Inputs that determine an `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub secret_id: &'a str,
    pub secret_key: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    pub payload: &'a str,
    pub timestamp: i64,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ScfError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ScfError::InvalidRequest(format!("Failed to create HMAC: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// UTC date of `timestamp` as used in the credential scope.
fn scope_date(timestamp: i64) -> Result<String, ScfError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ScfError::InvalidRequest(format!("timestamp {timestamp} out of range")))
}

#[must_use]
pub fn canonical_request(host: &str, payload: &str) -> String {
    format!(
        "POST\n/\n\ncontent-type:{CONTENT_TYPE}\nhost:{host}\n\n{SIGNED_HEADERS}\n{}",
        sha256_hex(payload)
    )
}

#[must_use]
pub fn string_to_sign(timestamp: i64, credential_scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{timestamp}\n{credential_scope}\n{}",
        sha256_hex(canonical_request)
    )
}

/// Compute the hex signature for `input`.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented as a date.
pub fn compute_signature(input: &SigningInput<'_>) -> Result<String, ScfError> {
    let date = scope_date(input.timestamp)?;
    let credential_scope = format!("{date}/{}/{TERMINATOR}", input.service);
    let canonical = canonical_request(input.host, input.payload);
    let to_sign = string_to_sign(input.timestamp, &credential_scope, &canonical);

    let secret_date = hmac_sha256(format!("TC3{}", input.secret_key).as_bytes(), date.as_bytes())?;
    let secret_service = hmac_sha256(&secret_date, input.service.as_bytes())?;
    let secret_signing = hmac_sha256(&secret_service, TERMINATOR.as_bytes())?;
    Ok(hex::encode(hmac_sha256(&secret_signing, to_sign.as_bytes())?))
}

/// Build the `Authorization` header value for `input`.
///
/// # Errors
///
/// Returns an error if the signature cannot be computed.
pub fn authorization_header(input: &SigningInput<'_>) -> Result<String, ScfError> {
    let date = scope_date(input.timestamp)?;
    let signature = compute_signature(input)?;
    Ok(format!(
        "{ALGORITHM} Credential={}/{date}/{}/{TERMINATOR}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        input.secret_id, input.service
    ))
}
