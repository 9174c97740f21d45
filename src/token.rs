//! Stream-token inspection.
//!
//! fmplapla issues a compact three-segment token (JWT-shaped) alongside
//! the websocket location. The middle segment carries the claims; when the
//! subject starts with the restricted marker the station may only be
//! played from Japan, and resolution must fail rather than hand out a
//! descriptor that the origin will refuse to serve.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::error::ExtractError;

/// Subject prefix the origin uses for region-locked listeners.
const RESTRICTED_SUBJECT_MARKER: &str = "restricted";

/// Country the fmplapla family locks restricted streams to.
const RESTRICTED_COUNTRY: &str = "Japan";

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
}

/// Decode the claims segment of a compact token.
///
/// Returns `None` when the token is not exactly three dot-separated
/// segments or the payload is not base64url JSON; such tokens are opaque
/// to us and pass through uninspected.
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Reject tokens whose subject marks the stream as region-locked.
pub fn check_geo_restriction(token: &str) -> Result<(), ExtractError> {
    if let Some(TokenClaims { sub: Some(subject) }) = decode_claims(token) {
        if subject.starts_with(RESTRICTED_SUBJECT_MARKER) {
            return Err(ExtractError::GeoRestricted {
                country: RESTRICTED_COUNTRY,
            });
        }
    }
    Ok(())
}
