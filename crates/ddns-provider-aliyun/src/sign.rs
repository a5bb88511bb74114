//! Alidns RPC request signing
//!
//! 1. Flatten the parameters and sort them by name (byte-wise)
//! 2. Percent-encode names and values, join as `k=v` with `&`
//! 3. String-to-sign: `GET&%2F&` + percent-encoded canonical query
//! 4. HMAC-SHA1 keyed with `secret&`, base64 encoded
//!
//! Percent-encoding is RFC 3986: `A-Z a-z 0-9 - _ . ~` pass through,
//! everything else becomes `%XX` with uppercase hex (space is `%20`).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ddns_core::{Error, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::params::{QueryMap, QueryParameters};

type HmacSha1 = Hmac<Sha1>;

/// Percent-encode a single component
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Join sorted parameters into the canonical query string
pub fn canonical_query(params: &QueryMap) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string-to-sign for a GET request
pub fn string_to_sign(canonical: &str) -> String {
    format!("GET&{}&{}", percent_encode("/"), percent_encode(canonical))
}

/// HMAC-SHA1 of `string_to_sign` keyed with `secret&`, base64 encoded
pub fn sign_string(string_to_sign: &str, access_key_secret: &str) -> Result<String> {
    let key = format!("{}&", access_key_secret);
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| Error::invalid_input(format!("Invalid signing key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Sign a flattened parameter map
pub fn sign_map(params: &QueryMap, access_key_secret: &str) -> Result<String> {
    sign_string(&string_to_sign(&canonical_query(params)), access_key_secret)
}

/// Sign a parameter set
pub fn sign(params: &impl QueryParameters, access_key_secret: &str) -> Result<String> {
    sign_map(&params.to_query_map(), access_key_secret)
}
