//! OAuth 1.0a request signing (HMAC-SHA1) for a delegated access token.

use crate::client::TrelloCredentials;
use crate::error::{BoardApiError, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding; only `A-Z a-z 0-9 - . _ ~` stay literal.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Build the `Authorization` header for one request with a fresh nonce and timestamp.
///
/// `url` must not carry a query string; query parameters go in `params`.
pub fn authorization_header(
    credentials: &TrelloCredentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
) -> Result<String> {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    signed_header(credentials, method, url, params, &nonce, &timestamp)
}

pub(crate) fn signed_header(
    credentials: &TrelloCredentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
    nonce: &str,
    timestamp: &str,
) -> Result<String> {
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.api_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", OAUTH_VERSION),
    ];

    let signature = sign(credentials, method, url, params, &oauth_params)?;
    oauth_params.push(("oauth_signature", signature.as_str()));
    oauth_params.sort_by(|a, b| a.0.cmp(b.0));

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}

fn sign(
    credentials: &TrelloCredentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
    oauth_params: &[(&str, &str)],
) -> Result<String> {
    // Encode first, then sort by encoded key and value
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .chain(
            oauth_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string)
    );

    let key = format!(
        "{}&{}",
        percent_encode(&credentials.api_secret),
        percent_encode(&credentials.access_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| BoardApiError::SigningError(e.to_string()))?;
    mac.update(base_string.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
