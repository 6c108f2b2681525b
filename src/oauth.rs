//! OAuth 1.0a request signing (HMAC-SHA1) for the store API.
//!
//! The API authenticates every request with a consumer key pair and an access
//! token pair that the seller creates in their account. There is no token
//! exchange: each request is signed with all four values.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// The four OAuth values issued for an API consumer.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token_value: String,
    pub token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("token_value", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Splits `url` into the base URI and its decoded query parameters.
fn split_url(url: &str) -> (&str, Vec<(String, String)>) {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => (url, ""),
    };
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_owned())
            };
            (decode(k), decode(v))
        })
        .collect();
    (base, params)
}

fn oauth_params(credentials: &Credentials, nonce: &str, timestamp: u64) -> Vec<(String, String)> {
    vec![
        ("oauth_consumer_key".to_owned(), credentials.consumer_key.clone()),
        ("oauth_nonce".to_owned(), nonce.to_owned()),
        ("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
        ("oauth_timestamp".to_owned(), timestamp.to_string()),
        ("oauth_token".to_owned(), credentials.token_value.clone()),
        ("oauth_version".to_owned(), VERSION.to_owned()),
    ]
}

/// The signature base string of RFC 5849 section 3.4.1.
fn signature_base_string(method: &str, url: &str, oauth: &[(String, String)]) -> String {
    let (base, query) = split_url(url);
    let mut params: Vec<(String, String)> = query
        .into_iter()
        .chain(oauth.iter().cloned())
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    params.sort();
    let normalized = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base),
        encode(&normalized)
    )
}

fn sign(base_string: &str, credentials: &Credentials) -> String {
    let key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC takes any key length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Builds the `Authorization` header value for one request.
///
/// `nonce` must be unique per request and `timestamp` is seconds since the
/// Unix epoch; both are parameters so signatures can be reproduced.
pub fn authorization_header(
    method: &str,
    url: &str,
    credentials: &Credentials,
    nonce: &str,
    timestamp: u64,
) -> String {
    let mut params = oauth_params(credentials, nonce, timestamp);
    let signature = sign(&signature_base_string(method, url, &params), credentials);
    params.push(("oauth_signature".to_owned(), signature));
    params.sort();
    let fields = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs&1".to_string(),
            token_value: "tv".to_string(),
            token_secret: "ts".to_string(),
        }
    }

    #[test]
    fn test_encode_uses_unreserved_set() {
        assert_eq!(encode("a-b._~Z9"), "a-b._~Z9");
        assert_eq!(encode("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
    }

    #[test]
    fn test_signature_base_string_sorts_and_encodes_parameters() {
        let oauth = oauth_params(&credentials(), "abc", 1_700_000_000);

        let base = signature_base_string(
            "get",
            "https://api.bricklink.com/api/store/v1/inventories?status=S&item_type=PART",
            &oauth,
        );

        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.bricklink.com%2Fapi%2Fstore%2Fv1%2Finventories&\
item_type%3DPART%26oauth_consumer_key%3Dck%26oauth_nonce%3Dabc%26\
oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1700000000%26\
oauth_token%3Dtv%26oauth_version%3D1.0%26status%3DS"
        );
    }

    #[test]
    fn test_authorization_header_is_deterministic_for_fixed_nonce() {
        let url = "https://api.bricklink.com/api/store/v1/categories";
        let a = authorization_header("GET", url, &credentials(), "n1", 42);
        let b = authorization_header("GET", url, &credentials(), "n1", 42);
        let c = authorization_header("GET", url, &credentials(), "n2", 42);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("OAuth oauth_consumer_key=\"ck\", oauth_nonce=\"n1\", "));
        assert!(a.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(a.contains("oauth_timestamp=\"42\""));
        assert!(a.contains("oauth_token=\"tv\""));
        assert!(a.contains("oauth_version=\"1.0\""));
        assert!(!a.contains("cs&1"), "secrets must never appear in the header");
    }

    #[test]
    fn test_signature_is_base64_sha1_digest() {
        let header = authorization_header("GET", "https://example.test/x", &credentials(), "n", 1);
        let signature = header
            .split(", ")
            .find_map(|field| field.strip_prefix("oauth_signature=\""))
            .and_then(|rest| rest.strip_suffix('"'))
            .expect("signature field present");
        let decoded = urlencoding::decode(signature).unwrap();

        assert_eq!(STANDARD.decode(decoded.as_bytes()).unwrap().len(), 20);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", credentials());

        assert!(!debug.contains("cs&1"));
        assert!(!debug.contains("\"ck\""));
        assert!(debug.contains("<redacted>"));
    }
}
