//! HMAC verification for inbound platform requests.
//!
//! The platform signs install and OAuth-callback requests by HMAC-SHA256ing
//! the query string (minus the `hmac`/`signature` params, sorted by key)
//! with the app's API secret and appending the hex digest as `hmac`.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify the HMAC signature on an inbound request's query parameters.
///
/// Returns `false` for a missing or non-hex `hmac` param, or a digest
/// mismatch. The comparison is constant-time (`Mac::verify_slice`).
#[must_use]
pub fn verify_request(params: &HashMap<String, String>, secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };

    let Ok(provided_bytes) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signature_message(params).as_bytes());

    mac.verify_slice(&provided_bytes).is_ok()
}

/// Build the message the platform signed: all params except `hmac` and
/// `signature`, sorted by key, joined as `k=v&k=v`.
fn signature_message(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(params: &HashMap<String, String>, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signature_message(params).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    const SECRET: &str = "hush";

    #[test]
    fn test_verify_accepts_signed_request() {
        let mut request = params(&[
            ("shop", "example.myshopify.com"),
            ("timestamp", "1337178173"),
        ]);
        let hmac = sign(&request, SECRET);
        request.insert("hmac".to_string(), hmac);

        assert!(verify_request(&request, SECRET));
    }

    #[test]
    fn test_verify_rejects_tampered_param() {
        let mut request = params(&[
            ("shop", "example.myshopify.com"),
            ("timestamp", "1337178173"),
        ]);
        let hmac = sign(&request, SECRET);
        request.insert("hmac".to_string(), hmac);
        request.insert("shop".to_string(), "evil.myshopify.com".to_string());

        assert!(!verify_request(&request, SECRET));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let mut request = params(&[("shop", "example.myshopify.com")]);
        let hmac = sign(&request, "other-secret");
        request.insert("hmac".to_string(), hmac);

        assert!(!verify_request(&request, SECRET));
    }

    #[test]
    fn test_verify_rejects_missing_hmac() {
        let request = params(&[("shop", "example.myshopify.com")]);
        assert!(!verify_request(&request, SECRET));
    }

    #[test]
    fn test_verify_rejects_non_hex_hmac() {
        let mut request = params(&[("shop", "example.myshopify.com")]);
        request.insert("hmac".to_string(), "not hex at all".to_string());

        assert!(!verify_request(&request, SECRET));
    }

    #[test]
    fn test_signature_message_sorted_and_filtered() {
        let request = params(&[
            ("timestamp", "2"),
            ("shop", "a.example.com"),
            ("hmac", "ffff"),
            ("signature", "legacy"),
            ("code", "abc"),
        ]);

        assert_eq!(
            signature_message(&request),
            "code=abc&shop=a.example.com&timestamp=2"
        );
    }
}
