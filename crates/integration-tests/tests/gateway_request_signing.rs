//! Integration tests for inbound platform request verification.
//!
//! Requests are signed the way the platform signs them: HMAC-SHA256 over
//! the sorted `k=v&k=v` query string (minus `hmac`), hex-encoded.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use shopkeeper_gateway::shopify::verify_request;

type HmacSha256 = Hmac<Sha256>;

const SECRET: &str = "0a8b2f19c3d44e6f8091a2b3c4d5e6f7";

/// Sign a parameter map the way the platform does.
fn platform_sign(params: &HashMap<String, String>, secret: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable();

    let message = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn install_request() -> HashMap<String, String> {
    let mut params: HashMap<String, String> = [
        ("shop", "example.myshopify.com"),
        ("timestamp", "1337178173"),
        ("host", "ZXhhbXBsZS5teXNob3BpZnkuY29t"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let hmac = platform_sign(&params, SECRET);
    params.insert("hmac".to_string(), hmac);
    params
}

#[test]
fn test_signed_install_request_is_accepted() {
    let params = install_request();
    assert!(verify_request(&params, SECRET));
}

#[test]
fn test_signed_callback_request_is_accepted() {
    let mut params = install_request();
    params.remove("hmac");
    params.insert("code".to_string(), "0907a61c0c8d55e99db179b68161bc00".to_string());
    let hmac = platform_sign(&params, SECRET);
    params.insert("hmac".to_string(), hmac);

    assert!(verify_request(&params, SECRET));
}

#[test]
fn test_tampered_shop_is_rejected() {
    let mut params = install_request();
    params.insert("shop".to_string(), "attacker.myshopify.com".to_string());

    assert!(!verify_request(&params, SECRET));
}

#[test]
fn test_added_param_is_rejected() {
    let mut params = install_request();
    params.insert("role".to_string(), "admin".to_string());

    assert!(!verify_request(&params, SECRET));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let params = install_request();
    assert!(!verify_request(&params, "a-different-secret"));
}

#[test]
fn test_unsigned_request_is_rejected() {
    let mut params = install_request();
    params.remove("hmac");

    assert!(!verify_request(&params, SECRET));
}

#[test]
fn test_legacy_signature_param_is_ignored_by_signing() {
    // The deprecated `signature` param is excluded from the signed message,
    // so adding it after signing must not break verification.
    let mut params = install_request();
    params.insert("signature".to_string(), "deadbeef".to_string());

    assert!(verify_request(&params, SECRET));
}
