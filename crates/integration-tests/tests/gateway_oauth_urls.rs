//! Integration tests for OAuth URL construction.

use secrecy::SecretString;

use shopkeeper_core::ShopDomain;
use shopkeeper_gateway::config::ShopifyApiConfig;
use shopkeeper_gateway::shopify::Client;

fn api_config() -> ShopifyApiConfig {
    ShopifyApiConfig {
        api_key: "3f81c0a59be24d7a".to_string(),
        api_secret: SecretString::from("0a8b2f19c3d44e6f8091a2b3c4d5e6f7"),
        scopes: "read_products,read_orders".to_string(),
    }
}

#[test]
fn test_authorization_url_targets_the_requesting_shop() {
    let client = Client::new(&api_config()).expect("client builds");
    let shop = ShopDomain::parse("dev-store.myshopify.com").expect("valid domain");

    let url = client.authorization_url(&shop, "https://app.example.com/auth/redirect");

    assert!(url.starts_with("https://dev-store.myshopify.com/admin/oauth/authorize?"));
    assert!(url.contains("client_id=3f81c0a59be24d7a"));
    assert!(url.contains("scope=read_products%2Cread_orders"));
    assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fredirect"));
}

#[test]
fn test_authorization_url_never_leaks_the_secret() {
    let client = Client::new(&api_config()).expect("client builds");
    let shop = ShopDomain::parse("dev-store.myshopify.com").expect("valid domain");

    let url = client.authorization_url(&shop, "https://app.example.com/auth/redirect");

    assert!(!url.contains("0a8b2f19c3d44e6f8091a2b3c4d5e6f7"));
}

#[test]
fn test_shop_domains_that_would_break_the_url_are_unrepresentable() {
    // The authorize URL is built by interpolating the shop domain, so the
    // domain type must reject anything that could redirect elsewhere.
    assert!(ShopDomain::parse("example.myshopify.com/../evil.example").is_err());
    assert!(ShopDomain::parse("evil.example?shop=example.myshopify.com").is_err());
    assert!(ShopDomain::parse("example.myshopify.com#fragment").is_err());
    assert!(ShopDomain::parse("example.myshopify.com\u{0}").is_err());
}
