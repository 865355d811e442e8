//! Integration tests for Shopkeeper.
//!
//! These tests exercise the gateway crate's exported building blocks -
//! request signing, OAuth URL construction, and error-response mapping -
//! without a database or network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopkeeper-integration-tests
//! ```
