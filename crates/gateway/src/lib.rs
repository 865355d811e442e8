//! Shopkeeper Gateway library.
//!
//! This crate provides the installation gateway as a library, allowing it
//! to be tested and reused.
//!
//! # Flow
//!
//! - `GET /install` - decides between the OAuth consent screen and the
//!   login page, based on whether the shop is installed and its stored
//!   token is still live
//! - `GET /auth/redirect` - exchanges the authorization code, fetches the
//!   shop profile, persists the store and its generated login, and
//!   dispatches webhook configuration
//!
//! # Security
//!
//! Inbound flow requests must carry a valid platform HMAC signature; the
//! app API secret signs them and is never exposed in logs or URLs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
