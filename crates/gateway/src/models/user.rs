//! Generated store login.

use chrono::{DateTime, Utc};

use shopkeeper_core::{Email, StoreId, UserId};

/// The login generated for a store at first installation.
///
/// The password hash never leaves the database; this model carries only
/// what the flow needs for logging and the credentials email.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal id.
    pub id: UserId,
    /// Login email (the shop's contact email at install time).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Owning store.
    pub store_id: StoreId,
    /// When the login was created.
    pub created_at: DateTime<Utc>,
}
