//! Merchant shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that is not valid in a hostname.
    #[error("shop domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input has no dot-separated labels (e.g. `example.myshopify.com`).
    #[error("shop domain must be a dotted hostname")]
    MissingDot,
    /// A dot-separated label is empty (leading/trailing/double dot).
    #[error("shop domain has an empty label")]
    EmptyLabel,
}

/// A merchant's shop domain (e.g. `example.myshopify.com`).
///
/// The installation flow interpolates this value directly into platform URLs
/// (`https://{shop}/admin/oauth/authorize?...`), so it must be a bare
/// hostname: lowercase alphanumerics, hyphens, and dots only. Anything that
/// could smuggle a scheme, path, port, or userinfo into the redirect target
/// is rejected here.
///
/// ## Examples
///
/// ```
/// use shopkeeper_core::ShopDomain;
///
/// assert!(ShopDomain::parse("example.myshopify.com").is_ok());
/// assert!(ShopDomain::parse("dev-store.example.io").is_ok());
///
/// assert!(ShopDomain::parse("https://evil.example").is_err()); // scheme
/// assert!(ShopDomain::parse("shop/with/path").is_err());       // path
/// assert!(ShopDomain::parse("user@shop.example").is_err());    // userinfo
/// assert!(ShopDomain::parse("shop.example:8080").is_err());    // port
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname (RFC 1035).
    pub const MAX_LENGTH: usize = 253;

    /// Parse a `ShopDomain` from a string.
    ///
    /// Uppercase ASCII is folded to lowercase; hostnames are
    /// case-insensitive and the lowercase form is the canonical key for
    /// store lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty or longer than 253 characters
    /// - Contains a character other than ASCII alphanumerics, `-`, or `.`
    /// - Has no dot, or an empty dot-separated label
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let lowered = s.to_ascii_lowercase();

        if let Some(c) = lowered
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        if !lowered.contains('.') {
            return Err(ShopDomainError::MissingDot);
        }

        if lowered.split('.').any(str::is_empty) {
            return Err(ShopDomainError::EmptyLabel);
        }

        Ok(Self(lowered))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShopDomain` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_domains() {
        assert!(ShopDomain::parse("example.myshopify.com").is_ok());
        assert!(ShopDomain::parse("dev-store-2.myshopify.com").is_ok());
        assert!(ShopDomain::parse("shop.example.io").is_ok());
    }

    #[test]
    fn test_parse_lowercases() {
        let domain = ShopDomain::parse("Example.MyShopify.COM").unwrap();
        assert_eq!(domain.as_str(), "example.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ShopDomain::parse(""), Err(ShopDomainError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}.myshopify.com", "a".repeat(260));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_url_injection() {
        assert!(matches!(
            ShopDomain::parse("https://evil.example"),
            Err(ShopDomainError::InvalidCharacter(_))
        ));
        assert!(matches!(
            ShopDomain::parse("shop.example/admin"),
            Err(ShopDomainError::InvalidCharacter('/'))
        ));
        assert!(matches!(
            ShopDomain::parse("user@shop.example"),
            Err(ShopDomainError::InvalidCharacter('@'))
        ));
        assert!(matches!(
            ShopDomain::parse("shop.example:8080"),
            Err(ShopDomainError::InvalidCharacter(':'))
        ));
        assert!(matches!(
            ShopDomain::parse("shop.example?x=1"),
            Err(ShopDomainError::InvalidCharacter('?'))
        ));
    }

    #[test]
    fn test_parse_rejects_bare_label() {
        assert!(matches!(
            ShopDomain::parse("localhost"),
            Err(ShopDomainError::MissingDot)
        ));
    }

    #[test]
    fn test_parse_rejects_empty_labels() {
        assert!(matches!(
            ShopDomain::parse(".example.com"),
            Err(ShopDomainError::EmptyLabel)
        ));
        assert!(matches!(
            ShopDomain::parse("example..com"),
            Err(ShopDomainError::EmptyLabel)
        ));
        assert!(matches!(
            ShopDomain::parse("example.com."),
            Err(ShopDomainError::EmptyLabel)
        ));
    }
}
