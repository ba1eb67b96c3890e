//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains a character that is not an ASCII digit.
    #[error("phone must contain only digits")]
    NotDigits,
    /// The input is not exactly 11 digits long.
    #[error("phone must be exactly {expected} digits (got {got})")]
    BadLength {
        /// Required number of digits.
        expected: usize,
        /// Number of digits received.
        got: usize,
    },
}

/// A normalized Russian phone number.
///
/// Stored as 11 digits with a `7` country prefix. Input with a leading `8`
/// (the domestic trunk prefix) is rewritten to the `7` form; any other
/// leading digit is kept verbatim.
///
/// ## Examples
///
/// ```
/// use vapteke_core::Phone;
///
/// let phone = Phone::parse("89041482222").unwrap();
/// assert_eq!(phone.as_str(), "79041482222");
/// assert_eq!(phone.suffix(), "9041482222");
///
/// assert!(Phone::parse("8904148222").is_err());   // 10 digits
/// assert!(Phone::parse("8904148222a").is_err());  // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in a normalized phone.
    pub const LENGTH: usize = 11;

    /// Parse a `Phone` from a raw string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input contains a non-digit character or is
    /// not exactly 11 digits long.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        if !raw.bytes().all(|b| b.is_ascii_digit()) || raw.is_empty() {
            return Err(PhoneError::NotDigits);
        }

        if raw.len() != Self::LENGTH {
            return Err(PhoneError::BadLength {
                expected: Self::LENGTH,
                got: raw.len(),
            });
        }

        if let Some(rest) = raw.strip_prefix('8') {
            return Ok(Self(format!("7{rest}")));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Build a `Phone` from the 10-digit suffix, prefixing it with `7`.
    ///
    /// Used by the legacy import, where the suffix is the identity key.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is not exactly 10 digits.
    pub fn from_suffix(suffix: &str) -> Result<Self, PhoneError> {
        Self::parse(&format!("7{suffix}"))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the last 10 digits - the true identity key of the number,
    /// ignoring country-code prefix variants.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed normalized
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
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
    fn test_parse_rewrites_leading_eight() {
        let phone = Phone::parse("89041482222").unwrap();
        assert_eq!(phone.as_str(), "79041482222");
        assert_eq!(phone.as_str().len(), Phone::LENGTH);
    }

    #[test]
    fn test_parse_keeps_leading_seven() {
        let phone = Phone::parse("79041482222").unwrap();
        assert_eq!(phone.as_str(), "79041482222");
    }

    #[test]
    fn test_parse_keeps_other_leading_digit() {
        // Only the 8 prefix is rewritten; any other leading digit passes
        // through untouched.
        let phone = Phone::parse("99041482222").unwrap();
        assert_eq!(phone.as_str(), "99041482222");
    }

    #[test]
    fn test_parse_rejects_non_digit() {
        assert_eq!(Phone::parse("8904148222a"), Err(PhoneError::NotDigits));
        assert_eq!(Phone::parse("+7904148222"), Err(PhoneError::NotDigits));
        assert_eq!(Phone::parse(""), Err(PhoneError::NotDigits));
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            Phone::parse("8904148222"),
            Err(PhoneError::BadLength {
                expected: 11,
                got: 10
            })
        ));
        assert!(matches!(
            Phone::parse("890414822223"),
            Err(PhoneError::BadLength { .. })
        ));
    }

    #[test]
    fn test_suffix() {
        let phone = Phone::parse("89041482222").unwrap();
        assert_eq!(phone.suffix(), "9041482222");
    }

    #[test]
    fn test_from_suffix() {
        let phone = Phone::from_suffix("9041111111").unwrap();
        assert_eq!(phone.as_str(), "79041111111");
        assert!(Phone::from_suffix("904111111").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("79041482222").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"79041482222\"");
        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }
}
