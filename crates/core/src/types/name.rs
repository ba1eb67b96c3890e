//! Proper name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PersonName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonNameError {
    /// The input string is empty.
    #[error("name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a digit.
    #[error("name cannot contain digits")]
    ContainsDigit,
}

/// A validated, title-cased proper name (first or last name).
///
/// Normalization is Unicode-aware: Cyrillic input is the common case.
///
/// ## Examples
///
/// ```
/// use vapteke_core::PersonName;
///
/// let name = PersonName::parse("иван").unwrap();
/// assert_eq!(name.as_str(), "Иван");
///
/// assert!(PersonName::parse("иван1").is_err()); // digits rejected
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Maximum length of a name in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a `PersonName` from a raw string, title-casing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 50 characters,
    /// or contains a digit.
    pub fn parse(raw: &str) -> Result<Self, PersonNameError> {
        if raw.is_empty() {
            return Err(PersonNameError::Empty);
        }

        if raw.chars().count() > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(PersonNameError::ContainsDigit);
        }

        Ok(Self(title_case(raw)))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PersonName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PersonName {
    type Err = PersonNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Title-case a string: the first letter of every word is uppercased, the
/// rest lowercased. A word starts after any non-alphabetic character, so
/// hyphenated names get both halves capitalized.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PersonName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PersonName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PersonName {
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
    fn test_parse_title_cases_cyrillic() {
        let name = PersonName::parse("иван").unwrap();
        assert_eq!(name.as_str(), "Иван");
    }

    #[test]
    fn test_parse_lowercases_tail() {
        let name = PersonName::parse("ИВАНОВ").unwrap();
        assert_eq!(name.as_str(), "Иванов");
    }

    #[test]
    fn test_parse_multiple_words() {
        let name = PersonName::parse("анна мария").unwrap();
        assert_eq!(name.as_str(), "Анна Мария");
    }

    #[test]
    fn test_parse_hyphenated() {
        let name = PersonName::parse("петров-водкин").unwrap();
        assert_eq!(name.as_str(), "Петров-Водкин");
    }

    #[test]
    fn test_parse_rejects_digits() {
        assert_eq!(
            PersonName::parse("Иванов1"),
            Err(PersonNameError::ContainsDigit)
        );
        assert_eq!(PersonName::parse("1"), Err(PersonNameError::ContainsDigit));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PersonName::parse(""), Err(PersonNameError::Empty));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "а".repeat(51);
        assert!(matches!(
            PersonName::parse(&long),
            Err(PersonNameError::TooLong { max: 50 })
        ));
    }

    #[test]
    fn test_title_case_preserves_characters() {
        // Same set of characters modulo case, same length in chars.
        let out = title_case("пётр ильич");
        assert_eq!(out, "Пётр Ильич");
        assert_eq!(out.chars().count(), "пётр ильич".chars().count());
    }

    #[test]
    fn test_title_case_latin() {
        assert_eq!(title_case("john doe"), "John Doe");
    }
}
