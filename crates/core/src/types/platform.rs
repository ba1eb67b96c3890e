//! Enumerated customer attributes: auth platform and gender.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The platform a customer last authenticated from.
///
/// Stored behind the `platforms` interning table; the enum constrains the
/// accepted wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Site,
    Mobile,
    App,
}

impl Platform {
    /// The canonical lowercase name, as interned in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Mobile => "mobile",
            Self::App => "app",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// Single-letter code as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    /// Parse the single-letter database code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Self::Male),
            "f" => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serde() {
        assert_eq!(serde_json::to_string(&Platform::Mobile).unwrap(), "\"mobile\"");
        let p: Platform = serde_json::from_str("\"site\"").unwrap();
        assert_eq!(p, Platform::Site);
        assert!(serde_json::from_str::<Platform>("\"desktop\"").is_err());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::Male.as_str(), "m");
        assert_eq!(Gender::from_code("f"), Some(Gender::Female));
        assert_eq!(Gender::from_code("x"), None);
    }

    #[test]
    fn test_gender_serde() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"f\"");
        let g: Gender = serde_json::from_str("\"m\"").unwrap();
        assert_eq!(g, Gender::Male);
    }
}
