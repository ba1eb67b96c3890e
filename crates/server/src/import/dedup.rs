//! Deduplication and transformation of legacy customer rows.
//!
//! The last 10 digits of the phone number are the true identity key:
//! prefix variants (`+7`, `7`, `8`) all collapse to the same suffix. Within
//! a suffix group exactly one row survives - the most recently created
//! legacy record, with the larger legacy id breaking `created_at` ties.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use vapteke_core::{Phone, title_case};

use super::legacy::LegacyCustomerRow;

/// Permissive shape accepted for imported emails.
static EMAIL_MASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.{1,100}@[a-z]{2,6}\.[a-z]{2,4}$").expect("email mask is a valid regex")
});

/// Maximum length of an imported first name, in characters.
const FIRSTNAME_MAX: usize = 50;

/// A legacy row transformed into the primary-store shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedCustomer {
    pub id: i64,
    pub phone: Phone,
    pub firstname: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Extract the 10-digit phone suffix if `phone` matches a Russian mobile
/// shape (`+7`, `7` or `8` followed by exactly 10 digits).
#[must_use]
pub fn phone_suffix(phone: &str) -> Option<&str> {
    let rest = phone
        .strip_prefix("+7")
        .or_else(|| phone.strip_prefix('7'))
        .or_else(|| phone.strip_prefix('8'))?;

    (rest.len() == 10 && rest.bytes().all(|b| b.is_ascii_digit())).then_some(rest)
}

/// Select one canonical row per phone suffix: maximum `created_at`, ties
/// broken by the larger legacy id. Rows whose phone does not match the
/// mobile shape are dropped. Output is ordered by legacy id.
#[must_use]
pub fn select_canonical(rows: Vec<LegacyCustomerRow>) -> Vec<LegacyCustomerRow> {
    let mut by_suffix: HashMap<String, LegacyCustomerRow> = HashMap::new();

    for row in rows {
        let Some(suffix) = phone_suffix(&row.phone_main) else {
            continue;
        };

        match by_suffix.get(suffix) {
            Some(kept)
                if (kept.created_at, kept.id) >= (row.created_at, row.id) => {}
            _ => {
                by_suffix.insert(suffix.to_owned(), row);
            }
        }
    }

    let mut selected: Vec<_> = by_suffix.into_values().collect();
    selected.sort_by_key(|r| r.id);
    selected
}

/// Transform a selected legacy row into the primary-store shape.
///
/// - firstname: truncated to 50 characters and title-cased
/// - email: lowercased, whitespace stripped, kept only if it matches the
///   permissive mask, otherwise null
/// - phone: the 10-digit suffix prefixed with `7`
/// - timestamps: epoch seconds converted to UTC
///
/// Returns `None` when the phone does not match the mobile shape or the
/// epoch timestamps are out of range.
#[must_use]
pub fn transform(row: &LegacyCustomerRow) -> Option<TransformedCustomer> {
    let suffix = phone_suffix(&row.phone_main)?;
    let phone = Phone::from_suffix(suffix).ok()?;

    let firstname: String = row
        .first_fio
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(FIRSTNAME_MAX)
        .collect();
    let firstname = title_case(&firstname);

    let email = row.email_main.as_deref().and_then(normalize_email);

    Some(TransformedCustomer {
        id: row.id,
        phone,
        firstname,
        email,
        created_at: DateTime::from_timestamp(row.created_at, 0)?,
        updated_at: DateTime::from_timestamp(row.updated_at, 0)?,
    })
}

/// Lowercase, strip whitespace, and accept only addresses matching the
/// permissive mask.
fn normalize_email(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    EMAIL_MASK.is_match(&cleaned).then_some(cleaned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(id: i64, phone: &str, created_at: i64) -> LegacyCustomerRow {
        LegacyCustomerRow {
            id,
            phone_main: phone.to_owned(),
            first_fio: Some("иван".to_owned()),
            email_main: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_phone_suffix_accepts_all_prefix_variants() {
        assert_eq!(phone_suffix("+79041111111"), Some("9041111111"));
        assert_eq!(phone_suffix("79041111111"), Some("9041111111"));
        assert_eq!(phone_suffix("89041111111"), Some("9041111111"));
    }

    #[test]
    fn test_phone_suffix_rejects_bad_shapes() {
        assert_eq!(phone_suffix("9041111111"), None); // no prefix
        assert_eq!(phone_suffix("+7904111111"), None); // 9 digits
        assert_eq!(phone_suffix("+790411111112"), None); // 11 digits
        assert_eq!(phone_suffix("+7904111111a"), None); // non-digit
        assert_eq!(phone_suffix(""), None);
    }

    #[test]
    fn test_select_canonical_keeps_max_created_at() {
        // Same suffix via different prefixes; the newer row wins.
        let rows = vec![
            row(1, "+79041111111", 100),
            row(2, "89041111111", 200),
        ];
        let selected = select_canonical(rows);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 2);
    }

    #[test]
    fn test_select_canonical_tie_breaks_by_larger_id() {
        let rows = vec![
            row(7, "79041111111", 100),
            row(3, "89041111111", 100),
        ];
        let selected = select_canonical(rows);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 7);
    }

    #[test]
    fn test_select_canonical_distinct_suffixes_all_kept() {
        let rows = vec![
            row(1, "79041111111", 100),
            row(2, "79042222222", 50),
        ];
        let selected = select_canonical(rows);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, 1);
        assert_eq!(selected[1].id, 2);
    }

    #[test]
    fn test_select_canonical_drops_non_mobile_rows() {
        let rows = vec![row(1, "84951234567890", 100), row(2, "абракадабра", 100)];
        assert!(select_canonical(rows).is_empty());
    }

    #[test]
    fn test_transform_phone_and_name() {
        let r = row(5, "89041482222", 1_700_000_000);
        let t = transform(&r).unwrap();
        assert_eq!(t.phone.as_str(), "79041482222");
        assert_eq!(t.firstname, "Иван");
        assert_eq!(t.created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_transform_truncates_firstname_to_50_chars() {
        let mut r = row(5, "89041482222", 100);
        r.first_fio = Some("а".repeat(80));
        let t = transform(&r).unwrap();
        assert_eq!(t.firstname.chars().count(), 50);
    }

    #[test]
    fn test_transform_email_normalized_and_masked() {
        let mut r = row(5, "89041482222", 100);
        r.email_main = Some(" Ivanov@Mail.Ru ".to_owned());
        let t = transform(&r).unwrap();
        assert_eq!(t.email.as_deref(), Some("ivanov@mail.ru"));
    }

    #[test]
    fn test_transform_bad_email_becomes_null() {
        let mut r = row(5, "89041482222", 100);
        r.email_main = Some("not-an-email".to_owned());
        let t = transform(&r).unwrap();
        assert_eq!(t.email, None);

        // domain label too long for the mask
        r.email_main = Some("user@averylongdomain.ru".to_owned());
        assert_eq!(transform(&r).unwrap().email, None);
    }

    #[test]
    fn test_transform_missing_name_is_empty() {
        let mut r = row(5, "89041482222", 100);
        r.first_fio = None;
        let t = transform(&r).unwrap();
        assert_eq!(t.firstname, "");
    }

    #[test]
    fn test_import_scenario_two_prefix_variants() {
        // {phone: "+79041111111", created_at: 100} vs
        // {phone: "89041111111", created_at: 200}
        // -> exactly one customer, from the created_at=200 row.
        let rows = vec![row(1, "+79041111111", 100), row(2, "89041111111", 200)];
        let selected = select_canonical(rows);
        assert_eq!(selected.len(), 1);
        let t = transform(&selected[0]).unwrap();
        assert_eq!(t.id, 2);
        assert_eq!(t.phone.as_str(), "79041111111");
    }
}
