//! Default label normalizers.
//!
//! The path normalizer keeps label cardinality bounded when requests do not
//! match a route template: value-like segments (ids, dates, e-mails) collapse
//! into a single placeholder.

use super::request::NormalizeContext;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Placeholder written in place of value-like path segments.
pub const VALUE_PLACEHOLDER: &str = "#val";

static VALUE_MASKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // integers
        r"^-?\d+$",
        // ISO dates
        r"^(\d{2}|\d{4})-\d{2}-\d{2}$",
        // e-mail addresses
        r"^[^@/\s]+@[^@/\s]+\.[^@/\s]+$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static HEX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[0-9a-f]{7,}$").expect("valid regex"));

fn is_value_segment(segment: &str) -> bool {
    // ---
    if VALUE_MASKS.iter().any(|mask| mask.is_match(segment)) || Uuid::parse_str(segment).is_ok() {
        return true;
    }

    // Plain words such as "facade" or "deadbeef" stay; ids carry digits.
    HEX_ID.is_match(segment) && segment.chars().any(|c| c.is_ascii_digit())
}

/// Replaces value-like segments of `path` with [`VALUE_PLACEHOLDER`].
///
/// The query string and fragment are dropped first. Route templates such as
/// `/users/{id}` pass through unchanged.
pub fn replace_path_values(path: &str) -> String {
    // ---
    let path = path.split(['?', '#']).next().unwrap_or_default();

    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && is_value_segment(segment) {
                VALUE_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Default `path` normalizer.
pub fn normalize_path(path: &str, _ctx: &NormalizeContext<'_>) -> String {
    replace_path_values(path)
}

/// Default `method` normalizer; passes the method through.
pub fn normalize_method(method: &str, _ctx: &NormalizeContext<'_>) -> String {
    method.to_string()
}

/// Default `status_code` normalizer; passes the status through.
pub fn normalize_status_code(status_code: &str, _ctx: &NormalizeContext<'_>) -> String {
    status_code.to_string()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn every_value_mask_compiles() {
        assert_eq!(VALUE_MASKS.len(), 3);
    }

    #[test]
    fn numeric_segments_are_replaced() {
        assert_eq!(replace_path_values("/users/42/posts/7"), "/users/#val/posts/#val");
    }

    #[test]
    fn query_string_is_dropped() {
        assert_eq!(replace_path_values("/search?q=rust&page=2"), "/search");
    }

    #[test]
    fn uuid_and_hex_ids_are_replaced() {
        // ---
        assert_eq!(
            replace_path_values("/orders/3f2504e0-4f89-11d3-9a0c-0305e82c3301"),
            "/orders/#val"
        );
        assert_eq!(replace_path_values("/commits/a1b2c3d4e5"), "/commits/#val");
    }

    #[test]
    fn words_and_templates_are_kept() {
        // ---
        assert_eq!(replace_path_values("/api/facade/deadbeef"), "/api/facade/deadbeef");
        assert_eq!(replace_path_values("/users/{id}"), "/users/{id}");
        assert_eq!(replace_path_values("/"), "/");
    }

    #[test]
    fn dates_and_emails_are_replaced() {
        // ---
        assert_eq!(replace_path_values("/reports/2024-03-01"), "/reports/#val");
        assert_eq!(replace_path_values("/people/jo@example.com"), "/people/#val");
    }
}
