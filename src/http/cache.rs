//! Conditional requests for served reports
//!
//! Reports can be regenerated under the same name, so the validator is a hash
//! of the file content rather than its modification time.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong entity tag for `content`, quoted: `"1f3a9c"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// `true` when `If-None-Match` already names `etag` and a `304` can be sent
///
/// Accepts a comma-separated list, weak tags (`W/"abc"`) and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// `Cache-Control` sent with report files, from `reports.cache_max_age`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Cacheable for the given number of seconds
    Public(u32),
    /// Revalidate on every use
    NoCache,
}

impl CachePolicy {
    /// `0` means `no-cache`
    pub const fn from_max_age(max_age: u32) -> Self {
        if max_age == 0 {
            Self::NoCache
        } else {
            Self::Public(max_age)
        }
    }

    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(seconds) => format!("public, max-age={seconds}"),
            Self::NoCache => String::from("no-cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_tracks_content() {
        let report = b"<html><head></head></html>";
        let etag = generate_etag(report);
        assert!(etag.len() > 2 && etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(report));
        assert_ne!(etag, generate_etag(b"<html><head> </head></html>"));
    }

    #[test]
    fn test_if_none_match_forms() {
        let etag = generate_etag(b"report");
        let weak = format!("W/{etag}");
        let listed = format!("\"stale\", {etag}");

        assert!(check_etag_match(Some(&etag), &etag));
        assert!(check_etag_match(Some(&weak), &etag));
        assert!(check_etag_match(Some(&listed), &etag));
        assert!(check_etag_match(Some("*"), &etag));
        assert!(!check_etag_match(Some("\"stale\""), &etag));
        assert!(!check_etag_match(None, &etag));
    }

    #[test]
    fn test_policy_from_config() {
        assert_eq!(CachePolicy::from_max_age(0), CachePolicy::NoCache);
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
        assert_eq!(
            CachePolicy::from_max_age(3600).to_header_value(),
            "public, max-age=3600"
        );
    }
}
