//! Name inflection helpers.

use regex::Regex;
use std::sync::LazyLock;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("literal regex"));
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("literal regex"));

/// Converts a type-style name to a lowercase path.
///
/// Namespace separators (`::`) become `/` and camel-case words are joined
/// with underscores: `Guests::CleanStale` becomes `guests/clean_stale`.
#[must_use]
pub fn underscore(name: &str) -> String {
    let path = name.replace("::", "/");
    let path = ACRONYM_BOUNDARY.replace_all(&path, "${1}_${2}");
    let path = WORD_BOUNDARY.replace_all(&path, "${1}_${2}");
    path.replace('-', "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("Guests::CleanStale"), "guests/clean_stale");
        assert_eq!(underscore("HTTPRequestJob"), "http_request_job");
        assert_eq!(underscore("send-email"), "send_email");
        assert_eq!(underscore("already_snake"), "already_snake");
    }
}
