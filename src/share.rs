//! URL extraction from shared free text.

use regex::Regex;
use std::sync::OnceLock;

const URL_PATTERN: &str =
    r"(http|https)://[\w\-_]+(\.[\w\-_]+)+([\w\-.,@?^=%&:/~+#]*[\w\-@?^=%&/~+#])?";

fn url_regex() -> Option<&'static Regex> {
    static URL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    URL_REGEX
        .get_or_init(|| match Regex::new(URL_PATTERN) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::error!(error = %e, "invalid URL pattern");
                None
            }
        })
        .as_ref()
}

/// First http(s) URL in `text`
///
/// Share actions often wrap the link in a sentence ("Check this out: https://...").
pub fn extract_url(text: &str) -> Option<String> {
    extract_urls(text).into_iter().next()
}

/// Every http(s) URL in `text`, in order of appearance
pub fn extract_urls(text: &str) -> Vec<String> {
    match url_regex() {
        Some(regex) => regex
            .find_iter(text)
            .map(|found| found.as_str())
            .filter(|candidate| is_valid_url(candidate))
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

// The pattern is loose enough to match things like ports out of range
fn is_valid_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok_and(|url| url.host_str().is_some())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_url_inside_sentence() {
        assert_eq!(
            extract_url("Watch this: https://www.youtube.com/watch?v=dQw4w9WgXcQ !").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn bare_url_is_returned_whole() {
        let url = "https://youtu.be/dQw4w9WgXcQ?t=42";
        assert_eq!(extract_url(url).as_deref(), Some(url));
    }

    #[test]
    fn no_url_in_text() {
        assert_eq!(extract_url("nothing to see here"), None);
        assert_eq!(extract_url("ftp://files.example.com/a"), None);
        assert!(extract_urls("").is_empty());
    }

    #[test]
    fn unparseable_match_is_skipped() {
        let text = "bad http://host.example.com:99999/x then https://ok.example.com/v";
        assert_eq!(extract_url(text).as_deref(), Some("https://ok.example.com/v"));
    }

    #[test]
    fn multiple_urls_in_order() {
        let text = "first http://a.example.com/x, then https://b.example.org/y.";
        assert_eq!(
            extract_urls(text),
            vec!["http://a.example.com/x", "https://b.example.org/y"]
        );
    }
}
