//! URL extraction from free-form message text.

use lazy_regex::regex;

/// Returns every `http://` / `https://` token in `text`, left to right.
///
/// A match runs up to the next whitespace, so trailing punctuation is kept.
/// Duplicates are preserved and nothing is normalized.
///
/// # Examples
///
/// ```
/// use mediagrab_core::links::extract_links;
///
/// let links = extract_links("see https://youtu.be/abc and http://x.y/z!");
/// assert_eq!(links, vec!["https://youtu.be/abc", "http://x.y/z!"]);
/// ```
#[must_use]
pub fn extract_links(text: &str) -> Vec<&str> {
    regex!(r"https?://\S+")
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_links;

    #[test]
    fn test_empty_input() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("no links here, just words").is_empty());
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        let text = "https://a.example/1 then http://b.example/2 and https://a.example/1";
        assert_eq!(
            extract_links(text),
            vec![
                "https://a.example/1",
                "http://b.example/2",
                "https://a.example/1"
            ]
        );
    }

    #[test]
    fn test_captures_trailing_punctuation() {
        let links = extract_links("look: https://www.instagram.com/p/Cxyz/, nice");
        assert_eq!(links, vec!["https://www.instagram.com/p/Cxyz/,"]);
    }

    #[test]
    fn test_stops_at_any_whitespace() {
        let links = extract_links("https://a.example/x\nhttps://b.example/y\thttps://c.example/z");
        assert_eq!(
            links,
            vec!["https://a.example/x", "https://b.example/y", "https://c.example/z"]
        );
    }

    #[test]
    fn test_ignores_other_schemes() {
        assert!(extract_links("ftp://files.example/a www.example.com").is_empty());
        assert_eq!(extract_links("xhttps://a.b"), vec!["https://a.b"]);
    }
}
