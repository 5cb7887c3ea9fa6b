use mediagrab_core::links::extract_links;
use mediagrab_core::platform::Platform;
use proptest::prelude::*;

proptest! {
    /// Extraction never panics on arbitrary text.
    #[test]
    fn does_not_crash(s in "\\PC*") {
        let _ = extract_links(&s);
    }

    /// Every result starts with a scheme, contains no whitespace and is a slice of the input.
    #[test]
    fn results_are_scheme_prefixed_tokens(s in "\\PC*") {
        for link in extract_links(&s) {
            prop_assert!(link.starts_with("http://") || link.starts_with("https://"));
            prop_assert!(!link.chars().any(char::is_whitespace));
            prop_assert!(s.contains(link));
        }
    }

    /// Links separated by whitespace come back unmodified and in order.
    #[test]
    fn keeps_order(
        paths in proptest::collection::vec("[a-zA-Z0-9/_.?=-]{0,20}", 1..5),
        filler in "[a-z ]{0,10}",
    ) {
        let links: Vec<String> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| format!("https://host{i}.example/{p}"))
            .collect();
        let text = links.join(&format!(" {filler} "));

        let found = extract_links(&text);
        prop_assert_eq!(found, links.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Classification is total and youtube markers always win.
    #[test]
    fn youtube_wins(prefix in "[a-z./]{0,10}", suffix in "[a-z./]{0,10}") {
        let url = format!("https://{prefix}instagram.com/{suffix}youtu.be");
        prop_assert_eq!(Platform::classify(&url), Platform::Youtube);
    }
}
