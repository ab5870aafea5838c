//! Stylesheet reference scanning.
//!
//! Finds `url(...)` and `@import "..."` references and lets the caller
//! substitute each one. Only the reference text itself is replaced; quotes,
//! whitespace and the surrounding function stay as they were. Matching is
//! byte-exact: no normalization is applied to reference strings.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const PATTERN: &str = r#"(?is)/\*.*?\*/|\burl\(\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^)"'\s]*))\s*\)|@import\s+(?:"(?P<idq>[^"]*)"|'(?P<isq>[^']*)')"#;

const REFERENCE_GROUPS: [&str; 5] = ["dq", "sq", "bare", "idq", "isq"];

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN).expect("reference pattern is valid"));

/// Rewrite `text`, replacing every non-empty reference with `replace(reference)`.
///
/// Comments are passed through untouched.
pub fn scan<F>(text: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> String,
{
    REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let reference = REFERENCE_GROUPS
                .iter()
                .find_map(|name| caps.name(name))
                .filter(|m| !m.as_str().is_empty());

            let Some(reference) = reference else {
                return whole.to_string();
            };

            let offset = caps.get(0).map_or(0, |m| m.start());
            let start = reference.start() - offset;
            let end = reference.end() - offset;
            format!(
                "{}{}{}",
                &whole[..start],
                replace(reference.as_str()),
                &whole[end..]
            )
        })
        .into_owned()
}

/// Distinct references in first-seen order. Does not modify anything.
pub fn references(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    scan(text, |reference| {
        if seen.insert(reference.to_string()) {
            ordered.push(reference.to_string());
        }
        reference.to_string()
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_forms() {
        let css = r#"a { background: url(a.png); } b { background: URL( "b.png" ) } c { src: url('c.woff2') format("woff2") }"#;
        assert_eq!(references(css), vec!["a.png", "b.png", "c.woff2"]);
    }

    #[test]
    fn test_import_forms() {
        let css = "@import \"base.css\";\n@import 'print.css' print;\n@import url(theme.css);";
        assert_eq!(references(css), vec!["base.css", "print.css", "theme.css"]);
    }

    #[test]
    fn test_distinct_first_seen_order() {
        let css = "x{a:url(b.png)} y{a:url(a.png)} z{a:url(b.png)} w{a:url('a.png')}";
        assert_eq!(references(css), vec!["b.png", "a.png"]);
    }

    #[test]
    fn test_comments_skipped() {
        let css = "/* url(ignored.png) */ a { background: url(kept.png) } /*\n@import 'no.css';\n*/";
        assert_eq!(references(css), vec!["kept.png"]);
        assert_eq!(scan(css, |_| "X".to_string()), "/* url(ignored.png) */ a { background: url(X) } /*\n@import 'no.css';\n*/");
    }

    #[test]
    fn test_replace_preserves_quotes_and_spacing() {
        let css = r#"a{b:url( "x.png" )} c{d:url('x.png')} e{f:url(x.png)}"#;
        let out = scan(css, |r| format!("<{r}>"));
        assert_eq!(out, r#"a{b:url( "<x.png>" )} c{d:url('<x.png>')} e{f:url(<x.png>)}"#);
    }

    #[test]
    fn test_empty_url_untouched() {
        let css = "a { background: url(); b: url('') }";
        assert!(references(css).is_empty());
        assert_eq!(scan(css, |_| "X".to_string()), css);
    }

    #[test]
    fn test_no_references_identity() {
        let css = "body { color: red; }\n.urlish { content: 'url' }";
        assert!(references(css).is_empty());
        assert_eq!(scan(css, |r| r.to_string()), css);
    }

    #[test]
    fn test_exact_match_no_normalization() {
        let css = "a{b:url(./x.png)} c{d:url(x.png)}";
        assert_eq!(references(css), vec!["./x.png", "x.png"]);
    }
}
