//! DOM Operations Adapter
//!
//! Small set of read-only helpers over the `dom_query` crate. The query
//! engine in [`crate::crawly`] goes through these functions instead of
//! calling `dom_query` directly, so the HTML backend stays in one place.

use std::sync::LazyLock;

use regex::Regex;

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Opening of a tag, closing tag, comment, doctype or processing instruction.
#[allow(clippy::expect_used)]
static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z!/?]").expect("valid regex"));

/// Any run of whitespace.
#[allow(clippy::expect_used)]
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Check whether a string contains any markup at all.
///
/// `"5 < 6"` is plain text, `"<b>5</b>"` and `"<!-- x -->"` are not.
#[must_use]
pub fn is_markup(input: &str) -> bool {
    MARKUP_RE.is_match(input)
}

/// Wrap plain text into a minimal document so it can be queried.
///
/// `&` is escaped so the text reads back exactly as given.
#[must_use]
pub fn wrap_text(text: &str) -> String {
    format!("<html><body>{}</body></html>", text.replace('&', "&amp;"))
}

/// Opening and closing markup of the element that `tag`'s children must be
/// parsed inside, for tags whose content the parser drops out of context.
#[must_use]
pub fn context_wrapper(tag: &str) -> Option<(String, String)> {
    match tag {
        "tr" => Some(("<table><tbody><tr>".into(), "</tr></tbody></table>".into())),
        "tbody" | "thead" | "tfoot" => {
            Some((format!("<table><{tag}>"), format!("</{tag}></table>")))
        }
        "table" | "select" => Some((format!("<{tag}>"), format!("</{tag}>"))),
        _ => None,
    }
}

// === Text Content ===

/// Get all text content of the selection and its descendants
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML of the first node in the selection
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML of the first node in the selection
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Collapse whitespace runs into single spaces and strip both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// === Tag/Node Information ===

/// Get tag name (lowercase) of the first node
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Get an attribute value of the first node
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Selection holding only the first node, empty if there is none.
#[must_use]
pub fn first<'a>(sel: &Selection<'a>) -> Selection<'a> {
    match sel.nodes().first() {
        Some(node) => Selection::from(*node),
        None => Selection::from(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_detection() {
        assert!(is_markup("<div>x</div>"));
        assert!(is_markup("text <br> more"));
        assert!(is_markup("<!-- comment -->"));
        assert!(!is_markup("5.5"));
        assert!(!is_markup("5 < 6 and 7 > 3"));
        assert!(!is_markup(""));
    }

    #[test]
    fn test_wrap_text_escapes_ampersand() {
        let doc = parse(&wrap_text("AT&amp;T & co"));
        assert_eq!(text_content(&doc.select("body")), "AT&amp;T & co".into());
    }

    #[test]
    fn test_context_wrapper() {
        let (open, close) = context_wrapper("tr").expect("rows need a table");
        let doc = parse(&format!("{open}<td>a</td><td>b</td>{close}"));
        assert_eq!(doc.select("td").length(), 2);

        assert!(context_wrapper("thead").is_some());
        assert!(context_wrapper("select").is_some());
        assert!(context_wrapper("div").is_none());
        assert!(context_wrapper("li").is_none());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("   Hello        world  "), "Hello world");
        assert_eq!(collapse_whitespace("a\n\t b"), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_text_and_html_content() {
        let doc = parse(r#"<div>text <span>nested</span> more</div>"#);
        let div = doc.select("div");

        assert_eq!(text_content(&div), "text nested more".into());
        assert_eq!(inner_html(&div), "text <span>nested</span> more".into());
        assert!(outer_html(&div).starts_with("<div>"));
    }

    #[test]
    fn test_tag_name_and_attribute() {
        let doc = parse(r#"<a href="/x" target="_blank">Link</a>"#);
        let a = doc.select("a");

        assert_eq!(tag_name(&a), Some("a".to_string()));
        assert_eq!(get_attribute(&a, "target"), Some("_blank".to_string()));
        assert_eq!(get_attribute(&a, "rel"), None);
    }

    #[test]
    fn test_first_of_empty_selection() {
        let doc = parse("<div>content</div>");
        let empty = doc.select("span");

        assert!(first(&empty).is_empty());
        assert_eq!(first(&doc.select("div")).length(), 1);
    }

    #[test]
    fn test_operations_on_empty_selection() {
        let doc = parse(r#"<div>content</div>"#);
        let empty = doc.select("span");

        assert_eq!(text_content(&empty), "".into());
        assert!(inner_html(&empty).is_empty());
        assert_eq!(tag_name(&empty), None);
    }
}
