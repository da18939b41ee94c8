//! Character encoding detection for raw source bodies.
//!
//! Files and HTTP responses arrive as bytes. Before they reach the query
//! engine they are decoded to UTF-8, using (in order) a byte order mark, the
//! `charset` parameter of a `Content-Type` header, and the document's own
//! `<meta>` declarations.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match the `charset=` parameter of a Content-Type value
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Detect the encoding of a body.
///
/// `content_type` is the value of a `Content-Type` header, if the body came
/// with one. Only the first 1024 bytes are searched for `<meta>` tags.
#[must_use]
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(|value| capture(&HEADER_CHARSET_RE, value))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(1024)]);
    capture(&CHARSET_META_RE, &head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a body to a UTF-8 string.
///
/// Invalid sequences are replaced with U+FFFD rather than failing the read.
#[must_use]
pub fn decode(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(body, content_type);
    let (decoded, _encoding_used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_to_utf8_when_no_charset() {
        let html = b"<html><body>Test</body></html>";
        assert_eq!(detect_encoding(html, None), UTF_8);
    }

    #[test]
    fn detect_from_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html, None).name(), "windows-1252");
    }

    #[test]
    fn detect_from_http_equiv_content_type() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1251">"#;
        assert_eq!(detect_encoding(html, None).name(), "windows-1251");
    }

    #[test]
    fn header_wins_over_meta() {
        let html = br#"<meta charset="utf-8"><p>x</p>"#;
        let encoding = detect_encoding(html, Some("text/html; charset=ISO-8859-2"));
        assert_eq!(encoding.name(), "ISO-8859-2");
    }

    #[test]
    fn bom_wins_over_everything() {
        let html = b"\xEF\xBB\xBF<meta charset=\"windows-1252\"><p>x</p>";
        assert_eq!(detect_encoding(html, Some("text/html; charset=ISO-8859-2")), UTF_8);
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let html = br#"<meta charset="not-a-charset"><p>x</p>"#;
        assert_eq!(detect_encoding(html, Some("text/html")), UTF_8);
    }

    #[test]
    fn decode_latin1_body() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode(html, None).contains("Café"));
    }

    #[test]
    fn decode_invalid_utf8_gracefully() {
        let html = b"<p>Test \xFF\xFE Invalid</p>";
        let result = decode(html, None);
        assert!(result.contains("Test"));
        assert!(result.contains("Invalid"));
    }
}
