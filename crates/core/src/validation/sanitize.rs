//! Output-safety sanitizers.
//!
//! [`sanitize`] makes a value safe to embed in HTML (trim, strip NUL
//! bytes, entity-encode). The narrow sanitizers (`sanitize_email`,
//! `sanitize_int`, ...) filter to a character class for a specific output
//! context and never HTML-encode.

use super::engine::FieldValue;

/// Characters PHP's `FILTER_SANITIZE_EMAIL` preserves besides alphanumerics.
const EMAIL_CHARS: &str = "!#$%&'*+-/=?^_`{|}~@.[]";

/// Characters `FILTER_SANITIZE_URL` preserves besides alphanumerics.
const URL_CHARS: &str = r#"$-_.+!*'(),{}|\^~[]`<>#%";/?:@&="#;

/// Sanitize a string for HTML output: trim, strip NUL bytes, and encode
/// `& < > " '` as entities.
///
/// Apply exactly once per value. Encoding an already-encoded string
/// encodes the ampersands again, so sanitized values must not be run
/// through this function a second time.
pub fn sanitize(value: &str) -> String {
    let stripped: String = value.trim().chars().filter(|&c| c != '\0').collect();
    encode_entities(&stripped)
}

/// Recursively sanitize a field value; list values are sanitized
/// element-wise.
pub fn sanitize_value(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Str(s) => FieldValue::Str(sanitize(s)),
        FieldValue::List(items) => FieldValue::List(items.iter().map(sanitize_value).collect()),
    }
}

/// Keep only characters that can appear in an email address.
pub fn sanitize_email(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || EMAIL_CHARS.contains(c))
        .collect()
}

/// Keep only digits and sign characters.
pub fn sanitize_int(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c.is_ascii_digit() || c == '+' || c == '-')
        .collect()
}

/// Keep only digits, sign characters, and the decimal point.
pub fn sanitize_float(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c.is_ascii_digit() || c == '+' || c == '-' || c == '.')
        .collect()
}

/// Keep only characters that can appear in a URL.
pub fn sanitize_url(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || URL_CHARS.contains(c))
        .collect()
}

/// Remove `<...>` tag spans. An unterminated tag swallows the remainder.
pub fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn encode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_encodes() {
        assert_eq!(sanitize("  <script>alert('x')</script>  "),
            "&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;");
        assert_eq!(sanitize("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(sanitize("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn strips_nul_bytes() {
        assert_eq!(sanitize("a\0b"), "ab");
    }

    #[test]
    fn plain_text_is_a_fixed_point() {
        // A value without special characters is unchanged, no matter how
        // often it is sanitized.
        let once = sanitize("plain text 123");
        assert_eq!(once, "plain text 123");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn encoding_is_not_idempotent_when_chained() {
        // Documents why sanitize must run exactly once per value.
        let once = sanitize("a&b");
        assert_eq!(once, "a&amp;b");
        assert_eq!(sanitize(&once), "a&amp;amp;b");
    }

    #[test]
    fn email_sanitizer_drops_invalid_characters() {
        assert_eq!(sanitize_email(" a b@exa mple.com "), "ab@example.com");
        assert_eq!(sanitize_email("user+tag@example.com"), "user+tag@example.com");
    }

    #[test]
    fn int_and_float_sanitizers() {
        assert_eq!(sanitize_int("qty: -42 items"), "-42");
        assert_eq!(sanitize_float("€ 19.99"), "19.99");
    }

    #[test]
    fn url_sanitizer_drops_whitespace() {
        assert_eq!(
            sanitize_url(" https://example.com/a b?x=1 "),
            "https://example.com/ab?x=1"
        );
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<b>bold</b> text"), "bold text");
        assert_eq!(strip_tags("no tags"), "no tags");
        assert_eq!(strip_tags("broken <tag"), "broken ");
    }
}
