//! URL encoding for form bodies.
//!
//! Follows `application/x-www-form-urlencoded`: unreserved characters are
//! kept, spaces become `+`, everything else is percent-encoded byte-wise so
//! arbitrary (non-UTF-8) byte values survive.

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters to percent-encode in form values (excluding space).
///
/// This encodes all control characters plus characters with special meaning in
/// URLs (query separators, reserved characters), while leaving unreserved
/// characters (alphanumeric, `-`, `_`, `.`, `~`) as-is per RFC 3986. Bytes
/// above 0x7F are always encoded by `percent_encode`.
pub(super) const FORM_ENCODE_SET_NO_SPACE: &AsciiSet = &CONTROLS
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'\'');

/// Form-encode raw bytes, mapping spaces to `+` in the same pass.
pub(super) fn url_encode_bytes(input: &[u8]) -> String {
    let mut result = String::with_capacity(input.len());
    let mut first = true;
    for piece in input.split(|&b| b == b' ') {
        if !first {
            result.push('+');
        }
        first = false;
        result.extend(percent_encode(piece, FORM_ENCODE_SET_NO_SPACE));
    }
    result
}

/// Form-encode a string.
pub(super) fn url_encode(s: &str) -> String {
    url_encode_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encode_special_chars() {
        assert_eq!(url_encode("hello world"), "hello+world");
        assert_eq!(url_encode("a=b&c=d"), "a%3Db%26c%3Dd");
        assert_eq!(url_encode("test_value-123.txt"), "test_value-123.txt");
        assert_eq!(url_encode("secret!"), "secret%21");
    }

    #[test]
    fn url_encode_edge_cases() {
        assert_eq!(url_encode(""), "");
        assert_eq!(url_encode("a  b"), "a++b");
        assert_eq!(url_encode(" hello"), "+hello");
        assert_eq!(url_encode("hello "), "hello+");
        assert_eq!(url_encode("   "), "+++");
    }

    #[test]
    fn encodes_multibyte_text_per_byte() {
        assert_eq!(url_encode("あ"), "%E3%81%82");
    }

    #[test]
    fn encodes_invalid_utf8_bytes() {
        assert_eq!(url_encode_bytes(&[0xff, b' ', 0x00, b'a']), "%FF+%00a");
    }
}
