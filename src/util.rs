//! Small shared utilities: latin-1 byte/text coercion for protocol
//! bytes, RFC 2616 token quoting, and a dict-header parser.
//!
//! Grounded on `pulsar/utils/httpurl.py`'s `quote_header_value` /
//! `unquote_header_value` / `parse_dict_header` and the module's
//! general use of a latin-1 default charset for the wire, utf-8 for
//! payload text.

/// Decode protocol bytes as ISO-8859-1: every byte maps 1:1 onto a
/// Unicode scalar value 0..=255, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text back to latin-1 bytes. Characters outside the
/// `0..=255` range (which should not occur in header-field text) are
/// replaced with `?`, matching the historical behavior of lossy
/// protocol-byte encoders.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' }).collect()
}

const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

fn is_token_char(b: u8) -> bool {
    b > 0x20 && b < 0x7F && !SEPARATORS.contains(&b)
}

/// Quote a header value if necessary: returned unchanged when every
/// character is a valid RFC 2616 token character (plus `extra_chars`),
/// otherwise wrapped in double quotes with `\` and `"` escaped.
pub fn quote_header_value(value: &str, extra_chars: &str) -> String {
    let is_token = value.bytes().all(|b| {
        is_token_char(b) || extra_chars.as_bytes().contains(&b)
    });
    if is_token {
        value.to_string()
    } else {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    }
}

/// Reverse of [`quote_header_value`]. Strips a single layer of
/// surrounding quotes and un-escapes `\\` and `\"`; values that are
/// not quoted are returned unchanged.
pub fn unquote_header_value(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        let inner = &value[1..value.len() - 1];
        inner.replace("\\\\", "\\").replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

/// Splits a comma-separated RFC 2068 §2 list honoring quoted strings,
/// e.g. `foo="is a fish", bar="as well"` -> `["foo=\"is a fish\"", ...]`.
fn parse_http_list(value: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '\\' if in_quotes => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' if !in_quotes => {
                if !current.trim().is_empty() {
                    result.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        result.push(current.trim().to_string());
    }
    result
}

/// Parse `key=value, key2, key3="quoted value"` into a map. Keys with
/// no `=` map to `None`.
pub fn parse_dict_header(value: &str) -> std::collections::HashMap<String, Option<String>> {
    let mut result = std::collections::HashMap::new();
    for item in parse_http_list(value) {
        match item.split_once('=') {
            None => {
                result.insert(item, None);
            }
            Some((name, val)) => {
                let val = if val.len() >= 2 && val.starts_with('"') && val.ends_with('"') {
                    unquote_header_value(val)
                } else {
                    val.to_string()
                };
                result.insert(name.to_string(), Some(val));
            }
        }
    }
    result
}
