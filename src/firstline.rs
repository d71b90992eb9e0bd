//! Request-line and status-line parsing.
//!
//! A direct port of `pulsar/utils/httpurl.py`'s `_parse_request_line`
//! and `_parse_response_line`. Both use Python's `re.match`, which
//! anchors only at the start of the string — trailing garbage after a
//! valid version/status match is silently ignored rather than
//! rejected. We keep that permissiveness rather than "fixing" it, per
//! spec.md's Non-goals ("deliberately permissive on some malformed
//! inputs, matching the source").

use crate::version::Version;

/// The parsed request line: method, raw target, its split-out parts,
/// and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub url: String,
    pub path: String,
    pub query_string: String,
    pub fragment: String,
    pub version: Version,
}

/// The parsed status line. `reason` is only the first word of the
/// reason phrase — see spec.md §9's open question; this is
/// intentional, not a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: Version,
    pub status_code: u16,
    pub reason: String,
}

/// Mimics Python's `line.split(None, n - 1)`: splits on runs of
/// whitespace, collapsing them, but stops after producing `n` tokens —
/// the last token keeps whatever (including embedded whitespace) is
/// left over. Returns fewer than `n` tokens if the string runs out.
fn split_ws_n(s: &str, n: usize) -> Vec<&str> {
    let mut parts = Vec::with_capacity(n);
    let mut remaining = s;
    while parts.len() + 1 < n {
        let trimmed = remaining.trim_start();
        if trimmed.is_empty() {
            return parts;
        }
        match trimmed.find(char::is_whitespace) {
            Some(idx) => {
                parts.push(&trimmed[..idx]);
                remaining = &trimmed[idx..];
            }
            None => {
                parts.push(trimmed);
                return parts;
            }
        }
    }
    let trimmed = remaining.trim_start();
    if !trimmed.is_empty() {
        parts.push(trimmed);
    }
    parts
}

/// `HTTP/(\d+).(\d+)` matched as a *prefix* — trailing characters
/// after the minor version digits are ignored, matching `re.match`.
fn parse_version(token: &str) -> Option<Version> {
    let rest = token.strip_prefix("HTTP/")?;
    let major_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if major_end == 0 || rest.as_bytes().get(major_end) != Some(&b'.') {
        return None;
    }
    let after_dot = &rest[major_end + 1..];
    let minor_end = after_dot.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_dot.len());
    if minor_end == 0 {
        return None;
    }
    let major: u16 = rest[..major_end].parse().ok()?;
    let minor: u16 = after_dot[..minor_end].parse().ok()?;
    Some(Version(major, minor))
}

/// `[A-Z0-9$-_.]{3,20}` matched as a prefix run, same quirk as the
/// source: `$-_` inside the original Python character class forms a
/// range from `$` (0x24) to `_` (0x5F), which already swallows
/// `A-Z`, `0-9` and `.`. We keep that exact byte range rather than
/// narrowing it to what was probably intended.
fn is_valid_method(token: &str) -> bool {
    let run = token.bytes().take_while(|&b| (0x24..=0x5F).contains(&b)).count();
    (3..=20).contains(&run)
}

/// Parse `"METHOD target HTTP/M.N"`. Exactly 3 whitespace-separated
/// tokens are required.
pub fn parse_request_line(line: &str) -> Option<RequestLine> {
    let bits = split_ws_n(line, 3);
    if bits.len() != 3 {
        return None;
    }
    let (method, url, version_token) = (bits[0], bits[1], bits[2]);

    if !is_valid_method(method) {
        return None;
    }
    let version = parse_version(version_token)?;

    let (path, query_string, fragment) = split_target(url);

    Some(RequestLine {
        method: method.to_ascii_uppercase(),
        url: url.to_string(),
        path,
        query_string,
        fragment,
        version,
    })
}

/// Split a raw request target into path / query / fragment using the
/// `url` crate against a throwaway base, the way `urlsplit` did for
/// the original source's `_parse_request_line`.
fn split_target(target: &str) -> (String, String, String) {
    let base = url::Url::parse("http://localhost").expect("static base url");
    match base.join(target) {
        Ok(u) => (
            u.path().to_string(),
            u.query().unwrap_or("").to_string(),
            u.fragment().unwrap_or("").to_string(),
        ),
        Err(_) => (target.to_string(), String::new(), String::new()),
    }
}

/// Parse `"HTTP/M.N CODE reason..."`. Splits into 2 whitespace
/// tokens: the version, and the remainder holding code + reason.
pub fn parse_status_line(line: &str) -> Option<StatusLine> {
    let bits = split_ws_n(line, 2);
    if bits.len() != 2 {
        return None;
    }
    let version = parse_version(bits[0])?;

    // `(\d{3})\s*(\w*)` matched as a prefix of bits[1]: exactly the
    // first 3 digits are the code, regardless of what follows them —
    // `re.match` doesn't require the digit run to end there, so
    // `2000 OK` parses as code=200, reason=`0`, same as the source.
    let remainder = bits[1];
    if remainder.len() < 3 || !remainder.as_bytes()[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let status_code: u16 = remainder[..3].parse().ok()?;
    let reason_part = remainder[3..].trim_start();
    let reason = reason_part
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("")
        .to_string();

    Some(StatusLine { version, status_code, reason })
}
