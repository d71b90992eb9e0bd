//! The Header Container: an ordered multimap of canonical header name
//! to a non-empty list of values, parameterised by a [`HeaderKind`]
//! that constrains which canonical names are accepted.
//!
//! Grounded on `pulsar/utils/httpurl.py`'s `Headers` class for the
//! set/add/get/pop/update/flat/ordering behavior; the byte-level value
//! matcher below (`is_chunked`) is carried near-verbatim from
//! `swindon-rs-tk-http`'s `headers.rs`.

use std::fmt;

pub use crate::registry::HeaderKind;
use crate::registry::{registry, HeaderGroup};
use crate::version::Version;

/// Ordered mapping from canonical header name to its list of values.
#[derive(Debug, Clone)]
pub struct HeaderContainer {
    kind: HeaderKind,
    strict: bool,
    // Insertion order is the order names first appeared.
    order: Vec<String>,
    values: std::collections::HashMap<String, Vec<String>>,
}

impl HeaderContainer {
    pub fn new(kind: HeaderKind) -> HeaderContainer {
        HeaderContainer::with_strict(kind, false)
    }

    pub fn with_strict(kind: HeaderKind, strict: bool) -> HeaderContainer {
        HeaderContainer {
            kind,
            strict,
            order: Vec::new(),
            values: std::collections::HashMap::new(),
        }
    }

    pub fn kind(&self) -> HeaderKind { self.kind }

    pub fn is_strict(&self) -> bool { self.strict }

    fn canonical(&self, name: &str) -> Option<String> {
        registry().canonicalize(name, self.kind, self.strict)
    }

    /// Overwrite any existing values for `name` with the single
    /// `value`. Canonicalisation rejection or an empty value is a
    /// no-op.
    pub fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(canon) = self.canonical(name) {
            if !self.values.contains_key(&canon) {
                self.order.push(canon.clone());
            }
            self.values.insert(canon, vec![value.to_string()]);
        }
    }

    /// Append `value` to `name`'s list if not already present.
    /// Canonicalisation rejection or an empty value is a no-op.
    pub fn add(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(canon) = self.canonical(name) {
            if !self.values.contains_key(&canon) {
                self.order.push(canon.clone());
            }
            let list = self.values.entry(canon).or_insert_with(Vec::new);
            if !list.iter().any(|v| v == value) {
                list.push(value.to_string());
            }
        }
    }

    /// Stored values joined by `", "`, or `None` if absent.
    pub fn get(&self, name: &str) -> Option<String> {
        let canon = self.canonical(name)?;
        self.values.get(&canon).map(|v| v.join(", "))
    }

    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// The raw value list for `name`.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        let canon = self.canonical(name)?;
        self.values.get(&canon).map(|v| v.as_slice())
    }

    /// Remove `name`, returning its value list if present.
    pub fn pop(&mut self, name: &str) -> Option<Vec<String>> {
        let canon = self.canonical(name)?;
        let removed = self.values.remove(&canon);
        if removed.is_some() {
            self.order.retain(|n| n != &canon);
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.canonical(name) {
            Some(canon) => self.values.contains_key(&canon),
            None => false,
        }
    }

    /// One `(canonical_name, value)` pair per stored value, in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().flat_map(move |name| {
            self.values[name].iter().map(move |v| (name.as_str(), v.as_str()))
        })
    }

    /// Total number of values across all names.
    pub fn len(&self) -> usize {
        self.values.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `set(k, v)` for each pair in `iterable`.
    pub fn update<'a, I>(&mut self, iterable: I)
        where I: IntoIterator<Item = (&'a str, &'a str)>
    {
        for (name, value) in iterable {
            self.set(name, value);
        }
    }

    /// Projection joining each name's values with `", "`.
    pub fn as_dict(&self) -> std::collections::HashMap<String, String> {
        self.values.iter()
            .map(|(k, v)| (k.clone(), v.join(", ")))
            .collect()
    }

    fn ordered_lines(&self) -> Vec<String> {
        let reg = registry();
        let groups = [
            HeaderGroup::General, HeaderGroup::Request,
            HeaderGroup::Response, HeaderGroup::Entity,
        ];
        let mut lines = Vec::new();
        for group in groups.iter() {
            for name in &self.order {
                if reg.group_of(name) == Some(*group) {
                    lines.push(format!("{}: {}", name, self.values[name].join(", ")));
                }
            }
        }
        lines
    }

    /// `HTTP/M.N status\r\n` followed by the serialised header block,
    /// encoded as latin-1 (ASCII here is sufficient since header
    /// values are validated token bytes).
    pub fn flat(&self, version: Version, status: &str) -> Vec<u8> {
        let mut out = format!("{} {}\r\n", version, status);
        for line in self.ordered_lines() {
            out.push_str(&line);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.into_bytes()
    }
}

impl fmt::Display for HeaderContainer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in self.ordered_lines() {
            write!(f, "{}\r\n", line)?;
        }
        write!(f, "\r\n")
    }
}

// header value is byte sequence
// we need case insensitive comparison and strip out of the whitespace
pub fn is_chunked(val: &[u8]) -> bool {
    if val.len() < "chunked".len() {
        return false;
    }
    let mut iter = val.iter();
    for (idx, &ch) in iter.by_ref().enumerate() {
        match ch {
            b'\r' | b'\n' | b' ' | b'\t' => continue,
            b'c' | b'C' => {
                if idx + "chunked".len() > val.len() {
                    return false;
                }
                break;
            }
            _ => return false,
        }
    }
    for (idx, ch) in iter.by_ref().take(6).enumerate() {
        if b"hunked"[idx] != ch.to_ascii_lowercase() {
            return false;
        }
    }
    for &ch in iter {
        if !matches!(ch, b'\r' | b'\n' | b' ' | b'\t') {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::{is_chunked, HeaderContainer, HeaderKind};
    use crate::version::Version;

    #[test]
    fn test_chunked() {
        assert!(is_chunked(b"chunked"));
        assert!(is_chunked(b"Chunked"));
        assert!(is_chunked(b"chuNKED"));
        assert!(is_chunked(b"CHUNKED"));
        assert!(is_chunked(b"   CHUNKED"));
        assert!(is_chunked(b"   CHUNKED  "));
        assert!(is_chunked(b"chunked  "));
        assert!(is_chunked(b"   CHUNKED"));
        assert!(!is_chunked(b"   CHUNKED 1 "));
    }

    #[test]
    fn set_overwrites_add_appends_once() {
        let mut h = HeaderContainer::new(HeaderKind::Both);
        h.set("Host", "example.com");
        assert_eq!(h.get("host"), Some("example.com".to_string()));
        h.add("Accept", "text/html");
        h.add("Accept", "text/html");
        assert_eq!(h.get_all("accept").map(|v| v.len()), Some(1));
    }

    #[test]
    fn empty_value_is_noop() {
        let mut h = HeaderContainer::new(HeaderKind::Both);
        h.set("Host", "");
        assert!(h.get("host").is_none());
    }

    #[test]
    fn case_insensitive_get() {
        let mut h = HeaderContainer::new(HeaderKind::Both);
        h.set("Content-Type", "text/plain");
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain".to_string()));
        assert_eq!(h.get("content-type"), Some("text/plain".to_string()));
    }

    #[test]
    fn strict_mode_drops_unknown_names() {
        let mut h = HeaderContainer::with_strict(HeaderKind::Both, true);
        h.set("Frobnicate", "1");
        assert!(h.get("frobnicate").is_none());
        h.set("X-Frobnicate", "1");
        assert_eq!(h.get("x-frobnicate"), Some("1".to_string()));
    }

    #[test]
    fn serialises_in_group_order() {
        let mut h = HeaderContainer::new(HeaderKind::Both);
        h.set("Content-Length", "5");
        h.set("Host", "example.com");
        h.set("Connection", "close");
        let bytes = h.flat(Version(1, 1), "200 OK");
        let text = String::from_utf8(bytes).unwrap();
        let conn_pos = text.find("Connection").unwrap();
        let host_pos = text.find("Host").unwrap();
        let clen_pos = text.find("Content-Length").unwrap();
        assert!(conn_pos < host_pos);
        assert!(host_pos < clen_pos);
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn pop_removes_and_returns_values() {
        let mut h = HeaderContainer::new(HeaderKind::Both);
        h.add("Via", "1.1 proxy");
        let popped = h.pop("via").unwrap();
        assert_eq!(popped, vec!["1.1 proxy".to_string()]);
        assert!(!h.contains("via"));
    }
}
