//! The canonical HTTP header name catalogue.
//!
//! Partitions the well-known header names into the four RFC 2616 §4.2
//! groups (general, request, response, entity) and knows how to
//! canonicalise an arbitrary input name into its registry form.

use std::collections::HashSet;

/// Which registry group a canonical header name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderGroup {
    General,
    Request,
    Response,
    Entity,
}

const GENERAL: &[&str] = &[
    "Cache-Control", "Connection", "Date", "Pragma", "Trailer",
    "Transfer-Encoding", "Upgrade", "Sec-WebSocket-Extensions",
    "Sec-WebSocket-Protocol", "Via", "Warning",
];

const REQUEST: &[&str] = &[
    "Accept", "Accept-Charset", "Accept-Encoding", "Accept-Language",
    "Authorization", "Cookie", "Expect", "From", "Host", "If-Match",
    "If-Modified-Since", "If-None-Match", "If-Range",
    "If-Unmodified-Since", "Max-Forwards", "Proxy-Authorization",
    "Range", "Referer", "Sec-WebSocket-Key", "Sec-WebSocket-Version",
    "TE", "User-Agent", "X-Requested-With",
];

const RESPONSE: &[&str] = &[
    "Accept-Ranges", "Age", "ETag", "Location", "Proxy-Authenticate",
    "Retry-After", "Sec-WebSocket-Accept", "Server", "Set-Cookie",
    "Set-Cookie2", "Vary", "WWW-Authenticate", "X-Frame-Options",
];

const ENTITY: &[&str] = &[
    "Allow", "Content-Encoding", "Content-Language", "Content-Length",
    "Content-Location", "Content-MD5", "Content-Range", "Content-Type",
    "Expires", "Last-Modified",
];

/// Which direction of traffic a `HeaderContainer` is for. Determines
/// which canonical names the container accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Client = 0,
    Server = 1,
    Both = 2,
}

impl HeaderKind {
    pub fn from_code(code: u8) -> HeaderKind {
        match code {
            0 => HeaderKind::Client,
            1 => HeaderKind::Server,
            _ => HeaderKind::Both,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Immutable, process-wide table of canonical header names.
///
/// Lookup is case-insensitive; the registry never changes after
/// construction, so a single static instance (`REGISTRY`) may be
/// shared freely across threads.
pub struct HeaderRegistry {
    general: HashSet<&'static str>,
    request: HashSet<&'static str>,
    response: HashSet<&'static str>,
    entity: HashSet<&'static str>,
    by_lower: std::collections::HashMap<String, &'static str>,
}

impl HeaderRegistry {
    fn new() -> HeaderRegistry {
        let general: HashSet<_> = GENERAL.iter().cloned().collect();
        let request: HashSet<_> = REQUEST.iter().cloned().collect();
        let response: HashSet<_> = RESPONSE.iter().cloned().collect();
        let entity: HashSet<_> = ENTITY.iter().cloned().collect();
        let mut by_lower = std::collections::HashMap::new();
        for &name in general.iter().chain(&request).chain(&response).chain(&entity) {
            by_lower.insert(name.to_ascii_lowercase(), name);
        }
        HeaderRegistry { general, request, response, entity, by_lower }
    }

    /// Does `kind` accept `canonical`?
    pub fn accepts(&self, kind: HeaderKind, canonical: &str) -> bool {
        match kind {
            HeaderKind::Client => {
                self.general.contains(canonical)
                    || self.request.contains(canonical)
                    || self.entity.contains(canonical)
            }
            HeaderKind::Server => {
                self.general.contains(canonical)
                    || self.response.contains(canonical)
                    || self.entity.contains(canonical)
            }
            HeaderKind::Both => {
                self.general.contains(canonical)
                    || self.request.contains(canonical)
                    || self.response.contains(canonical)
                    || self.entity.contains(canonical)
            }
        }
    }

    /// The group a canonical name belongs to, if any.
    pub fn group_of(&self, canonical: &str) -> Option<HeaderGroup> {
        if self.general.contains(canonical) {
            Some(HeaderGroup::General)
        } else if self.request.contains(canonical) {
            Some(HeaderGroup::Request)
        } else if self.response.contains(canonical) {
            Some(HeaderGroup::Response)
        } else if self.entity.contains(canonical) {
            Some(HeaderGroup::Entity)
        } else {
            None
        }
    }

    /// Canonicalise an arbitrary input name.
    ///
    /// 1. Lowercase.
    /// 2. `x-`-prefixed names get `Capfirst-Dash` treatment unconditionally.
    /// 3. Otherwise look up the registry; if found, return the canonical form
    ///    (optionally filtered by `kind`).
    /// 4. Otherwise, in strict mode return `None`; else `Capfirst-Dash`.
    pub fn canonicalize(&self, name: &str, kind: HeaderKind, strict: bool)
        -> Option<String>
    {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("x-") {
            return Some(capheader(&lower));
        }
        if let Some(&canonical) = self.by_lower.get(&lower) {
            if self.accepts(kind, canonical) {
                return Some(canonical.to_string());
            }
            return None;
        }
        if strict {
            None
        } else {
            Some(capheader(&lower))
        }
    }
}

/// `Capfirst-Dash`: split on `-`, upcase the first byte of each
/// non-empty segment and lowercase the rest, rejoin with `-`.
pub fn capheader(name: &str) -> String {
    name.split('-')
        .filter(|seg| !seg.is_empty())
        .map(capfirst)
        .collect::<Vec<_>>()
        .join("-")
}

fn capfirst(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => {
            let mut out = first.to_uppercase().collect::<String>();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

use std::sync::OnceLock;

static REGISTRY_CELL: OnceLock<HeaderRegistry> = OnceLock::new();

/// The shared, immutable header registry.
pub fn registry() -> &'static HeaderRegistry {
    REGISTRY_CELL.get_or_init(HeaderRegistry::new)
}
