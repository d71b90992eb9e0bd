//! The resumable HTTP/1.x message parser.
//!
//! A direct generalisation of `pulsar/utils/httpurl.py`'s `HttpParser`
//! class: feed bytes as they arrive over `execute`, and the parser
//! advances through first-line, headers, body and (for chunked
//! bodies) trailers, pausing cleanly whenever it runs out of buffered
//! input. Framing and state-machine shape follow the original source;
//! buffering style and the split of concerns across small functions
//! follow `swindon-rs-tk-http`'s `client/parser.rs` and
//! `body_parser.rs`.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::chunked;
use crate::decompress::{self, Decompressor};
use crate::error::{Errno, Error};
use crate::firstline::{self, RequestLine, StatusLine};
use crate::headers::HeaderContainer;
use crate::registry::HeaderKind;
use crate::util::decode_latin1;
use crate::version::Version;

const HEADER_FORBIDDEN: &[u8] = b"()<>@,;:[]={} \t\\\"";

fn header_name_forbidden(name: &str) -> bool {
    name.bytes().any(|b| b <= 0x1F || b == 0x7F || HEADER_FORBIDDEN.contains(&b))
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

/// Parses a single, complete header block (no surrounding first line)
/// into a fresh container. Used both for the main header block and,
/// after a zero-size chunk, for trailers.
fn parse_header_block(kind: HeaderKind, strict: bool, data: &[u8]) -> Result<HeaderContainer, Error> {
    let mut container = HeaderContainer::with_strict(kind, strict);
    if data.is_empty() {
        return Ok(container);
    }
    let text = decode_latin1(data);
    let mut lines: VecDeque<&str> = text.split("\r\n").collect();
    // `split` on a block with no trailing bare CRLF leaves one empty
    // trailing element; drop it so the continuation-line lookahead
    // below doesn't treat it as a line of its own.
    if lines.back() == Some(&"") {
        lines.pop_back();
    }

    while let Some(curr) = lines.pop_front() {
        let colon = match curr.find(':') {
            Some(idx) => idx,
            None => continue,
        };
        let raw_name = &curr[..colon];
        let name = raw_name.trim_end_matches(|c| c == ' ' || c == '\t').to_ascii_uppercase();
        if header_name_forbidden(&name) {
            return Err(Error::InvalidHeader(name));
        }

        let mut value = curr[colon + 1..].trim_start().to_string();
        while let Some(next) = lines.front() {
            if next.starts_with(' ') || next.starts_with('\t') {
                value.push(' ');
                value.push_str(next.trim_start());
                lines.pop_front();
            } else {
                break;
            }
        }
        let value = value.trim_end().to_string();
        if value.is_empty() {
            continue;
        }

        let merged = match container.get(&name) {
            Some(existing) => format!("{}, {}", existing, value),
            None => value,
        };
        container.set(&name, &merged);
    }
    Ok(container)
}

/// Which kind of first line this parser expects: `0` parses requests,
/// `1` parses responses, `2` sniffs either from the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Request,
    Response,
    Auto,
}

impl Kind {
    pub fn from_code(code: u8) -> Kind {
        match code {
            0 => Kind::Request,
            1 => Kind::Response,
            _ => Kind::Auto,
        }
    }

    fn header_kind(self) -> HeaderKind {
        match self {
            Kind::Request => HeaderKind::Client,
            Kind::Response => HeaderKind::Server,
            Kind::Auto => HeaderKind::Both,
        }
    }
}

enum BodyOutcome {
    NeedMore,
    Error,
    Complete,
    Continue,
}

/// An incremental, single-message HTTP/1.x parser. Build one per
/// message; feed it with [`Parser::execute`] as bytes arrive.
pub struct Parser {
    kind: Kind,
    decompress_enabled: bool,

    buf: Vec<u8>,

    message_begin: bool,
    firstline_complete: bool,
    headers_complete: bool,
    message_complete: bool,

    request: Option<RequestLine>,
    status: Option<StatusLine>,

    headers: HeaderContainer,
    trailers: Option<HeaderContainer>,

    chunked: bool,
    content_length: Option<u64>,
    clen_rest: Option<i64>,
    partial_body: bool,
    body: Vec<u8>,
    decompressor: Option<Box<dyn Decompressor>>,

    errno: Option<Errno>,
    errstr: String,
}

impl Parser {
    /// `kind`: 0 = parse a request, 1 = parse a response, 2 = sniff
    /// either from the first line. `decompress`: transparently inflate
    /// `Content-Encoding: gzip`/`deflate` bodies.
    pub fn new(kind: u8, decompress: bool) -> Parser {
        let kind = Kind::from_code(kind);
        Parser {
            kind,
            decompress_enabled: decompress,
            buf: Vec::new(),
            message_begin: false,
            firstline_complete: false,
            headers_complete: false,
            message_complete: false,
            request: None,
            status: None,
            headers: HeaderContainer::new(kind.header_kind()),
            trailers: None,
            chunked: false,
            content_length: None,
            clen_rest: None,
            partial_body: false,
            body: Vec::new(),
            decompressor: None,
            errno: None,
            errstr: String::new(),
        }
    }

    // -- predicates --------------------------------------------------

    pub fn is_message_begin(&self) -> bool { self.message_begin }
    pub fn is_headers_complete(&self) -> bool { self.headers_complete }
    pub fn is_partial_body(&self) -> bool { self.partial_body }
    pub fn is_message_complete(&self) -> bool { self.message_complete }
    pub fn is_chunked(&self) -> bool { self.chunked }

    // -- accessors -----------------------------------------------------

    pub fn version(&self) -> Option<Version> {
        self.request.as_ref().map(|r| r.version).or_else(|| self.status.as_ref().map(|s| s.version))
    }
    pub fn method(&self) -> Option<&str> { self.request.as_ref().map(|r| r.method.as_str()) }
    pub fn url(&self) -> Option<&str> { self.request.as_ref().map(|r| r.url.as_str()) }
    pub fn path(&self) -> Option<&str> { self.request.as_ref().map(|r| r.path.as_str()) }
    pub fn query_string(&self) -> Option<&str> { self.request.as_ref().map(|r| r.query_string.as_str()) }
    pub fn fragment(&self) -> Option<&str> { self.request.as_ref().map(|r| r.fragment.as_str()) }
    pub fn status_code(&self) -> Option<u16> { self.status.as_ref().map(|s| s.status_code) }
    pub fn reason(&self) -> Option<&str> { self.status.as_ref().map(|s| s.reason.as_str()) }
    pub fn headers(&self) -> &HeaderContainer { &self.headers }
    pub fn trailers(&self) -> Option<&HeaderContainer> { self.trailers.as_ref() }
    pub fn errno(&self) -> Option<Errno> { self.errno }
    pub fn errstr(&self) -> &str { &self.errstr }

    /// Drains and returns whatever body bytes have accumulated since
    /// the last call. Call this after each [`Parser::execute`] that
    /// advanced the body phase, the same way the original source
    /// expects callers to drain `self._body` incrementally.
    pub fn recv_body(&mut self) -> Vec<u8> {
        self.partial_body = false;
        std::mem::take(&mut self.body)
    }

    // -- driving the state machine ------------------------------------

    /// Feed `data`. Returns the number of bytes logically consumed
    /// (usually `data.len()`, since partial lines/headers/chunks are
    /// buffered rather than rejected), or `-1` if `data` contained an
    /// invalid chunk size or terminator -- check [`Parser::errno`] in
    /// that case.
    pub fn execute(&mut self, data: &[u8]) -> i64 {
        if data.is_empty() {
            return self.close();
        }
        self.run(data.to_vec())
    }

    /// Signal end-of-stream: the peer closed the connection. Forces
    /// message completion once headers have been seen, regardless of
    /// framing -- a body cut short by an early close is still "done"
    /// as far as this parser is concerned.
    pub fn close(&mut self) -> i64 {
        self.message_begin = true;
        if self.headers_complete && !self.message_complete {
            if let Some(ref mut d) = self.decompressor {
                let tail = d.finish();
                if !tail.is_empty() {
                    self.body.extend_from_slice(&tail);
                }
            }
            self.message_complete = true;
            debug!("message completed by end-of-stream signal");
        }
        0
    }

    fn run(&mut self, mut data: Vec<u8>) -> i64 {
        let length = data.len() as i64;
        let mut nb_parsed: i64 = 0;

        loop {
            if !self.firstline_complete {
                if !data.is_empty() {
                    self.buf.extend_from_slice(&data);
                    data.clear();
                }
                match find_crlf(&self.buf) {
                    None => return length,
                    Some(idx) => {
                        let line_bytes = self.buf[..idx].to_vec();
                        let rest = self.buf[idx + 2..].to_vec();
                        let consumed = self.buf.len() - rest.len();
                        self.buf = rest;

                        let line = decode_latin1(&line_bytes);
                        if !self.parse_firstline(&line) {
                            self.errno = Some(Errno::BadFirstLine);
                            self.errstr = format!("bad first line: {:?}", line);
                            warn!("bad first line: {:?}", line);
                            return nb_parsed;
                        }
                        self.firstline_complete = true;
                        self.message_begin = true;
                        nb_parsed += consumed as i64;
                        trace!("first line parsed");
                    }
                }
            } else if !self.headers_complete {
                if !data.is_empty() {
                    self.buf.extend_from_slice(&data);
                    data.clear();
                }
                // A header block with no headers at all is just the
                // blank line itself: the request/status line's own
                // CRLF was already consumed above, so here that blank
                // line is a single leading `\r\n`, not `\r\n\r\n`.
                let header_end = find_subslice(&self.buf, b"\r\n\r\n").map(|idx| (idx, 4))
                    .or_else(|| {
                        if self.buf.starts_with(b"\r\n") { Some((0, 2)) } else { None }
                    });
                match header_end {
                    None => return length,
                    Some((idx, term_len)) => {
                        let block = self.buf[..idx].to_vec();
                        let rest = self.buf[idx + term_len..].to_vec();
                        let consumed = self.buf.len() - rest.len();
                        self.buf = rest;

                        match parse_header_block(self.kind.header_kind(), false, &block) {
                            Ok(headers) => {
                                self.headers = headers;
                                self.apply_framing();
                                self.headers_complete = true;
                                nb_parsed += consumed as i64;
                                debug!("headers complete, chunked={} content_length={:?}",
                                       self.chunked, self.content_length);
                                if self.forced_empty_body() {
                                    self.message_complete = true;
                                }
                            }
                            Err(e) => {
                                self.errno = Some(e.errno());
                                self.errstr = e.to_string();
                                warn!("invalid header: {}", self.errstr);
                                return nb_parsed;
                            }
                        }
                    }
                }
            } else if !self.message_complete {
                if !data.is_empty() {
                    self.buf.extend_from_slice(&data);
                    data.clear();
                }
                match self.parse_body() {
                    BodyOutcome::NeedMore => return length,
                    BodyOutcome::Error => return -1,
                    BodyOutcome::Complete => {
                        self.message_complete = true;
                        trace!("message complete");
                        return length;
                    }
                    BodyOutcome::Continue => continue,
                }
            } else {
                return 0;
            }
        }
    }

    fn parse_firstline(&mut self, line: &str) -> bool {
        match self.kind {
            Kind::Request => {
                match firstline::parse_request_line(line) {
                    Some(rl) => { self.request = Some(rl); true }
                    None => false,
                }
            }
            Kind::Response => {
                match firstline::parse_status_line(line) {
                    Some(sl) => { self.status = Some(sl); true }
                    None => false,
                }
            }
            Kind::Auto => {
                if let Some(rl) = firstline::parse_request_line(line) {
                    self.request = Some(rl);
                    true
                } else if let Some(sl) = firstline::parse_status_line(line) {
                    self.status = Some(sl);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// A message has no body regardless of framing headers: 1xx, 204,
    /// 304 responses and `HEAD` responses to a request.
    fn forced_empty_body(&self) -> bool {
        match self.status.as_ref().map(|s| s.status_code) {
            Some(code) if code / 100 == 1 || code == 204 || code == 304 => return true,
            _ => {}
        }
        if let Some(m) = self.method() {
            if m.eq_ignore_ascii_case("HEAD") {
                return true;
            }
        }
        false
    }

    /// Inspects `Transfer-Encoding`/`Content-Length`/`Content-Encoding`
    /// after the header block completes and sets up body framing.
    fn apply_framing(&mut self) {
        if let Some(te) = self.headers.get("Transfer-Encoding") {
            if crate::headers::is_chunked(te.as_bytes()) {
                self.chunked = true;
            }
        }
        if !self.chunked {
            if let Some(cl) = self.headers.get("Content-Length") {
                if let Ok(n) = cl.trim().parse::<u64>() {
                    self.content_length = Some(n);
                    self.clen_rest = Some(n as i64);
                }
            }
        }
        if self.decompress_enabled {
            if let Some(encoding) = self.headers.get("Content-Encoding") {
                self.decompressor = decompress::for_content_encoding(encoding.trim());
            }
        }
    }

    fn parse_body(&mut self) -> BodyOutcome {
        if !self.chunked {
            let data = std::mem::take(&mut self.buf);
            if let Some(rest) = self.clen_rest.as_mut() {
                *rest -= data.len() as i64;
            }
            let data = match self.decompressor.as_mut() {
                Some(d) => d.write(&data),
                None => data,
            };
            self.partial_body = true;
            if !data.is_empty() {
                self.body.extend_from_slice(&data);
            }
            // Without a declared length, the body is whatever was
            // already buffered alongside the header terminator -- the
            // message completes right here rather than waiting for an
            // explicit end-of-stream signal. Matches the source: an
            // identity body with no `Content-Length` is never actually
            // read incrementally.
            let done = self.clen_rest.map_or(true, |r| r <= 0);
            if done {
                if let Some(d) = self.decompressor.as_mut() {
                    let tail = d.finish();
                    if !tail.is_empty() {
                        self.body.extend_from_slice(&tail);
                    }
                }
                return BodyOutcome::Complete;
            }
            return BodyOutcome::NeedMore;
        }

        self.parse_chunk()
    }

    fn parse_chunk(&mut self) -> BodyOutcome {
        let (line_len, size) = match chunked::parse_chunk_size(&self.buf) {
            Ok(Some(v)) => v,
            Ok(None) => return BodyOutcome::NeedMore,
            Err(e) => {
                self.errno = Some(Errno::InvalidChunk);
                self.errstr = format!("invalid chunk size: {}", e);
                warn!("{}", self.errstr);
                return BodyOutcome::Error;
            }
        };

        if size == 0 {
            let rest = self.buf[line_len..].to_vec();
            self.buf.clear();
            self.parse_trailers(&rest);
            return BodyOutcome::Complete;
        }

        let size = size as usize;
        if self.buf.len() < line_len + size + 2 {
            return BodyOutcome::NeedMore;
        }

        let body_part = self.buf[line_len..line_len + size].to_vec();
        let terminator = &self.buf[line_len + size..line_len + size + 2];
        if terminator != b"\r\n" {
            self.errno = Some(Errno::InvalidChunk);
            self.errstr = "chunk missing trailing CRLF".to_string();
            warn!("{}", self.errstr);
            return BodyOutcome::Error;
        }

        self.buf = self.buf[line_len + size + 2..].to_vec();

        let body_part = match self.decompressor.as_mut() {
            Some(d) => d.write(&body_part),
            None => body_part,
        };
        self.partial_body = true;
        if !body_part.is_empty() {
            self.body.extend_from_slice(&body_part);
        }
        trace!("chunk of {} bytes consumed", size);
        BodyOutcome::Continue
    }

    /// After the zero-size terminal chunk: if what remains begins with
    /// `\r\n`, treat it as a trailer header block (terminated by a
    /// second `\r\n`). An incomplete or absent trailer block just
    /// leaves `trailers()` unset -- the message is still complete.
    fn parse_trailers(&mut self, data: &[u8]) {
        if data.len() < 2 || &data[..2] != b"\r\n" {
            return;
        }
        let end = find_subslice(data, b"\r\n\r\n").unwrap_or(data.len() - 1);
        match parse_header_block(self.headers.kind(), false, &data[..end]) {
            Ok(trailers) => self.trailers = Some(trailers),
            Err(e) => {
                warn!("invalid trailer: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("kind", &self.kind)
            .field("firstline_complete", &self.firstline_complete)
            .field("headers_complete", &self.headers_complete)
            .field("message_complete", &self.message_complete)
            .field("chunked", &self.chunked)
            .field("content_length", &self.content_length)
            .field("errno", &self.errno)
            .finish()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_minimal_get_request() {
        let mut p = Parser::new(0, true);
        let n = p.execute(b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(n, 42);
        assert!(p.is_headers_complete());
        // No Content-Length and not chunked: the identity body never
        // waits for more data, it completes with whatever (nothing)
        // was buffered alongside the headers.
        assert!(p.is_message_complete());
        assert_eq!(p.method(), Some("GET"));
        assert_eq!(p.path(), Some("/hello"));
        assert_eq!(p.headers().get("Host"), Some("example.com".to_string()));
        assert_eq!(p.recv_body(), Vec::<u8>::new());
    }

    #[test]
    fn response_204_has_forced_empty_body() {
        let mut p = Parser::new(1, true);
        p.execute(b"HTTP/1.1 204 No Content\r\nServer: x\r\n\r\n");
        assert!(p.is_message_complete());
        assert_eq!(p.status_code(), Some(204));
    }

    #[test]
    fn identity_body_can_split_across_feeds() {
        let mut p = Parser::new(0, true);
        p.execute(b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\n");
        assert!(p.is_headers_complete());
        assert!(!p.is_message_complete());
        p.execute(b"hello");
        assert_eq!(p.recv_body(), b"hello");
        assert!(!p.is_message_complete());
        p.execute(b"world");
        assert_eq!(p.recv_body(), b"world");
        assert!(p.is_message_complete());
    }

    #[test]
    fn chunked_body_completes_on_zero_chunk() {
        let mut p = Parser::new(0, true);
        p.execute(b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");
        assert!(p.is_chunked());
        p.execute(b"5\r\nhello\r\n0\r\n\r\n");
        assert!(p.is_message_complete());
        assert_eq!(p.recv_body(), b"hello");
    }

    #[test]
    fn named_trailers_are_not_captured_matching_source_quirk() {
        // The block after the zero-size chunk only becomes `trailers`
        // when it begins with a blank line; named trailer lines (the
        // usual case) don't, so they're silently dropped. This mirrors
        // `pulsar.utils.httpurl.HttpParser._parse_trailers`'s exact
        // (slightly too literal) guard rather than "fixing" it.
        let mut p = Parser::new(0, true);
        p.execute(b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");
        p.execute(b"5\r\nhello\r\n0\r\nX-Trailer: yes\r\n\r\n");
        assert!(p.is_message_complete());
        assert!(p.trailers().is_none());
    }

    #[test]
    fn invalid_chunk_size_sets_errno() {
        let mut p = Parser::new(0, true);
        p.execute(b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");
        let n = p.execute(b"ZZZ\r\n");
        assert_eq!(n, -1);
        assert_eq!(p.errno(), Some(Errno::InvalidChunk));
    }

    #[test]
    fn header_value_continuation_is_folded_with_a_single_space() {
        let mut p = Parser::new(0, true);
        p.execute(b"GET / HTTP/1.1\r\nX-Long: part1\r\n part2\r\n\r\n");
        assert_eq!(p.headers().get("X-Long"), Some("part1 part2".to_string()));
    }

    #[test]
    fn resumability_any_split_yields_the_same_result() {
        let whole: &[u8] = b"GET /a?x=1 HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\nabc";
        for split in 1..whole.len() {
            let mut p = Parser::new(0, true);
            p.execute(&whole[..split]);
            p.execute(&whole[split..]);
            assert!(p.is_message_complete(), "split at {} failed", split);
            assert_eq!(p.recv_body(), b"abc");
        }
    }

    #[test]
    fn bad_first_line_sets_errno() {
        let mut p = Parser::new(0, true);
        p.execute(b"not a request line\r\n");
        assert_eq!(p.errno(), Some(Errno::BadFirstLine));
    }

    #[test]
    fn auto_kind_sniffs_response() {
        let mut p = Parser::new(2, true);
        p.execute(b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(p.status_code(), Some(200));
    }
}
