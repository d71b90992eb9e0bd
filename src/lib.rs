//! A resumable HTTP/1.1 message parser and its header-value model.
//!
//! Feed bytes to a [`Parser`] as they arrive from a transport; it
//! reports request-line or status-line fields, a completed
//! [`HeaderContainer`], body fragments (optionally decompressed) and
//! trailers, pausing cleanly whenever it needs more input. The parser
//! does no I/O itself and never blocks.

mod chunked;
mod decompress;
mod error;
mod firstline;
mod headers;
mod parser;
mod registry;
mod util;
mod version;

pub use decompress::Decompressor;
pub use error::{Errno, Error};
pub use firstline::{parse_request_line, parse_status_line, RequestLine, StatusLine};
pub use headers::HeaderContainer;
pub use parser::{Kind, Parser};
pub use registry::{registry, HeaderGroup, HeaderKind, HeaderRegistry};
pub use util::{decode_latin1, encode_latin1, parse_dict_header, quote_header_value, unquote_header_value};
pub use version::Version;
