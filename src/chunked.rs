//! Chunk-size line scanning.
//!
//! Adapted from `swindon-rs-tk-http`'s `chunked.rs`: that module drove
//! a `tk_bufstream::Buf` across multiple reads to track how much of an
//! in-flight chunked body was already buffered. This parser has no I/O
//! buffer of its own — `parser.rs`'s body phase re-invokes
//! [`parse_chunk_size`] once per complete chunk, the same way the
//! original Python source's `_parse_chunk_size` was called once per
//! `_parse_body` iteration — so all that is kept here is the hex
//! chunk-size-line scan, still built on `httparse::parse_chunk_size`
//! exactly as the teacher used it.

use httparse::{self, InvalidChunkSize};

/// Scans a `SIZE[;ext]\r\n` chunk-size line at the start of `data`.
///
/// Returns `Ok(None)` if the line is not fully buffered yet, or
/// `Ok(Some((line_len, chunk_size)))` once it is, where `line_len` is
/// the number of bytes the size line (including its trailing CRLF)
/// occupies.
pub fn parse_chunk_size(data: &[u8]) -> Result<Option<(usize, u64)>, InvalidChunkSize> {
    use httparse::Status::*;
    match httparse::parse_chunk_size(data)? {
        Complete((line_len, size)) => Ok(Some((line_len, size))),
        Partial => Ok(None),
    }
}
