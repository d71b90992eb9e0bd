//! Parser failure kinds.
//!
//! The parser never unwinds past `Parser::execute`: errors are stored
//! on the parser (`errno`/`errstr`) and signalled through the return
//! value, matching the original source's `self.errno = ...` contract.
//! `Error` exists alongside `Errno` so library users who do propagate
//! results with `?` have something that implements `std::error::Error`.

use std::fmt;

use quick_error::quick_error;

/// Numeric error code, fixed by the wire contract: callers may persist
/// or compare this value across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Neither a valid request line nor a valid status line.
    BadFirstLine = 0,
    /// A header name contained a forbidden character.
    InvalidHeader = 1,
    /// A chunk size was not hexadecimal, or a chunk was missing its
    /// trailing CRLF.
    InvalidChunk = 2,
}

impl Errno {
    pub fn code(self) -> u8 {
        self as u8
    }
}

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        BadFirstLine(line: String) {
            description("first line is neither a valid request line \
                         nor a valid status line")
            display("bad first line: {:?}", line)
        }
        InvalidHeader(name: String) {
            description("invalid header name")
            display("invalid header name: {:?}", name)
        }
        InvalidChunk(reason: String) {
            description("invalid chunk")
            display("invalid chunk: {}", reason)
        }
    }
}

impl Error {
    pub fn errno(&self) -> Errno {
        match *self {
            Error::BadFirstLine(..) => Errno::BadFirstLine,
            Error::InvalidHeader(..) => Errno::InvalidHeader,
            Error::InvalidChunk(..) => Errno::InvalidChunk,
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Errno::BadFirstLine => write!(f, "BAD_FIRST_LINE"),
            Errno::InvalidHeader => write!(f, "INVALID_HEADER"),
            Errno::InvalidChunk => write!(f, "INVALID_CHUNK"),
        }
    }
}
