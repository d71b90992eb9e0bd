//! HTTP version value type.
//!
//! Generalised from `swindon-rs-tk-http`'s `Http10`/`Http11` enum: the
//! parser accepts any `HTTP/\d+\.\d+` first line, not just 1.0/1.1.

use std::fmt;

/// `(major, minor)` HTTP version, e.g. `Version(1, 1)` for HTTP/1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u16, pub u16);

impl Version {
    pub fn major(self) -> u16 { self.0 }
    pub fn minor(self) -> u16 { self.1 }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.0, self.1)
    }
}
