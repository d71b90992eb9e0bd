//! Optional transparent body decompression.
//!
//! A narrow trait, as spec.md §9's design note prescribes
//! (`write(bytes) -> bytes; finish() -> bytes`), so `parser.rs` does
//! not need to know which compression library backs it. `flate2` is
//! the implementation, pulled in from `Aaron1011-http-serve` (already
//! a dependency there for gzip response bodies); this module simply
//! reads the other direction.

/// Incrementally inflates a compressed body.
pub trait Decompressor: std::fmt::Debug {
    /// Feed `bytes`, returning whatever decompressed output they
    /// produced.
    fn write(&mut self, bytes: &[u8]) -> Vec<u8>;
    /// Flush any buffered output. Called when the underlying framing
    /// (Content-Length or the final chunk) says the body is done.
    fn finish(&mut self) -> Vec<u8>;
}

#[cfg(feature = "decompress")]
mod flate {
    use super::Decompressor;
    use std::io::Write;

    #[derive(Debug)]
    pub struct GzipDecompressor {
        inner: flate2::write::GzDecoder<Vec<u8>>,
    }

    impl GzipDecompressor {
        pub fn new() -> GzipDecompressor {
            GzipDecompressor { inner: flate2::write::GzDecoder::new(Vec::new()) }
        }
    }

    impl Decompressor for GzipDecompressor {
        fn write(&mut self, bytes: &[u8]) -> Vec<u8> {
            let _ = self.inner.write_all(bytes);
            std::mem::take(self.inner.get_mut())
        }

        fn finish(&mut self) -> Vec<u8> {
            let _ = self.inner.try_finish();
            std::mem::take(self.inner.get_mut())
        }
    }

    #[derive(Debug)]
    pub struct DeflateDecompressor {
        inner: flate2::write::DeflateDecoder<Vec<u8>>,
    }

    impl DeflateDecompressor {
        pub fn new() -> DeflateDecompressor {
            DeflateDecompressor { inner: flate2::write::DeflateDecoder::new(Vec::new()) }
        }
    }

    impl Decompressor for DeflateDecompressor {
        fn write(&mut self, bytes: &[u8]) -> Vec<u8> {
            let _ = self.inner.write_all(bytes);
            std::mem::take(self.inner.get_mut())
        }

        fn finish(&mut self) -> Vec<u8> {
            let _ = self.inner.try_finish();
            std::mem::take(self.inner.get_mut())
        }
    }
}

#[cfg(feature = "decompress")]
pub use flate::{DeflateDecompressor, GzipDecompressor};

/// Picks a decompressor for a `Content-Encoding` value, or `None` for
/// anything else (including plain `identity`).
#[cfg(feature = "decompress")]
pub fn for_content_encoding(encoding: &str) -> Option<Box<dyn Decompressor>> {
    match encoding {
        "gzip" => Some(Box::new(GzipDecompressor::new())),
        "deflate" => Some(Box::new(DeflateDecompressor::new())),
        _ => None,
    }
}

#[cfg(not(feature = "decompress"))]
pub fn for_content_encoding(_encoding: &str) -> Option<Box<dyn Decompressor>> {
    None
}
