//! Response body decoding
//!
//! The client advertises compressed encodings and decodes them itself, so
//! the body handed to the JSON parser is always text.

use std::io::{self, Read};

use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::warn;

/// Brotli decoder buffer size
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decode a response body according to its `Content-Encoding`.
///
/// `gzip`, `deflate` and `br` are decompressed; anything else is passed
/// through as UTF-8. When decompression fails the raw bytes are used.
pub fn decode_body(encoding: Option<&str>, body: &[u8]) -> String {
    match decompress(encoding, body) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                encoding = encoding.unwrap_or("identity"),
                error = %e,
                "Failed to decode response body, falling back to raw text"
            );
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

fn decompress(encoding: Option<&str>, body: &[u8]) -> io::Result<String> {
    let normalized = encoding.map(|value| value.trim().to_ascii_lowercase());
    let bytes = match normalized.as_deref() {
        Some("gzip") | Some("x-gzip") => {
            let mut out = Vec::new();
            GzDecoder::new(body).read_to_end(&mut out)?;
            out
        }
        Some("deflate") => {
            let mut out = Vec::new();
            ZlibDecoder::new(body).read_to_end(&mut out)?;
            out
        }
        Some("br") => {
            let mut out = Vec::new();
            brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE).read_to_end(&mut out)?;
            out
        }
        _ => body.to_vec(),
    };
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
