//! Request signature
//!
//! The upstream web client proves request authenticity with an MD5 digest
//! over a fixed template. The digest only depends on the request path tail,
//! the platform and version codes, and the device time sent alongside it.

use crate::identity::md5_hex;

const SIGN_PREFIX: &str = "9e2c";
const SIGN_SUFFIX: &str = "11ac";

/// Number of trailing path characters folded into the signature
const PATH_TAIL_LEN: usize = 7;

/// Compute the `Sign` header for a request
pub fn request_sign(uri: &str, platform_code: &str, version_code: &str, device_time: i64) -> String {
    let tail = path_tail(uri, PATH_TAIL_LEN);
    md5_hex(&format!(
        "{SIGN_PREFIX}|{tail}|{platform_code}|{version_code}|{device_time}||{SIGN_SUFFIX}"
    ))
}

fn path_tail(uri: &str, len: usize) -> &str {
    let count = uri.chars().count();
    if count <= len {
        return uri;
    }
    uri.char_indices()
        .nth(count - len)
        .map(|(idx, _)| &uri[idx..])
        .unwrap_or(uri)
}
