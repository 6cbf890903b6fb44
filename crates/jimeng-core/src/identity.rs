//! Identity and utility helpers
//!
//! Identifier generation, timestamps, digests and encodings used to shape
//! requests to the upstream service. Nothing here performs network I/O.

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

/// Lower bound of the device and web identifier band
const IDENTIFIER_FLOOR: u64 = 7_000_000_000_000_000_000;

/// Upper bound (exclusive) of the device and web identifier band
const IDENTIFIER_CEILING: u64 = 8_000_000_000_000_000_000;

/// Identity presented to the upstream service as one browser device.
///
/// Build one per process (or per apparent device) and hand it to the client
/// builder; every request made by that client reuses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Numeric device identifier
    pub device_id: u64,
    /// Numeric web identifier, sent as the `web_id` query parameter
    pub web_id: u64,
    /// Hyphen-less UUID for the apparent user
    pub user_id: String,
}

impl DeviceIdentity {
    /// Create an identity from fixed values (fixtures, replays)
    pub fn new(device_id: u64, web_id: u64, user_id: impl Into<String>) -> Self {
        Self {
            device_id,
            web_id,
            user_id: user_id.into(),
        }
    }

    /// Generate a fresh random identity
    pub fn generate() -> Self {
        Self {
            device_id: generate_device_id(),
            web_id: generate_web_id(),
            user_id: generate_uuid(false),
        }
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::generate()
    }
}

/// Generate a random v4 UUID, optionally without separators
pub fn generate_uuid(with_hyphen: bool) -> String {
    let id = uuid::Uuid::new_v4();
    if with_hyphen {
        id.hyphenated().to_string()
    } else {
        id.simple().to_string()
    }
}

/// Current Unix time in seconds
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Lowercase hex MD5 digest of a string
pub fn md5_hex(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

pub fn generate_device_id() -> u64 {
    rand::thread_rng().gen_range(IDENTIFIER_FLOOR..IDENTIFIER_CEILING)
}

pub fn generate_web_id() -> u64 {
    rand::thread_rng().gen_range(IDENTIFIER_FLOOR..IDENTIFIER_CEILING)
}

/// Percent-encode a string for use in a query value
pub fn url_encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// Serialize JSON without any insignificant whitespace.
///
/// Payload fields that embed JSON as a string must match the browser's
/// compact encoding byte for byte, so object keys keep insertion order.
pub fn json_encode(value: &Value) -> String {
    value.to_string()
}

/// Split an `Authorization` header value into session tokens.
///
/// Accepts `Bearer a,b,c` as well as a bare comma-separated list. Blank
/// entries are dropped.
pub fn split_tokens(authorization: &str) -> Vec<String> {
    let trimmed = authorization.trim();
    let list = trimmed.strip_prefix("Bearer").unwrap_or(trimmed);
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick one session token at random from an `Authorization` header value
pub fn pick_token(authorization: &str) -> Option<String> {
    let tokens = split_tokens(authorization);
    tokens.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uuid_with_and_without_hyphen() {
        let hyphenated = generate_uuid(true);
        assert_eq!(hyphenated.len(), 36);
        assert_eq!(hyphenated.matches('-').count(), 4);

        let simple = generate_uuid(false);
        assert_eq!(simple.len(), 32);
        assert!(!simple.contains('-'));
    }

    #[test]
    fn test_uuids_are_unique() {
        assert_ne!(generate_uuid(true), generate_uuid(true));
    }

    #[test]
    fn test_md5_known_value() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_identifiers_within_band() {
        for _ in 0..64 {
            let device = generate_device_id();
            let web = generate_web_id();
            assert!((IDENTIFIER_FLOOR..IDENTIFIER_CEILING).contains(&device));
            assert!((IDENTIFIER_FLOOR..IDENTIFIER_CEILING).contains(&web));
        }
    }

    #[test]
    fn test_generated_identity_shape() {
        let identity = DeviceIdentity::generate();
        assert_eq!(identity.user_id.len(), 32);
        assert!(identity.device_id >= IDENTIFIER_FLOOR);
    }

    #[test]
    fn test_json_encode_is_compact() {
        let value = json!({"scenario": "image_video_generation", "n": [1, 2]});
        let encoded = json_encode(&value);
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('\n'));
        assert_eq!(encoded, r#"{"scenario":"image_video_generation","n":[1,2]}"#);
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode(r#"{"a":"b c"}"#), "%7B%22a%22%3A%22b%20c%22%7D");
        assert_eq!(url_encode("plain-text_1.0~"), "plain-text_1.0~");
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("Bearer a, b ,,c"), vec!["a", "b", "c"]);
        assert_eq!(split_tokens("single"), vec!["single"]);
        assert!(split_tokens("").is_empty());
        assert!(split_tokens("Bearer ").is_empty());
    }

    #[test]
    fn test_pick_token() {
        let picked = pick_token("Bearer x,y").unwrap();
        assert!(picked == "x" || picked == "y");
        assert!(pick_token("").is_none());
    }
}
