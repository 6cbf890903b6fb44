//! Transport to the upstream web API
//!
//! - `client`: signed, cookie-authenticated calls
//! - `decode`: `Content-Encoding` handling
//! - `envelope`: `{ret, errmsg, data}` interpretation
//! - `sign`: the `Sign` header digest

pub mod client;
pub mod decode;
pub mod envelope;
pub mod sign;

pub use client::{JimengClient, JimengClientBuilder, UpstreamRequest, session_cookie};
pub use decode::decode_body;
pub use envelope::interpret;
pub use sign::request_sign;
