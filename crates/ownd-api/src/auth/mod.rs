//! Gateway authentication schemes.
//!
//! Older gateways challenge with a numeric nonce and expect the
//! [`password::digest`] of a numeric password. Newer ones announce an
//! HMAC exchange (`*98*1##` for SHA-1, `*98*2##` for SHA-256), handled by
//! [`hmac`].

pub mod hmac;
pub mod password;

pub use hmac::HashAlgorithm;
