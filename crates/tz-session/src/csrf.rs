//! Salted CSRF tokens: `<salt>-<base64url(sha256("<salt>-<secret>"))>`.
//!
//! Any number of tokens may be issued for one session; each verifies
//! against the session secret alone.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Request headers checked for a token, in order.
pub const CSRF_HEADER_NAMES: &[&str] = &["x-csrf-token", "csrf-token", "x-xsrf-token", "xsrf-token"];

const SALT_LEN: usize = 8;

pub fn issue_token(secret: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    token_with_salt(&salt[..SALT_LEN], secret)
}

pub fn verify_token(secret: &str, token: &str) -> Result<()> {
    let (salt, _) = token.split_once('-').ok_or(SessionError::MalformedToken)?;
    if salt.is_empty() {
        return Err(SessionError::MalformedToken);
    }
    let expected = token_with_salt(salt, secret);
    if constant_time_eq(expected.as_bytes(), token.as_bytes()) {
        Ok(())
    } else {
        Err(SessionError::TokenMismatch)
    }
}

/// First non-empty token among [`CSRF_HEADER_NAMES`].
pub fn token_from_headers<'a>(header: impl Fn(&str) -> Option<&'a str>) -> Option<&'a str> {
    CSRF_HEADER_NAMES
        .iter()
        .filter_map(|name| header(*name))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn token_with_salt(salt: &str, secret: &str) -> String {
    let digest = Sha256::digest(format!("{salt}-{secret}").as_bytes());
    format!("{salt}-{}", URL_SAFE_NO_PAD.encode(digest))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
