//! Bearer tokens for the imagery service and the output bucket
//!
//! [`BearerToken`] keeps the token in a [`secrecy::Secret`], which zeroizes
//! the memory on drop. Its `Debug` and `Serialize` output is `[REDACTED]`.
//! TOML parse errors quote the offending line, so [`redact_tokens`] scrubs
//! `token = "..."` assignments from them before they reach a log or terminal.
//!
//! # Example
//!
//! ```rust
//! use geoexport::config::BearerToken;
//!
//! let token = BearerToken::new("ya29.a0Af\n");
//! assert_eq!(token.expose(), "ya29.a0Af");
//! assert_eq!(format!("{token:?}"), "BearerToken([REDACTED])");
//! ```

use regex::Regex;
use secrecy::{CloneableSecret, ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use zeroize::Zeroize;

const REDACTED: &str = "[REDACTED]";

#[derive(Clone, Zeroize)]
#[zeroize(drop)]
struct TokenValue(String);

impl CloneableSecret for TokenValue {}

/// OAuth access token sent as `Authorization: Bearer <token>`
#[derive(Clone)]
pub struct BearerToken(Secret<TokenValue>);

impl BearerToken {
    /// Wraps a token, trimming surrounding whitespace such as the trailing
    /// newline printed by `gcloud auth print-access-token`
    pub fn new(value: impl Into<String>) -> Self {
        let mut raw = value.into();
        let token = TokenValue(raw.trim().to_string());
        raw.zeroize();
        Self(Secret::new(token))
    }

    /// True for an empty token, e.g. one substituted from an empty variable
    pub fn is_blank(&self) -> bool {
        self.expose().is_empty()
    }

    /// The raw token, for building the `Authorization` header only
    pub fn expose(&self) -> &str {
        &self.0.expose_secret().0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({REDACTED})")
    }
}

impl Serialize for BearerToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for BearerToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(BearerToken::new)
    }
}

/// Replaces the value of every `token = "..."` assignment in `message`.
///
/// Unterminated strings are redacted up to the end of the line.
pub fn redact_tokens(message: &str) -> String {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

    match PATTERN.get_or_init(|| Regex::new(r#"(token\s*=\s*)"[^"\n]*"?"#).ok()) {
        Some(re) => re
            .replace_all(message, format!("${{1}}\"{REDACTED}\""))
            .into_owned(),
        None => format!("{REDACTED} (message withheld)"),
    }
}
