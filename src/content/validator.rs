//! # Post Body Validation
//!
//! Length check and profanity redaction applied before a post is stored.
//! Both are pure; the same input always yields the same output.

use serde::{Deserialize, Serialize};

use crate::store::{StoreError, StoreResult};

/// Maximum body length in Unicode scalar values
pub const MAX_POST_CHARS: usize = 140;

/// Terms replaced in post bodies (lowercase)
pub const REDACTED_TERMS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a redacted token
pub const MASK: &str = "****";

/// Content rules for post bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPolicy {
    /// Maximum body length in Unicode scalar values (default: 140)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Lowercase terms to mask
    #[serde(default = "default_redacted_terms")]
    pub redacted_terms: Vec<String>,
}

fn default_max_chars() -> usize {
    MAX_POST_CHARS
}

fn default_redacted_terms() -> Vec<String> {
    REDACTED_TERMS.iter().map(|t| t.to_string()).collect()
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            redacted_terms: default_redacted_terms(),
        }
    }
}

impl ContentPolicy {
    /// Validate a body against this policy
    pub fn validate(&self, body: &str) -> StoreResult<String> {
        let count = body.chars().count();
        if count > self.max_chars {
            return Err(StoreError::TooLong {
                count,
                max: self.max_chars,
            });
        }

        Ok(self.redact(body))
    }

    /// Mask whole space-separated tokens that match a term, ignoring case.
    ///
    /// Runs of spaces collapse to one space.
    pub fn redact(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        for (i, token) in body.split(' ').enumerate() {
            if i > 0 && !out.ends_with(' ') {
                out.push(' ');
            }
            if token.is_empty() {
                continue;
            }

            let lowered = token.to_lowercase();
            if self.redacted_terms.iter().any(|term| *term == lowered) {
                out.push_str(MASK);
            } else {
                out.push_str(token);
            }
        }
        out
    }
}

/// Validate a body against the default policy
pub fn validate(body: &str) -> StoreResult<String> {
    ContentPolicy::default().validate(body)
}
