//! Credential handling: the API key type and its on-disk persistence.
//!
//! The key is an opaque secret. It is never logged; `Debug` only reveals
//! its length so that log lines stay useful without leaking it.

mod store;

pub use store::{cache_dir, CredentialStore, PermissionMarker, StoreError};

use std::fmt;

/// An API key for the remote vision-model service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input. Surrounding whitespace is
    /// dropped; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw secret, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_input() {
        let c = Credential::parse("  abc123\n").unwrap();
        assert_eq!(c.expose(), "abc123");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("   \t").is_none());
    }

    #[test]
    fn debug_does_not_reveal_secret() {
        let c = Credential::parse("super-secret-key").unwrap();
        let shown = format!("{:?}", c);
        assert!(!shown.contains("super-secret-key"));
        assert!(shown.contains("16 chars"));
    }
}
