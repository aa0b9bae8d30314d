use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer credential issued by the companion server.
///
/// Lives until revoked or replaced. The crate keeps it in memory only;
/// persisting it across restarts is the host's job.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

#[derive(Error, Debug)]
pub enum Error {
    #[error("token must not be empty")]
    Empty,
}

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::Empty);
        }

        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// The token grants control over the user's player: keep it out of debug
// output and diagnostic logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_non_empty() {
        let token = "abc123".parse::<Token>().unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn rejects_empty() {
        assert!("".parse::<Token>().is_err());
    }

    #[test]
    fn debug_redacts_value() {
        let token = "secret_bearer".parse::<Token>().unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret_bearer"));
        assert!(debug.contains("REDACTED"));
    }
}
