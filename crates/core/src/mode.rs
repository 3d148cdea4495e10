use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the remote service identifies an upload session.
///
/// Chosen once per run and handed to the client, which derives every route
/// and request shape from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AddressingMode {
    /// Public API: sessions are short `upload_uuid` values.
    #[default]
    #[serde(alias = "uuid", alias = "public")]
    SessionId,
    /// Internal API: sessions are server paths (`pulp_href`).
    #[serde(alias = "href", alias = "internal")]
    ResourceLocator,
}

impl AddressingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionId => "session-id",
            Self::ResourceLocator => "resource-locator",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown addressing mode {0:?} (expected session-id or resource-locator)")]
pub struct ParseModeError(String);

impl FromStr for AddressingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session-id" | "uuid" | "public" => Ok(Self::SessionId),
            "resource-locator" | "href" | "internal" => Ok(Self::ResourceLocator),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
