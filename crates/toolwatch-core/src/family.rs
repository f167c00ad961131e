use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix that places a tool in the remotely-brokered MCP family.
pub const MCP_PREFIX: &str = "mcp__";

// ---------------------------------------------------------------------------
// ToolFamily
// ---------------------------------------------------------------------------

/// Grouping of tools by invocation mechanism. Each family owns its own
/// execution log and statistics document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFamily {
    /// Remotely-brokered tools, named `mcp__<server>__<operation>`.
    Mcp,
    /// Locally-spawned shell commands, named by their command word.
    Shell,
}

impl ToolFamily {
    pub fn all() -> &'static [ToolFamily] {
        &[ToolFamily::Mcp, ToolFamily::Shell]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolFamily::Mcp => "mcp",
            ToolFamily::Shell => "shell",
        }
    }

    /// Classify a tool name into its family by naming convention.
    ///
    /// Returns `None` for names outside the tracked namespaces (empty,
    /// whitespace, uppercase, shell metacharacters). Callers treat `None`
    /// as a no-op, not an error.
    pub fn classify(tool_name: &str) -> Option<ToolFamily> {
        if !paths::is_valid_tool_name(tool_name) {
            return None;
        }
        if tool_name.starts_with(MCP_PREFIX) {
            Some(ToolFamily::Mcp)
        } else {
            Some(ToolFamily::Shell)
        }
    }
}

impl fmt::Display for ToolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolFamily {
    type Err = crate::error::TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcp" => Ok(ToolFamily::Mcp),
            "shell" => Ok(ToolFamily::Shell),
            _ => Err(crate::error::TrackError::InvalidToolName(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
