//! Functional categorization.
//!
//! Static name-to-category tables for both families. Shell commands match
//! by exact command word; MCP tools match by server prefix. Unmatched
//! tools land in `Other`. Extending coverage means editing one table here.

use crate::family::ToolFamily;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FileOperations,
    GitOperations,
    PackageManagement,
    SystemOperations,
    ProcessManagement,
    NetworkOperations,
    TextProcessing,
    Development,
    SourceControl,
    CloudServices,
    BrowserAutomation,
    DataStorage,
    Utilities,
    AiServices,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::FileOperations => "file_operations",
            Category::GitOperations => "git_operations",
            Category::PackageManagement => "package_management",
            Category::SystemOperations => "system_operations",
            Category::ProcessManagement => "process_management",
            Category::NetworkOperations => "network_operations",
            Category::TextProcessing => "text_processing",
            Category::Development => "development",
            Category::SourceControl => "source_control",
            Category::CloudServices => "cloud_services",
            Category::BrowserAutomation => "browser_automation",
            Category::DataStorage => "data_storage",
            Category::Utilities => "utilities",
            Category::AiServices => "ai_services",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

const SHELL_CATEGORIES: &[(Category, &[&str])] = &[
    (
        Category::FileOperations,
        &["ls", "find", "cat", "grep", "rg", "fd", "bat", "eza"],
    ),
    (Category::GitOperations, &["git"]),
    (
        Category::PackageManagement,
        &["npm", "pip", "cargo", "brew", "apt"],
    ),
    (
        Category::SystemOperations,
        &["chmod", "mkdir", "rm", "mv", "cp", "pwd"],
    ),
    (Category::ProcessManagement, &["ps", "kill", "top", "htop"]),
    (
        Category::NetworkOperations,
        &["curl", "wget", "ping", "ssh"],
    ),
    (
        Category::TextProcessing,
        &["sed", "awk", "sort", "uniq", "wc"],
    ),
    (
        Category::Development,
        &["node", "python", "java", "make", "docker"],
    ),
];

const MCP_CATEGORIES: &[(&str, Category)] = &[
    ("mcp__github__", Category::SourceControl),
    ("mcp__aws__", Category::CloudServices),
    ("mcp__playwright__", Category::BrowserAutomation),
    ("mcp__memory__", Category::DataStorage),
    ("mcp__time__", Category::Utilities),
    ("mcp__sequential-thinking__", Category::AiServices),
];

/// Map a tool to its functional category.
pub fn categorize(family: ToolFamily, tool_name: &str) -> Category {
    match family {
        ToolFamily::Shell => {
            for (category, commands) in SHELL_CATEGORIES {
                if commands.contains(&tool_name) {
                    return *category;
                }
            }
            Category::Other
        }
        ToolFamily::Mcp => {
            for (prefix, category) in MCP_CATEGORIES {
                if tool_name.starts_with(prefix) {
                    return *category;
                }
            }
            Category::Other
        }
    }
}

// ---------------------------------------------------------------------------
// Security keyword lists
// ---------------------------------------------------------------------------

/// Name keywords that mark privileged or destructive operations.
pub const PRIVILEGED_KEYWORDS: &[&str] = &["chmod", "sudo", "su", "chown", "systemctl"];

/// Name keywords that mark network-touching operations.
pub const NETWORK_KEYWORDS: &[&str] = &["curl", "wget", "ssh", "scp", "rsync"];

/// Name keywords that mark file-access operations.
pub const FILE_ACCESS_KEYWORDS: &[&str] = &["find", "grep", "cat", "ls", "rm", "mv", "cp"];

/// True when any keyword occurs as a substring of the (lowercased) name.
pub fn name_matches_any(tool_name: &str, keywords: &[&str]) -> bool {
    let lower = tool_name.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
