//! # Tool Slugs
//!
//! Registry of the logical tool names callers use and the router-native
//! slugs they resolve to. Whether an unregistered name passes through
//! verbatim or is rejected is a policy decision, not a hardcoded one.

use serde::{Deserialize, Serialize};

use crate::error::{ToolError, ToolResult};

pub const ARXIV_SEARCH: &str = "ARXIV_SEARCH";
pub const PUBCHEM_QUERY: &str = "PUBCHEM_QUERY";
pub const NOTION_DRAFT: &str = "NOTION_DRAFT";
pub const REMOTE_BASH: &str = "REMOTE_BASH";

/// Logical name → router-native slug
const KNOWN_SLUGS: &[(&str, &str)] = &[
    (ARXIV_SEARCH, "arxiv.paper_search"),
    (PUBCHEM_QUERY, "pubchem.compound_query"),
    (NOTION_DRAFT, "notion.page_draft"),
    (REMOTE_BASH, "workbench.remote_bash"),
];

/// How to treat a slug that is not in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugPolicy {
    /// Pass unregistered slugs through verbatim
    #[default]
    Permissive,
    /// Reject unregistered slugs as an application failure
    Strict,
}

/// Resolve a logical name to its router-native slug
pub fn resolve(slug: &str, policy: SlugPolicy) -> ToolResult<String> {
    if let Some((_, native)) = KNOWN_SLUGS.iter().find(|(name, _)| *name == slug) {
        return Ok((*native).to_string());
    }
    match policy {
        SlugPolicy::Permissive => Ok(slug.to_string()),
        SlugPolicy::Strict => Err(ToolError::Application(format!(
            "unregistered tool slug: {slug}"
        ))),
    }
}
