//! MCP tool annotations.
//!
//! Hints are derived from what a tool does to the copyparty server rather than from the HTTP
//! method: copyparty routes deletes and moves through `POST`, and search is a read-only `POST`.

use rmcp::model::ToolAnnotations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Reads state only (listings, downloads, search, probes).
    ReadOnly,
    /// Creates new state without touching existing entries (upload, mkdir, copy, new share).
    Additive,
    /// Removes or rewrites existing state (delete, move, share expiry changes).
    Destructive,
}

/// Generate MCP tool annotations for a tool with the given effect.
///
/// `openWorldHint` is always `true`: every tool talks to an external server.
#[must_use]
pub fn annotations_for(effect: Effect) -> ToolAnnotations {
    let open_world_hint = Some(true);

    match effect {
        Effect::ReadOnly => ToolAnnotations {
            title: None,
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint,
        },
        Effect::Additive => ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(false),
            idempotent_hint: Some(false),
            open_world_hint,
        },
        Effect::Destructive => ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            // Repeating a delete is harmless, repeating a move is not; do not guess.
            idempotent_hint: None,
            open_world_hint,
        },
    }
}
