//! History ledger tag convention.
//!
//! Ledger entries are plain strings; prefixes mark entries the decision
//! prompt treats specially. Memory tags mark entries whose payload is fed
//! back to the model as "system memory" on the next step.

/// Entry prefixes and memory tags shared by client and server.
pub mod tags {
    /// Output of an os_* command.
    pub const OS_RESULT: &str = "OS_RESULT:";
    /// Clipboard contents after read_clipboard.
    pub const CLIPBOARD_CONTENT: &str = "CLIPBOARD_CONTENT:";
    /// Result of a server-side web search.
    pub const WEB_SEARCH_RESULT: &str = "WEB_SEARCH_RESULT";
    /// Step failed; loop continues.
    pub const FAILED: &str = "FAILED:";
    /// Loop bookkeeping not tied to an executed command.
    pub const SYSTEM: &str = "SYSTEM:";
    /// Answer collected from the human operator.
    pub const USER_SAID: &str = "USER_SAID:";

    /// Tags whose entries count as system memory.
    pub const MEMORY_TAGS: [&str; 3] = [OS_RESULT, CLIPBOARD_CONTENT, WEB_SEARCH_RESULT];
}

/// Most recent memory-tagged entry, scanning from the tail.
///
/// Returns `"None"` when the history carries no memory entry, so the prompt
/// always has a memory line.
pub fn latest_memory(history: &[String]) -> &str {
    history
        .iter()
        .rev()
        .find(|entry| tags::MEMORY_TAGS.iter().any(|tag| entry.contains(tag)))
        .map(String::as_str)
        .unwrap_or("None")
}
