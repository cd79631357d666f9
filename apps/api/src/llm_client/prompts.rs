// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompts.rs next to it and builds on these.

/// System prompt fragment that keeps answers free of chatter.
pub const PLAIN_TEXT_ONLY: &str = "\
    Respond with the requested text only. \
    Do NOT add a preface, a title, quotation marks or commentary. \
    Do NOT use markdown.";
