//! Chat template
//!
//! Wraps raw prompt content in the role-delimited turns the target model expects.

/// Marks the start of a turn
pub const TURN_START: &str = "<|im_start|>";
/// Marks the end of a turn
pub const TURN_END: &str = "<|im_end|>";

/// Role of a turn in the chat template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Format a single user prompt and open the assistant turn.
///
/// The result ends right after the assistant header, so the engine continues
/// with the assistant reply and stops at [`TURN_END`].
pub fn format_chat_prompt(prompt: &str) -> String {
    format!(
        "{start}{user}\n{prompt}{end}\n{start}{assistant}\n",
        start = TURN_START,
        end = TURN_END,
        user = Role::User.as_str(),
        assistant = Role::Assistant.as_str(),
        prompt = prompt,
    )
}
