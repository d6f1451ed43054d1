//! History of one conversation.
//!
//! Turns 0 and 1 are reserved: they are overwritten on every call with the
//! freshly rendered system prompt and a fixed acknowledgement, so device state
//! is never stale. Turns 2+ are the real exchange and persist verbatim.

use homevertex_core::Content;

/// Number of reserved turns at the front of every history.
pub const RESERVED_TURNS: usize = 2;

/// Model acknowledgement placed in the second reserved slot.
pub const ACKNOWLEDGEMENT: &str = "Ok";

#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Conversation identifier
    pub id: String,
    /// Reserved turns followed by the exchange
    pub contents: Vec<Content>,
}

impl ConversationSession {
    /// A new session whose reserved slots hold empty placeholders.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            contents: vec![Content::user_text(""), Content::model_text("")],
        }
    }

    /// History to send for this turn: regenerated reserved slots plus the
    /// stored exchange.
    #[must_use]
    pub fn seeded_history(&self, system_prompt: &str) -> Vec<Content> {
        let mut history = Vec::with_capacity(self.contents.len().max(RESERVED_TURNS));
        history.push(Content::user_text(system_prompt));
        history.push(Content::model_text(ACKNOWLEDGEMENT));
        history.extend_from_slice(self.exchange());
        history
    }

    /// Replace the stored history with the one returned after a successful
    /// turn, keeping at most `max_exchange_turns` exchange turns.
    pub fn replace_history(&mut self, contents: Vec<Content>, max_exchange_turns: usize) {
        self.contents = contents;
        self.trim_exchange(max_exchange_turns);
    }

    /// Turns after the reserved slots.
    #[must_use]
    pub fn exchange(&self) -> &[Content] {
        self.contents.get(RESERVED_TURNS..).unwrap_or(&[])
    }

    #[must_use]
    pub fn exchange_len(&self) -> usize {
        self.exchange().len()
    }

    /// Drop the oldest exchange turns in whole user/model pairs. A limit of
    /// zero keeps everything.
    fn trim_exchange(&mut self, max_exchange_turns: usize) {
        if max_exchange_turns == 0 {
            return;
        }
        let excess = self.exchange_len().saturating_sub(max_exchange_turns);
        if excess == 0 {
            return;
        }
        let drop = excess + excess % 2;
        let end = (RESERVED_TURNS + drop).min(self.contents.len());
        self.contents.drain(RESERVED_TURNS..end);
    }
}
