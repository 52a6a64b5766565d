use crate::engine::prompt_builder::{build_greeting, build_system_prompt, PromptContext};
use crate::model::catalog::Catalog;
use crate::model::message::{Message, Role};

/// Message history of one chat session.
///
/// The first message is always the system prompt. `reset` restores the two
/// messages computed at `initialize`; the system prompt (and the timestamp
/// inside it) therefore stays fixed for the session's lifetime.
#[derive(Debug, Clone)]
pub struct Conversation {
    initial: [Message; 2],
    messages: Vec<Message>,
}

impl Conversation {
    pub fn initialize(catalog: &Catalog, pickup_address: &str, timestamp: &str) -> Self {
        let context = PromptContext::new(catalog, pickup_address, timestamp);

        Self::from_initial(
            build_system_prompt(&context),
            build_greeting(&catalog.menu),
        )
    }

    pub fn from_initial(system_prompt: String, greeting: String) -> Self {
        let initial = [Message::system(system_prompt), Message::assistant(greeting)];

        Self {
            messages: initial.to_vec(),
            initial,
        }
    }

    pub fn reset(&mut self) {
        self.messages = self.initial.to_vec();
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.initial[0].content
    }

    /// Messages meant for the chat window (everything but the system prompt).
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}
