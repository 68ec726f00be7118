//! Displayed chat bubbles.

use crate::chat_log::Role;

/// How a bubble is drawn. Greeting and error bubbles are local and never reach the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    Normal,
    Greeting,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub author: Role,
    pub text: String,
    pub style: BubbleStyle,
    /// Local wall-clock time, "HH:MM".
    pub time: String,
}

impl Bubble {
    pub fn new(author: Role, text: impl Into<String>, style: BubbleStyle) -> Self {
        Self {
            author,
            text: text.into(),
            style,
            time: chrono::Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Role::User
    }
}

/// Everything currently shown in the chat area, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    bubbles: Vec<Bubble>,
}

impl Transcript {
    pub fn push(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn last(&self) -> Option<&Bubble> {
        self.bubbles.last()
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
    }
}
