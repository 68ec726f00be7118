//! Chat flow: user input -> history + bubble -> reply service -> bubble.
//!
//! One request may be in flight at a time. The controller holds that as an explicit `Sending`
//! state instead of trusting the front-end's disabled send button, so a programmatic `submit`
//! while a reply is pending is ignored.

use crate::chat_log::{ChatLog, Message, Role};
use crate::reply::{ReplyBackend, ReplyError};
use crate::transcript::{Bubble, BubbleStyle, Transcript};

/// Prefix of the bubble shown when the service fails ("something went wrong with the service, dear: ").
pub const SERVICE_ERROR_PREFIX: &str = "صار شي بالخدمة يا وليدي: ";

/// UI side effects the controller asks for. Front-ends implement what they can; the rest stay no-ops.
pub trait ChatView {
    fn clear_input(&mut self) {}
    fn set_send_enabled(&mut self, _enabled: bool) {}
    fn focus_input(&mut self) {}
}

/// View that ignores every effect (headless use).
pub struct NoView;

impl ChatView for NoView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    /// Waiting for the reply to the request with this id.
    Sending(u64),
}

/// A request the front-end should deliver to the reply service.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub id: u64,
    pub message: String,
    /// History snapshot, already including `message` as its last entry.
    pub history: Vec<Message>,
}

#[derive(Debug)]
pub struct ChatController {
    log: ChatLog,
    transcript: Transcript,
    state: SendState,
    next_id: u64,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            log: ChatLog::new(),
            transcript: Transcript::default(),
            state: SendState::Idle,
            next_id: 1,
        }
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, SendState::Sending(_))
    }

    /// Idle -> Sending. Returns None (and changes nothing) for blank input or while a request is in flight.
    pub fn begin_send(&mut self, text: &str, view: &mut dyn ChatView) -> Option<Outgoing> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let SendState::Sending(id) = self.state {
            log::debug!("chat: ignoring submit while request {} is pending", id);
            return None;
        }

        view.clear_input();
        self.transcript
            .push(Bubble::new(Role::User, text, BubbleStyle::Normal));
        self.log.push(Message::user(text));
        view.set_send_enabled(false);

        let id = self.next_id;
        self.next_id += 1;
        self.state = SendState::Sending(id);
        Some(Outgoing {
            id,
            message: text.to_string(),
            history: self.log.messages().to_vec(),
        })
    }

    /// Sending -> Idle with the outcome of request `id`. Outcomes for any other request are dropped.
    pub fn finish_send(
        &mut self,
        id: u64,
        outcome: Result<String, ReplyError>,
        view: &mut dyn ChatView,
    ) {
        if self.state != SendState::Sending(id) {
            log::debug!("chat: dropping stale reply for request {}", id);
            return;
        }
        match outcome {
            Ok(reply) => {
                self.transcript
                    .push(Bubble::new(Role::Assistant, reply.as_str(), BubbleStyle::Normal));
                self.log.push(Message::assistant(reply));
            }
            Err(e) => {
                log::warn!("chat: reply failed: {}", e);
                // Display only: a failed exchange never becomes context for later requests.
                self.transcript.push(Bubble::new(
                    Role::Assistant,
                    format!("{}{}", SERVICE_ERROR_PREFIX, e),
                    BubbleStyle::Error,
                ));
            }
        }
        self.state = SendState::Idle;
        view.set_send_enabled(true);
        view.focus_input();
    }

    /// Full round-trip against `backend`. Returns false when the input was ignored.
    pub async fn send<B: ReplyBackend + ?Sized>(
        &mut self,
        backend: &B,
        text: &str,
        view: &mut dyn ChatView,
    ) -> bool {
        let Some(out) = self.begin_send(text, view) else {
            return false;
        };
        let outcome = backend.reply(&out.message, &out.history).await;
        self.finish_send(out.id, outcome, view);
        true
    }

    /// Local-only assistant bubble (greeting); not part of the history.
    pub fn push_greeting(&mut self, text: impl Into<String>) {
        self.transcript
            .push(Bubble::new(Role::Assistant, text, BubbleStyle::Greeting));
    }

    /// Drop the transcript and history. Any pending reply will be discarded when it arrives,
    /// so the send lock is released here instead.
    pub fn clear(&mut self, view: &mut dyn ChatView) {
        self.transcript.clear();
        self.log.clear();
        view.clear_input();
        if let SendState::Sending(id) = self.state {
            log::debug!("chat: abandoning request {}", id);
            view.set_send_enabled(true);
        }
        self.state = SendState::Idle;
    }
}
