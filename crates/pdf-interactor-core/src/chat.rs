//! The chat view state machine
//!
//! [`ChatView`] owns every piece of application state: the conversation,
//! the text being composed, the request flag and the UI phase. It performs
//! no IO itself except through [`ChatView::submit`], which borrows a
//! [`QaClient`] for exactly one request.
//!
//! Submitting is split into [`ChatView::begin_submit`] and
//! [`ChatView::finish_submit`] so a UI can run the request on a background
//! task and stay responsive while it is pending.

use tracing::{debug, info, warn};

use crate::client::QaClient;
use crate::error::AskError;
use crate::state::{ChatEvent, Message, RequestState, UiPhase};

pub const GREETING: &str = "Document loaded. I'm ready to answer your questions!";

/// Build the user-facing apology for a failed request
fn apology(err: &AskError) -> String {
    format!("Sorry, I encountered an error. Please try again. ({})", err)
}

#[derive(Debug)]
pub struct ChatView {
    messages: Vec<Message>,
    input: String,
    request: RequestState,
    phase: UiPhase,
    greeting: String,
    events: Vec<ChatEvent>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            request: RequestState::default(),
            phase: UiPhase::Idle,
            greeting: greeting.into(),
            events: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn phase(&self) -> UiPhase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.request.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.request.last_error.as_deref()
    }

    /// "Upload completed": enter the chat phase with a fresh conversation.
    ///
    /// Transmits nothing. Callable from any phase, but rejected while a
    /// request is pending so its answer can't land in the new conversation.
    /// Returns whether the conversation was reset.
    pub fn start(&mut self) -> bool {
        if self.request.in_flight {
            debug!("start rejected while a request is in flight");
            return false;
        }

        if self.phase != UiPhase::Active {
            self.phase = UiPhase::Active;
            self.events.push(ChatEvent::PhaseChanged);
            info!("chat phase started");
        }

        self.messages.clear();
        self.messages.push(Message::ai(self.greeting.clone()));
        self.request.last_error = None;
        self.events.push(ChatEvent::ConversationChanged);
        true
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn can_submit(&self) -> bool {
        self.phase == UiPhase::Active && !self.request.in_flight && !self.input.trim().is_empty()
    }

    /// Record the user's question and mark a request as in flight.
    ///
    /// Returns the untrimmed question to send, or `None` when the submit is
    /// rejected (idle phase, blank input, or a request already pending). A
    /// rejected submit leaves every piece of state untouched.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            debug!(
                in_flight = self.request.in_flight,
                phase = ?self.phase,
                "submit rejected"
            );
            return None;
        }

        let question = std::mem::take(&mut self.input);
        self.messages.push(Message::user(question.clone()));
        self.events.push(ChatEvent::ConversationChanged);

        self.request.in_flight = true;
        self.request.last_error = None;
        self.events.push(ChatEvent::LoadingChanged);

        info!(chars = question.chars().count(), "question submitted");
        Some(question)
    }

    /// Settle the pending request with its outcome.
    pub fn finish_submit(&mut self, result: Result<String, AskError>) {
        if !self.request.in_flight {
            warn!("request settled with nothing in flight, ignoring");
            return;
        }

        match result {
            Ok(answer) => {
                info!(chars = answer.chars().count(), "answer received");
                self.messages.push(Message::ai(answer));
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "question failed");
                self.messages.push(Message::ai(apology(&err)));
                self.request.last_error = Some(err.to_string());
            }
        }
        self.events.push(ChatEvent::ConversationChanged);

        self.request.in_flight = false;
        self.events.push(ChatEvent::LoadingChanged);
    }

    /// Submit and wait for the answer in place.
    ///
    /// Returns `false` when the submit was rejected and no request was made.
    pub async fn submit(&mut self, client: &QaClient) -> bool {
        let Some(question) = self.begin_submit() else {
            return false;
        };

        let result = client.ask(&question).await;
        self.finish_submit(result);
        true
    }

    /// Take the events emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<ChatEvent> {
        std::mem::take(&mut self.events)
    }
}
