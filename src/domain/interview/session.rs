//! Interview session entity

use super::exchange::{ExchangeReply, SessionId};
use super::state::{transition, InterviewEvent, InterviewState, InvalidInterviewTransition};

/// Prompt shown before the first server reply
pub const INTRO_TEXT: &str = "Tell Me about yourself!";

/// Shown when the server answered without a next prompt
pub const NO_RESPONSE_TEXT: &str = "No response received. Try again.";

/// Shown once the candidate asked for the result
pub const FAREWELL_TEXT: &str = "Thank you for your time!";

/// Outcome of offering a session id to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdUpdate {
    /// First id seen; now fixed
    Assigned,
    /// Same id as before
    Unchanged,
    /// A different id arrived after one was fixed; kept the original
    Conflict { kept: SessionId, offered: SessionId },
}

/// One interview, from the first click to the final redirect.
///
/// Owns the control state and what is shown alongside it. All state
/// changes go through [`InterviewSession::apply`].
#[derive(Debug, Clone)]
pub struct InterviewSession {
    state: InterviewState,
    session_id: Option<SessionId>,
    prompt_text: String,
    prompt_audio_url: Option<String>,
    button_text: Option<String>,
    exchanges: u32,
    redirect_url: Option<String>,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        Self {
            state: InterviewState::Start,
            session_id: None,
            prompt_text: String::new(),
            prompt_audio_url: None,
            button_text: None,
            exchanges: 0,
            redirect_url: None,
        }
    }

    pub fn state(&self) -> InterviewState {
        self.state
    }

    /// Label for the control. The server may rename the record button.
    pub fn label(&self) -> &str {
        match (self.state, self.button_text.as_deref()) {
            (InterviewState::Record | InterviewState::Finish, Some(label)) => label,
            (state, _) => state.label(),
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    /// Audio for the current prompt, if the server sent one
    pub fn prompt_audio_url(&self) -> Option<&str> {
        self.prompt_audio_url.as_deref()
    }

    /// Completed upload exchanges
    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Apply an event through the transition table
    pub fn apply(
        &mut self,
        event: InterviewEvent,
    ) -> Result<InterviewState, InvalidInterviewTransition> {
        let next = transition(self.state, event).ok_or(InvalidInterviewTransition {
            current_state: self.state,
            event,
        })?;
        self.state = next;
        Ok(next)
    }

    /// Start the interview with the intro prompt
    pub fn begin(
        &mut self,
        intro_text: &str,
        intro_audio_url: Option<&str>,
    ) -> Result<InterviewState, InvalidInterviewTransition> {
        let next = self.apply(InterviewEvent::Begin)?;
        self.prompt_text = intro_text.to_string();
        self.prompt_audio_url = intro_audio_url.map(str::to_string);
        Ok(next)
    }

    /// Record a successful upload reply.
    ///
    /// A reply without a prompt audio URL counts as no answer: the question
    /// is asked again unless the server marked the exchange as the last one.
    pub fn complete_exchange(
        &mut self,
        reply: &ExchangeReply,
    ) -> Result<InterviewState, InvalidInterviewTransition> {
        let next = self.apply(InterviewEvent::ExchangeCompleted {
            is_last: reply.is_last(),
        })?;

        match reply.audio_url() {
            Some(url) => {
                self.exchanges += 1;
                self.prompt_text = reply.text().to_string();
                self.prompt_audio_url = Some(url.to_string());
                self.button_text = reply.button_text().map(str::to_string);
            }
            None if reply.is_last() => {
                self.exchanges += 1;
                self.prompt_text = reply.text().to_string();
                self.prompt_audio_url = None;
                self.button_text = None;
            }
            None => {
                self.prompt_text = NO_RESPONSE_TEXT.to_string();
                self.prompt_audio_url = None;
                self.button_text = None;
            }
        }
        Ok(next)
    }

    /// Upload failed; the same question can be answered again
    pub fn fail_exchange(&mut self) -> Result<InterviewState, InvalidInterviewTransition> {
        self.apply(InterviewEvent::ExchangeFailed)
    }

    /// Leave `Finish` and wait for the result
    pub fn request_finish(&mut self) -> Result<InterviewState, InvalidInterviewTransition> {
        let next = self.apply(InterviewEvent::FinishRequested)?;
        self.prompt_text = FAREWELL_TEXT.to_string();
        self.prompt_audio_url = None;
        Ok(next)
    }

    /// Resolve the final result. `None` means the server gave no redirect.
    pub fn resolve(
        &mut self,
        redirect_url: Option<String>,
    ) -> Result<InterviewState, InvalidInterviewTransition> {
        let next = self.apply(InterviewEvent::ResultResolved)?;
        self.redirect_url = redirect_url;
        Ok(next)
    }

    /// Offer a server-assigned session id. The first one wins.
    pub fn assign_session_id(&mut self, id: SessionId) -> SessionIdUpdate {
        match &self.session_id {
            None => {
                self.session_id = Some(id);
                SessionIdUpdate::Assigned
            }
            Some(current) if *current == id => SessionIdUpdate::Unchanged,
            Some(current) => SessionIdUpdate::Conflict {
                kept: current.clone(),
                offered: id,
            },
        }
    }
}
