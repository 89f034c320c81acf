//! Interview flow: control state machine and server replies

mod exchange;
mod session;
mod state;

pub use exchange::{ExchangeReply, ResultReply, SessionId};
pub use session::{InterviewSession, SessionIdUpdate, FAREWELL_TEXT, INTRO_TEXT, NO_RESPONSE_TEXT};
pub use state::{transition, InterviewEvent, InterviewState, InvalidInterviewTransition};
