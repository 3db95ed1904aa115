//! Conversation state machine.
//!
//! `Idle` accepts a submission, appends the user turn and hands back the
//! request to perform. `AwaitingResponse` ignores submissions until the result
//! of that request is applied, which appends exactly one assistant turn.

use crate::error::ChatResult;

use super::message::{Message, Role};

/// Seeded first assistant turn.
pub const WELCOME_MESSAGE: &str =
    "Hi! I'm CodeHelperNET, your assistant for C# and .NET. How can I help you today?";

/// Assistant turn appended when a request fails. The raw error is never shown.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, there was an error processing your message. Please try again.";

/// Whether a submission is in flight.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    /// Ready for a submission.
    #[default]
    Idle,
    /// One submission is in flight.
    AwaitingResponse,
}

/// Request the caller must perform after an accepted submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingRequest {
    /// Text to send, as typed.
    pub text: String,
}

/// Ordered message log plus the busy flag.
#[derive(Clone, Debug)]
pub struct ConversationState {
    messages: Vec<Message>,
    phase: Phase,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Start idle with the standard welcome turn.
    #[must_use]
    pub fn new() -> Self {
        Self::with_welcome(WELCOME_MESSAGE)
    }

    /// Start idle with a custom welcome turn.
    #[must_use]
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(welcome)],
            phase: Phase::Idle,
        }
    }

    /// Submit user text.
    ///
    /// Returns `None` (and changes nothing) when the text is blank or a
    /// request is already in flight.
    pub fn submit(&mut self, text: &str) -> Option<PendingRequest> {
        if self.phase == Phase::AwaitingResponse || text.trim().is_empty() {
            tracing::debug!(phase = ?self.phase, "submission ignored");
            return None;
        }

        self.messages.push(Message::user(text));
        self.phase = Phase::AwaitingResponse;
        Some(PendingRequest {
            text: text.to_string(),
        })
    }

    /// Apply the result of the in-flight request.
    ///
    /// Returns the appended assistant turn, or `None` if nothing was in flight.
    pub fn resolve(&mut self, result: ChatResult) -> Option<&Message> {
        if self.phase != Phase::AwaitingResponse {
            tracing::warn!("result arrived with no request in flight; dropped");
            return None;
        }

        let reply = match result {
            Ok(text) => Message::assistant(text),
            Err(err) => {
                tracing::error!(kind = err.kind().as_str(), "chat turn failed: {err}");
                Message::assistant(APOLOGY_MESSAGE)
            }
        };
        self.messages.push(reply);
        self.phase = Phase::Idle;
        self.messages.last()
    }

    /// All turns in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// `true` while a submission is in flight.
    #[must_use]
    pub fn pending_submission(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// Number of turns, not counting the welcome message.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }

    /// Most recent turn by `role`.
    #[must_use]
    pub fn last_by(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role() == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    #[test]
    fn test_starts_idle_with_welcome() {
        let state = ConversationState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role(), Role::Assistant);
        assert_eq!(state.messages()[0].content(), WELCOME_MESSAGE);
        assert_eq!(state.exchange_count(), 0);
    }

    #[test]
    fn test_submit_appends_user_turn_verbatim() {
        let mut state = ConversationState::new();
        let request = state.submit("  What is LINQ?\n");

        assert_eq!(
            request,
            Some(PendingRequest {
                text: "  What is LINQ?\n".to_string()
            })
        );
        assert!(state.pending_submission());
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].role(), Role::User);
        assert_eq!(state.messages()[1].content(), "  What is LINQ?\n");
    }

    #[test]
    fn test_blank_submission_is_ignored() {
        let mut state = ConversationState::new();
        assert!(state.submit("").is_none());
        assert!(state.submit(" \t\n ").is_none());
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_submission_while_awaiting_is_ignored() {
        let mut state = ConversationState::new();
        assert!(state.submit("first").is_some());
        let before: Vec<String> = state.messages().iter().map(|m| m.id().to_string()).collect();

        assert!(state.submit("second").is_none());

        let after: Vec<String> = state.messages().iter().map(|m| m.id().to_string()).collect();
        assert_eq!(before, after);
        assert_eq!(state.phase(), Phase::AwaitingResponse);
    }

    #[test]
    fn test_success_appends_answer_and_returns_to_idle() {
        let mut state = ConversationState::new();
        state.submit("How do I await a Task?");

        let reply = state
            .resolve(Ok("Use async/await with Task<T>.".to_string()))
            .map(|m| (m.role(), m.content().to_string()));

        assert_eq!(
            reply,
            Some((Role::Assistant, "Use async/await with Task<T>.".to_string()))
        );
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.exchange_count(), 2);
    }

    #[test]
    fn test_failure_appends_apology_not_raw_error() {
        let mut state = ConversationState::new();
        state.submit("hello");
        state.resolve(Err(ChatError::BackendUnavailable));

        let last = state.last_by(Role::Assistant).map(Message::content);
        assert_eq!(last, Some(APOLOGY_MESSAGE));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_result_while_idle_is_dropped() {
        let mut state = ConversationState::new();
        assert!(state.resolve(Ok("stray".to_string())).is_none());
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_can_submit_again_after_failure() {
        let mut state = ConversationState::new();
        state.submit("one");
        state.resolve(Err(ChatError::unknown("boom")));
        assert!(state.submit("two").is_some());
        assert_eq!(state.last_by(Role::User).map(Message::content), Some("two"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::error::ChatError;
    use proptest::prelude::*;

    fn arb_input() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9 ?.<>]{1,40}",
            Just(String::new()),
            "[ \t\n]{1,5}",
        ]
    }

    fn arb_result() -> impl Strategy<Value = ChatResult> {
        prop_oneof![
            "[a-zA-Z ]{0,30}".prop_map(|text| -> ChatResult { Ok(text) }),
            Just(Err(ChatError::BackendUnavailable)),
            "[a-z ]{1,20}".prop_map(|m| Err(ChatError::Backend(m))),
        ]
    }

    proptest! {
        #[test]
        fn prop_serial_round_trips_keep_order(
            rounds in prop::collection::vec((arb_input(), arb_result()), 0..20)
        ) {
            let mut state = ConversationState::new();
            let mut accepted = Vec::new();

            for (input, result) in rounds {
                let appended_before = state.messages().len();
                match state.submit(&input) {
                    Some(request) => {
                        prop_assert!(!input.trim().is_empty());
                        prop_assert_eq!(state.messages().len(), appended_before + 1);
                        accepted.push(request.text);
                        prop_assert!(state.resolve(result).is_some());
                    }
                    None => {
                        prop_assert!(input.trim().is_empty());
                        prop_assert_eq!(state.messages().len(), appended_before);
                    }
                }
                prop_assert_eq!(state.phase(), Phase::Idle);
            }

            let messages = state.messages();
            prop_assert_eq!(messages.len(), 1 + 2 * accepted.len());
            prop_assert_eq!(messages[0].content(), WELCOME_MESSAGE);
            for (i, text) in accepted.iter().enumerate() {
                let user = &messages[1 + 2 * i];
                let assistant = &messages[2 + 2 * i];
                prop_assert_eq!(user.role(), Role::User);
                prop_assert_eq!(user.content(), text.as_str());
                prop_assert_eq!(assistant.role(), Role::Assistant);
            }
        }

        #[test]
        fn prop_busy_state_rejects_everything(inputs in prop::collection::vec(arb_input(), 1..10)) {
            let mut state = ConversationState::new();
            prop_assert!(state.submit("in flight").is_some());
            let len = state.messages().len();

            for input in inputs {
                prop_assert!(state.submit(&input).is_none());
            }
            prop_assert_eq!(state.messages().len(), len);
            prop_assert!(state.pending_submission());
        }
    }
}
