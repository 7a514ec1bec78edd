//! UI-agnostic conversation state
//!
//! The session is a two-state machine. `Idle` accepts a submit, which
//! appends the user turn and hands back the one completion request to
//! issue; `Awaiting` accepts exactly one resolution, which appends the AI
//! turn (or the fallback) and returns to `Idle`. Any UI (the TUI, the
//! headless `ask` command, tests) drives it through the same methods.

use serde::{Deserialize, Serialize};

use crate::ai::{Completion, CompletionRequest};
use crate::error::RemoteCallFailed;
use crate::format::format_response;
use crate::persona::Persona;

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One message in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    pub show_call_to_action: bool,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            show_call_to_action: false,
        }
    }

    pub fn ai(text: impl Into<String>, show_call_to_action: bool) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
            show_call_to_action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Awaiting,
}

/// Read-only snapshot handed to a renderer
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub turns: &'a [Turn],
    pub draft: &'a str,
    pub busy: bool,
}

pub struct Session {
    persona: Persona,
    enable_web_search: bool,
    turns: Vec<Turn>,
    draft: String,
    busy: bool,
}

impl Session {
    /// New idle session seeded with the persona's greeting
    pub fn new(persona: Persona, enable_web_search: bool) -> Self {
        let greeting = Turn::ai(persona.greeting.clone(), false);
        Self {
            persona,
            enable_web_search,
            turns: vec![greeting],
            draft: String::new(),
            busy: false,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Mutable access for line editors that insert at a cursor
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Awaiting
        } else {
            Phase::Idle
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            turns: &self.turns,
            draft: &self.draft,
            busy: self.busy,
        }
    }

    /// Submit the current draft.
    ///
    /// Returns the request to send when the session moved to `Awaiting`.
    /// Returns `None` (and changes nothing) while a call is outstanding or
    /// when the draft is blank.
    pub fn submit(&mut self) -> Option<CompletionRequest> {
        if self.busy {
            tracing::debug!("submit dropped: a completion is already in flight");
            return None;
        }

        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();

        self.turns.push(Turn::user(text.clone()));
        self.draft.clear();
        self.busy = true;

        Some(CompletionRequest {
            system_prompt: self.persona.system_prompt.clone(),
            user_text: text,
            enable_web_search: self.enable_web_search,
        })
    }

    /// Settle the outstanding call. Ignored when nothing is in flight.
    pub fn resolve(&mut self, outcome: Result<String, RemoteCallFailed>) {
        if !self.busy {
            tracing::debug!("completion ignored: session is idle");
            return;
        }

        let turn = match outcome {
            Ok(raw) => {
                let text = format_response(&raw);
                let cta = self.persona.call_to_action.is_triggered_by(&text);
                Turn::ai(text, cta)
            }
            Err(e) => {
                tracing::warn!(kind = %e.kind, error = %e.message, "completion failed");
                Turn::ai(self.persona.fallback_message.clone(), false)
            }
        };

        self.turns.push(turn);
        self.busy = false;
    }

    /// Submit, run the one completion call, and resolve, in sequence.
    ///
    /// Returns false when the submit was rejected and no call was made.
    pub async fn dispatch<C: Completion>(&mut self, client: &C) -> bool {
        let Some(request) = self.submit() else {
            return false;
        };
        let outcome = client.complete(&request).await;
        self.resolve(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::persona::{CallToAction, FALLBACK_MESSAGE};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SQUALO: &str =
        "**87' Squalo** is perfect. Glen is on stand by to finalize details the moment you...";

    struct FakeClient {
        reply: Result<String, FailureKind>,
        calls: AtomicUsize,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeClient {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(FailureKind::Network),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Completion for FakeClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteCallFailed> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(kind) => Err(RemoteCallFailed::new(*kind, "simulated")),
            }
        }
    }

    fn session() -> Session {
        Session::new(Persona::waves_n_wishes(), true)
    }

    #[test]
    fn test_initial_state_has_only_greeting() {
        let s = session();
        assert_eq!(s.turns().len(), 1);
        assert_eq!(s.turns()[0].sender, Sender::Ai);
        assert!(s.turns()[0].text.starts_with("Welcome"));
        assert!(!s.turns()[0].show_call_to_action);
        assert!(s.turns().iter().all(|t| t.sender != Sender::User));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_submit_appends_trimmed_user_turn_and_clears_draft() {
        let mut s = session();
        s.set_draft("  I want adventure \n");
        let request = s.submit().expect("submit accepted");

        assert_eq!(s.turns().len(), 2);
        assert_eq!(s.turns()[1], Turn::user("I want adventure"));
        assert_eq!(s.draft(), "");
        assert!(s.is_busy());
        assert_eq!(s.phase(), Phase::Awaiting);
        assert_eq!(request.user_text, "I want adventure");
        assert_eq!(request.system_prompt, s.persona().system_prompt);
        assert!(request.enable_web_search);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut s = session();
        for draft in ["", "   ", "\n\t "] {
            s.set_draft(draft);
            assert!(s.submit().is_none());
            assert_eq!(s.turns().len(), 1);
            assert!(!s.is_busy());
        }
    }

    #[test]
    fn test_submit_while_awaiting_is_dropped() {
        let mut s = session();
        s.set_draft("first");
        assert!(s.submit().is_some());

        s.set_draft("second");
        assert!(s.submit().is_none());
        assert_eq!(s.turns().len(), 2);
        assert_eq!(s.draft(), "second");
        assert!(s.is_busy());
    }

    #[test]
    fn test_success_sets_call_to_action_on_marker() {
        let mut s = session();
        s.set_draft("I want adventure");
        s.submit();
        s.resolve(Ok(SQUALO.to_string()));

        let last = s.last_turn().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert!(last.show_call_to_action);
        assert!(!last.text.contains('*'));
        assert!(last.text.starts_with("<strong>87' Squalo</strong>"));
        assert!(!s.is_busy());
    }

    #[test]
    fn test_success_without_marker_has_no_call_to_action() {
        let mut s = session();
        s.set_draft("How much is it?");
        s.submit();
        s.resolve(Ok("I think Glen has the most apt answer to that.".to_string()));
        assert!(!s.last_turn().unwrap().show_call_to_action);
    }

    #[test]
    fn test_always_variant_flags_every_answer() {
        let persona = Persona::waves_n_wishes().with_call_to_action(CallToAction::Always);
        let mut s = Session::new(persona, false);
        s.set_draft("hello");
        let request = s.submit().unwrap();
        assert!(!request.enable_web_search);
        s.resolve(Ok("Hello there".to_string()));
        assert!(s.last_turn().unwrap().show_call_to_action);
    }

    #[test]
    fn test_failure_appends_fallback() {
        let mut s = session();
        s.set_draft("I want adventure");
        s.submit();
        s.resolve(Err(RemoteCallFailed::network("connection refused")));

        assert_eq!(s.turns().len(), 3);
        let last = s.last_turn().unwrap();
        assert_eq!(
            last.text,
            "I'm sorry, I encountered a technical issue. Please try again shortly."
        );
        assert_eq!(last.text, FALLBACK_MESSAGE);
        assert!(!last.show_call_to_action);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_session_usable_after_failure() {
        let mut s = session();
        s.set_draft("one");
        s.submit();
        s.resolve(Err(RemoteCallFailed::payload("empty")));
        s.set_draft("two");
        assert!(s.submit().is_some());
        assert_eq!(s.turns().len(), 4);
    }

    #[test]
    fn test_resolve_while_idle_is_ignored() {
        let mut s = session();
        s.resolve(Ok("stray".to_string()));
        assert_eq!(s.turns().len(), 1);
    }

    #[test]
    fn test_busy_tracks_outstanding_call_over_many_turns() {
        let mut s = session();
        for i in 0..5 {
            s.set_draft(format!("message {}", i));
            assert!(s.submit().is_some());
            assert!(s.is_busy());
            assert!(s.submit().is_none());
            s.resolve(Ok(format!("reply {}", i)));
            assert!(!s.is_busy());
        }
        assert_eq!(s.turns().len(), 11);
    }

    #[test]
    fn test_view_reflects_state() {
        let mut s = session();
        s.set_draft("draft");
        let view = s.view();
        assert_eq!(view.turns.len(), 1);
        assert_eq!(view.draft, "draft");
        assert!(!view.busy);
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let client = FakeClient::ok(SQUALO);
        let mut s = session();
        s.set_draft("I want adventure");
        assert!(s.dispatch(&client).await);

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].user_text, "I want adventure");
        assert_eq!(s.turns().len(), 3);
        assert!(s.last_turn().unwrap().show_call_to_action);
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_dispatch_failure_makes_exactly_one_attempt() {
        let client = FakeClient::failing();
        let mut s = session();
        s.set_draft("I want adventure");
        assert!(s.dispatch(&client).await);

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.last_turn().unwrap().text, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_dispatch_blank_makes_no_call() {
        let client = FakeClient::ok("unused");
        let mut s = session();
        s.set_draft("   ");
        assert!(!s.dispatch(&client).await);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Submit(String),
        Resolve(bool),
    }

    fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
        prop::collection::vec(
            prop_oneof![
                "[a-z ]{0,6}".prop_map(Step::Submit),
                Just(Step::Submit("  \n\t".to_string())),
                any::<bool>().prop_map(Step::Resolve),
            ],
            0..40,
        )
    }

    proptest! {
        #[test]
        fn test_busy_iff_one_call_outstanding(steps in arb_steps()) {
            let mut s = session();
            let mut outstanding = 0usize;

            for step in steps {
                let turns_before = s.turns().len();
                match step {
                    Step::Submit(text) => {
                        let was_busy = s.is_busy();
                        s.set_draft(text.clone());
                        let request = s.submit();

                        if was_busy {
                            prop_assert!(request.is_none());
                            prop_assert_eq!(s.turns().len(), turns_before);
                            prop_assert_eq!(s.draft(), text.as_str());
                        } else if text.trim().is_empty() {
                            prop_assert!(request.is_none());
                            prop_assert_eq!(s.turns().len(), turns_before);
                        } else {
                            prop_assert!(request.is_some());
                            prop_assert_eq!(s.turns().len(), turns_before + 1);
                            prop_assert_eq!(s.draft(), "");
                            outstanding += 1;
                        }
                    }
                    Step::Resolve(ok) => {
                        let outcome = if ok {
                            Ok("**Eden** awaits".to_string())
                        } else {
                            Err(RemoteCallFailed::network("down"))
                        };
                        s.resolve(outcome);

                        if outstanding == 1 {
                            prop_assert_eq!(s.turns().len(), turns_before + 1);
                            prop_assert_eq!(s.last_turn().map(|t| t.sender), Some(Sender::Ai));
                            outstanding = 0;
                        } else {
                            prop_assert_eq!(s.turns().len(), turns_before);
                        }
                    }
                }

                prop_assert!(outstanding <= 1);
                prop_assert_eq!(s.is_busy(), outstanding == 1);
                prop_assert_eq!(s.phase() == Phase::Awaiting, outstanding == 1);
            }
        }
    }
}
