//! Feedback state machine.
//!
//! Per-question presentation state after a submit:
//!
//! - `Unanswered` -> (`submit`) -> `Correct` | `Incorrect`
//! - `try_again` returns to `Unanswered`
//!
//! Two orthogonal flags overlay any status: `revealed_answer`, set only by
//! an explicit reveal, and `show_explanation`, togglable only while
//! feedback or the revealed answer is visible.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlayerError, Result};
use crate::evaluation::Verdict;
use crate::question::QuizMode;

// ============================================================================
// FeedbackStatus
// ============================================================================

/// Outcome of the latest submit for a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    /// Nothing submitted since the last reset.
    #[default]
    Unanswered,
    /// The last submit was correct.
    Correct,
    /// The last submit was incorrect.
    Incorrect,
}

impl FeedbackStatus {
    /// Returns the correctness of the last submit, `None` while unanswered.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::FeedbackStatus;
    ///
    /// assert_eq!(FeedbackStatus::Unanswered.is_correct(), None);
    /// assert_eq!(FeedbackStatus::Incorrect.is_correct(), Some(false));
    /// ```
    #[must_use]
    pub const fn is_correct(self) -> Option<bool> {
        match self {
            Self::Unanswered => None,
            Self::Correct => Some(true),
            Self::Incorrect => Some(false),
        }
    }

    /// Returns `true` once a verdict has been recorded.
    #[must_use]
    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

// ============================================================================
// FeedbackState
// ============================================================================

/// Feedback flags for a single question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackState {
    /// Status of the latest submit.
    pub status: FeedbackStatus,

    /// Whether the correctness feedback is shown.
    pub show_feedback: bool,

    /// Whether the correct answer has been revealed.
    pub revealed_answer: bool,

    /// Whether the explanation panel is open.
    pub show_explanation: bool,

    /// Number of submits so far, kept across retries.
    pub attempts: u32,

    /// Verdict of the latest submit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verdict: Option<Verdict>,
}

impl FeedbackState {
    /// Creates the initial (unanswered) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a verdict and shows feedback.
    pub fn submit(&mut self, verdict: &Verdict) {
        self.status = if verdict.is_correct {
            FeedbackStatus::Correct
        } else {
            FeedbackStatus::Incorrect
        };
        self.show_feedback = true;
        self.attempts += 1;
        self.last_verdict = Some(verdict.clone());
    }

    /// Marks the answer as revealed.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::RevealNotAllowed`] when `mode` forbids reveals.
    pub fn reveal_answer(&mut self, question_id: u64, mode: QuizMode) -> Result<()> {
        if !mode.allows_reveal() {
            return Err(PlayerError::RevealNotAllowed { question_id });
        }
        self.revealed_answer = true;
        Ok(())
    }

    /// Returns to `Unanswered` with feedback and reveal cleared.
    ///
    /// The attempt count and the learner's response are untouched; retry
    /// means revising the previous answer, not starting from empty.
    pub fn try_again(&mut self) {
        self.status = FeedbackStatus::Unanswered;
        self.show_feedback = false;
        self.revealed_answer = false;
        self.show_explanation = false;
    }

    /// Flips the explanation panel. Returns `false` (and does nothing)
    /// unless feedback or the revealed answer is visible.
    pub fn toggle_explanation(&mut self) -> bool {
        if !self.feedback_visible() {
            return false;
        }
        self.show_explanation = !self.show_explanation;
        true
    }

    /// Returns `true` while feedback or the revealed answer is on screen.
    #[must_use]
    pub const fn feedback_visible(&self) -> bool {
        self.show_feedback || self.revealed_answer
    }

    /// Returns `true` if the explanation panel is open.
    #[must_use]
    pub const fn explanation_visible(&self) -> bool {
        self.show_explanation && self.feedback_visible()
    }
}

// ============================================================================
// FeedbackStore
// ============================================================================

/// Session-scoped feedback states keyed by question id.
///
/// An entry is created by the first submit or reveal of a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStore {
    states: HashMap<u64, FeedbackState>,
}

impl FeedbackStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for a question, if one exists.
    #[must_use]
    pub fn get(&self, question_id: u64) -> Option<&FeedbackState> {
        self.states.get(&question_id)
    }

    /// Returns the state for a question, or the initial state.
    #[must_use]
    pub fn state(&self, question_id: u64) -> FeedbackState {
        self.states.get(&question_id).cloned().unwrap_or_default()
    }

    /// Records a verdict for a question.
    pub fn submit(&mut self, verdict: &Verdict) -> &FeedbackState {
        let state = self.states.entry(verdict.question_id).or_default();
        state.submit(verdict);
        info!(
            question_id = verdict.question_id,
            is_correct = verdict.is_correct,
            attempt = state.attempts,
            "Answer submitted"
        );
        state
    }

    /// Reveals the answer of a question, subject to the quiz mode.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::RevealNotAllowed`] in graded mode. No state
    /// is created in that case.
    pub fn reveal_answer(&mut self, question_id: u64, mode: QuizMode) -> Result<&FeedbackState> {
        if !mode.allows_reveal() {
            return Err(PlayerError::RevealNotAllowed { question_id });
        }
        let state = self.states.entry(question_id).or_default();
        state.reveal_answer(question_id, mode)?;
        info!(question_id, "Answer revealed");
        Ok(state)
    }

    /// Resets feedback for a question. No-op for unknown questions.
    pub fn try_again(&mut self, question_id: u64) {
        if let Some(state) = self.states.get_mut(&question_id) {
            state.try_again();
            debug!(question_id, attempts = state.attempts, "Feedback reset for retry");
        }
    }

    /// Toggles the explanation panel; returns whether anything changed.
    pub fn toggle_explanation(&mut self, question_id: u64) -> bool {
        let toggled = self
            .states
            .get_mut(&question_id)
            .is_some_and(FeedbackState::toggle_explanation);
        debug!(question_id, toggled, "Explanation toggle");
        toggled
    }

    /// Returns `true` while feedback or the revealed answer is visible.
    #[must_use]
    pub fn feedback_visible(&self, question_id: u64) -> bool {
        self.get(question_id)
            .is_some_and(FeedbackState::feedback_visible)
    }

    /// Returns `true` if the explanation panel is open.
    #[must_use]
    pub fn explanation_visible(&self, question_id: u64) -> bool {
        self.get(question_id)
            .is_some_and(FeedbackState::explanation_visible)
    }

    /// Drops every state (session end or restart).
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
