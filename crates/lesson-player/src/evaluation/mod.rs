//! Answer evaluation engine.
//!
//! Pure functions: given a question's answer key and the learner's
//! current response, produce a [`Verdict`]. Nothing here keeps state
//! between calls, so evaluating the same pair twice yields the same
//! verdict.
//!
//! | Module     | Archetypes |
//! |------------|------------|
//! | `choice`   | single choice, multiple choice, image choice, true/false |
//! | `grouping` | drag and drop into buckets |
//! | `numeric`  | numeric comparison with an explicit operator |
//! | `sequence` | order list, fill in the blank, match the words |
//!
//! Two failure modes are kept apart on purpose. A malformed question
//! (missing correct answer, unknown operator, ...) is an
//! [`UnsupportedQuestion`](crate::PlayerError::UnsupportedQuestion) error.
//! An incomplete response is not an error at all: it evaluates to
//! `is_correct = false`.

pub mod choice;
pub mod grouping;
pub mod numeric;
pub mod sequence;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};
use crate::question::{Question, QuestionKind};
use crate::response::Response;

// ============================================================================
// OptionStatus
// ============================================================================

/// Presentation status of one option, item, blank or word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionStatus {
    /// Not chosen, and nothing to point out.
    #[default]
    Unselected,
    /// Chosen and correct.
    SelectedCorrect,
    /// Chosen but wrong.
    SelectedIncorrect,
    /// Correct but not chosen; only reported while feedback is visible.
    CorrectButUnselected,
}

impl OptionStatus {
    /// Derives the status from the three facts that decide it.
    #[must_use]
    pub const fn classify(selected: bool, correct: bool, feedback_visible: bool) -> Self {
        match (selected, correct) {
            (true, true) => Self::SelectedCorrect,
            (true, false) => Self::SelectedIncorrect,
            (false, true) if feedback_visible => Self::CorrectButUnselected,
            (false, _) => Self::Unselected,
        }
    }
}

impl std::fmt::Display for OptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unselected => "unselected",
            Self::SelectedCorrect => "selected-correct",
            Self::SelectedIncorrect => "selected-incorrect",
            Self::CorrectButUnselected => "correct-but-unselected",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Correctness judgement for one evaluated response.
///
/// A fresh verdict is produced on every evaluation; verdicts are never
/// updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Question the verdict belongs to.
    pub question_id: u64,

    /// Whether the response is fully correct. There is no partial credit.
    pub is_correct: bool,

    /// Status per option identifier (or item, blank, word).
    pub option_statuses: BTreeMap<String, OptionStatus>,
}

impl Verdict {
    /// Creates a verdict.
    #[must_use]
    pub const fn new(
        question_id: u64,
        is_correct: bool,
        option_statuses: BTreeMap<String, OptionStatus>,
    ) -> Self {
        Self {
            question_id,
            is_correct,
            option_statuses,
        }
    }

    /// Returns the status of one option, `Unselected` if unknown.
    #[must_use]
    pub fn status_of(&self, option: &str) -> OptionStatus {
        self.option_statuses
            .get(option)
            .copied()
            .unwrap_or_default()
    }
}

// ============================================================================
// EvaluationOptions
// ============================================================================

/// Knobs that influence evaluation without being part of the question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    /// Absolute tolerance for numeric equality.
    pub numeric_tolerance: f64,

    /// Whether fill-in-the-blank answers are compared case-sensitively.
    pub case_sensitive_blanks: bool,

    /// Whether feedback (or a revealed answer) is currently shown; enables
    /// the `CorrectButUnselected` status.
    pub feedback_visible: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            numeric_tolerance: 1e-9,
            case_sensitive_blanks: false,
            feedback_visible: false,
        }
    }
}

impl EvaluationOptions {
    /// Returns a copy with `feedback_visible` set.
    #[must_use]
    pub const fn with_feedback_visible(mut self, feedback_visible: bool) -> Self {
        self.feedback_visible = feedback_visible;
        self
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Evaluates a response against a question.
///
/// # Errors
///
/// Returns [`PlayerError::UnsupportedQuestion`] if the question's answer
/// key is malformed, and [`PlayerError::ResponseMismatch`] if the
/// response shape does not belong to the question's archetype.
///
/// # Examples
///
/// ```
/// use lesson_player::{
///     evaluate, ChoiceOption, EvaluationOptions, Question, QuestionKind, Response,
/// };
///
/// let question = Question::new(
///     2,
///     QuestionKind::MultipleChoice {
///         options: vec![ChoiceOption::new("A"), ChoiceOption::new("B"), ChoiceOption::new("C")],
///         correct: vec!["A".to_string(), "C".to_string()],
///     },
/// );
/// let response = Response::Choice(["C".to_string(), "A".to_string()].into_iter().collect());
///
/// let verdict = evaluate(&question, &response, &EvaluationOptions::default()).unwrap();
/// assert!(verdict.is_correct);
/// ```
pub fn evaluate(
    question: &Question,
    response: &Response,
    options: &EvaluationOptions,
) -> Result<Verdict> {
    let id = question.id;
    let visible = options.feedback_visible;

    let verdict = match (&question.kind, response) {
        (QuestionKind::SingleChoice { options: offered, correct }, Response::Choice(selected)) => {
            choice::evaluate_single(id, offered, correct.as_deref(), selected, visible)
        }
        (
            QuestionKind::MultipleChoice {
                options: offered,
                correct,
            },
            Response::Choice(selected),
        ) => choice::evaluate_multiple(id, offered, correct, selected, visible),
        (
            QuestionKind::ImageChoice {
                options: offered,
                correct,
                multiple,
            },
            Response::Choice(selected),
        ) => choice::evaluate_image(id, offered, correct, *multiple, selected, visible),
        (QuestionKind::TrueFalse { correct }, Response::Choice(selected)) => {
            choice::evaluate_true_false(id, *correct, selected, visible)
        }
        (QuestionKind::DragDrop { buckets }, Response::Placement(placement)) => {
            grouping::evaluate(id, buckets, placement, visible)
        }
        (QuestionKind::Numeric { expected, operator }, Response::Numeric(value)) => {
            numeric::evaluate(
                id,
                *expected,
                operator.as_deref(),
                *value,
                options.numeric_tolerance,
            )
        }
        (QuestionKind::OrderList { items }, Response::Order(order)) => {
            sequence::evaluate_order(id, items, order, visible)
        }
        (QuestionKind::FillBlank { template, .. }, Response::Blanks(blanks)) => {
            sequence::evaluate_blanks(id, template, blanks, options.case_sensitive_blanks, visible)
        }
        (QuestionKind::MatchWords { pairs }, Response::Matches(connections)) => {
            sequence::evaluate_matches(id, pairs, connections, visible)
        }
        (kind, _) => {
            return Err(PlayerError::response_mismatch(
                id,
                Response::empty_for(kind).shape(),
            ))
        }
    };

    if let Err(ref err) = verdict {
        tracing::warn!(question_id = id, error = %err, "Question cannot be evaluated");
    }
    verdict
}

/// Returns `true` if the response meets the question's minimum-answer
/// requirement.
///
/// This only inspects completeness. A malformed question can still be
/// submittable; its configuration problem is reported by [`evaluate`].
#[must_use]
pub fn is_submittable(question: &Question, response: &Response) -> bool {
    match (&question.kind, response) {
        (
            QuestionKind::SingleChoice { .. } | QuestionKind::TrueFalse { .. },
            Response::Choice(selected),
        ) => selected.len() == 1,
        (QuestionKind::ImageChoice { multiple, .. }, Response::Choice(selected)) => {
            if *multiple {
                !selected.is_empty()
            } else {
                selected.len() == 1
            }
        }
        (QuestionKind::MultipleChoice { .. }, Response::Choice(selected)) => !selected.is_empty(),
        (QuestionKind::DragDrop { buckets }, Response::Placement(placement)) => {
            grouping::all_items_placed(buckets, placement)
        }
        (QuestionKind::Numeric { .. }, Response::Numeric(value)) => value.is_some(),
        (QuestionKind::OrderList { items }, Response::Order(order)) => {
            sequence::is_permutation(items, order)
        }
        (QuestionKind::FillBlank { template, .. }, Response::Blanks(blanks)) => {
            sequence::all_blanks_filled(template, blanks)
        }
        (QuestionKind::MatchWords { pairs }, Response::Matches(connections)) => {
            pairs.iter().all(|pair| connections.contains_key(&pair.word))
        }
        _ => false,
    }
}

/// Returns the answer that a reveal shows, as a response of the right shape.
///
/// # Errors
///
/// Returns [`PlayerError::UnsupportedQuestion`] if the question has no
/// usable correct answer.
pub fn correct_response(question: &Question) -> Result<Response> {
    let id = question.id;
    match &question.kind {
        QuestionKind::SingleChoice { correct, .. } => correct
            .clone()
            .map(|c| Response::Choice(std::iter::once(c).collect()))
            .ok_or_else(|| PlayerError::unsupported_question(id, "missing correct option")),
        QuestionKind::MultipleChoice { correct, .. }
        | QuestionKind::ImageChoice { correct, .. } => {
            if correct.is_empty() {
                Err(PlayerError::unsupported_question(id, "missing correct answer set"))
            } else {
                Ok(Response::Choice(correct.iter().cloned().collect()))
            }
        }
        QuestionKind::TrueFalse { correct } => correct
            .map(|c| Response::Choice(BTreeSet::from([choice::true_false_option(c).to_string()])))
            .ok_or_else(|| PlayerError::unsupported_question(id, "missing true/false answer")),
        QuestionKind::DragDrop { buckets } => Ok(Response::Placement(buckets.clone())),
        QuestionKind::Numeric { expected, .. } => expected
            .map(|value| Response::Numeric(Some(value)))
            .ok_or_else(|| PlayerError::unsupported_question(id, "missing expected value")),
        QuestionKind::OrderList { items } => Ok(Response::Order(items.clone())),
        QuestionKind::FillBlank { template, .. } => Ok(Response::Blanks(
            sequence::blank_answers(template).into_iter().map(Some).collect(),
        )),
        QuestionKind::MatchWords { pairs } => Ok(Response::Matches(
            pairs
                .iter()
                .map(|pair| (pair.word.clone(), pair.matches.clone()))
                .collect(),
        )),
    }
}
