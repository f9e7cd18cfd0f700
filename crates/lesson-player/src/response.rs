//! Learner responses, one shape per archetype family.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::placement::BucketMapping;
use crate::question::QuestionKind;

/// Option identifiers used for true/false questions.
pub const TRUE_OPTION: &str = "true";
/// Option identifiers used for true/false questions.
pub const FALSE_OPTION: &str = "false";

/// The learner's in-progress answer to one question.
///
/// Responses are edited in place as the learner interacts and read by the
/// evaluation engine on submit. Drag-and-drop responses are not stored here
/// but in the [`PlacementStore`](crate::PlacementStore); the session copies
/// them into a [`Response::Placement`] at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Response {
    /// Selected option identifiers (single, multiple, image, true/false).
    Choice(BTreeSet<String>),
    /// Entered number, if the input currently parses.
    Numeric(Option<f64>),
    /// Bucket placements for drag-and-drop questions.
    Placement(BucketMapping),
    /// Items in the learner's current order.
    Order(Vec<String>),
    /// One entry per blank; `None` while the blank is empty.
    Blanks(Vec<Option<String>>),
    /// Word to the match the learner connected it to.
    Matches(BTreeMap<String, String>),
}

impl Response {
    /// Returns the empty response matching a question archetype.
    #[must_use]
    pub fn empty_for(kind: &QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleChoice { .. }
            | QuestionKind::MultipleChoice { .. }
            | QuestionKind::ImageChoice { .. }
            | QuestionKind::TrueFalse { .. } => Self::Choice(BTreeSet::new()),
            QuestionKind::DragDrop { .. } => Self::Placement(BucketMapping::new()),
            QuestionKind::Numeric { .. } => Self::Numeric(None),
            QuestionKind::OrderList { .. } => Self::Order(Vec::new()),
            QuestionKind::FillBlank { template, .. } => {
                Self::Blanks(vec![None; crate::evaluation::sequence::blank_answers(template).len()])
            }
            QuestionKind::MatchWords { .. } => Self::Matches(BTreeMap::new()),
        }
    }

    /// Returns `true` if the learner has not entered anything yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Choice(selected) => selected.is_empty(),
            Self::Numeric(value) => value.is_none(),
            Self::Placement(mapping) => mapping.values().all(Vec::is_empty),
            Self::Order(items) => items.is_empty(),
            Self::Blanks(blanks) => blanks.iter().all(Option::is_none),
            Self::Matches(connections) => connections.is_empty(),
        }
    }

    /// Returns a short name of the response shape for diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Choice(_) => "choice",
            Self::Numeric(_) => "numeric",
            Self::Placement(_) => "placement",
            Self::Order(_) => "order",
            Self::Blanks(_) => "blanks",
            Self::Matches(_) => "matches",
        }
    }

    /// Flattens the response into display strings, for submission records.
    #[must_use]
    pub fn to_answer_texts(&self) -> Vec<String> {
        match self {
            Self::Choice(selected) => selected.iter().cloned().collect(),
            Self::Numeric(value) => value.iter().map(ToString::to_string).collect(),
            Self::Placement(mapping) => mapping
                .iter()
                .flat_map(|(bucket, items)| {
                    items.iter().map(move |item| format!("{item} -> {bucket}"))
                })
                .collect(),
            Self::Order(items) => items.clone(),
            Self::Blanks(blanks) => blanks
                .iter()
                .map(|blank| blank.clone().unwrap_or_default())
                .collect(),
            Self::Matches(connections) => connections
                .iter()
                .map(|(word, matched)| format!("{word} -> {matched}"))
                .collect(),
        }
    }
}

/// Parses learner-typed numeric text.
///
/// Surrounding whitespace is ignored and a decimal comma is accepted.
/// Anything that is not a finite number yields `None`, which keeps the
/// question unsubmittable rather than grading garbage.
///
/// # Examples
///
/// ```
/// use lesson_player::parse_numeric_input;
///
/// assert_eq!(parse_numeric_input(" 42 "), Some(42.0));
/// assert_eq!(parse_numeric_input("3,5"), Some(3.5));
/// assert_eq!(parse_numeric_input("-0.25"), Some(-0.25));
/// assert_eq!(parse_numeric_input("abc"), None);
/// assert_eq!(parse_numeric_input("inf"), None);
/// ```
#[must_use]
pub fn parse_numeric_input(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
