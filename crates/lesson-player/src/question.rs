//! Question payloads for assessment slides.
//!
//! Each archetype is a variant of [`QuestionKind`] carrying only the fields
//! its evaluation needs. Payloads come from the content source and are
//! read-only for the whole session; they are validated lazily, when the
//! evaluation engine first needs them, so that one malformed question does
//! not prevent the rest of a module from being played.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// QuizMode
// ============================================================================

/// Whether a question is practised or graded.
///
/// Practice mode allows revealing the answer and retrying; graded mode
/// records the first submission and suppresses both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizMode {
    /// Reveal and retry are allowed (default).
    #[default]
    Practice,
    /// Reveal and retry are suppressed.
    Graded,
}

impl QuizMode {
    /// Parses a string into a `QuizMode`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "practice" => Some(Self::Practice),
            "graded" | "quiz" => Some(Self::Graded),
            _ => None,
        }
    }

    /// Returns `true` if the learner may reveal the answer in this mode.
    #[must_use]
    pub const fn allows_reveal(self) -> bool {
        matches!(self, Self::Practice)
    }

    /// Returns `true` if the learner may retry after submitting in this mode.
    #[must_use]
    pub const fn allows_retry(self) -> bool {
        matches!(self, Self::Practice)
    }

    /// Returns the canonical lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Graded => "graded",
        }
    }
}

impl std::fmt::Display for QuizMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuizMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid quiz mode '{s}': expected one of 'practice', 'graded'"
            ))
        })
    }
}

impl Serialize for QuizMode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// NumericOperator
// ============================================================================

/// Comparison applied between the learner's value and the expected value.
///
/// Operators arrive as raw strings in question payloads and are parsed at
/// evaluation time; an unrecognized symbol is a content error, never a
/// silent fallback to equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericOperator {
    /// Entered value is strictly greater than expected.
    Gt,
    /// Entered value is greater than or equal to expected.
    Gte,
    /// Entered value is strictly less than expected.
    Lt,
    /// Entered value is less than or equal to expected.
    Lte,
    /// Entered value equals expected (within tolerance).
    Eq,
    /// Entered value differs from expected (beyond tolerance).
    Neq,
}

impl NumericOperator {
    /// Every recognized operator, in declaration order.
    pub const ALL: [Self; 6] = [Self::Gt, Self::Gte, Self::Lt, Self::Lte, Self::Eq, Self::Neq];

    /// Parses one of the six recognized operator symbols.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::NumericOperator;
    ///
    /// assert_eq!(NumericOperator::parse("gte"), Some(NumericOperator::Gte));
    /// assert_eq!(NumericOperator::parse(" NEQ "), Some(NumericOperator::Neq));
    /// assert_eq!(NumericOperator::parse("approx"), None);
    /// ```
    #[must_use]
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim().to_lowercase().as_str() {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            _ => None,
        }
    }

    /// Returns the operator's symbol as used in question payloads.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Neq => "neq",
        }
    }

    /// Applies the comparison `value <op> expected`.
    ///
    /// `tolerance` widens equality for `eq`/`neq` and the inclusive bounds of
    /// `gte`/`lte`, absorbing float noise such as `0.1 + 0.2`.
    #[must_use]
    pub fn apply(self, value: f64, expected: f64, tolerance: f64) -> bool {
        let equal = (value - expected).abs() <= tolerance;
        match self {
            Self::Gt => value > expected && !equal,
            Self::Gte => value > expected || equal,
            Self::Lt => value < expected && !equal,
            Self::Lte => value < expected || equal,
            Self::Eq => equal,
            Self::Neq => !equal,
        }
    }
}

impl std::fmt::Display for NumericOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Options and pairs
// ============================================================================

/// A selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    /// Unique identifier of the option within its question.
    pub id: String,

    /// Label shown to the learner.
    #[serde(default)]
    pub text: String,

    /// Image shown instead of (or beside) the label for image choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChoiceOption {
    /// Creates a text option whose label equals its identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
            image_url: None,
        }
    }
}

/// A word and the match it must be connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    /// The word on the left-hand column.
    pub word: String,
    /// The correct partner on the right-hand column.
    pub matches: String,
}

// ============================================================================
// QuestionKind
// ============================================================================

/// Archetype-specific answer key.
///
/// Correct-answer fields are optional at the type level because content
/// sources do ship incomplete questions; the evaluation engine rejects them
/// with an unsupported-configuration error instead of grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuestionKind {
    /// Exactly one option is correct.
    SingleChoice {
        /// Offered options.
        options: Vec<ChoiceOption>,
        /// Identifier of the correct option.
        #[serde(default)]
        correct: Option<String>,
    },

    /// Any non-empty subset of options is correct.
    MultipleChoice {
        /// Offered options.
        options: Vec<ChoiceOption>,
        /// Identifiers of the correct options.
        #[serde(default)]
        correct: Vec<String>,
    },

    /// Choice among images; single- or multi-select.
    ImageChoice {
        /// Offered options; each should carry an `image_url`.
        options: Vec<ChoiceOption>,
        /// Identifiers of the correct options.
        #[serde(default)]
        correct: Vec<String>,
        /// Whether more than one option may be selected.
        #[serde(default)]
        multiple: bool,
    },

    /// A statement judged true or false.
    TrueFalse {
        /// The correct judgement.
        #[serde(default)]
        correct: Option<bool>,
    },

    /// Items dragged into labelled buckets.
    DragDrop {
        /// Expected bucket label to item identifiers.
        buckets: BTreeMap<String, Vec<String>>,
    },

    /// A number compared against an expected value.
    Numeric {
        /// Expected value.
        #[serde(default)]
        expected: Option<f64>,
        /// Raw operator symbol; one of `gt`, `gte`, `lt`, `lte`, `eq`, `neq`.
        #[serde(default)]
        operator: Option<String>,
    },

    /// Items to be arranged in the listed order.
    OrderList {
        /// Items in their correct order.
        items: Vec<String>,
    },

    /// Text whose `[bracketed]` words are blanks to be filled.
    FillBlank {
        /// Template text, e.g. `"The [sun] rises in the [east]."`.
        template: String,
        /// Extra words offered alongside the correct ones.
        #[serde(default)]
        distractors: Vec<String>,
    },

    /// Words connected to their matches.
    MatchWords {
        /// Word and match pairs.
        pairs: Vec<MatchPair>,
    },
}

impl QuestionKind {
    /// Returns a stable, human-readable archetype name.
    #[must_use]
    pub const fn archetype(&self) -> &'static str {
        match self {
            Self::SingleChoice { .. } => "single choice",
            Self::MultipleChoice { .. } => "multiple choice",
            Self::ImageChoice { .. } => "image choice",
            Self::TrueFalse { .. } => "true or false",
            Self::DragDrop { .. } => "drag and drop",
            Self::Numeric { .. } => "numerical",
            Self::OrderList { .. } => "order list",
            Self::FillBlank { .. } => "fill in the blank",
            Self::MatchWords { .. } => "match the words",
        }
    }

    /// Returns the offered choice options for choice archetypes.
    #[must_use]
    pub fn options(&self) -> Option<&[ChoiceOption]> {
        match self {
            Self::SingleChoice { options, .. }
            | Self::MultipleChoice { options, .. }
            | Self::ImageChoice { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Returns `true` if the learner picks from a fixed option set.
    #[must_use]
    pub const fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::SingleChoice { .. }
                | Self::MultipleChoice { .. }
                | Self::ImageChoice { .. }
                | Self::TrueFalse { .. }
        )
    }

    /// Returns `true` if at most one option may be selected at a time.
    #[must_use]
    pub const fn is_single_select(&self) -> bool {
        matches!(
            self,
            Self::SingleChoice { .. }
                | Self::TrueFalse { .. }
                | Self::ImageChoice {
                    multiple: false,
                    ..
                }
        )
    }
}

// ============================================================================
// Question
// ============================================================================

/// An assessment question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the module.
    pub id: u64,

    /// Short title shown above the question.
    #[serde(default)]
    pub title: String,

    /// Prompt text.
    #[serde(default)]
    pub text: String,

    /// Explanation shown after feedback or reveal.
    #[serde(default)]
    pub explanation: String,

    /// Practice or graded.
    #[serde(default)]
    pub quiz_mode: QuizMode,

    /// Archetype and answer key.
    pub kind: QuestionKind,
}

impl Question {
    /// Creates a practice-mode question with empty prompt text.
    #[must_use]
    pub fn new(id: u64, kind: QuestionKind) -> Self {
        Self {
            id,
            title: String::new(),
            text: String::new(),
            explanation: String::new(),
            quiz_mode: QuizMode::Practice,
            kind,
        }
    }

    /// Sets the quiz mode.
    #[must_use]
    pub const fn with_quiz_mode(mut self, quiz_mode: QuizMode) -> Self {
        self.quiz_mode = quiz_mode;
        self
    }

    /// Sets the explanation text.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}
