//! Lesson Session Reports
//!
//! This crate turns the outcome of a lesson session into a report. Reports
//! can be serialized to JSON for programmatic access or rendered to Markdown
//! for instructors and learners.
//!
//! The crate does not depend on the player. Callers mirror their session
//! into a plain [`ReportInput`] and hand it to [`ReportGenerator`].
//!
//! # Types
//!
//! - [`SessionReport`] - The complete report
//! - [`ReportSummary`] - Progress and score figures
//! - [`QuestionResult`] - Outcome of one assessment
//! - [`TimelineEntry`] - A timestamped event from the session
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Generate JSON reports with compact or pretty formatting
//! - [`MarkdownGenerator`] - Generate human-readable Markdown reports
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use lesson_report::{AttemptInput, QuestionInput, ReportGenerator, ReportInput};
//! use lesson_report::json::JsonGenerator;
//!
//! let now = Utc::now();
//! let input = ReportInput {
//!     module_name: "Primary colours".to_string(),
//!     started_at: now,
//!     finished_at: now,
//!     slides_total: 3,
//!     slides_completed: 3,
//!     questions: vec![QuestionInput::new(20, 1, "multiple choice")],
//!     attempts: vec![AttemptInput::submitted(20, 1, true, vec!["A".to_string()], now)],
//! };
//!
//! let report = ReportGenerator::new(input).generate().unwrap();
//! assert_eq!(report.summary.correct, 1);
//!
//! let json = JsonGenerator::new(&report).generate_pretty().unwrap();
//! assert!(json.contains("\"module_name\""));
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Session Status
// ============================================================================

/// Overall state of the session when the report was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Only the first slide has been seen and nothing was answered.
    #[default]
    NotStarted,
    /// Some slides are still incomplete.
    InProgress,
    /// Every slide is completed.
    Completed,
}

impl SessionStatus {
    /// Derives the status from progress figures.
    #[must_use]
    pub const fn from_progress(
        slides_total: usize,
        slides_completed: usize,
        answered: usize,
    ) -> Self {
        if slides_total > 0 && slides_completed >= slides_total {
            Self::Completed
        } else if slides_completed > 1 || answered > 0 {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }

    /// Returns `true` if the module was finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns a human-readable description of the status.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Module completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// SessionReport
// ============================================================================

/// Complete report of one lesson session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Name of the module that was played.
    pub module_name: String,

    /// Progress and score figures.
    pub summary: ReportSummary,

    /// One entry per assessment, in slide order.
    pub questions: Vec<QuestionResult>,

    /// Chronological timeline of events.
    pub timeline: Vec<TimelineEntry>,
}

impl SessionReport {
    /// Serializes the report to JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }

    /// Returns the questions that were not answered correctly, revealed
    /// ones included.
    #[must_use]
    pub fn missed_questions(&self) -> Vec<&QuestionResult> {
        self.questions
            .iter()
            .filter(|q| q.outcome() != QuestionOutcome::Correct)
            .collect()
    }
}

// ============================================================================
// ReportSummary
// ============================================================================

/// Progress and score figures of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Overall status.
    pub status: SessionStatus,

    /// Number of playable slides.
    pub slides_total: usize,

    /// Number of completed slides.
    pub slides_completed: usize,

    /// Number of assessment slides.
    pub assessments_total: usize,

    /// Assessments submitted at least once.
    pub answered: usize,

    /// Assessments whose latest submit was correct.
    pub correct: usize,

    /// Assessments answered correctly on the first submit.
    pub first_try_correct: usize,

    /// Assessments whose answer was revealed.
    pub revealed: usize,

    /// `correct` as a whole percentage of `assessments_total`.
    pub score_percent: u32,

    /// Session length in seconds.
    pub duration_seconds: u64,
}

// ============================================================================
// QuestionResult
// ============================================================================

/// Final outcome of one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// Never submitted or revealed.
    Unanswered,
    /// Latest submit was correct.
    Correct,
    /// Latest submit was incorrect.
    Incorrect,
    /// The answer was revealed and never submitted correctly afterwards.
    Revealed,
}

impl QuestionOutcome {
    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unanswered => "Unanswered",
            Self::Correct => "Correct",
            Self::Incorrect => "Incorrect",
            Self::Revealed => "Revealed",
        }
    }
}

impl std::fmt::Display for QuestionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of one assessment in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Question identifier.
    pub question_id: u64,

    /// Index of the slide holding the question.
    pub slide_index: usize,

    /// Question title, possibly empty.
    pub title: String,

    /// Archetype name, e.g. "multiple choice".
    pub archetype: String,

    /// Number of submits.
    pub attempts: u32,

    /// Correctness of the latest submit, `None` if never submitted.
    pub correct: Option<bool>,

    /// Whether the answer was revealed.
    pub revealed: bool,

    /// Whether the first submit was correct.
    pub first_try_correct: bool,

    /// The learner's latest answer, flattened for display.
    pub final_answer: Vec<String>,
}

impl QuestionResult {
    /// Returns the final outcome.
    #[must_use]
    pub const fn outcome(&self) -> QuestionOutcome {
        match (self.correct, self.revealed) {
            (Some(true), _) => QuestionOutcome::Correct,
            (_, true) => QuestionOutcome::Revealed,
            (Some(false), false) => QuestionOutcome::Incorrect,
            (None, false) => QuestionOutcome::Unanswered,
        }
    }
}

// ============================================================================
// TimelineEntry
// ============================================================================

/// A timestamped event in the session timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Slide the event happened on, if any.
    pub slide_index: Option<usize>,

    /// Short description of the event.
    pub event: String,

    /// Optional additional details about the event.
    pub details: Option<String>,
}

impl TimelineEntry {
    /// Creates a timeline entry stamped with the current time.
    #[must_use]
    pub fn new(slide_index: Option<usize>, event: impl Into<String>) -> Self {
        Self::at_time(Utc::now(), slide_index, event)
    }

    /// Creates a timeline entry with a specific timestamp.
    #[must_use]
    pub fn at_time(
        timestamp: DateTime<Utc>,
        slide_index: Option<usize>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            slide_index,
            event: event.into(),
            details: None,
        }
    }

    /// Adds details to the entry.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ============================================================================
// ReportInput
// ============================================================================

/// An assessment as seen by the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInput {
    /// Question identifier.
    pub question_id: u64,
    /// Index of the slide holding the question.
    pub slide_index: usize,
    /// Question title.
    pub title: String,
    /// Archetype name.
    pub archetype: String,
}

impl QuestionInput {
    /// Creates an untitled question input.
    #[must_use]
    pub fn new(question_id: u64, slide_index: usize, archetype: impl Into<String>) -> Self {
        Self {
            question_id,
            slide_index,
            title: String::new(),
            archetype: archetype.into(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A submit or reveal as seen by the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptInput {
    /// Question that was answered.
    pub question_id: u64,
    /// Submit count at the time of the attempt.
    pub attempt: u32,
    /// Verdict of the submit; `false` for reveals.
    pub is_correct: bool,
    /// Whether this is a reveal.
    pub revealed: bool,
    /// The learner's answer, flattened for display.
    pub answer: Vec<String>,
    /// When the attempt happened.
    pub timestamp: DateTime<Utc>,
}

impl AttemptInput {
    /// Creates a submit attempt.
    #[must_use]
    pub const fn submitted(
        question_id: u64,
        attempt: u32,
        is_correct: bool,
        answer: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            attempt,
            is_correct,
            revealed: false,
            answer,
            timestamp,
        }
    }

    /// Creates a reveal.
    #[must_use]
    pub const fn revealed(
        question_id: u64,
        attempt: u32,
        answer: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            attempt,
            is_correct: false,
            revealed: true,
            answer,
            timestamp,
        }
    }
}

/// Plain-data snapshot of a session, the input of [`ReportGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInput {
    /// Module name.
    pub module_name: String,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session state last changed.
    pub finished_at: DateTime<Utc>,
    /// Number of playable slides.
    pub slides_total: usize,
    /// Number of completed slides.
    pub slides_completed: usize,
    /// Every assessment, in slide order.
    pub questions: Vec<QuestionInput>,
    /// Every submit and reveal, in chronological order.
    pub attempts: Vec<AttemptInput>,
}

// ============================================================================
// ReportGenerator
// ============================================================================

/// Builds a [`SessionReport`] from a [`ReportInput`].
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    input: ReportInput,
}

impl ReportGenerator {
    /// Creates a generator for the given input.
    #[must_use]
    pub const fn new(input: ReportInput) -> Self {
        Self { input }
    }

    /// Generates the report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if the session ends before it
    /// starts, more slides are completed than exist, or an attempt refers to
    /// an unknown question.
    pub fn generate(&self) -> Result<SessionReport> {
        self.validate()?;

        let questions: Vec<QuestionResult> = self
            .input
            .questions
            .iter()
            .map(|question| self.question_result(question))
            .collect();

        let count = |f: fn(&QuestionResult) -> bool| questions.iter().filter(|q| f(q)).count();
        let answered = count(|q| q.attempts > 0);
        let correct = count(|q| q.correct == Some(true));
        let assessments_total = questions.len();

        let summary = ReportSummary {
            status: SessionStatus::from_progress(
                self.input.slides_total,
                self.input.slides_completed,
                answered,
            ),
            slides_total: self.input.slides_total,
            slides_completed: self.input.slides_completed,
            assessments_total,
            answered,
            correct,
            first_try_correct: count(|q| q.first_try_correct),
            revealed: count(|q| q.revealed),
            score_percent: score_percent(correct, assessments_total),
            duration_seconds: self.duration_seconds(),
        };

        Ok(SessionReport {
            module_name: self.input.module_name.clone(),
            summary,
            questions,
            timeline: self.timeline(),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.input.finished_at < self.input.started_at {
            return Err(ReportError::InvalidData(
                "session finishes before it starts".to_string(),
            ));
        }
        if self.input.slides_completed > self.input.slides_total {
            return Err(ReportError::InvalidData(format!(
                "{} slides completed out of {}",
                self.input.slides_completed, self.input.slides_total
            )));
        }
        if let Some(attempt) = self.input.attempts.iter().find(|attempt| {
            !self
                .input
                .questions
                .iter()
                .any(|q| q.question_id == attempt.question_id)
        }) {
            return Err(ReportError::InvalidData(format!(
                "attempt refers to unknown question {}",
                attempt.question_id
            )));
        }
        Ok(())
    }

    fn question_result(&self, question: &QuestionInput) -> QuestionResult {
        let attempts: Vec<&AttemptInput> = self
            .input
            .attempts
            .iter()
            .filter(|attempt| attempt.question_id == question.question_id)
            .collect();

        let submits: Vec<&AttemptInput> = attempts
            .iter()
            .copied()
            .filter(|attempt| !attempt.revealed)
            .collect();
        // A reveal before the first submit means the learner saw the answer.
        let first_try_correct = attempts
            .first()
            .is_some_and(|first| !first.revealed && first.is_correct);

        QuestionResult {
            question_id: question.question_id,
            slide_index: question.slide_index,
            title: question.title.clone(),
            archetype: question.archetype.clone(),
            attempts: u32::try_from(submits.len()).unwrap_or(u32::MAX),
            correct: submits.last().map(|attempt| attempt.is_correct),
            revealed: attempts.iter().any(|attempt| attempt.revealed),
            first_try_correct,
            final_answer: attempts
                .last()
                .map(|attempt| attempt.answer.clone())
                .unwrap_or_default(),
        }
    }

    fn timeline(&self) -> Vec<TimelineEntry> {
        let mut timeline = vec![TimelineEntry::at_time(
            self.input.started_at,
            None,
            "Session started",
        )];

        for attempt in &self.input.attempts {
            let slide_index = self
                .input
                .questions
                .iter()
                .find(|q| q.question_id == attempt.question_id)
                .map(|q| q.slide_index);
            let event = if attempt.revealed {
                format!("Answer revealed for question {}", attempt.question_id)
            } else if attempt.is_correct {
                format!(
                    "Question {} answered correctly (attempt {})",
                    attempt.question_id, attempt.attempt
                )
            } else {
                format!(
                    "Question {} answered incorrectly (attempt {})",
                    attempt.question_id, attempt.attempt
                )
            };
            let mut entry = TimelineEntry::at_time(attempt.timestamp, slide_index, event);
            if !attempt.answer.is_empty() {
                entry = entry.with_details(attempt.answer.join(", "));
            }
            timeline.push(entry);
        }

        timeline.push(
            TimelineEntry::at_time(self.input.finished_at, None, "Report generated").with_details(
                format!(
                    "{} of {} slides completed",
                    self.input.slides_completed, self.input.slides_total
                ),
            ),
        );
        timeline
    }

    fn duration_seconds(&self) -> u64 {
        let elapsed = self.input.finished_at - self.input.started_at;
        u64::try_from(elapsed.num_seconds()).unwrap_or(0)
    }
}

/// Rounds `correct / total` down to a whole percentage; 0 when there is
/// nothing to score.
fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from(correct * 100 / total).unwrap_or(100)
}

// ============================================================================
// Tests
// ============================================================================
