//! Markdown report generation.
//!
//! [`MarkdownGenerator`] converts a [`SessionReport`] into a Markdown
//! document with:
//!
//! - A summary table with progress and score
//! - A results table with one row per assessment
//! - A review list of questions that were missed or revealed
//! - A timeline of submits and reveals
//!
//! # Example
//!
//! ```rust
//! use lesson_report::{MarkdownGenerator, SessionReport};
//!
//! let report = SessionReport {
//!     module_name: "Fractions".to_string(),
//!     ..SessionReport::default()
//! };
//!
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("# Lesson Report: Fractions"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::{QuestionOutcome, QuestionResult, SessionReport, TimelineEntry};

/// Longest answer shown in the results table before truncation.
const MAX_ANSWER_DISPLAY_LENGTH: usize = 60;

/// Generates Markdown reports from lesson sessions.
pub struct MarkdownGenerator<'a> {
    report: &'a SessionReport,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a SessionReport) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown report, ending with a footer that
    /// carries the generation time.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = self.generate_body();
        Self::write_footer(&mut output);
        output
    }

    /// Generates every section except the footer.
    fn generate_body(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_questions(&mut output);
        self.write_review(&mut output);
        self.write_timeline(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "# Lesson Report: {}\n",
            escape_markdown(&self.report.module_name)
        );
    }

    /// Writes the summary section with metrics table.
    fn write_summary(&self, output: &mut String) {
        let summary = &self.report.summary;

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(output, "| Status | {} |", summary.status.description());
        let _ = writeln!(
            output,
            "| Slides | {} of {} completed |",
            summary.slides_completed, summary.slides_total
        );
        let _ = writeln!(
            output,
            "| Score | {}% ({} of {} correct) |",
            summary.score_percent, summary.correct, summary.assessments_total
        );
        let _ = writeln!(
            output,
            "| First try | {} |",
            summary.first_try_correct
        );
        let _ = writeln!(output, "| Revealed | {} |", summary.revealed);
        let _ = writeln!(
            output,
            "| Duration | {} |",
            format_duration(summary.duration_seconds)
        );
        let _ = writeln!(output);
    }

    /// Writes the per-question results table.
    fn write_questions(&self, output: &mut String) {
        let _ = writeln!(output, "## Questions\n");

        if self.report.questions.is_empty() {
            let _ = writeln!(output, "*This module has no assessments.*\n");
            return;
        }

        let _ = writeln!(output, "| Slide | Question | Type | Attempts | Result | Answer |");
        let _ = writeln!(output, "|-------|----------|------|----------|--------|--------|");

        for question in &self.report.questions {
            Self::write_question_row(output, question);
        }

        let _ = writeln!(output);
    }

    fn write_question_row(output: &mut String, question: &QuestionResult) {
        let slide = question.slide_index + 1;
        let title = question_label(question);
        let archetype = escape_markdown(&question.archetype);
        let attempts = question.attempts;
        let result = outcome_icon(question.outcome());
        let answer = escape_markdown(&truncate_answer(
            &question.final_answer.join(", "),
            MAX_ANSWER_DISPLAY_LENGTH,
        ));
        let _ = writeln!(
            output,
            "| {slide} | {title} | {archetype} | {attempts} | {result} | {answer} |"
        );
    }

    /// Writes the list of questions worth revisiting.
    fn write_review(&self, output: &mut String) {
        let _ = writeln!(output, "## Needs Review\n");

        let missed = self.report.missed_questions();
        if missed.is_empty() {
            let _ = writeln!(output, "*Nothing to review.*\n");
            return;
        }

        for question in missed {
            let reason = match question.outcome() {
                QuestionOutcome::Unanswered => "not answered",
                QuestionOutcome::Incorrect => "answered incorrectly",
                QuestionOutcome::Revealed => "answer was revealed",
                QuestionOutcome::Correct => continue,
            };
            let _ = writeln!(
                output,
                "- Slide {}: {} ({reason})",
                question.slide_index + 1,
                question_label(question)
            );
        }

        let _ = writeln!(output);
    }

    /// Writes the timeline section.
    fn write_timeline(&self, output: &mut String) {
        let _ = writeln!(output, "## Timeline\n");

        if self.report.timeline.is_empty() {
            let _ = writeln!(output, "*No timeline events recorded.*\n");
            return;
        }

        let _ = writeln!(output, "| Time | Slide | Event | Details |");
        let _ = writeln!(output, "|------|-------|-------|---------|");

        for entry in &self.report.timeline {
            Self::write_timeline_entry(output, entry);
        }

        let _ = writeln!(output);
    }

    fn write_timeline_entry(output: &mut String, entry: &TimelineEntry) {
        let details = entry
            .details
            .as_deref()
            .map(escape_markdown)
            .unwrap_or_default();
        let slide = entry
            .slide_index
            .map_or_else(|| "-".to_string(), |index| (index + 1).to_string());

        let time = format_timestamp(&entry.timestamp);
        let event = escape_markdown(&entry.event);
        let _ = writeln!(output, "| {time} | {slide} | {event} | {details} |");
    }

    fn write_footer(output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&Utc::now());
        let _ = writeln!(output, "*Generated by Lesson Player at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a duration in seconds to a human-readable string.
///
/// Examples:
/// - 65 seconds -> "1m 5s"
/// - 3661 seconds -> "1h 1m 1s"
/// - 45 seconds -> "45s"
fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    parts.join(" ")
}

/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Title of a question, or "Question {id}" when it has none.
fn question_label(question: &QuestionResult) -> String {
    if question.title.trim().is_empty() {
        format!("Question {}", question.question_id)
    } else {
        escape_markdown(&question.title)
    }
}

/// Uses HTML entities so the icons survive every Markdown renderer.
fn outcome_icon(outcome: QuestionOutcome) -> String {
    let icon = match outcome {
        QuestionOutcome::Correct => "&#9989;",
        QuestionOutcome::Incorrect => "&#10060;",
        QuestionOutcome::Revealed => "&#128065;",
        QuestionOutcome::Unanswered => "&#11036;",
    };
    format!("{icon} {}", outcome.label())
}

/// Escapes special Markdown characters in text.
///
/// This prevents learner answers from being interpreted as Markdown
/// formatting or breaking table rows.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push_str("<br>"),
            _ => result.push(ch),
        }
    }

    result
}

/// Truncates an answer to `max_length` bytes on a char boundary, adding an
/// ellipsis if anything was cut.
fn truncate_answer(answer: &str, max_length: usize) -> String {
    if answer.len() <= max_length {
        return answer.to_string();
    }
    let truncate_at = answer
        .char_indices()
        .take_while(|(idx, _)| *idx < max_length)
        .last()
        .map_or(0, |(idx, c)| idx + c.len_utf8());
    format!("{}...", &answer[..truncate_at])
}

// ============================================================================
// Tests
// ============================================================================
