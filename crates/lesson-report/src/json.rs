//! JSON report generation.
//!
//! [`JsonGenerator`] serializes a [`SessionReport`] as compact single-line
//! JSON or pretty-printed for human readability.
//!
//! # Example
//!
//! ```rust
//! use lesson_report::SessionReport;
//! use lesson_report::json::JsonGenerator;
//!
//! let report = SessionReport::default();
//! let generator = JsonGenerator::new(&report);
//!
//! let compact = generator.generate().unwrap();
//! assert!(!compact.contains('\n'));
//!
//! let pretty = generator.generate_pretty().unwrap();
//! assert!(pretty.contains("  \"summary\""));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{ReportError, Result, SessionReport};

/// JSON report generator.
pub struct JsonGenerator<'a> {
    report: &'a SessionReport,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a SessionReport) -> Self {
        Self { report }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes the JSON report to a file, creating or overwriting it.
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    /// Returns [`ReportError::Io`] if file creation or writing fails.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lesson_report::{SessionReport, json::JsonGenerator};
    /// use std::path::Path;
    ///
    /// let report = SessionReport::default();
    /// JsonGenerator::new(&report)
    ///     .write_to_file(Path::new("lesson-report.json"), true)
    ///     .unwrap();
    /// ```
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{QuestionResult, ReportSummary, SessionStatus, TimelineEntry};

    fn sample_report() -> SessionReport {
        SessionReport {
            module_name: "Fractions".to_string(),
            summary: ReportSummary {
                status: SessionStatus::Completed,
                slides_total: 4,
                slides_completed: 4,
                assessments_total: 1,
                answered: 1,
                correct: 1,
                first_try_correct: 1,
                revealed: 0,
                score_percent: 100,
                duration_seconds: 42,
            },
            questions: vec![QuestionResult {
                question_id: 7,
                slide_index: 2,
                title: "Halves".to_string(),
                archetype: "numerical".to_string(),
                attempts: 1,
                correct: Some(true),
                revealed: false,
                first_try_correct: true,
                final_answer: vec!["0.5".to_string()],
            }],
            timeline: vec![TimelineEntry::new(None, "Session started")],
        }
    }

    #[test]
    fn test_generate_compact_json() {
        let report = sample_report();
        let json = JsonGenerator::new(&report).generate().unwrap();

        assert!(!json.contains('\n'));
        assert!(json.contains(r#""module_name":"Fractions""#));
        assert!(json.contains(r#""status":"completed""#));
        assert!(json.contains(r#""score_percent":100"#));
    }

    #[test]
    fn test_json_contains_all_top_level_fields() {
        let report = sample_report();
        let json = JsonGenerator::new(&report).generate_pretty().unwrap();

        assert!(json.contains("\"module_name\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"questions\""));
        assert!(json.contains("\"timeline\""));
    }

    #[test]
    fn test_json_question_fields() {
        let report = sample_report();
        let value: serde_json::Value =
            serde_json::from_str(&JsonGenerator::new(&report).generate().unwrap()).unwrap();

        let question = &value["questions"][0];
        assert_eq!(question["question_id"], 7);
        assert_eq!(question["archetype"], "numerical");
        assert_eq!(question["correct"], true);
        assert_eq!(question["final_answer"][0], "0.5");
        assert!(value["timeline"][0]["slide_index"].is_null());
    }

    #[test]
    fn test_write_to_file() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson-report.json");

        JsonGenerator::new(&report).write_to_file(&path, true).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains('\n'));
        let parsed: SessionReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.questions, report.questions);
    }

    #[test]
    fn test_write_to_file_compact() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson-report.min.json");

        JsonGenerator::new(&report).write_to_file(&path, false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains('\n'));
    }

    #[test]
    fn test_write_to_file_invalid_path() {
        let report = sample_report();
        let result = JsonGenerator::new(&report)
            .write_to_file(Path::new("/nonexistent/dir/report.json"), true);

        assert!(matches!(result.unwrap_err(), ReportError::Io(_)));
    }
}
