//! Player configuration.
//!
//! Loaded from `lesson.json`; every field has a default so an empty object
//! (or a missing file) yields a usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::content::DEFAULT_MAX_MODULE_SIZE_KB;
use crate::error::{PlayerError, Result};
use crate::evaluation::EvaluationOptions;
use crate::question::QuizMode;

/// The default config file name.
const CONFIG_FILE_NAME: &str = "lesson.json";

/// Default absolute tolerance for numeric equality.
const fn default_numeric_tolerance() -> f64 {
    1e-9
}

/// Default maximum module file size in kilobytes.
const fn default_max_module_size_kb() -> u64 {
    DEFAULT_MAX_MODULE_SIZE_KB
}

/// Default output directory for reports.
fn default_output_dir() -> String {
    ".".to_string()
}

/// Configuration for a lesson session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Overrides the quiz mode of every question when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_mode: Option<QuizMode>,

    /// Lets learners advance past assessments they have not completed.
    #[serde(default)]
    pub skip_assessments: bool,

    /// Compares fill-in-the-blank answers case-sensitively.
    #[serde(default)]
    pub case_sensitive_blanks: bool,

    /// Absolute tolerance for numeric equality.
    #[serde(default = "default_numeric_tolerance")]
    pub numeric_tolerance: f64,

    /// Largest module file accepted, in kilobytes.
    #[serde(default = "default_max_module_size_kb")]
    pub max_module_size_kb: u64,

    /// Output directory for generated reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            quiz_mode: None,
            skip_assessments: false,
            case_sensitive_blanks: false,
            numeric_tolerance: default_numeric_tolerance(),
            max_module_size_kb: default_max_module_size_kb(),
            output_dir: default_output_dir(),
        }
    }
}

impl PlayerConfig {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `lesson.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            PlayerError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `lesson.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::ConfigParseError` if the file exists but contains
    /// invalid JSON or an invalid quiz mode.
    ///
    /// Returns `PlayerError::ConfigValidationError` if a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(PlayerError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PlayerError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `numeric_tolerance` must be finite and not negative
    /// - `max_module_size_kb` must be greater than 0
    /// - `output_dir` must not be empty
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if !self.numeric_tolerance.is_finite() || self.numeric_tolerance < 0.0 {
            return Err(PlayerError::config_validation(
                format!(
                    "numericTolerance must be a finite, non-negative number (got {})",
                    self.numeric_tolerance
                ),
                "Set numericTolerance to a small value such as 0.000001 in your lesson.json",
            ));
        }

        if self.max_module_size_kb == 0 {
            return Err(PlayerError::config_validation(
                "maxModuleSizeKb must be greater than 0",
                "Set maxModuleSizeKb to at least 1 in your lesson.json",
            ));
        }

        if self.output_dir.trim().is_empty() {
            return Err(PlayerError::config_validation(
                "outputDir must not be empty",
                "Provide a valid output directory path in your lesson.json (use '.' for current directory)",
            ));
        }

        Ok(())
    }

    /// Returns the quiz mode that applies to a question.
    #[must_use]
    pub fn effective_quiz_mode(&self, question_mode: QuizMode) -> QuizMode {
        self.quiz_mode.unwrap_or(question_mode)
    }

    /// Returns the evaluation options derived from this configuration.
    #[must_use]
    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            numeric_tolerance: self.numeric_tolerance,
            case_sensitive_blanks: self.case_sensitive_blanks,
            feedback_visible: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = PlayerConfig::default();

        assert_eq!(config.quiz_mode, None);
        assert!(!config.skip_assessments);
        assert!(!config.case_sensitive_blanks);
        assert!((config.numeric_tolerance - 1e-9).abs() < f64::EPSILON);
        assert_eq!(config.max_module_size_kb, 512);
        assert_eq!(config.output_dir, ".");
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: PlayerConfig = serde_json::from_str(r"{}").unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_config_deserialization_with_overrides() {
        let json = r#"{
            "quizMode": "GRADED",
            "skipAssessments": true,
            "maxModuleSizeKb": 64
        }"#;
        let config: PlayerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.quiz_mode, Some(QuizMode::Graded));
        assert!(config.skip_assessments);
        assert_eq!(config.max_module_size_kb, 64);
        assert_eq!(config.output_dir, ".");
    }

    #[test]
    fn test_invalid_quiz_mode_error() {
        let result: std::result::Result<PlayerConfig, _> =
            serde_json::from_str(r#"{"quizMode": "exam"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid quiz mode"));
        assert!(err.contains("exam"));
    }

    #[test]
    fn test_effective_quiz_mode() {
        let config = PlayerConfig::default();
        assert_eq!(config.effective_quiz_mode(QuizMode::Graded), QuizMode::Graded);

        let config = PlayerConfig {
            quiz_mode: Some(QuizMode::Practice),
            ..PlayerConfig::default()
        };
        assert_eq!(config.effective_quiz_mode(QuizMode::Graded), QuizMode::Practice);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PlayerConfig {
            numeric_tolerance: -1.0,
            ..PlayerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlayerError::ConfigValidationError { .. })
        ));

        let config = PlayerConfig {
            numeric_tolerance: f64::INFINITY,
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PlayerConfig {
            max_module_size_kb: 0,
            ..PlayerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("maxModuleSizeKb"));

        let config = PlayerConfig {
            output_dir: "  ".to_string(),
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_valid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"caseSensitiveBlanks": true, "numericTolerance": 0.01}"#)
            .unwrap();

        let config = PlayerConfig::load_from_file(file.path()).unwrap();
        assert!(config.case_sensitive_blanks);
        assert!((config.numeric_tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.max_module_size_kb, 512);
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not valid json }").unwrap();

        let err = PlayerConfig::load_from_file(file.path()).unwrap_err();
        assert!(
            matches!(
                &err,
                PlayerError::ConfigParseError { path, message }
                    if path == file.path() && !message.is_empty()
            ),
            "Expected ConfigParseError with correct path, got: {err:?}"
        );
    }

    #[test]
    fn test_load_from_file_missing_uses_defaults() {
        let config = PlayerConfig::load_from_file(Path::new("/nonexistent/lesson.json")).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_load_from_dir_finds_lesson_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lesson.json"), r#"{"outputDir": "reports"}"#).unwrap();

        let config = PlayerConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.output_dir, "reports");
    }

    #[test]
    fn test_evaluation_options() {
        let config = PlayerConfig {
            case_sensitive_blanks: true,
            ..PlayerConfig::default()
        };
        let options = config.evaluation_options();
        assert!(options.case_sensitive_blanks);
        assert!(!options.feedback_visible);
    }
}
