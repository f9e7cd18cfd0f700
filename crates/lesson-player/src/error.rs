//! Error types for the lesson player.
//!
//! The core performs no network I/O, so the taxonomy is narrow: loading
//! errors for configuration and module files, malformed question
//! configurations surfaced at evaluation time, and policy rejections.
//! Out-of-range navigation is deliberately absent; it is a silent no-op.

use std::path::PathBuf;

/// A specialized `Result` type for lesson player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors that can occur while loading or playing a lesson.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your lesson.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Module Loading Errors
    // ========================================================================
    /// Module file was not found at the specified path.
    #[error("Module not found: '{path}'\n\nSuggestion: Check the module path passed to the player")]
    ModuleNotFound {
        /// Path where the module was expected.
        path: PathBuf,
    },

    /// Module file exceeds the configured size limit.
    #[error("Module exceeds size limit ({limit_kb}KB): '{path}' is {size_kb}KB\n\nSuggestion: Split the module or raise maxModuleSizeKb in lesson.json")]
    ModuleTooLarge {
        /// Path to the oversized module.
        path: PathBuf,
        /// Actual size in kilobytes.
        size_kb: u64,
        /// Configured limit in kilobytes.
        limit_kb: u64,
    },

    /// Module file is not valid module JSON.
    #[error("Invalid module file '{path}': {message}\n\nSuggestion: Re-export the module from the content source")]
    ModuleParseError {
        /// Path to the module file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Module content is structurally unusable.
    #[error("Invalid module: {message}")]
    InvalidModule {
        /// Description of the structural problem.
        message: String,
    },

    // ========================================================================
    // Evaluation Errors
    // ========================================================================
    /// The question's answer key cannot be evaluated.
    ///
    /// Raised instead of guessing a default so a learner is never mis-graded.
    #[error("Unsupported question configuration for question {question_id}: {reason}\n\nSuggestion: Fix the question in the content source")]
    UnsupportedQuestion {
        /// Identifier of the malformed question.
        question_id: u64,
        /// What is wrong with the question.
        reason: String,
    },

    /// The learner's response does not fit the question archetype.
    #[error("Response for question {question_id} does not match its archetype (expected {expected})")]
    ResponseMismatch {
        /// Identifier of the question.
        question_id: u64,
        /// The response shape the question expects.
        expected: String,
    },

    /// An option that the question does not offer was referenced.
    #[error("Question {question_id} has no option '{option}'")]
    UnknownOption {
        /// Identifier of the question.
        question_id: u64,
        /// The unknown option identifier.
        option: String,
    },

    // ========================================================================
    // Policy Errors
    // ========================================================================
    /// Answer reveal was requested while the question is in graded mode.
    #[error("Revealing the answer is not allowed for graded question {question_id}")]
    RevealNotAllowed {
        /// Identifier of the graded question.
        question_id: u64,
    },

    /// An assessment-only operation was issued on a non-assessment slide.
    #[error("Slide at index {index} is not an assessment")]
    NotAnAssessment {
        /// Index of the slide in the session's slide list.
        index: usize,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlayerError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `ModuleNotFound` error.
    #[must_use]
    pub fn module_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ModuleNotFound { path: path.into() }
    }

    /// Creates a new `ModuleTooLarge` error.
    #[must_use]
    pub fn module_too_large(path: impl Into<PathBuf>, size_kb: u64, limit_kb: u64) -> Self {
        Self::ModuleTooLarge {
            path: path.into(),
            size_kb,
            limit_kb,
        }
    }

    /// Creates a new `ModuleParseError`.
    #[must_use]
    pub fn module_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ModuleParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidModule` error.
    #[must_use]
    pub fn invalid_module(message: impl Into<String>) -> Self {
        Self::InvalidModule {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedQuestion` error.
    #[must_use]
    pub fn unsupported_question(question_id: u64, reason: impl Into<String>) -> Self {
        Self::UnsupportedQuestion {
            question_id,
            reason: reason.into(),
        }
    }

    /// Creates a new `ResponseMismatch` error.
    #[must_use]
    pub fn response_mismatch(question_id: u64, expected: impl Into<String>) -> Self {
        Self::ResponseMismatch {
            question_id,
            expected: expected.into(),
        }
    }

    /// Creates a new `UnknownOption` error.
    #[must_use]
    pub fn unknown_option(question_id: u64, option: impl Into<String>) -> Self {
        Self::UnknownOption {
            question_id,
            option: option.into(),
        }
    }

    /// Returns `true` if the error is a content problem rather than a
    /// learner or caller mistake.
    ///
    /// The presentation layer renders a diagnostic for these instead of a grade.
    #[must_use]
    pub const fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedQuestion { .. }
                | Self::InvalidModule { .. }
                | Self::ModuleParseError { .. }
        )
    }

    /// Returns `true` if this error prevents a session from starting.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::ModuleNotFound { .. }
                | Self::ModuleTooLarge { .. }
                | Self::ModuleParseError { .. }
                | Self::InvalidModule { .. }
        )
    }
}
