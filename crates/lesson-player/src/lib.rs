//! Lesson Player Core
//!
//! Plays interactive lesson modules: ordered slides, some of which are
//! assessments with one of nine answer archetypes. A [`LessonSession`]
//! composes the four core components:
//!
//! - [`PlacementStore`] holds drag-and-drop placements per question
//! - [`FeedbackStore`] tracks submit, reveal, retry and explanation state
//! - [`evaluate`] grades a response against a question
//! - [`ProgressionController`] navigates slides and keeps per-slide flags
//!
//! ```
//! use lesson_player::{
//!     ChoiceOption, LessonSession, Module, OptionStatus, PlayerConfig, Question, QuestionKind,
//!     Slide, SlideKind,
//! };
//!
//! let question = Question::new(
//!     1,
//!     QuestionKind::MultipleChoice {
//!         options: vec![ChoiceOption::new("A"), ChoiceOption::new("B"), ChoiceOption::new("C")],
//!         correct: vec!["A".to_string(), "C".to_string()],
//!     },
//! );
//! let module = Module {
//!     id: 1,
//!     name: "Primary colours".to_string(),
//!     description: String::new(),
//!     slides: vec![Slide::new(1, 0, SlideKind::Assessment { question })],
//! };
//!
//! let mut session = LessonSession::new(module, PlayerConfig::default()).unwrap();
//! session.select_option("A").unwrap();
//! let verdict = session.submit().unwrap().unwrap();
//!
//! assert!(!verdict.is_correct);
//! assert_eq!(verdict.status_of("C"), OptionStatus::CorrectButUnselected);
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod evaluation;
pub mod feedback;
pub mod placement;
pub mod progression;
pub mod question;
pub mod response;
pub mod session;

pub use config::PlayerConfig;
pub use content::{
    ContentSubtype, CustomSubtype, Module, Slide, SlideKind, DEFAULT_MAX_MODULE_SIZE_KB,
};
pub use error::{PlayerError, Result};
pub use evaluation::{
    correct_response, evaluate, is_submittable, EvaluationOptions, OptionStatus, Verdict,
};
pub use feedback::{FeedbackState, FeedbackStatus, FeedbackStore};
pub use placement::{BucketMapping, PlacementStore};
pub use progression::ProgressionController;
pub use question::{ChoiceOption, MatchPair, NumericOperator, Question, QuestionKind, QuizMode};
pub use response::{parse_numeric_input, Response, FALSE_OPTION, TRUE_OPTION};
pub use session::{ActionOutcome, LessonSession, PlayerAction, SubmissionRecord};
