//! Session-scoped lesson player.
//!
//! A [`LessonSession`] owns one learner's state for one module: the
//! progression controller, the placement store, the feedback store, the
//! in-progress responses and the submission history. Nothing is shared
//! between sessions, so several can run side by side.
//!
//! Every user action is applied in a fixed order: the response is edited,
//! the submittable flag is recomputed, and on submit the evaluation read
//! and the feedback write happen inside the same `&mut self` call. A submit
//! therefore always grades the response as it stood when it was issued.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::content::Module;
use crate::error::{PlayerError, Result};
use crate::evaluation::{self, sequence, Verdict};
use crate::feedback::{FeedbackState, FeedbackStatus, FeedbackStore};
use crate::placement::{BucketMapping, PlacementStore};
use crate::progression::ProgressionController;
use crate::question::{Question, QuestionKind, QuizMode};
use crate::response::{parse_numeric_input, Response, FALSE_OPTION, TRUE_OPTION};

// ============================================================================
// SubmissionRecord
// ============================================================================

/// One submit or reveal, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Question that was answered.
    pub question_id: u64,

    /// Index of the slide holding the question.
    pub slide_index: usize,

    /// Submit count for the question at the time of the record (1-indexed
    /// for submits; reveals carry the count of submits before them).
    pub attempt: u32,

    /// Verdict of the submit; always `false` for reveals.
    pub is_correct: bool,

    /// Whether this record is a reveal rather than a submit.
    pub revealed: bool,

    /// The learner's response at the time of the record.
    pub response: Response,

    /// When the record was created.
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        question_id: u64,
        slide_index: usize,
        attempt: u32,
        is_correct: bool,
        revealed: bool,
        response: Response,
    ) -> Self {
        Self {
            question_id,
            slide_index,
            attempt,
            is_correct,
            revealed,
            response,
            submitted_at: Utc::now(),
        }
    }
}

// ============================================================================
// PlayerAction and ActionOutcome
// ============================================================================

/// A learner gesture, as issued by the presentation layer or a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Select a choice option (replaces the selection for single-select).
    Select {
        /// Option identifier.
        option: String,
    },
    /// Remove a choice option from the selection.
    Deselect {
        /// Option identifier.
        option: String,
    },
    /// Type into a numeric answer field.
    EnterNumber {
        /// Raw text as typed.
        text: String,
    },
    /// Drag an item into a bucket, or out of every bucket.
    MoveItem {
        /// Item identifier.
        item: String,
        /// Target bucket; `None` removes the item.
        #[serde(default)]
        bucket: Option<String>,
    },
    /// Replace the whole bucket mapping.
    SetPlacement {
        /// New bucket mapping.
        mapping: BucketMapping,
    },
    /// Rearrange an order list.
    SetOrder {
        /// Items in the new order.
        order: Vec<String>,
    },
    /// Fill one blank.
    FillBlank {
        /// Zero-based blank index.
        index: usize,
        /// Entered text; empty clears the blank.
        text: String,
    },
    /// Connect a word to a match.
    Connect {
        /// Word being connected.
        word: String,
        /// Match it is connected to.
        matched: String,
    },
    /// Remove a word's connection.
    Disconnect {
        /// Word being disconnected.
        word: String,
    },
    /// Submit the current answer.
    Submit,
    /// Reveal the correct answer.
    Reveal,
    /// Retry after feedback.
    TryAgain,
    /// Open or close the explanation.
    ToggleExplanation,
    /// Go to the next slide.
    Next,
    /// Go to the previous slide.
    Previous,
    /// Jump to a slide from the path view.
    JumpTo {
        /// Target slide index.
        index: usize,
    },
    /// Start the module over.
    Restart,
}

/// Result of applying a [`PlayerAction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A response edit was applied or ignored.
    Edited {
        /// Whether the response changed.
        changed: bool,
        /// Whether the slide is now submittable.
        submittable: bool,
    },
    /// A submit was processed; `None` when it was ignored.
    Submitted {
        /// The fresh verdict, if the answer was graded.
        verdict: Option<Verdict>,
    },
    /// The correct answer was revealed.
    Revealed {
        /// The correct answer in response form.
        answer: Response,
    },
    /// A retry was requested.
    Retried {
        /// Whether feedback was reset.
        reset: bool,
    },
    /// The explanation toggle was pressed.
    ExplanationToggled {
        /// Whether the explanation is now open.
        visible: bool,
    },
    /// A navigation request was processed.
    Navigated {
        /// Whether the current slide changed.
        moved: bool,
        /// Current slide index afterwards.
        index: usize,
    },
    /// The session was restarted.
    Restarted,
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edited {
                changed,
                submittable,
            } => write!(f, "edited (changed: {changed}, submittable: {submittable})"),
            Self::Submitted { verdict: None } => write!(f, "submit ignored"),
            Self::Submitted {
                verdict: Some(verdict),
            } => {
                let result = if verdict.is_correct {
                    "correct"
                } else {
                    "incorrect"
                };
                write!(f, "submitted: {result}")
            }
            Self::Revealed { answer } => {
                write!(f, "revealed: {}", answer.to_answer_texts().join(", "))
            }
            Self::Retried { reset } => write!(f, "try again (reset: {reset})"),
            Self::ExplanationToggled { visible } => write!(f, "explanation visible: {visible}"),
            Self::Navigated { moved, index } => write!(f, "slide {index} (moved: {moved})"),
            Self::Restarted => write!(f, "restarted"),
        }
    }
}

// ============================================================================
// LessonSession
// ============================================================================

/// One learner's playthrough of one module.
#[derive(Debug, Clone)]
pub struct LessonSession {
    module: Module,
    config: PlayerConfig,
    progression: ProgressionController,
    placements: PlacementStore,
    feedback: FeedbackStore,
    responses: HashMap<u64, Response>,
    submissions: Vec<SubmissionRecord>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LessonSession {
    /// Starts a session on the module's published slides in display order.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::ConfigValidationError` for an invalid config and
    /// `PlayerError::InvalidModule` if the module has nothing to play.
    pub fn new(module: Module, config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        module.validate()?;
        let progression = ProgressionController::from_module(&module)?;
        let now = Utc::now();

        info!(
            module = %module.name,
            slides = progression.slide_count(),
            skip_assessments = config.skip_assessments,
            "Session started"
        );

        Ok(Self {
            module,
            config,
            progression,
            placements: PlacementStore::new(),
            feedback: FeedbackStore::new(),
            responses: HashMap::new(),
            submissions: Vec::new(),
            started_at: now,
            updated_at: now,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ------------------------------------------------------------------------
    // Lookup helpers
    // ------------------------------------------------------------------------

    /// Returns the current slide's index and a copy of its question.
    fn current_assessment(&self) -> Result<(usize, Question)> {
        let index = self.progression.current_index();
        self.progression
            .current_slide()
            .question()
            .cloned()
            .map(|question| (index, question))
            .ok_or(PlayerError::NotAnAssessment { index })
    }

    fn response_for(&self, question: &Question) -> Response {
        match question.kind {
            QuestionKind::DragDrop { .. } => {
                Response::Placement(self.placements.placement(question.id))
            }
            _ => self
                .responses
                .get(&question.id)
                .cloned()
                .unwrap_or_else(|| Response::empty_for(&question.kind)),
        }
    }

    fn store_response(&mut self, question_id: u64, response: Response) {
        match response {
            Response::Placement(mapping) => self.placements.set_placement(question_id, mapping),
            other => {
                self.responses.insert(question_id, other);
            }
        }
    }

    fn refresh_submittable(&mut self, index: usize, question: &Question) -> bool {
        let submittable = evaluation::is_submittable(question, &self.response_for(question));
        self.progression.set_submittable(index, submittable);
        submittable
    }

    fn mismatch(question: &Question) -> PlayerError {
        PlayerError::response_mismatch(question.id, Response::empty_for(&question.kind).shape())
    }

    /// Quiz mode in effect for a question, after the config override.
    #[must_use]
    pub fn quiz_mode(&self, question: &Question) -> QuizMode {
        self.config.effective_quiz_mode(question.quiz_mode)
    }

    /// Returns `true` if edits to a question's response are currently
    /// rejected.
    ///
    /// Graded questions lock on their first submit. Practice questions lock
    /// once answered correctly or revealed, until `try_again`.
    #[must_use]
    pub fn is_locked(&self, question: &Question) -> bool {
        let Some(state) = self.feedback.get(question.id) else {
            return false;
        };
        match self.quiz_mode(question) {
            QuizMode::Graded => state.status.is_answered(),
            QuizMode::Practice => state.status == FeedbackStatus::Correct || state.revealed_answer,
        }
    }

    /// Applies an edit to the current question's response.
    fn edit_response<F>(&mut self, edit: F) -> Result<ActionOutcome>
    where
        F: FnOnce(&Question, &mut Response) -> Result<bool>,
    {
        let (index, question) = self.current_assessment()?;
        if self.is_locked(&question) {
            debug!(question_id = question.id, "Edit ignored, response is locked");
            return Ok(ActionOutcome::Edited {
                changed: false,
                submittable: self.progression.is_submittable(index),
            });
        }

        let mut response = self.response_for(&question);
        let changed = edit(&question, &mut response)?;
        if changed {
            self.store_response(question.id, response);
            self.touch();
        }
        let submittable = self.refresh_submittable(index, &question);
        Ok(ActionOutcome::Edited {
            changed,
            submittable,
        })
    }

    // ------------------------------------------------------------------------
    // Response edits
    // ------------------------------------------------------------------------

    /// Selects a choice option. Single-select questions replace the
    /// selection; multi-select questions add to it.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `ResponseMismatch` for non-choice
    /// questions and `UnknownOption` for options the question does not offer.
    pub fn select_option(&mut self, option: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            check_option(question, option)?;
            let Response::Choice(selected) = response else {
                return Err(Self::mismatch(question));
            };
            if question.kind.is_single_select() {
                if selected.len() == 1 && selected.contains(option) {
                    return Ok(false);
                }
                selected.clear();
            }
            Ok(selected.insert(option.to_string()))
        })
    }

    /// Removes a choice option from the selection.
    ///
    /// # Errors
    ///
    /// Same as [`LessonSession::select_option`].
    pub fn deselect_option(&mut self, option: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            check_option(question, option)?;
            let Response::Choice(selected) = response else {
                return Err(Self::mismatch(question));
            };
            Ok(selected.remove(option))
        })
    }

    /// Records typed numeric input. Text that does not parse leaves the
    /// answer empty and the slide unsubmittable.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment` or `ResponseMismatch`.
    pub fn enter_number(&mut self, text: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let Response::Numeric(value) = response else {
                return Err(Self::mismatch(question));
            };
            let parsed = parse_numeric_input(text);
            let changed = *value != parsed;
            *value = parsed;
            Ok(changed)
        })
    }

    /// Moves a drag-and-drop item into a bucket, or out of all buckets.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `ResponseMismatch`, or `UnknownOption`
    /// for an item or bucket the question does not define.
    pub fn move_item(&mut self, item: &str, bucket: Option<&str>) -> Result<ActionOutcome> {
        let (index, question) = self.current_assessment()?;
        let QuestionKind::DragDrop { buckets } = &question.kind else {
            return Err(Self::mismatch(&question));
        };
        if !buckets.values().flatten().any(|known| known == item) {
            return Err(PlayerError::unknown_option(question.id, item));
        }
        if let Some(bucket) = bucket {
            if !buckets.contains_key(bucket) {
                return Err(PlayerError::unknown_option(question.id, bucket));
            }
        }

        if self.is_locked(&question) {
            debug!(question_id = question.id, "Edit ignored, response is locked");
            return Ok(ActionOutcome::Edited {
                changed: false,
                submittable: self.progression.is_submittable(index),
            });
        }

        let changed = self.placements.bucket_of(question.id, item) != bucket;
        self.placements.move_item(question.id, item, bucket);
        self.touch();
        let submittable = self.refresh_submittable(index, &question);
        Ok(ActionOutcome::Edited {
            changed,
            submittable,
        })
    }

    /// Replaces the whole bucket mapping of the current question.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment` or `ResponseMismatch`.
    pub fn set_placement(&mut self, mapping: BucketMapping) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let Response::Placement(current) = response else {
                return Err(Self::mismatch(question));
            };
            let changed = *current != mapping;
            *current = mapping;
            Ok(changed)
        })
    }

    /// Rearranges an order list.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `ResponseMismatch`, or `UnknownOption`
    /// for items the question does not list.
    pub fn set_order(&mut self, order: Vec<String>) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let QuestionKind::OrderList { items } = &question.kind else {
                return Err(Self::mismatch(question));
            };
            if let Some(unknown) = order.iter().find(|item| !items.contains(item)) {
                return Err(PlayerError::unknown_option(question.id, unknown.as_str()));
            }
            let Response::Order(current) = response else {
                return Err(Self::mismatch(question));
            };
            let changed = *current != order;
            *current = order;
            Ok(changed)
        })
    }

    /// Fills (or clears, with empty text) one blank.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `ResponseMismatch`, or `UnknownOption`
    /// for a blank index past the end of the template.
    pub fn fill_blank(&mut self, blank: usize, text: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let QuestionKind::FillBlank { template, .. } = &question.kind else {
                return Err(Self::mismatch(question));
            };
            let count = sequence::blank_answers(template).len();
            if blank >= count {
                return Err(PlayerError::unknown_option(
                    question.id,
                    sequence::blank_key(blank),
                ));
            }
            let Response::Blanks(blanks) = response else {
                return Err(Self::mismatch(question));
            };
            blanks.resize(count, None);
            let entry = Some(text.to_string()).filter(|t| !t.trim().is_empty());
            let changed = blanks[blank] != entry;
            blanks[blank] = entry;
            Ok(changed)
        })
    }

    /// Connects a word to a match. Each match holds at most one word, so a
    /// previous connection to the same match is dropped.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `ResponseMismatch`, or `UnknownOption`
    /// for an unknown word or match.
    pub fn connect(&mut self, word: &str, matched: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let QuestionKind::MatchWords { pairs } = &question.kind else {
                return Err(Self::mismatch(question));
            };
            if !pairs.iter().any(|pair| pair.word == word) {
                return Err(PlayerError::unknown_option(question.id, word));
            }
            if !pairs.iter().any(|pair| pair.matches == matched) {
                return Err(PlayerError::unknown_option(question.id, matched));
            }
            let Response::Matches(connections) = response else {
                return Err(Self::mismatch(question));
            };
            if connections.get(word).is_some_and(|current| current == matched) {
                return Ok(false);
            }
            connections.retain(|_, current| current != matched);
            connections.insert(word.to_string(), matched.to_string());
            Ok(true)
        })
    }

    /// Removes a word's connection.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment` or `ResponseMismatch`.
    pub fn disconnect(&mut self, word: &str) -> Result<ActionOutcome> {
        self.edit_response(|question, response| {
            let Response::Matches(connections) = response else {
                return Err(Self::mismatch(question));
            };
            Ok(connections.remove(word).is_some())
        })
    }

    // ------------------------------------------------------------------------
    // Feedback
    // ------------------------------------------------------------------------

    /// Grades the current answer.
    ///
    /// Returns `Ok(None)` without grading when the response is incomplete
    /// or locked. Otherwise evaluates, records the verdict in the feedback
    /// store and the progression flags, and appends a submission record.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment` or the evaluation error of a malformed
    /// question (`UnsupportedQuestion`).
    pub fn submit(&mut self) -> Result<Option<Verdict>> {
        let (index, question) = self.current_assessment()?;
        if self.is_locked(&question) {
            debug!(question_id = question.id, "Submit ignored, response is locked");
            return Ok(None);
        }

        let response = self.response_for(&question);
        if !evaluation::is_submittable(&question, &response) {
            debug!(question_id = question.id, "Submit ignored, response incomplete");
            return Ok(None);
        }

        let options = self.config.evaluation_options().with_feedback_visible(true);
        let verdict = evaluation::evaluate(&question, &response, &options)?;
        let attempt = self.feedback.submit(&verdict).attempts;

        self.progression
            .set_correctness(index, Some(verdict.is_correct));
        if verdict.is_correct || self.quiz_mode(&question) == QuizMode::Graded {
            self.progression.set_completed(index, true);
        }
        self.submissions.push(SubmissionRecord::new(
            question.id,
            index,
            attempt,
            verdict.is_correct,
            false,
            response,
        ));
        self.touch();
        Ok(Some(verdict))
    }

    /// Reveals the correct answer of the current question.
    ///
    /// The learner's own response is left as it is; the correct answer is
    /// returned for display. The slide counts as completed afterwards.
    /// Revealing again returns the answer without adding a record.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`, `RevealNotAllowed` in graded mode, or
    /// `UnsupportedQuestion` when the question has no usable answer.
    pub fn reveal_answer(&mut self) -> Result<Response> {
        let (index, question) = self.current_assessment()?;
        let mode = self.quiz_mode(&question);
        if !mode.allows_reveal() {
            return Err(PlayerError::RevealNotAllowed {
                question_id: question.id,
            });
        }

        let answer = evaluation::correct_response(&question)?;
        let already_revealed = self
            .feedback
            .get(question.id)
            .is_some_and(|state| state.revealed_answer);
        if already_revealed {
            debug!(question_id = question.id, "Answer already revealed");
            return Ok(answer);
        }

        let attempt = self.feedback.reveal_answer(question.id, mode)?.attempts;
        self.progression.set_completed(index, true);
        self.submissions.push(SubmissionRecord::new(
            question.id,
            index,
            attempt,
            false,
            true,
            self.response_for(&question),
        ));
        self.touch();
        Ok(answer)
    }

    /// Resets feedback so the learner can revise their answer.
    ///
    /// The response itself is kept. Returns `false` when nothing was reset:
    /// in graded mode, or when no feedback is showing.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`.
    pub fn try_again(&mut self) -> Result<bool> {
        let (index, question) = self.current_assessment()?;
        if !self.quiz_mode(&question).allows_retry() {
            debug!(question_id = question.id, "Retry ignored in graded mode");
            return Ok(false);
        }
        if !self.feedback.feedback_visible(question.id) {
            return Ok(false);
        }

        self.feedback.try_again(question.id);
        self.progression.set_completed(index, false);
        self.progression.set_correctness(index, None);
        self.refresh_submittable(index, &question);
        self.touch();
        Ok(true)
    }

    /// Toggles the explanation; returns whether it is now visible.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAssessment`.
    pub fn toggle_explanation(&mut self) -> Result<bool> {
        let (_, question) = self.current_assessment()?;
        self.feedback.toggle_explanation(question.id);
        Ok(self.feedback.explanation_visible(question.id))
    }

    /// Verdict of the latest submit on the current slide, while feedback is
    /// visible. Edits made after that submit are not graded here; only the
    /// next submit produces a new verdict.
    ///
    /// Returns `None` on non-assessment slides, while no feedback is shown,
    /// and after a reveal with no submit before it.
    #[must_use]
    pub fn current_verdict(&self) -> Option<Verdict> {
        let (_, question) = self.current_assessment().ok()?;
        self.feedback
            .get(question.id)
            .filter(|state| state.feedback_visible())
            .and_then(|state| state.last_verdict.clone())
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Returns `true` if the learner may advance from the current slide.
    ///
    /// Not on the last slide, and the current slide is not an assessment,
    /// is completed, or assessments may be skipped.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        if self.progression.is_last() {
            return false;
        }
        let index = self.progression.current_index();
        !self.progression.current_slide().is_assessment()
            || self.progression.is_completed(index)
            || self.config.skip_assessments
    }

    /// Advances when [`LessonSession::can_advance`] allows it.
    pub fn next_slide(&mut self) -> bool {
        if !self.can_advance() {
            debug!(
                index = self.progression.current_index(),
                "Advance blocked on current slide"
            );
            return false;
        }
        let moved = self.progression.next_slide();
        self.touch();
        moved
    }

    /// Goes back one slide.
    pub fn previous_slide(&mut self) -> bool {
        let moved = self.progression.previous_slide();
        self.touch();
        moved
    }

    /// Jumps to a slide; out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let moved = self.progression.jump_to(index);
        self.touch();
        moved
    }

    /// Clears every response, placement, feedback state, submission and
    /// completion flag and returns to the first slide.
    pub fn restart(&mut self) {
        self.responses.clear();
        self.placements.clear_all();
        self.feedback.clear();
        self.submissions.clear();
        self.progression.reset();
        self.started_at = Utc::now();
        self.updated_at = self.started_at;
        info!(module = %self.module.name, "Session restarted");
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Applies one learner action.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::{
    ///     ActionOutcome, ChoiceOption, LessonSession, Module, PlayerAction, PlayerConfig,
    ///     Question, QuestionKind, Slide, SlideKind,
    /// };
    ///
    /// let question = Question::new(
    ///     7,
    ///     QuestionKind::SingleChoice {
    ///         options: vec![ChoiceOption::new("yes"), ChoiceOption::new("no")],
    ///         correct: Some("yes".to_string()),
    ///     },
    /// );
    /// let module = Module {
    ///     id: 1,
    ///     name: "Quick check".to_string(),
    ///     description: String::new(),
    ///     slides: vec![Slide::new(1, 0, SlideKind::Assessment { question })],
    /// };
    /// let mut session = LessonSession::new(module, PlayerConfig::default()).unwrap();
    ///
    /// session.apply(PlayerAction::Select { option: "yes".to_string() }).unwrap();
    /// let outcome = session.apply(PlayerAction::Submit).unwrap();
    /// assert!(matches!(outcome, ActionOutcome::Submitted { verdict: Some(v) } if v.is_correct));
    /// ```
    pub fn apply(&mut self, action: PlayerAction) -> Result<ActionOutcome> {
        debug!(?action, "Applying action");
        let outcome = match action {
            PlayerAction::Select { option } => self.select_option(&option)?,
            PlayerAction::Deselect { option } => self.deselect_option(&option)?,
            PlayerAction::EnterNumber { text } => self.enter_number(&text)?,
            PlayerAction::MoveItem { item, bucket } => self.move_item(&item, bucket.as_deref())?,
            PlayerAction::SetPlacement { mapping } => self.set_placement(mapping)?,
            PlayerAction::SetOrder { order } => self.set_order(order)?,
            PlayerAction::FillBlank { index, text } => self.fill_blank(index, &text)?,
            PlayerAction::Connect { word, matched } => self.connect(&word, &matched)?,
            PlayerAction::Disconnect { word } => self.disconnect(&word)?,
            PlayerAction::Submit => ActionOutcome::Submitted {
                verdict: self.submit()?,
            },
            PlayerAction::Reveal => ActionOutcome::Revealed {
                answer: self.reveal_answer()?,
            },
            PlayerAction::TryAgain => ActionOutcome::Retried {
                reset: self.try_again()?,
            },
            PlayerAction::ToggleExplanation => ActionOutcome::ExplanationToggled {
                visible: self.toggle_explanation()?,
            },
            PlayerAction::Next => self.navigated(Self::next_slide),
            PlayerAction::Previous => self.navigated(Self::previous_slide),
            PlayerAction::JumpTo { index } => self.navigated(|s| s.jump_to(index)),
            PlayerAction::Restart => {
                self.restart();
                ActionOutcome::Restarted
            }
        };
        Ok(outcome)
    }

    /// Applies a sequence of actions in order and returns how many were
    /// refused.
    ///
    /// `observe` sees every step (1-based), the action and its result
    /// before the next action runs. Refused actions such as a reveal in
    /// graded mode or an unknown option are counted and skipped. A
    /// malformed question stops the replay.
    ///
    /// # Errors
    ///
    /// Returns the first content error (see [`PlayerError::is_content_error`]).
    pub fn replay<I, F>(&mut self, actions: I, mut observe: F) -> Result<usize>
    where
        I: IntoIterator<Item = PlayerAction>,
        F: FnMut(usize, &PlayerAction, &Result<ActionOutcome>),
    {
        let mut rejected = 0;

        for (step, action) in actions.into_iter().enumerate() {
            let step = step + 1;
            let result = self.apply(action.clone());
            observe(step, &action, &result);

            match result {
                Ok(_) => {}
                Err(e) if e.is_content_error() => {
                    warn!(step, error = %e, "Unsupported question configuration");
                    return Err(e);
                }
                Err(e) => {
                    rejected += 1;
                    debug!(step, error = %e, "Action rejected");
                }
            }
        }

        Ok(rejected)
    }

    fn navigated(&mut self, navigate: impl FnOnce(&mut Self) -> bool) -> ActionOutcome {
        let moved = navigate(self);
        ActionOutcome::Navigated {
            moved,
            index: self.progression.current_index(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The module being played.
    #[must_use]
    pub const fn module(&self) -> &Module {
        &self.module
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Progression state.
    #[must_use]
    pub const fn progression(&self) -> &ProgressionController {
        &self.progression
    }

    /// Drag-and-drop placements.
    #[must_use]
    pub const fn placements(&self) -> &PlacementStore {
        &self.placements
    }

    /// Feedback states.
    #[must_use]
    pub const fn feedback(&self) -> &FeedbackStore {
        &self.feedback
    }

    /// Feedback state of a question, or the initial state.
    #[must_use]
    pub fn feedback_state(&self, question_id: u64) -> FeedbackState {
        self.feedback.state(question_id)
    }

    /// Submission history in chronological order.
    #[must_use]
    pub fn submissions(&self) -> &[SubmissionRecord] {
        &self.submissions
    }

    /// The question on the current slide, if it is an assessment.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.progression.current_slide().question()
    }

    /// The learner's current response to a question of this module.
    #[must_use]
    pub fn response(&self, question_id: u64) -> Option<Response> {
        let index = self.progression.index_of_question(question_id)?;
        let question = self.progression.slide(index)?.question()?;
        Some(self.response_for(question))
    }

    /// Latest submit result per question: `(attempts, is_correct)`.
    #[must_use]
    pub fn latest_results(&self) -> BTreeMap<u64, (u32, bool)> {
        self.submissions
            .iter()
            .filter(|record| !record.revealed)
            .map(|record| (record.question_id, (record.attempt, record.is_correct)))
            .collect()
    }

    /// When the session (or the last restart) began.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the session state last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Checks that a choice question offers `option`.
fn check_option(question: &Question, option: &str) -> Result<()> {
    let offered = match &question.kind {
        QuestionKind::TrueFalse { .. } => option == TRUE_OPTION || option == FALSE_OPTION,
        kind => match kind.options() {
            Some(options) => options.iter().any(|o| o.id == option),
            None => return Err(LessonSession::mismatch(question)),
        },
    };
    if offered {
        Ok(())
    } else {
        Err(PlayerError::unknown_option(question.id, option))
    }
}
