//! Module/slide progression controller.
//!
//! Owns the display-ordered slide list and the per-slide flags the path
//! view renders: submittable, completed, discovered and correctness.
//! Navigation never fails. Moving past either end and jumping out of
//! range are silent no-ops reported through a `bool` return value.

use serde::Serialize;
use tracing::debug;

use crate::content::{Module, Slide};
use crate::error::{PlayerError, Result};

/// Navigation state over an ordered, non-empty slide list.
///
/// Invariant: `current_index < slides.len()`, and every per-slide vector
/// has exactly `slides.len()` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionController {
    slides: Vec<Slide>,
    current_index: usize,
    submittable: Vec<bool>,
    completed: Vec<bool>,
    discovered: Vec<bool>,
    correctness: Vec<Option<bool>>,
}

impl ProgressionController {
    /// Creates a controller over slides that are already in display order.
    ///
    /// Completion flags carried by the slides are kept; the first slide is
    /// visited immediately.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidModule` if `slides` is empty.
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(PlayerError::invalid_module("no playable slides"));
        }

        let count = slides.len();
        let completed = slides.iter().map(|slide| slide.completed).collect();
        let mut controller = Self {
            slides,
            current_index: 0,
            submittable: vec![false; count],
            completed,
            discovered: vec![false; count],
            correctness: vec![None; count],
        };
        controller.arrive();
        Ok(controller)
    }

    /// Creates a controller over a module's published slides, sorted by
    /// ascending `order`.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidModule` if no slide is published.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::{CustomSubtype, Module, ProgressionController, Slide, SlideKind};
    ///
    /// let custom = |subtype| SlideKind::Custom { subtype, image: None };
    /// let module = Module {
    ///     id: 1,
    ///     name: "Demo".to_string(),
    ///     description: String::new(),
    ///     slides: vec![
    ///         Slide::new(1, 0, custom(CustomSubtype::Intro)),
    ///         Slide::new(2, 1, custom(CustomSubtype::Outro)),
    ///     ],
    /// };
    ///
    /// let mut controller = ProgressionController::from_module(&module).unwrap();
    /// assert!(!controller.previous_slide());
    /// assert!(controller.next_slide());
    /// assert!(!controller.next_slide());
    /// assert_eq!(controller.current_index(), 1);
    /// assert!(!controller.jump_to(5));
    /// ```
    pub fn from_module(module: &Module) -> Result<Self> {
        Self::new(module.playable_slides())
    }

    /// Marks the current slide discovered and completes it if it has
    /// nothing to answer.
    fn arrive(&mut self) {
        let index = self.current_index;
        self.discovered[index] = true;
        if !self.slides[index].is_assessment() {
            self.completed[index] = true;
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Advances by one slide. Returns `false` on the last slide.
    pub fn next_slide(&mut self) -> bool {
        if self.is_last() {
            debug!(index = self.current_index, "Already on last slide");
            return false;
        }
        self.current_index += 1;
        self.arrive();
        debug!(index = self.current_index, "Advanced to next slide");
        true
    }

    /// Goes back by one slide. Returns `false` on the first slide.
    pub fn previous_slide(&mut self) -> bool {
        if self.current_index == 0 {
            debug!("Already on first slide");
            return false;
        }
        self.current_index -= 1;
        self.arrive();
        debug!(index = self.current_index, "Returned to previous slide");
        true
    }

    /// Jumps directly to `index`. Out-of-range indices are rejected and
    /// leave the state unchanged.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.slides.len() {
            debug!(index, slides = self.slides.len(), "Rejected out-of-range jump");
            return false;
        }
        self.current_index = index;
        self.arrive();
        debug!(index, "Jumped to slide");
        true
    }

    // ------------------------------------------------------------------------
    // Per-slide flags
    // ------------------------------------------------------------------------

    /// Updates whether a slide's in-progress response is complete enough to
    /// submit. Returns `false` for an out-of-range index.
    pub fn set_submittable(&mut self, index: usize, submittable: bool) -> bool {
        match self.submittable.get_mut(index) {
            Some(flag) => {
                *flag = submittable;
                true
            }
            None => false,
        }
    }

    /// Returns whether a slide can currently be submitted.
    #[must_use]
    pub fn is_submittable(&self, index: usize) -> bool {
        self.submittable.get(index).copied().unwrap_or(false)
    }

    /// Sets the completion flag of a slide. Ignores out-of-range indices.
    pub fn set_completed(&mut self, index: usize, completed: bool) {
        if let Some(flag) = self.completed.get_mut(index) {
            *flag = completed;
        }
    }

    /// Returns whether a slide is completed.
    #[must_use]
    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.get(index).copied().unwrap_or(false)
    }

    /// Records the correctness of a slide's latest evaluation, `None` to
    /// clear it. Ignores out-of-range indices.
    pub fn set_correctness(&mut self, index: usize, correctness: Option<bool>) {
        if let Some(entry) = self.correctness.get_mut(index) {
            *entry = correctness;
        }
    }

    /// Returns to the first slide and clears every per-slide flag.
    pub fn reset(&mut self) {
        let count = self.slides.len();
        self.current_index = 0;
        self.submittable = vec![false; count];
        self.completed = vec![false; count];
        self.discovered = vec![false; count];
        self.correctness = vec![None; count];
        self.arrive();
        debug!("Progression reset");
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Index of the current slide.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current slide.
    #[must_use]
    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.current_index]
    }

    /// The slide at `index`, if any.
    #[must_use]
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// All slides in display order.
    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides.
    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Returns `true` on the last slide.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.slides.len()
    }

    /// Index of the slide holding a question.
    #[must_use]
    pub fn index_of_question(&self, question_id: u64) -> Option<usize> {
        self.slides
            .iter()
            .position(|slide| slide.question().is_some_and(|q| q.id == question_id))
    }

    /// Submittable flag per slide.
    #[must_use]
    pub fn submittable_states(&self) -> &[bool] {
        &self.submittable
    }

    /// Completion flag per slide.
    #[must_use]
    pub fn completed_states(&self) -> &[bool] {
        &self.completed
    }

    /// Discovery flag per slide.
    #[must_use]
    pub fn discovered_states(&self) -> &[bool] {
        &self.discovered
    }

    /// Correctness of the latest evaluation per slide.
    #[must_use]
    pub fn correctness_states(&self) -> &[Option<bool>] {
        &self.correctness
    }

    /// Number of completed slides.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|done| **done).count()
    }
}
