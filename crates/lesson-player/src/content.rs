//! Module and slide content model.
//!
//! A [`Module`] is supplied by the content source before the player starts
//! and is read-only for the whole session. Loading validates the file size
//! and the structural invariants the player relies on (non-empty slide list,
//! unique slide and question identifiers); question payloads themselves are
//! validated lazily at evaluation time.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};
use crate::question::Question;

/// Default maximum module file size in kilobytes.
pub const DEFAULT_MAX_MODULE_SIZE_KB: u64 = 512;

// ============================================================================
// Subtypes
// ============================================================================

/// Presentation subtype of a content slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentSubtype {
    /// Video player.
    Video,
    /// Still image.
    Image,
    /// Formatted text (default).
    #[default]
    #[serde(alias = "rich text", alias = "Rich Text")]
    RichText,
    /// Tabular dataset viewer.
    Dataset,
    /// Interactive neural network visualisation.
    NeuralNetwork,
}

/// Position of a custom slide within the lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomSubtype {
    /// Opening slide.
    Intro,
    /// Interstitial slide.
    Mid,
    /// Closing slide.
    Outro,
}

// ============================================================================
// Slide
// ============================================================================

/// Variant-specific slide payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SlideKind {
    /// Presentational content.
    Content {
        /// How the content is rendered.
        #[serde(default)]
        subtype: ContentSubtype,
        /// Media or document location, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// A question to answer.
    Assessment {
        /// The question payload.
        question: Question,
    },
    /// A guided hands-on activity.
    Activity {
        /// Identifier of the activity in the content source.
        #[serde(default)]
        activity: String,
        /// Number of steps the activity walks through.
        #[serde(default)]
        steps: u32,
    },
    /// Decorative intro, mid or outro slide.
    Custom {
        /// Position of the slide.
        subtype: CustomSubtype,
        /// Background image, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
}

const fn default_published() -> bool {
    true
}

/// One navigable unit within a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Unique identifier within the module.
    pub id: u64,

    /// Sort key; slides are displayed in ascending order.
    #[serde(default)]
    pub order: i64,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Unpublished slides are not played.
    #[serde(default = "default_published")]
    pub published: bool,

    /// Completion carried over from a previous session.
    #[serde(default)]
    pub completed: bool,

    /// Label of the advance button, if customised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,

    /// Variant payload.
    pub kind: SlideKind,
}

impl Slide {
    /// Creates a published, uncompleted slide.
    #[must_use]
    pub fn new(id: u64, order: i64, kind: SlideKind) -> Self {
        Self {
            id,
            order,
            name: String::new(),
            published: true,
            completed: false,
            button_label: None,
            kind,
        }
    }

    /// Returns `true` for assessment slides.
    #[must_use]
    pub const fn is_assessment(&self) -> bool {
        matches!(self.kind, SlideKind::Assessment { .. })
    }

    /// Returns the question of an assessment slide.
    #[must_use]
    pub const fn question(&self) -> Option<&Question> {
        match &self.kind {
            SlideKind::Assessment { question } => Some(question),
            _ => None,
        }
    }

    /// Returns the variant name, e.g. `"assessment"`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            SlideKind::Content { .. } => "content",
            SlideKind::Assessment { .. } => "assessment",
            SlideKind::Activity { .. } => "activity",
            SlideKind::Custom { .. } => "custom",
        }
    }
}

// ============================================================================
// Module
// ============================================================================

/// An ordered collection of slides forming one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module identifier.
    pub id: u64,

    /// Display name.
    pub name: String,

    /// Short description.
    #[serde(default)]
    pub description: String,

    /// Slides in content-source order; use [`Module::sorted_slides`] for
    /// display order.
    pub slides: Vec<Slide>,
}

impl Module {
    /// Loads and validates a module JSON file.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::ModuleNotFound` if the file doesn't exist.
    /// Returns `PlayerError::ModuleTooLarge` if the file exceeds `max_size_kb`.
    /// Returns `PlayerError::ModuleParseError` if the file is not module JSON.
    /// Returns `PlayerError::InvalidModule` if structural checks fail.
    pub fn load(path: impl AsRef<Path>, max_size_kb: u64) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::module_not_found(path)
            } else {
                PlayerError::Io(e)
            }
        })?;

        let file_size = metadata.len();
        if file_size > max_size_kb.saturating_mul(1024) {
            return Err(PlayerError::module_too_large(
                path,
                file_size.div_ceil(1024),
                max_size_kb,
            ));
        }

        let contents = std::fs::read_to_string(path)?;
        let module: Self = serde_json::from_str(&contents)
            .map_err(|e| PlayerError::module_parse(path, e.to_string()))?;
        module.validate()?;

        tracing::info!(
            path = %path.display(),
            module = %module.name,
            slides = module.slides.len(),
            "Module loaded"
        );
        Ok(module)
    }

    /// Parses and validates a module from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Json` on malformed JSON and
    /// `PlayerError::InvalidModule` if structural checks fail.
    pub fn from_json(json: &str) -> Result<Self> {
        let module: Self = serde_json::from_str(json)?;
        module.validate()?;
        Ok(module)
    }

    /// Checks the structural invariants the player depends on.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidModule` for an empty slide list or
    /// duplicate slide or question identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(PlayerError::invalid_module(format!(
                "module '{}' has no slides",
                self.name
            )));
        }

        let mut slide_ids = BTreeSet::new();
        let mut question_ids = BTreeSet::new();
        for slide in &self.slides {
            if !slide_ids.insert(slide.id) {
                return Err(PlayerError::invalid_module(format!(
                    "duplicate slide id {}",
                    slide.id
                )));
            }
            if let Some(question) = slide.question() {
                if !question_ids.insert(question.id) {
                    return Err(PlayerError::invalid_module(format!(
                        "duplicate question id {}",
                        question.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the slides sorted by ascending `order`.
    ///
    /// Slides sharing an `order` keep their relative position.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::{ContentSubtype, Module, Slide, SlideKind};
    ///
    /// let text = || SlideKind::Content { subtype: ContentSubtype::RichText, url: None };
    /// let module = Module {
    ///     id: 1,
    ///     name: "Intro".to_string(),
    ///     description: String::new(),
    ///     slides: vec![
    ///         Slide::new(10, 2, text()),
    ///         Slide::new(11, 1, text()),
    ///         Slide::new(12, 1, text()),
    ///     ],
    /// };
    ///
    /// let ids: Vec<u64> = module.sorted_slides().iter().map(|s| s.id).collect();
    /// assert_eq!(ids, vec![11, 12, 10]);
    /// ```
    #[must_use]
    pub fn sorted_slides(&self) -> Vec<Slide> {
        let mut slides = self.slides.clone();
        slides.sort_by_key(|slide| slide.order);
        slides
    }

    /// Returns the published slides in display order.
    #[must_use]
    pub fn playable_slides(&self) -> Vec<Slide> {
        self.sorted_slides()
            .into_iter()
            .filter(|slide| slide.published)
            .collect()
    }

    /// Returns the number of assessment slides.
    #[must_use]
    pub fn assessment_count(&self) -> usize {
        self.slides.iter().filter(|s| s.is_assessment()).count()
    }
}
