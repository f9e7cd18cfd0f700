//! Choice archetypes: single, multiple, image and true/false.
//!
//! All of them reduce to comparing a selected set against a correct set;
//! they differ only in how many options may be correct.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PlayerError, Result};
use crate::evaluation::{OptionStatus, Verdict};
use crate::question::ChoiceOption;
use crate::response::{FALSE_OPTION, TRUE_OPTION};

/// Maps a boolean answer to its option identifier.
#[must_use]
pub const fn true_false_option(value: bool) -> &'static str {
    if value {
        TRUE_OPTION
    } else {
        FALSE_OPTION
    }
}

/// Classifies every offered option against the selection.
#[must_use]
pub fn classify_options<'a>(
    option_ids: impl IntoIterator<Item = &'a str>,
    selected: &BTreeSet<String>,
    correct: &BTreeSet<&str>,
    feedback_visible: bool,
) -> BTreeMap<String, OptionStatus> {
    option_ids
        .into_iter()
        .map(|id| {
            let status = OptionStatus::classify(
                selected.contains(id),
                correct.contains(id),
                feedback_visible,
            );
            (id.to_string(), status)
        })
        .collect()
}

/// Validates that every correct identifier names an offered option.
fn correct_set<'a>(
    question_id: u64,
    options: &[ChoiceOption],
    correct: &'a [String],
) -> Result<BTreeSet<&'a str>> {
    if options.is_empty() {
        return Err(PlayerError::unsupported_question(question_id, "question offers no options"));
    }
    if correct.is_empty() {
        return Err(PlayerError::unsupported_question(
            question_id,
            "missing correct answer set",
        ));
    }
    let set: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
    if let Some(unknown) = set
        .iter()
        .find(|id| !options.iter().any(|option| option.id == **id))
    {
        return Err(PlayerError::unsupported_question(
            question_id,
            format!("correct answer '{unknown}' is not one of the options"),
        ));
    }
    Ok(set)
}

/// Evaluates a single-choice question.
///
/// Correct iff exactly one option is selected and it is the correct one.
pub fn evaluate_single(
    question_id: u64,
    options: &[ChoiceOption],
    correct: Option<&str>,
    selected: &BTreeSet<String>,
    feedback_visible: bool,
) -> Result<Verdict> {
    let Some(correct) = correct else {
        return Err(PlayerError::unsupported_question(
            question_id,
            "missing correct option",
        ));
    };
    let owned = [correct.to_string()];
    let expected = correct_set(question_id, options, &owned)?;

    let is_correct = selected.len() == 1 && selected.contains(correct);
    let statuses = classify_options(
        options.iter().map(|o| o.id.as_str()),
        selected,
        &expected,
        feedback_visible,
    );
    Ok(Verdict::new(question_id, is_correct, statuses))
}

/// Evaluates a multiple-choice question.
///
/// Correct iff the selected set equals the correct set; order is
/// irrelevant and there is no partial credit.
pub fn evaluate_multiple(
    question_id: u64,
    options: &[ChoiceOption],
    correct: &[String],
    selected: &BTreeSet<String>,
    feedback_visible: bool,
) -> Result<Verdict> {
    let expected = correct_set(question_id, options, correct)?;

    let is_correct = selected.len() == expected.len()
        && selected.iter().all(|id| expected.contains(id.as_str()));
    let statuses = classify_options(
        options.iter().map(|o| o.id.as_str()),
        selected,
        &expected,
        feedback_visible,
    );
    Ok(Verdict::new(question_id, is_correct, statuses))
}

/// Evaluates an image-choice question, single- or multi-select.
pub fn evaluate_image(
    question_id: u64,
    options: &[ChoiceOption],
    correct: &[String],
    multiple: bool,
    selected: &BTreeSet<String>,
    feedback_visible: bool,
) -> Result<Verdict> {
    if multiple {
        return evaluate_multiple(question_id, options, correct, selected, feedback_visible);
    }
    match correct {
        [single] => evaluate_single(
            question_id,
            options,
            Some(single.as_str()),
            selected,
            feedback_visible,
        ),
        [] => Err(PlayerError::unsupported_question(
            question_id,
            "missing correct option",
        )),
        _ => Err(PlayerError::unsupported_question(
            question_id,
            "single-select image question lists several correct options",
        )),
    }
}

/// Evaluates a true/false question, whose options are `"true"` and `"false"`.
pub fn evaluate_true_false(
    question_id: u64,
    correct: Option<bool>,
    selected: &BTreeSet<String>,
    feedback_visible: bool,
) -> Result<Verdict> {
    let Some(correct) = correct else {
        return Err(PlayerError::unsupported_question(
            question_id,
            "missing true/false answer",
        ));
    };
    let options = [ChoiceOption::new(TRUE_OPTION), ChoiceOption::new(FALSE_OPTION)];
    evaluate_single(
        question_id,
        &options,
        Some(true_false_option(correct)),
        selected,
        feedback_visible,
    )
}
