//! Archetypes answered by position: order list, fill in the blank and
//! match the words.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlayerError, Result};
use crate::evaluation::{OptionStatus, Verdict};
use crate::question::MatchPair;

// Matches `[answer]` markers; group 1 is the answer text.
static BLANK_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[(.*?)\]").ok());

/// Status key of the blank at `index`.
#[must_use]
pub fn blank_key(index: usize) -> String {
    format!("blank-{index}")
}

/// Extracts the expected answers from a fill-in-the-blank template.
///
/// # Examples
///
/// ```
/// use lesson_player::evaluation::sequence::blank_answers;
///
/// assert_eq!(
///     blank_answers("The [sun] rises in the [ east ]."),
///     vec!["sun".to_string(), "east".to_string()]
/// );
/// assert!(blank_answers("no blanks here").is_empty());
/// ```
#[must_use]
pub fn blank_answers(template: &str) -> Vec<String> {
    let Some(re) = BLANK_PATTERN.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

fn filled(blank: Option<&Option<String>>) -> Option<&str> {
    blank
        .and_then(Option::as_deref)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// Returns `true` when the response has a non-empty entry for every blank.
#[must_use]
pub fn all_blanks_filled(template: &str, blanks: &[Option<String>]) -> bool {
    let expected = blank_answers(template).len();
    expected > 0
        && blanks.len() == expected
        && (0..expected).all(|index| filled(blanks.get(index)).is_some())
}

/// Evaluates fill-in-the-blank answers.
///
/// Entries are trimmed before comparison and compared ignoring case unless
/// `case_sensitive` is set.
pub fn evaluate_blanks(
    question_id: u64,
    template: &str,
    blanks: &[Option<String>],
    case_sensitive: bool,
    feedback_visible: bool,
) -> Result<Verdict> {
    let answers = blank_answers(template);
    if answers.is_empty() {
        return Err(PlayerError::unsupported_question(question_id, "template contains no blanks"));
    }
    if let Some(index) = answers.iter().position(String::is_empty) {
        return Err(PlayerError::unsupported_question(
            question_id,
            format!("blank {index} has no answer"),
        ));
    }

    let matches = |entry: &str, answer: &str| {
        if case_sensitive {
            entry == answer
        } else {
            entry.to_lowercase() == answer.to_lowercase()
        }
    };

    let mut is_correct = blanks.len() == answers.len();
    let mut statuses = BTreeMap::new();
    for (index, answer) in answers.iter().enumerate() {
        let status = match filled(blanks.get(index)) {
            Some(entry) => {
                let correct = matches(entry, answer);
                is_correct &= correct;
                OptionStatus::classify(true, correct, feedback_visible)
            }
            None => {
                is_correct = false;
                OptionStatus::classify(false, true, feedback_visible)
            }
        };
        statuses.insert(blank_key(index), status);
    }

    Ok(Verdict::new(question_id, is_correct, statuses))
}

fn require_unique<'a>(
    question_id: u64,
    what: &str,
    values: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut count = 0usize;
    for value in values {
        count += 1;
        if !seen.insert(value.as_str()) {
            return Err(PlayerError::unsupported_question(
                question_id,
                format!("duplicate {what} '{value}'"),
            ));
        }
    }
    if count == 0 {
        return Err(PlayerError::unsupported_question(
            question_id,
            format!("question has no {what}s"),
        ));
    }
    Ok(())
}

/// Returns `true` when `order` holds exactly the expected items, in any order.
#[must_use]
pub fn is_permutation(items: &[String], order: &[String]) -> bool {
    if items.is_empty() || items.len() != order.len() {
        return false;
    }
    let mut expected: Vec<&String> = items.iter().collect();
    let mut given: Vec<&String> = order.iter().collect();
    expected.sort();
    given.sort();
    expected == given
}

/// Evaluates an ordering against the expected sequence.
///
/// Each expected item is `SelectedCorrect` at its expected position and
/// `SelectedIncorrect` anywhere else.
pub fn evaluate_order(
    question_id: u64,
    items: &[String],
    order: &[String],
    feedback_visible: bool,
) -> Result<Verdict> {
    require_unique(question_id, "item", items)?;

    let is_correct = items == order;
    let mut statuses: BTreeMap<String, OptionStatus> = items
        .iter()
        .enumerate()
        .map(|(expected_at, item)| {
            let status = match order.iter().position(|placed| placed == item) {
                Some(placed_at) => {
                    OptionStatus::classify(true, placed_at == expected_at, feedback_visible)
                }
                None => OptionStatus::classify(false, true, feedback_visible),
            };
            (item.clone(), status)
        })
        .collect();
    for stray in order.iter().filter(|placed| !items.contains(placed)) {
        statuses.insert(stray.clone(), OptionStatus::SelectedIncorrect);
    }

    Ok(Verdict::new(question_id, is_correct, statuses))
}

/// Evaluates word-to-match connections. Statuses are keyed by word.
pub fn evaluate_matches(
    question_id: u64,
    pairs: &[MatchPair],
    connections: &BTreeMap<String, String>,
    feedback_visible: bool,
) -> Result<Verdict> {
    require_unique(question_id, "word", pairs.iter().map(|pair| &pair.word))?;

    let mut statuses = BTreeMap::new();
    let mut is_correct = connections.len() == pairs.len();
    for pair in pairs {
        let status = match connections.get(&pair.word) {
            Some(matched) => {
                let correct = *matched == pair.matches;
                is_correct &= correct;
                OptionStatus::classify(true, correct, feedback_visible)
            }
            None => {
                is_correct = false;
                OptionStatus::classify(false, true, feedback_visible)
            }
        };
        statuses.insert(pair.word.clone(), status);
    }

    Ok(Verdict::new(question_id, is_correct, statuses))
}
