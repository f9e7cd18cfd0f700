//! Drag-and-drop grouping.
//!
//! Bucket identity matters, item order within a bucket does not.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PlayerError, Result};
use crate::evaluation::{OptionStatus, Verdict};
use crate::placement::BucketMapping;

/// Inverts an expected mapping into item -> bucket, rejecting items that
/// belong to two buckets.
fn expected_buckets(question_id: u64, buckets: &BucketMapping) -> Result<BTreeMap<&str, &str>> {
    if buckets.is_empty() {
        return Err(PlayerError::unsupported_question(question_id, "question defines no buckets"));
    }

    let mut owner = BTreeMap::new();
    for (bucket, items) in buckets {
        for item in items {
            if let Some(previous) = owner.insert(item.as_str(), bucket.as_str()) {
                if previous != bucket.as_str() {
                    return Err(PlayerError::unsupported_question(
                        question_id,
                        format!("item '{item}' is expected in both '{previous}' and '{bucket}'"),
                    ));
                }
            }
        }
    }

    if owner.is_empty() {
        return Err(PlayerError::unsupported_question(
            question_id,
            "question has no items to place",
        ));
    }
    Ok(owner)
}

fn item_set(items: Option<&Vec<String>>) -> BTreeSet<&str> {
    items
        .map(|items| items.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Evaluates a placement against the expected bucket mapping.
///
/// Correct iff every bucket, expected or submitted, holds exactly the
/// expected item set. Statuses are reported per item: an item in its
/// expected bucket is `SelectedCorrect`, an item anywhere else is
/// `SelectedIncorrect`, and an unplaced item is `CorrectButUnselected`
/// while feedback is visible.
pub fn evaluate(
    question_id: u64,
    buckets: &BucketMapping,
    placement: &BucketMapping,
    feedback_visible: bool,
) -> Result<Verdict> {
    let owner = expected_buckets(question_id, buckets)?;

    let labels: BTreeSet<&String> = buckets.keys().chain(placement.keys()).collect();
    let is_correct = labels
        .into_iter()
        .all(|label| item_set(buckets.get(label)) == item_set(placement.get(label)));

    let mut statuses: BTreeMap<String, OptionStatus> = owner
        .keys()
        .map(|item| {
            (
                (*item).to_string(),
                OptionStatus::classify(false, true, feedback_visible),
            )
        })
        .collect();
    for (bucket, items) in placement {
        for item in items {
            let correct = owner.get(item.as_str()) == Some(&bucket.as_str());
            statuses.insert(item.clone(), OptionStatus::classify(true, correct, feedback_visible));
        }
    }

    Ok(Verdict::new(question_id, is_correct, statuses))
}

/// Returns `true` once every expected item sits in some bucket.
#[must_use]
pub fn all_items_placed(buckets: &BucketMapping, placement: &BucketMapping) -> bool {
    let placed: BTreeSet<&str> = placement.values().flatten().map(String::as_str).collect();
    let mut expected = buckets.values().flatten().peekable();
    expected.peek().is_some() && expected.all(|item| placed.contains(item.as_str()))
}
