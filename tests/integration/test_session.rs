//! Session-level integration tests
//!
//! These tests drive a `LessonSession` through complete learner flows:
//! answering, retrying, graded lock-in, drag-and-drop placement and
//! navigation across a small module.

use std::collections::{BTreeMap, BTreeSet};

use lesson_player::{
    evaluate, ChoiceOption, ContentSubtype, EvaluationOptions, FeedbackState, FeedbackStatus,
    LessonSession, Module, OptionStatus, PlayerAction, PlayerConfig, PlayerError, Question,
    QuestionKind, QuizMode, Response, Slide, SlideKind,
};

fn text_slide(id: u64, order: i64) -> Slide {
    Slide::new(
        id,
        order,
        SlideKind::Content {
            subtype: ContentSubtype::RichText,
            url: None,
        },
    )
}

fn assessment(id: u64, order: i64, question: Question) -> Slide {
    Slide::new(id, order, SlideKind::Assessment { question })
}

fn abc_question(id: u64) -> Question {
    Question::new(
        id,
        QuestionKind::MultipleChoice {
            options: vec![
                ChoiceOption::new("A"),
                ChoiceOption::new("B"),
                ChoiceOption::new("C"),
            ],
            correct: vec!["A".to_string(), "C".to_string()],
        },
    )
    .with_explanation("A and C are both correct.")
}

fn tones_question(id: u64) -> Question {
    let mut buckets = BTreeMap::new();
    buckets.insert(
        "warm".to_string(),
        vec!["orange".to_string(), "red".to_string()],
    );
    buckets.insert("cool".to_string(), vec!["teal".to_string()]);
    Question::new(id, QuestionKind::DragDrop { buckets })
}

fn module(slides: Vec<Slide>) -> Module {
    Module {
        id: 1,
        name: "Integration".to_string(),
        description: String::new(),
        slides,
    }
}

/// Text, multiple choice, text.
fn three_slide_session(config: PlayerConfig) -> LessonSession {
    let slides = vec![
        text_slide(1, 0),
        assessment(2, 1, abc_question(10)),
        text_slide(3, 2),
    ];
    LessonSession::new(module(slides), config).expect("Failed to start session")
}

// ============================================================================
// Practice mode
// ============================================================================

/// Tests the partial-then-complete multiple choice walkthrough.
#[test]
fn test_multiple_choice_walkthrough() {
    let mut session = three_slide_session(PlayerConfig::default());

    assert!(session.next_slide());
    assert_eq!(session.progression().current_index(), 1);
    assert!(!session.progression().is_submittable(1));

    session.select_option("A").expect("select A");
    assert!(session.progression().is_submittable(1));

    let verdict = session
        .submit()
        .expect("submit")
        .expect("response should be graded");
    assert!(!verdict.is_correct);
    assert_eq!(verdict.status_of("A"), OptionStatus::SelectedCorrect);
    assert_eq!(verdict.status_of("B"), OptionStatus::Unselected);
    assert_eq!(verdict.status_of("C"), OptionStatus::CorrectButUnselected);
    assert_eq!(session.feedback_state(10).status, FeedbackStatus::Incorrect);

    // Practice mode keeps the response editable after a wrong answer.
    session.select_option("C").expect("select C");
    let verdict = session
        .submit()
        .expect("submit")
        .expect("response should be graded");
    assert!(verdict.is_correct);
    assert_eq!(session.feedback_state(10).attempts, 2);
    assert!(session.progression().is_completed(1));

    assert!(session.next_slide());
    assert_eq!(session.progression().current_index(), 2);
    assert_eq!(session.progression().completed_count(), 3);
}

/// Tests that the shown verdict is the submitted one, not a re-grade of
/// later edits.
#[test]
fn test_verdict_stays_until_next_submit() {
    let mut session = three_slide_session(PlayerConfig::default());
    session.next_slide();

    session.select_option("A").expect("select A");
    let submitted = session
        .submit()
        .expect("submit")
        .expect("response should be graded");

    // Completing the answer without submitting must not flip the verdict.
    session.select_option("C").expect("select C");

    assert_eq!(session.current_verdict(), Some(submitted));
    assert_eq!(session.feedback_state(10).status, FeedbackStatus::Incorrect);
    assert_eq!(session.feedback_state(10).attempts, 1);
    assert_eq!(session.progression().correctness_states()[1], Some(false));

    let resubmitted = session
        .submit()
        .expect("submit")
        .expect("response should be graded");
    assert!(resubmitted.is_correct);
    assert_eq!(session.current_verdict(), Some(resubmitted));
}

/// Tests that retrying keeps the answer but clears feedback and completion.
#[test]
fn test_try_again_resets_feedback_only() {
    let mut session = three_slide_session(PlayerConfig::default());
    session.next_slide();

    session.select_option("B").expect("select B");
    session.submit().expect("submit");
    assert!(session.feedback().feedback_visible(10));

    assert!(session.try_again().expect("try again"));

    let state = session.feedback_state(10);
    assert_eq!(state.status, FeedbackStatus::Unanswered);
    assert_eq!(state.attempts, 1);
    assert!(!session.feedback().feedback_visible(10));
    assert!(!session.progression().is_completed(1));
    assert!(session.progression().is_submittable(1));
    assert_eq!(
        session.response(10),
        Some(Response::Choice(["B".to_string()].into_iter().collect()))
    );

    // Nothing is showing now, so a second retry is a no-op.
    assert!(!session.try_again().expect("try again"));
}

/// Tests that advancing past an unanswered assessment is blocked unless
/// assessments may be skipped.
#[test]
fn test_assessment_gates_progress() {
    let mut session = three_slide_session(PlayerConfig::default());
    session.next_slide();

    assert!(!session.can_advance());
    assert!(!session.next_slide());
    assert_eq!(session.progression().current_index(), 1);

    let config = PlayerConfig {
        skip_assessments: true,
        ..PlayerConfig::default()
    };
    let mut session = three_slide_session(config);
    session.next_slide();
    assert!(session.next_slide());
    assert_eq!(session.progression().current_index(), 2);
}

/// Tests that a reveal completes the slide and locks the response.
#[test]
fn test_reveal_in_practice_mode() {
    let mut session = three_slide_session(PlayerConfig::default());
    session.next_slide();

    let answer = session.reveal_answer().expect("reveal allowed");
    assert_eq!(
        answer,
        Response::Choice(["A".to_string(), "C".to_string()].into_iter().collect())
    );
    assert!(session.feedback_state(10).revealed_answer);
    assert!(session.progression().is_completed(1));

    let outcome = session.select_option("B").expect("select B");
    assert_eq!(
        outcome,
        lesson_player::ActionOutcome::Edited {
            changed: false,
            submittable: false,
        }
    );
    assert_eq!(session.submissions().len(), 1);
    assert!(session.submissions()[0].revealed);
}

// ============================================================================
// Graded mode
// ============================================================================

/// Tests that graded questions allow one submission and no reveal.
#[test]
fn test_graded_mode_locks_after_submit() {
    let question = abc_question(10).with_quiz_mode(QuizMode::Graded);
    let slides = vec![text_slide(1, 0), assessment(2, 1, question)];
    let mut session =
        LessonSession::new(module(slides), PlayerConfig::default()).expect("start session");
    session.next_slide();

    let err = session.reveal_answer().unwrap_err();
    assert!(matches!(err, PlayerError::RevealNotAllowed { question_id: 10 }));

    session.select_option("B").expect("select B");
    let verdict = session.submit().expect("submit").expect("graded");
    assert!(!verdict.is_correct);

    // Graded slides complete on the first submit, right or wrong.
    assert!(session.progression().is_completed(1));
    assert!(!session.try_again().expect("try again"));

    session.select_option("A").expect("edit is ignored, not rejected");
    assert!(session.submit().expect("submit").is_none());
    assert_eq!(session.feedback_state(10).attempts, 1);
    assert_eq!(session.submissions().len(), 1);
}

/// Tests that the configured quiz mode overrides the question's own.
#[test]
fn test_config_quiz_mode_override() {
    let config = PlayerConfig {
        quiz_mode: Some(QuizMode::Graded),
        ..PlayerConfig::default()
    };
    let mut session = three_slide_session(config);
    session.next_slide();

    let question = session.current_question().cloned().expect("on a question");
    assert_eq!(question.quiz_mode, QuizMode::Practice);
    assert_eq!(session.quiz_mode(&question), QuizMode::Graded);
    assert!(session.reveal_answer().is_err());
}

// ============================================================================
// Drag and drop
// ============================================================================

/// Tests that moving an item keeps it in exactly one bucket.
#[test]
fn test_drag_drop_single_bucket() {
    let slides = vec![assessment(1, 0, tones_question(30))];
    let mut session =
        LessonSession::new(module(slides), PlayerConfig::default()).expect("start session");

    session.move_item("red", Some("cool")).expect("move red");
    session.move_item("red", Some("warm")).expect("move red again");

    let placement = session.placements().placement(30);
    assert_eq!(placement["warm"], vec!["red"]);
    assert_eq!(placement.get("cool").map_or(0, Vec::len), 0);
    assert_eq!(session.placements().bucket_of(30, "red"), Some("warm"));

    session.move_item("orange", Some("warm")).expect("move orange");
    assert!(!session.progression().is_submittable(0));
    session.move_item("teal", Some("cool")).expect("move teal");
    assert!(session.progression().is_submittable(0));

    let verdict = session.submit().expect("submit").expect("graded");
    assert!(verdict.is_correct);
}

/// Tests that unknown items and buckets are refused.
#[test]
fn test_drag_drop_unknown_item() {
    let slides = vec![assessment(1, 0, tones_question(30))];
    let mut session =
        LessonSession::new(module(slides), PlayerConfig::default()).expect("start session");

    assert!(matches!(
        session.move_item("purple", Some("warm")),
        Err(PlayerError::UnknownOption { .. })
    ));
    assert!(matches!(
        session.move_item("red", Some("lukewarm")),
        Err(PlayerError::UnknownOption { .. })
    ));
    assert!(session.placements().get(30).is_none());
}

/// Tests that removing an item makes the slide unsubmittable again.
#[test]
fn test_drag_drop_remove_item() {
    let slides = vec![assessment(1, 0, tones_question(30))];
    let mut session =
        LessonSession::new(module(slides), PlayerConfig::default()).expect("start session");

    for (item, bucket) in [("orange", "warm"), ("red", "warm"), ("teal", "cool")] {
        session.move_item(item, Some(bucket)).expect("move");
    }
    assert!(session.progression().is_submittable(0));

    session.move_item("teal", None).expect("remove teal");
    assert!(!session.progression().is_submittable(0));
    assert_eq!(session.placements().bucket_of(30, "teal"), None);
}

// ============================================================================
// Navigation
// ============================================================================

/// Tests the navigation bounds.
#[test]
fn test_navigation_bounds() {
    let config = PlayerConfig {
        skip_assessments: true,
        ..PlayerConfig::default()
    };
    let mut session = three_slide_session(config);

    assert!(!session.previous_slide());
    assert!(!session.jump_to(3));
    assert_eq!(session.progression().current_index(), 0);

    assert!(session.jump_to(2));
    assert!(!session.next_slide());
    assert!(session.previous_slide());
    assert_eq!(session.progression().current_index(), 1);
}

/// Tests that answering operations fail on a non-assessment slide.
#[test]
fn test_actions_on_content_slide() {
    let mut session = three_slide_session(PlayerConfig::default());

    assert!(matches!(
        session.select_option("A"),
        Err(PlayerError::NotAnAssessment { .. })
    ));
    assert!(matches!(
        session.submit(),
        Err(PlayerError::NotAnAssessment { .. })
    ));
    assert!(session.current_verdict().is_none());
}

/// Tests that restarting clears every answer and returns to the start.
#[test]
fn test_restart_clears_progress() {
    let mut session = three_slide_session(PlayerConfig::default());
    session.next_slide();
    session.select_option("A").expect("select");
    session.select_option("C").expect("select");
    session.submit().expect("submit");
    session.next_slide();

    session.restart();

    assert_eq!(session.progression().current_index(), 0);
    assert_eq!(session.progression().completed_count(), 1);
    assert!(session.submissions().is_empty());
    assert_eq!(session.response(10), Some(Response::Choice(BTreeSet::new())));
    assert_eq!(session.feedback_state(10).attempts, 0);
}

// ============================================================================
// Evaluation
// ============================================================================

/// Tests that evaluating the same response twice gives the same verdict.
#[test]
fn test_evaluation_is_idempotent() {
    let question = abc_question(10);
    let response = Response::Choice(["A".to_string(), "B".to_string()].into_iter().collect());
    let options = EvaluationOptions::default().with_feedback_visible(true);

    let first = evaluate(&question, &response, &options).expect("evaluate");
    let second = evaluate(&question, &response, &options).expect("evaluate");

    assert_eq!(first, second);
    assert_eq!(first.status_of("B"), OptionStatus::SelectedIncorrect);
}

/// Tests that hidden feedback never points at unselected correct options.
#[test]
fn test_hidden_feedback_statuses() {
    let question = abc_question(10);
    let response = Response::Choice(["A".to_string()].into_iter().collect());

    let verdict =
        evaluate(&question, &response, &EvaluationOptions::default()).expect("evaluate");

    assert_eq!(verdict.status_of("C"), OptionStatus::Unselected);
}

// ============================================================================
// Malformed questions
// ============================================================================

fn numeric_session(operator: Option<&str>) -> LessonSession {
    let question = Question::new(
        40,
        QuestionKind::Numeric {
            expected: Some(12.0),
            operator: operator.map(str::to_string),
        },
    );
    let slides = vec![text_slide(1, 0), assessment(2, 1, question)];
    LessonSession::new(module(slides), PlayerConfig::default()).expect("start session")
}

/// Tests that grading a malformed numeric question fails loudly and
/// writes nothing.
#[test]
fn test_malformed_numeric_question_fails_loudly() {
    for operator in [Some("about"), None] {
        let mut session = numeric_session(operator);
        session.next_slide();
        session.enter_number("12").expect("enter number");
        assert!(session.progression().is_submittable(1));

        let err = session.submit().unwrap_err();

        assert!(matches!(
            err,
            PlayerError::UnsupportedQuestion {
                question_id: 40,
                ..
            }
        ));
        assert!(err.is_content_error());
        assert_eq!(session.feedback_state(40), FeedbackState::new());
        assert_eq!(session.progression().correctness_states()[1], None);
        assert!(!session.progression().is_completed(1));
        assert!(session.submissions().is_empty());
        assert!(session.current_verdict().is_none());
    }
}

/// Tests that a choice question without a correct set fails loudly.
#[test]
fn test_missing_correct_answer_fails_loudly() {
    let question = Question::new(
        50,
        QuestionKind::SingleChoice {
            options: vec![ChoiceOption::new("yes"), ChoiceOption::new("no")],
            correct: None,
        },
    );
    let slides = vec![assessment(1, 0, question)];
    let mut session =
        LessonSession::new(module(slides), PlayerConfig::default()).expect("start session");
    session.select_option("yes").expect("select");

    let err = session.submit().unwrap_err();

    assert!(err.is_content_error());
    assert_eq!(session.feedback_state(50).attempts, 0);
    assert!(session.submissions().is_empty());
    assert!(session.reveal_answer().unwrap_err().is_content_error());
}

/// Tests that a replay stops at the malformed question.
#[test]
fn test_replay_stops_on_malformed_question() {
    let mut session = numeric_session(Some("about"));
    let actions = vec![
        PlayerAction::Next,
        PlayerAction::EnterNumber {
            text: "12".to_string(),
        },
        PlayerAction::Submit,
        PlayerAction::Previous,
    ];

    let mut seen = 0;
    let err = session.replay(actions, |_, _, _| seen += 1).unwrap_err();

    assert!(err.is_content_error());
    assert_eq!(seen, 3);
    assert_eq!(session.progression().current_index(), 1);
}
