//! End-to-end replay tests
//!
//! These tests load the colour theory fixture from disk, replay its
//! scripted learner actions through a session and check the resulting
//! report in both output formats.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use lesson_player::{
    ActionOutcome, LessonSession, Module, PlayerAction, PlayerConfig, PlayerError, Response,
    SubmissionRecord, DEFAULT_MAX_MODULE_SIZE_KB,
};
use lesson_report::{
    json::JsonGenerator, AttemptInput, MarkdownGenerator, QuestionInput, QuestionOutcome,
    ReportGenerator, ReportInput, SessionReport, SessionStatus,
};

/// Path to the colour theory fixture.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/colours")
}

fn load_module() -> Module {
    Module::load(fixture_path().join("module.json"), DEFAULT_MAX_MODULE_SIZE_KB)
        .expect("Failed to load module fixture")
}

fn load_script() -> Vec<PlayerAction> {
    let contents =
        std::fs::read_to_string(fixture_path().join("script.json")).expect("Failed to read script");
    serde_json::from_str(&contents).expect("Failed to parse script")
}

fn load_config() -> PlayerConfig {
    PlayerConfig::load_from_file(&fixture_path().join("lesson.json"))
        .expect("Failed to load config fixture")
}

/// Replays every scripted action, keeping the outcome or error of each.
fn replay(session: &mut LessonSession) -> Vec<Result<ActionOutcome, PlayerError>> {
    load_script()
        .into_iter()
        .map(|action| session.apply(action))
        .collect()
}

fn report_input(session: &LessonSession) -> ReportInput {
    let progression = session.progression();
    let questions = progression
        .slides()
        .iter()
        .enumerate()
        .filter_map(|(index, slide)| {
            slide.question().map(|question| {
                QuestionInput::new(question.id, index, question.kind.archetype())
                    .with_title(question.title.clone())
            })
        })
        .collect();

    ReportInput {
        module_name: session.module().name.clone(),
        started_at: session.started_at(),
        finished_at: session.updated_at(),
        slides_total: progression.slide_count(),
        slides_completed: progression.completed_count(),
        questions,
        attempts: session.submissions().iter().map(attempt_input).collect(),
    }
}

fn attempt_input(record: &SubmissionRecord) -> AttemptInput {
    let answer = record.response.to_answer_texts();
    if record.revealed {
        AttemptInput::revealed(record.question_id, record.attempt, answer, record.submitted_at)
    } else {
        AttemptInput::submitted(
            record.question_id,
            record.attempt,
            record.is_correct,
            answer,
            record.submitted_at,
        )
    }
}

fn replayed_report() -> SessionReport {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    replay(&mut session);
    ReportGenerator::new(report_input(&session))
        .generate()
        .expect("Failed to generate report")
}

// ============================================================================
// Fixtures
// ============================================================================

/// Tests that the module fixture loads, sorted and without drafts.
#[test]
fn test_module_fixture_loads() {
    let module = load_module();

    assert_eq!(module.name, "Colour Theory Basics");
    assert_eq!(module.slides.len(), 7);
    assert_eq!(module.assessment_count(), 3);

    let ids: Vec<u64> = module.playable_slides().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![101, 102, 103, 104, 105, 107]);
}

/// Tests that the config fixture overrides only what it names.
#[test]
fn test_config_fixture_loads() {
    let config = load_config();

    assert_eq!(config.output_dir, "reports");
    assert!((config.numeric_tolerance - 0.000_001).abs() < f64::EPSILON);
    assert!(config.quiz_mode.is_none());
    assert!(!config.skip_assessments);
    assert!(config.validate().is_ok());
}

/// Tests that every scripted action parses.
#[test]
fn test_script_fixture_parses() {
    let script = load_script();

    assert_eq!(script.len(), 20);
    assert_eq!(script[0], PlayerAction::Next);
    assert_eq!(
        script[10],
        PlayerAction::MoveItem {
            item: "orange".to_string(),
            bucket: Some("warm".to_string()),
        }
    );
}

// ============================================================================
// Replay
// ============================================================================

/// Tests the outcome of each scripted action.
#[test]
fn test_replay_trace() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    let results = replay(&mut session);

    let navigated = |result: &Result<ActionOutcome, PlayerError>| match result {
        Ok(ActionOutcome::Navigated { moved, index }) => Some((*moved, *index)),
        _ => None,
    };
    let graded = |result: &Result<ActionOutcome, PlayerError>| match result {
        Ok(ActionOutcome::Submitted { verdict }) => verdict.as_ref().map(|v| v.is_correct),
        _ => None,
    };

    assert_eq!(navigated(&results[1]), Some((true, 2)));

    // First try on the multiple choice question is wrong and blocks advance.
    assert_eq!(graded(&results[3]), Some(false));
    assert_eq!(navigated(&results[4]), Some((false, 2)));
    assert!(matches!(results[5], Ok(ActionOutcome::Retried { reset: true })));
    assert_eq!(graded(&results[7]), Some(true));
    assert!(matches!(
        results[8],
        Ok(ActionOutcome::ExplanationToggled { visible: true })
    ));
    assert_eq!(navigated(&results[9]), Some((true, 3)));

    // Drag and drop becomes submittable once every item is placed.
    assert!(matches!(
        results[11],
        Ok(ActionOutcome::Edited {
            submittable: false,
            ..
        })
    ));
    assert!(matches!(
        results[12],
        Ok(ActionOutcome::Edited {
            submittable: true,
            ..
        })
    ));
    assert!(matches!(
        results[13],
        Err(PlayerError::RevealNotAllowed { question_id: 30 })
    ));
    assert_eq!(graded(&results[14]), Some(false));
    assert_eq!(navigated(&results[15]), Some((true, 4)));

    // Unparseable numeric input leaves nothing to submit.
    assert!(matches!(
        results[16],
        Ok(ActionOutcome::Edited {
            changed: false,
            submittable: false,
        })
    ));
    assert!(matches!(
        results[17],
        Ok(ActionOutcome::Submitted { verdict: None })
    ));
    assert!(matches!(
        &results[18],
        Ok(ActionOutcome::Revealed { answer: Response::Numeric(Some(value)) })
            if (*value - 12.0).abs() < f64::EPSILON
    ));
    assert_eq!(navigated(&results[19]), Some((true, 5)));

    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
}

/// Tests the batch replay used by the command line runner.
#[test]
fn test_batch_replay_counts_refusals() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");

    let mut steps = 0;
    let rejected = session
        .replay(load_script(), |_, _, _| steps += 1)
        .expect("fixture has no malformed questions");

    assert_eq!(rejected, 1);
    assert_eq!(steps, 20);
    assert_eq!(session.submissions().len(), 4);
}

/// Tests the session state after the replay.
#[test]
fn test_replay_final_state() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    replay(&mut session);

    let progression = session.progression();
    assert_eq!(progression.current_index(), 5);
    assert_eq!(progression.completed_count(), 6);
    assert_eq!(
        progression.correctness_states(),
        &[None, None, Some(true), Some(false), None, None]
    );

    let summary: Vec<(u64, u32, bool, bool)> = session
        .submissions()
        .iter()
        .map(|r| (r.question_id, r.attempt, r.is_correct, r.revealed))
        .collect();
    assert_eq!(
        summary,
        vec![
            (20, 1, false, false),
            (20, 2, true, false),
            (30, 1, false, false),
            (40, 0, false, true),
        ]
    );

    let results = session.latest_results();
    assert_eq!(results.get(&20), Some(&(2, true)));
    assert_eq!(results.get(&30), Some(&(1, false)));
    assert!(!results.contains_key(&40));
}

/// Tests that a restart after the replay starts the module over.
#[test]
fn test_replay_then_restart() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    replay(&mut session);

    let outcome = session.apply(PlayerAction::Restart).expect("restart");

    assert_eq!(outcome, ActionOutcome::Restarted);
    assert_eq!(session.progression().current_index(), 0);
    assert!(session.submissions().is_empty());
    assert!(session.placements().get(30).is_none());
}

// ============================================================================
// Reports
// ============================================================================

/// Tests the summary figures of the replayed session.
#[test]
fn test_report_summary() {
    let report = replayed_report();
    let summary = &report.summary;

    assert_eq!(report.module_name, "Colour Theory Basics");
    assert_eq!(summary.status, SessionStatus::Completed);
    assert_eq!(summary.slides_total, 6);
    assert_eq!(summary.slides_completed, 6);
    assert_eq!(summary.assessments_total, 3);
    assert_eq!(summary.answered, 2);
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.first_try_correct, 0);
    assert_eq!(summary.revealed, 1);
    assert_eq!(summary.score_percent, 33);
}

/// Tests the per-question results of the replayed session.
#[test]
fn test_report_questions() {
    let report = replayed_report();

    let outcomes: Vec<(u64, QuestionOutcome)> = report
        .questions
        .iter()
        .map(|q| (q.question_id, q.outcome()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (20, QuestionOutcome::Correct),
            (30, QuestionOutcome::Incorrect),
            (40, QuestionOutcome::Revealed),
        ]
    );

    let colours = &report.questions[0];
    assert_eq!(colours.attempts, 2);
    assert_eq!(colours.archetype, "multiple choice");
    assert_eq!(colours.final_answer, vec!["blue", "red"]);

    let hues = &report.questions[2];
    assert!(hues.final_answer.is_empty());

    let missed: Vec<u64> = report
        .missed_questions()
        .iter()
        .map(|q| q.question_id)
        .collect();
    assert_eq!(missed, vec![30, 40]);
}

/// Tests that both report formats are written and agree.
#[test]
fn test_reports_written_to_disk() {
    let report = replayed_report();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let md_path = dir.path().join("lesson-report.md");
    std::fs::write(&md_path, MarkdownGenerator::new(&report).generate())
        .expect("Failed to write Markdown report");
    let json_path = dir.path().join("lesson-report.json");
    JsonGenerator::new(&report)
        .write_to_file(&json_path, true)
        .expect("Failed to write JSON report");

    let markdown = std::fs::read_to_string(&md_path).expect("Failed to read Markdown report");
    assert!(markdown.contains("# Lesson Report: Colour Theory Basics"));
    assert!(markdown.contains("## Needs Review"));
    assert!(markdown.contains("Warm or cool"));
    assert!(markdown.contains("Answer revealed for question 40"));

    let json = std::fs::read_to_string(&json_path).expect("Failed to read JSON report");
    let parsed: SessionReport = serde_json::from_str(&json).expect("Invalid JSON report");
    assert_eq!(parsed, report);
}

/// Tests the duration and timeline bounds with a fixed session window.
#[test]
fn test_report_with_fixed_session_window() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    replay(&mut session);

    let mut input = report_input(&session);
    input.started_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    input.finished_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 12, 5).unwrap();
    let report = ReportGenerator::new(input).generate().expect("generate report");

    assert_eq!(report.summary.duration_seconds, 725);
    assert_eq!(report.timeline[0].event, "Session started");
    assert_eq!(
        report.timeline[0].timestamp,
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    );

    let markdown = MarkdownGenerator::new(&report).generate();
    assert!(markdown.contains("| Duration | 12m 5s |"));
}

/// Tests that a session window ending before it starts is refused.
#[test]
fn test_report_rejects_inverted_window() {
    let mut session = LessonSession::new(load_module(), load_config()).expect("start session");
    replay(&mut session);

    let mut input = report_input(&session);
    input.finished_at = input.started_at - chrono::Duration::seconds(1);

    assert!(ReportGenerator::new(input).generate().is_err());
}
