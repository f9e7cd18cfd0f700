//! Lesson Player CLI
//!
//! Replays a scripted list of learner actions against a lesson module and
//! writes a session report.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use lesson_player::{
    LessonSession, Module, PlayerAction, PlayerConfig, PlayerError, SubmissionRecord,
};
use lesson_report::{
    json::JsonGenerator, AttemptInput, MarkdownGenerator, QuestionInput, ReportGenerator,
    ReportInput,
};
use tracing_subscriber::EnvFilter;

/// Lesson Player - Interactive Lesson Replay Tool
///
/// Loads a lesson module, plays a scripted sequence of learner actions
/// through a session, and reports progress and answers.
#[derive(Parser, Debug)]
#[command(name = "lesson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the module JSON file
    #[arg(value_name = "MODULE")]
    module: PathBuf,

    /// Path to configuration file (default: lesson.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to a JSON array of learner actions to replay
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Lesson player starting");
    tracing::debug!(config = ?args.config, script = ?args.script, "Arguments");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs one replay:
/// 1. Load config and apply overrides
/// 2. Load the module and the script
/// 3. Apply every scripted action to a fresh session
/// 4. Print a summary and write reports
fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(ref output_dir) = args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    config.validate()?;

    print_config(&config);

    tracing::info!(module = %args.module.display(), "Loading module");
    let module = Module::load(&args.module, config.max_module_size_kb)?;
    print_module_info(&module);

    let actions = match args.script.as_deref() {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let mut session = LessonSession::new(module, config)?;

    println!();
    println!("Replaying {} action(s)...", actions.len());
    let rejected = replay(&mut session, actions)?;

    println!();
    print_summary(&session, rejected);

    let report_dir = PathBuf::from(&session.config().output_dir);
    generate_reports(&session, &report_dir)?;

    Ok(())
}

/// Applies each action in order, printing one line per step.
///
/// Actions the session refuses (a reveal in graded mode, an unknown
/// option, an answer on a content slide) are reported and skipped. A
/// malformed question stops the replay. Returns the number of refused
/// actions.
fn replay(session: &mut LessonSession, actions: Vec<PlayerAction>) -> anyhow::Result<usize> {
    let rejected = session.replay(actions, |step, action, result| {
        let label = serde_json::to_string(action).unwrap_or_else(|_| format!("{action:?}"));
        match result {
            Ok(outcome) => println!("  [{step}] {label} -> {outcome}"),
            Err(e) => println!("  [{step}] {label} -> rejected: {}", first_line(e)),
        }
    })?;
    Ok(rejected)
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&Path>) -> anyhow::Result<PlayerConfig> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            PlayerConfig::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => PlayerConfig::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Loads the list of scripted actions.
fn load_script(path: &Path) -> anyhow::Result<Vec<PlayerAction>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read script: {e}\n\nPath: {}",
            path.display()
        )
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        anyhow::anyhow!(
            "Invalid script '{}': {e}\n\nSuggestion: A script is a JSON array such as [{{\"action\": \"select\", \"option\": \"A\"}}, {{\"action\": \"submit\"}}]",
            path.display()
        )
    })
}

/// First line of an error message, without the suggestion block.
fn first_line(error: &PlayerError) -> String {
    error.to_string().lines().next().unwrap_or_default().to_string()
}

/// Prints the loaded configuration.
fn print_config(config: &PlayerConfig) {
    println!("Configuration loaded:");
    match config.quiz_mode {
        Some(mode) => println!("  Quiz mode: {} (all questions)", mode.as_str()),
        None => println!("  Quiz mode: per question"),
    }
    println!("  Skip assessments: {}", config.skip_assessments);
    println!("  Case-sensitive blanks: {}", config.case_sensitive_blanks);
    println!("  Output directory: {}", config.output_dir);
}

/// Prints module information.
fn print_module_info(module: &Module) {
    let playable = module.playable_slides();
    println!();
    println!("Module loaded:");
    println!("  Name: {}", module.name);
    println!("  Slides: {} ({} published)", module.slides.len(), playable.len());
    println!("  Assessments: {}", module.assessment_count());

    for (index, slide) in playable.iter().enumerate() {
        tracing::debug!(
            index,
            slide_id = slide.id,
            kind = slide.type_name(),
            "Slide"
        );
    }
}

/// Prints a summary of the session.
fn print_summary(session: &LessonSession, rejected: usize) {
    let progression = session.progression();
    println!("=== Lesson Summary ===");
    println!(
        "Current slide: {} of {}",
        progression.current_index() + 1,
        progression.slide_count()
    );
    println!(
        "Completed slides: {} of {}",
        progression.completed_count(),
        progression.slide_count()
    );

    let results = session.latest_results();
    let correct = results.values().filter(|(_, is_correct)| *is_correct).count();
    println!("Answered: {} ({correct} correct)", results.len());
    println!("Submissions: {}", session.submissions().len());
    if rejected > 0 {
        println!("Rejected actions: {rejected}");
    }

    let elapsed = session.updated_at() - session.started_at();
    println!(
        "Duration: {}m {}s",
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    );
}

/// Generates reports from the final session state.
///
/// Creates both Markdown and JSON reports in the output directory.
fn generate_reports(session: &LessonSession, output_dir: &Path) -> anyhow::Result<()> {
    println!();
    println!("Generating reports...");

    let input = create_report_input(session);
    let report = ReportGenerator::new(input).generate()?;

    std::fs::create_dir_all(output_dir)?;

    let md_path = output_dir.join("lesson-report.md");
    std::fs::write(&md_path, MarkdownGenerator::new(&report).generate())?;
    println!("  Markdown report: {}", md_path.display());

    let json_path = output_dir.join("lesson-report.json");
    JsonGenerator::new(&report).write_to_file(&json_path, true)?;
    println!("  JSON report: {}", json_path.display());

    println!();
    println!(
        "Score: {}% ({} of {} correct)",
        report.summary.score_percent, report.summary.correct, report.summary.assessments_total
    );

    Ok(())
}

/// Creates a `ReportInput` from the session.
fn create_report_input(session: &LessonSession) -> ReportInput {
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
        attempts: session.submissions().iter().map(convert_submission).collect(),
    }
}

/// Converts a `SubmissionRecord` to `AttemptInput`.
fn convert_submission(record: &SubmissionRecord) -> AttemptInput {
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
