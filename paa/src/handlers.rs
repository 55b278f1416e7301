use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use paa_core::{
    CollectOptions, CollectProgressCallback, CollectionReport, OutputFormat, execute_collection,
    generate_collection_report, read_questions,
};
use paa_scanner::{
    CancellationToken, Explorer, GoogleSource, QuestionSource, RelatedQuestionMap, Selection,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_MAX_RELATED: usize = 4;
const DEFAULT_ANSWER_LIMIT: usize = 10;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be set when handlers run inside tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Search settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub delay: Duration,
    pub timeout_secs: u64,
    pub country: String,
    pub seed: Option<u64>,
    pub endpoint: Option<Url>,
}

impl SearchSettings {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            delay: Duration::from_millis(matches.get_one::<u64>("delay-ms").copied().unwrap_or(1000)),
            timeout_secs: matches.get_one::<u64>("timeout").copied().unwrap_or(10),
            country: matches
                .get_one::<String>("country")
                .cloned()
                .unwrap_or_else(|| paa_scanner::google::DEFAULT_COUNTRY.to_string()),
            seed: matches.get_one::<u64>("seed").copied(),
            endpoint: matches.get_one::<Url>("endpoint").cloned(),
        }
    }

    pub fn selection(&self) -> Selection {
        match self.seed {
            Some(seed) => Selection::Seeded(seed),
            None => Selection::BreadthFirst,
        }
    }
}

pub fn build_explorer(
    settings: &SearchSettings,
    token: CancellationToken,
) -> Result<Explorer<GoogleSource>> {
    debug!("Search settings: {:?}", settings);
    let mut source = GoogleSource::with_timeout(settings.timeout_secs)
        .context("Could not build the HTTP client")?
        .with_country(&settings.country);
    if let Some(ref endpoint) = settings.endpoint {
        source = source
            .with_endpoint(endpoint.as_str())
            .context("Invalid search endpoint")?;
    }

    Ok(Explorer::new(source)
        .with_delay(settings.delay)
        .with_selection(settings.selection())
        .with_cancellation(token))
}

/// Expands `~` in a user supplied path.
pub fn resolve_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Exit code for a finished batch: artifacts that could not be written fail
/// the run, seeds that could not be fetched do not.
pub fn collection_exit_code(report: &CollectionReport) -> i32 {
    if report.has_write_failures() { 1 } else { 0 }
}

/// Numbered `question -> link` listing.
pub fn format_related(related: &RelatedQuestionMap) -> String {
    let mut text = String::new();
    for (idx, (question, link)) in related.iter().enumerate() {
        text.push_str(&format!("{:>3}. {}\n     {}\n", idx + 1, question, link));
    }
    text
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| anyhow!("missing required argument '{}'", id))
}

fn report_failure(err: anyhow::Error) -> i32 {
    warn!("Command failed: {:?}", err);
    eprintln!("{} {:#}", "✗".red().bold(), err);
    1
}

pub async fn handle_collect<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
    quiet: bool,
) -> i32 {
    run_collect(sub_matches, explorer, quiet)
        .await
        .unwrap_or_else(report_failure)
}

async fn run_collect<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
    quiet: bool,
) -> Result<i32> {
    let input = resolve_path(required(sub_matches, "input-file")?);
    let output = resolve_path(required(sub_matches, "output")?);
    let format = match sub_matches.get_one::<String>("format") {
        Some(format) => format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?,
        None => OutputFormat::Json,
    };
    let target_count = sub_matches
        .get_one::<usize>("max-related")
        .copied()
        .unwrap_or(DEFAULT_MAX_RELATED);
    let workers = sub_matches.get_one::<usize>("threads").copied().unwrap_or(1);

    let questions = read_questions(&input).context("Could not load seed questions")?;

    if !quiet {
        println!(
            "\n{} Collecting related questions for {} seed(s)",
            "→".blue(),
            questions.len().to_string().bright_white()
        );
        println!("Workers: {}", workers);
        println!("Related per seed: {}", target_count);
        println!(
            "Output: {} ({})\n",
            output.display().to_string().bright_white(),
            match format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
            }
        );
    }

    let progress_callback: Option<CollectProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            if msg.starts_with("[+]") || msg.starts_with("[!]") {
                println!("{}", msg);
            }
        }))
    };

    let options = CollectOptions {
        questions,
        target_count,
        format,
        output,
        workers,
        show_progress_bars: !quiet,
    };

    let report = execute_collection(explorer, options, progress_callback)
        .await
        .context("Collection failed")?;

    if !quiet {
        println!("\n{} Collection complete!\n", "✓".green().bold());
        print!("{}", generate_collection_report(&report));
    }

    let code = collection_exit_code(&report);
    if code != 0 {
        eprintln!(
            "{} Some artifacts could not be written",
            "✗".red().bold()
        );
    }
    Ok(code)
}

pub async fn handle_related<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> i32 {
    run_related(sub_matches, explorer)
        .await
        .unwrap_or_else(report_failure)
}

async fn run_related<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> Result<i32> {
    let question = required(sub_matches, "QUESTION")?;
    let related = match sub_matches.get_one::<usize>("max-related") {
        Some(&max) => explorer.expand_bounded(question, max).await?,
        None => explorer.discover_related(question).await?,
    };

    print!("{}", format_related(&related));
    Ok(0)
}

pub async fn handle_answer<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> i32 {
    run_answer(sub_matches, explorer)
        .await
        .unwrap_or_else(report_failure)
}

async fn run_answer<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> Result<i32> {
    let question = required(sub_matches, "QUESTION")?;
    let answer = explorer.answer(question).await?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(0)
}

pub async fn handle_answers<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> i32 {
    run_answers(sub_matches, explorer)
        .await
        .unwrap_or_else(report_failure)
}

async fn run_answers<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
) -> Result<i32> {
    let question = required(sub_matches, "QUESTION")?;
    let limit = sub_matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(DEFAULT_ANSWER_LIMIT);

    debug!("Streaming up to {} answer(s) for '{}'", limit, question);
    let mut answers = explorer.collect_answers(question);
    let mut printed = 0;
    while printed < limit {
        match answers.next().await {
            Some(Ok(answer)) => {
                println!("{}", serde_json::to_string(&answer)?);
                printed += 1;
            }
            Some(Err(e)) => {
                return Err(e).with_context(|| format!("Stopped after {} answer(s)", printed));
            }
            None => break,
        }
    }
    Ok(0)
}

pub async fn handle_summarize<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
    quiet: bool,
) -> i32 {
    run_summarize(sub_matches, explorer, quiet)
        .await
        .unwrap_or_else(report_failure)
}

async fn run_summarize<S: QuestionSource>(
    sub_matches: &ArgMatches,
    explorer: &Explorer<S>,
    quiet: bool,
) -> Result<i32> {
    let question = required(sub_matches, "QUESTION")?;
    let allow_fallback = sub_matches.get_flag("fallback");

    let summary = explorer.summarize(question, allow_fallback).await?;
    if summary.is_empty() {
        if !quiet {
            eprintln!("{} No answer found for '{}'", "ℹ".blue(), question);
        }
    } else {
        println!("{}", summary);
    }
    Ok(0)
}
