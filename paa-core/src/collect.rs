use crate::error::{CollectError, Result};
use crate::output::{
    ArtifactNamer, OutputFormat, ensure_output_dir, write_csv_artifact, write_json_artifact,
};
use futures::StreamExt;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use paa_scanner::{Explorer, QuestionSource, RelatedQuestionMap, ScanError};
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Options for configuring a collection run
pub struct CollectOptions {
    pub questions: Vec<String>,
    pub target_count: usize,
    pub format: OutputFormat,
    /// JSON file for [`OutputFormat::Json`], directory for [`OutputFormat::Csv`].
    pub output: PathBuf,
    pub workers: usize,
    pub show_progress_bars: bool,
}

/// Callback for reporting collection progress
pub type CollectProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone)]
pub enum SeedStatus {
    Collected { related: RelatedQuestionMap },
    FetchFailed { error: String },
    WriteFailed { related: RelatedQuestionMap, error: String },
}

#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub seed: String,
    pub status: SeedStatus,
    pub elapsed: Duration,
    pub artifact: Option<PathBuf>,
}

impl SeedOutcome {
    pub fn related(&self) -> Option<&RelatedQuestionMap> {
        match &self.status {
            SeedStatus::Collected { related } | SeedStatus::WriteFailed { related, .. } => {
                Some(related)
            }
            SeedStatus::FetchFailed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SeedStatus::Collected { .. } => None,
            SeedStatus::FetchFailed { error } | SeedStatus::WriteFailed { error, .. } => {
                Some(error)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub outcomes: Vec<SeedOutcome>,
    pub format: OutputFormat,
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl CollectionReport {
    pub fn collected_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SeedStatus::Collected { .. }))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SeedOutcome> {
        self.outcomes.iter().filter(|o| o.error().is_some())
    }

    pub fn has_write_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, SeedStatus::WriteFailed { .. }))
    }

    pub fn total_related(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(SeedOutcome::related)
            .map(|related| related.len())
            .sum()
    }
}

/// Expands every seed question and writes the artifacts.
///
/// Seeds are independent: a seed whose expansion or artifact fails is
/// recorded in the report and the run moves on. Only failures that leave no
/// usable output at all (the output directory or the single JSON file cannot
/// be written) end the run with an error. A cancelled run stops before any
/// JSON output is written and returns [`CollectError::Cancelled`].
pub async fn execute_collection<S: QuestionSource>(
    explorer: &Explorer<S>,
    options: CollectOptions,
    progress_callback: Option<CollectProgressCallback>,
) -> Result<CollectionReport> {
    let CollectOptions {
        questions,
        target_count,
        format,
        output,
        workers,
        show_progress_bars,
    } = options;

    let total = questions.len();
    let workers = workers.max(1);
    info!(
        "Collecting up to {} related questions for {} seed(s) with {} worker(s)",
        target_count, total, workers
    );

    if format == OutputFormat::Csv {
        ensure_output_dir(&output)?;
    }

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("Starting collection...");
        Some(pb)
    } else {
        None
    };

    let started = Instant::now();
    let progress = progress_callback.as_ref();
    let pb = progress_bar.as_ref();

    let mut expansions = pin!(
        futures::stream::iter(questions.into_iter().enumerate())
            .map(|(idx, seed)| async move {
                if let Some(callback) = progress {
                    callback(format!("Collecting {}/{}: {}", idx + 1, total, seed));
                }
                if let Some(pb) = pb {
                    pb.set_message(seed.clone());
                }
                let seed_started = Instant::now();
                let result = explorer.expand_bounded(&seed, target_count).await;
                (seed, result, seed_started.elapsed())
            })
            .buffered(workers)
    );

    let mut namer = ArtifactNamer::new(&output, "csv");
    let mut outcomes = Vec::with_capacity(total);

    while let Some((seed, result, elapsed)) = expansions.next().await {
        if matches!(result, Err(ScanError::Cancelled)) {
            warn!("Collection cancelled at '{}' after {} seed(s)", seed, outcomes.len());
            if let Some(pb) = pb {
                pb.abandon_with_message("Collection cancelled");
            }
            return Err(CollectError::Cancelled {
                completed: outcomes.len(),
            });
        }

        let mut artifact = None;
        let status = match result {
            Ok(related) if format == OutputFormat::Csv => {
                let path = namer.path_for(&seed);
                match write_csv_artifact(&path, &related) {
                    Ok(()) => {
                        artifact = Some(path);
                        SeedStatus::Collected { related }
                    }
                    Err(e) => {
                        warn!("Failed to write artifact for '{}': {}", seed, e);
                        SeedStatus::WriteFailed {
                            related,
                            error: e.to_string(),
                        }
                    }
                }
            }
            Ok(related) => SeedStatus::Collected { related },
            Err(e) => {
                warn!("Failed to collect '{}': {}", seed, e);
                SeedStatus::FetchFailed {
                    error: e.to_string(),
                }
            }
        };

        let outcome = SeedOutcome {
            seed,
            status,
            elapsed,
            artifact,
        };
        if let Some(callback) = progress {
            callback(describe_outcome(&outcome));
        }
        if let Some(pb) = pb {
            pb.inc(1);
        }
        outcomes.push(outcome);
    }

    if format == OutputFormat::Json {
        let collected: IndexMap<String, RelatedQuestionMap> = outcomes
            .iter()
            .filter_map(|o| o.related().map(|related| (o.seed.clone(), related.clone())))
            .collect();
        write_json_artifact(&output, &collected)?;
        for outcome in outcomes.iter_mut().filter(|o| o.related().is_some()) {
            outcome.artifact = Some(output.clone());
        }
    }

    let elapsed = started.elapsed();
    if let Some(pb) = pb {
        pb.finish_with_message(format!("Collection complete in {}", format_elapsed(elapsed)));
    }
    info!(
        "Collected {} seed(s) in {:.2} minutes",
        total,
        elapsed.as_secs_f64() / 60.0
    );

    Ok(CollectionReport {
        outcomes,
        format,
        output,
        elapsed,
    })
}

fn describe_outcome(outcome: &SeedOutcome) -> String {
    match &outcome.status {
        SeedStatus::Collected { related } => format!(
            "[+] {}: {} related question(s) in {}",
            outcome.seed,
            related.len(),
            format_elapsed(outcome.elapsed)
        ),
        SeedStatus::FetchFailed { error } | SeedStatus::WriteFailed { error, .. } => {
            format!("[!] {}: {}", outcome.seed, error)
        }
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.2}min", secs / 60.0)
    }
}

/// Generate a collection report from results
pub fn generate_collection_report(report: &CollectionReport) -> String {
    let mut text = String::new();
    text.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    text.push_str("# Summary:\n");
    text.push_str(&format!("  Seeds processed: {}\n", report.outcomes.len()));
    text.push_str(&format!("  Seeds collected: {}\n", report.collected_count()));
    text.push_str(&format!("  Seeds failed: {}\n", report.failed().count()));
    text.push_str(&format!("  Related questions: {}\n", report.total_related()));
    text.push_str(&format!("  Elapsed: {}\n", format_elapsed(report.elapsed)));
    text.push_str(&format!("  Output: {}\n", report.output.display()));

    text.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for outcome in &report.outcomes {
        text.push_str(&format!("## {}\n", outcome.seed));
        match &outcome.status {
            SeedStatus::Collected { related } => {
                text.push_str(&format!(
                    "  {} related question(s) in {}\n",
                    related.len(),
                    format_elapsed(outcome.elapsed)
                ));
                for question in related.keys() {
                    text.push_str(&format!("  - {}\n", question));
                }
            }
            SeedStatus::FetchFailed { error } => {
                text.push_str(&format!("  \x1b[31mfetch failed\x1b[0m: {}\n", error));
            }
            SeedStatus::WriteFailed { error, .. } => {
                text.push_str(&format!("  \x1b[33mwrite failed\x1b[0m: {}\n", error));
            }
        }
        if let Some(ref artifact) = outcome.artifact {
            text.push_str(&format!("  \x1b[90m{}\x1b[0m\n", artifact.display()));
        }
        text.push('\n');
    }

    text
}
