use paa::handlers::*;
use paa::command_argument_builder;
use paa_scanner::{
    CancellationToken, Explorer, QuestionSource, RelatedQuestionMap, SearchPage, Selection,
    Snippet, SourceError,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

#[derive(Default)]
struct StubSource {
    graph: HashMap<String, Vec<String>>,
    answers: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubSource {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        Self {
            graph: edges
                .iter()
                .map(|(from, to)| (from.to_string(), to.iter().map(|q| q.to_string()).collect()))
                .collect(),
            ..Default::default()
        }
    }

    fn answering(mut self, question: &str, text: &str) -> Self {
        self.answers.insert(question.to_string(), text.to_string());
        self
    }

    fn failing_on(mut self, question: &str) -> Self {
        self.failing.insert(question.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl QuestionSource for StubSource {
    async fn lookup(&self, question: &str) -> Result<SearchPage, SourceError> {
        self.calls.lock().unwrap().push(question.to_string());
        if self.failing.contains(question) {
            return Err(SourceError::Status(503));
        }
        let related: RelatedQuestionMap = self
            .graph
            .get(question)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|q| {
                let link = format!("https://example.com/{}", q.replace(' ', "-"));
                (q, link)
            })
            .collect();
        let page = SearchPage::new(related);
        Ok(match self.answers.get(question) {
            Some(text) => page.with_snippet(Snippet::definition(text)),
            None => page,
        })
    }
}

fn explorer(source: StubSource) -> Explorer<StubSource> {
    Explorer::new(source).with_delay(Duration::ZERO)
}

fn graph() -> StubSource {
    StubSource::new(&[
        ("X", &["x1", "x2"]),
        ("x1", &["x3"]),
        ("Y", &["y1"]),
        ("Z", &[]),
    ])
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["paa"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_collect_defaults() {
    let matches = sub_matches(&["collect", "-i", "seeds.txt", "-o", "out.json"]);

    assert_eq!(matches.get_one::<String>("format").unwrap(), "json");
    assert_eq!(*matches.get_one::<usize>("max-related").unwrap(), 4);
    assert_eq!(*matches.get_one::<usize>("threads").unwrap(), 1);
}

#[test]
fn test_collect_requires_input_and_output() {
    let result = command_argument_builder().try_get_matches_from(["paa", "collect", "-o", "out"]);
    assert!(result.is_err());

    let result =
        command_argument_builder().try_get_matches_from(["paa", "collect", "-i", "seeds.txt"]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_format_rejected() {
    let result = command_argument_builder().try_get_matches_from([
        "paa", "collect", "-i", "seeds.txt", "-o", "out", "-f", "xml",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_subcommand_required() {
    let result = command_argument_builder().try_get_matches_from(["paa"]);
    assert!(result.is_err());
}

#[test]
fn test_search_settings_defaults() {
    let matches = command_argument_builder()
        .try_get_matches_from(["paa", "related", "what is rust?"])
        .unwrap();
    let settings = SearchSettings::from_matches(&matches);

    assert_eq!(settings.delay, Duration::from_millis(1000));
    assert_eq!(settings.timeout_secs, 10);
    assert_eq!(settings.country, "us");
    assert_eq!(settings.seed, None);
    assert_eq!(settings.endpoint, None);
    assert_eq!(settings.selection(), Selection::BreadthFirst);
    assert!(!matches.get_flag("quiet"));
}

#[test]
fn test_global_flags_after_subcommand() {
    let matches = command_argument_builder()
        .try_get_matches_from([
            "paa",
            "related",
            "what is rust?",
            "--delay-ms",
            "250",
            "--country",
            "uk",
            "--seed",
            "7",
            "-q",
        ])
        .unwrap();
    let settings = SearchSettings::from_matches(&matches);

    assert_eq!(settings.delay, Duration::from_millis(250));
    assert_eq!(settings.country, "uk");
    assert_eq!(settings.selection(), Selection::Seeded(7));
    assert!(matches.get_flag("quiet"));
}

#[test]
fn test_build_explorer_uses_endpoint() {
    let settings = SearchSettings {
        delay: Duration::ZERO,
        timeout_secs: 2,
        country: "de".to_string(),
        seed: None,
        endpoint: Some(Url::parse("http://127.0.0.1:8080/search").unwrap()),
    };
    let token = CancellationToken::new();

    let explorer = build_explorer(&settings, token.clone()).unwrap();
    token.cancel();

    assert_eq!(
        explorer.source().endpoint().as_str(),
        "http://127.0.0.1:8080/search"
    );
    assert!(explorer.cancellation_token().is_cancelled());
}

#[test]
fn test_resolve_path() {
    assert_eq!(resolve_path("out/seeds.txt"), PathBuf::from("out/seeds.txt"));
    if std::env::var_os("HOME").is_some() {
        assert!(!resolve_path("~/seeds.txt").starts_with("~"));
    }
}

#[test]
fn test_format_related() {
    let related: RelatedQuestionMap = [
        ("first?".to_string(), "https://a".to_string()),
        ("second?".to_string(), "https://b".to_string()),
    ]
    .into_iter()
    .collect();

    let text = format_related(&related);

    assert_eq!(
        text,
        "  1. first?\n     https://a\n  2. second?\n     https://b\n"
    );
}

// ============================================================================
// Handlers
// ============================================================================

#[tokio::test]
async fn test_handle_collect_writes_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("seeds.txt");
    let output = dir.path().join("out.json");
    fs::write(&input, "X\n\nY\nX\n").unwrap();

    let matches = sub_matches(&[
        "collect",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-m",
        "3",
    ]);
    let code = handle_collect(&matches, &explorer(graph()), true).await;

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 2);
    assert_eq!(json["X"].as_object().unwrap().len(), 3);
    assert_eq!(json["Y"]["y1"], "https://example.com/y1");
}

#[tokio::test]
async fn test_handle_collect_failed_seed_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("seeds.txt");
    let output = dir.path().join("out.json");
    fs::write(&input, "X\nY\n").unwrap();

    let matches = sub_matches(&[
        "collect",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    let code = handle_collect(&matches, &explorer(graph().failing_on("X")), true).await;

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(json.get("X").is_none());
    assert!(json.get("Y").is_some());
}

#[tokio::test]
async fn test_handle_collect_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.txt");
    let output = dir.path().join("out.json");

    let matches = sub_matches(&[
        "collect",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    let code = handle_collect(&matches, &explorer(graph()), true).await;

    assert_eq!(code, 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_handle_collect_csv_write_failure_fails_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("seeds.txt");
    let output = dir.path().join("artifacts");
    fs::write(&input, "X\nY\n").unwrap();
    fs::create_dir_all(output.join("X.csv")).unwrap();

    let matches = sub_matches(&[
        "collect",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-f",
        "csv",
    ]);
    let code = handle_collect(&matches, &explorer(graph()), true).await;

    assert_eq!(code, 1);
    assert!(output.join("Y.csv").is_file());
}

#[tokio::test]
async fn test_handle_related_exit_codes() {
    let explorer = explorer(graph().failing_on("Z"));

    let code = handle_related(&sub_matches(&["related", "X"]), &explorer).await;
    assert_eq!(code, 0);

    let code = handle_related(&sub_matches(&["related", "X", "-m", "3"]), &explorer).await;
    assert_eq!(code, 0);

    let code = handle_related(&sub_matches(&["related", "Z"]), &explorer).await;
    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_handle_answer_exit_codes() {
    let explorer = explorer(graph().answering("X", "An answer.").failing_on("Z"));

    assert_eq!(handle_answer(&sub_matches(&["answer", "X"]), &explorer).await, 0);
    assert_eq!(handle_answer(&sub_matches(&["answer", "Y"]), &explorer).await, 0);
    assert_eq!(handle_answer(&sub_matches(&["answer", "Z"]), &explorer).await, 1);
}

#[tokio::test]
async fn test_handle_answers_stops_at_limit() {
    let explorer = explorer(
        graph()
            .answering("x1", "one")
            .answering("x2", "two")
            .answering("x3", "three"),
    );

    let code = handle_answers(&sub_matches(&["answers", "X", "-l", "2"]), &explorer).await;

    assert_eq!(code, 0);
    assert_eq!(explorer.source().calls(), vec!["X", "x1", "x2"]);
}

#[tokio::test]
async fn test_handle_answers_without_limit_walks_everything() {
    let explorer = explorer(
        graph()
            .answering("x1", "one")
            .answering("x2", "two")
            .answering("x3", "three"),
    );

    let code = handle_answers(&sub_matches(&["answers", "X"]), &explorer).await;

    assert_eq!(code, 0);
    assert_eq!(explorer.source().calls(), vec!["X", "x1", "x2", "x3"]);
}

#[tokio::test]
async fn test_handle_answers_reports_source_failure() {
    let explorer = explorer(graph().answering("x1", "one").failing_on("x2"));

    let code = handle_answers(&sub_matches(&["answers", "X"]), &explorer).await;

    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_handle_summarize_without_answer_succeeds() {
    let explorer = explorer(graph().answering("x1", "one"));

    let code = handle_summarize(&sub_matches(&["summarize", "Z"]), &explorer, true).await;
    assert_eq!(code, 0);

    let code = handle_summarize(
        &sub_matches(&["summarize", "X", "--fallback"]),
        &explorer,
        true,
    )
    .await;
    assert_eq!(code, 0);
}

#[tokio::test]
async fn test_cancelled_explorer_fails_single_question_commands() {
    let explorer = explorer(graph());
    explorer.cancellation_token().cancel();

    let code = handle_related(&sub_matches(&["related", "X"]), &explorer).await;

    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_cancelled_collect_fails_and_keeps_previous_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("seeds.txt");
    let output = dir.path().join("out.json");
    fs::write(&input, "X\nY\n").unwrap();
    fs::write(&output, r#"{"previous":{}}"#).unwrap();
    let explorer = explorer(graph());
    explorer.cancellation_token().cancel();

    let matches = sub_matches(&[
        "collect",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    let code = handle_collect(&matches, &explorer, true).await;

    assert_eq!(code, 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), r#"{"previous":{}}"#);
    assert!(explorer.source().calls().is_empty());
}

#[tokio::test]
async fn test_cancelled_answers_fails() {
    let explorer = explorer(graph().answering("X", "An answer."));
    explorer.cancellation_token().cancel();

    let code = handle_answers(&sub_matches(&["answers", "X"]), &explorer).await;

    assert_eq!(code, 1);
    assert!(explorer.source().calls().is_empty());
}
