use crate::error::SourceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Related question text mapped to its provenance link, in document order.
pub type RelatedQuestionMap = IndexMap<String, String>;

/// Anything that can look up a question and hand back its parsed results page.
///
/// Implementations perform exactly one upstream request per call. They do not
/// throttle; the [`Explorer`](crate::Explorer) owns pacing.
pub trait QuestionSource {
    fn lookup(
        &self,
        question: &str,
    ) -> impl Future<Output = Result<SearchPage, SourceError>> + Send;
}

/// One search results page, reduced to the parts the explorer cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub related: RelatedQuestionMap,
    pub snippet: Option<Snippet>,
}

impl SearchPage {
    pub fn new(related: RelatedQuestionMap) -> Self {
        Self {
            related,
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        self.snippet = Some(snippet);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetKind {
    Definition,
    List,
    Table,
    Unknown,
}

impl SnippetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetKind::Definition => "definition",
            SnippetKind::List => "list",
            SnippetKind::Table => "table",
            SnippetKind::Unknown => "unknown",
        }
    }
}

/// Featured snippet payload exactly as found in the document. Nothing here is
/// guaranteed present; [`Answer`](crate::Answer) normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub kind: SnippetKind,
    pub heading: Option<String>,
    pub response: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub displayed_link: Option<String>,
    pub date: Option<String>,
    pub raw_text: String,
}

impl Snippet {
    pub fn new(kind: SnippetKind) -> Self {
        Self {
            kind,
            heading: None,
            response: None,
            title: None,
            link: None,
            displayed_link: None,
            date: None,
            raw_text: String::new(),
        }
    }

    /// A definition snippet carrying only response text.
    pub fn definition(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            raw_text: response.to_string(),
            ..Self::new(SnippetKind::Definition)
        }
    }
}
