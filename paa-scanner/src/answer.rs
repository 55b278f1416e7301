use crate::error::{Result, ScanError};
use crate::source::{RelatedQuestionMap, SearchPage, Snippet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub has_answer: bool,
    pub question: String,
    pub related_questions: RelatedQuestionMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub raw_fields: IndexMap<String, String>,
}

impl Answer {
    pub fn unanswered(question: String, related_questions: RelatedQuestionMap) -> Self {
        Self {
            has_answer: false,
            question,
            related_questions,
            response: None,
            source_url: None,
            raw_fields: IndexMap::new(),
        }
    }

    /// Builds the answer record for `question` from its results page.
    ///
    /// A page without a snippet is a valid, unanswered record. A snippet that
    /// has no usable response text is an [`ScanError::AnswerExtraction`].
    pub fn from_page(question: &str, page: SearchPage) -> Result<Self> {
        let SearchPage { related, snippet } = page;
        let Some(snippet) = snippet else {
            return Ok(Self::unanswered(question.to_string(), related));
        };

        let response = normalize_response(question, &snippet)?;
        Ok(Self {
            has_answer: true,
            question: question.to_string(),
            related_questions: related,
            response: Some(response),
            source_url: snippet.link.clone(),
            raw_fields: raw_fields(&snippet),
        })
    }
}

fn normalize_response(question: &str, snippet: &Snippet) -> Result<String> {
    let response = snippet
        .response
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ScanError::AnswerExtraction {
            question: question.to_string(),
            reason: format!("{} snippet has no response text", snippet.kind.as_str()),
        })?;
    Ok(response.to_string())
}

fn raw_fields(snippet: &Snippet) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    fields.insert("snippet_type".to_string(), snippet.kind.as_str().to_string());

    let optional = [
        ("heading", &snippet.heading),
        ("title", &snippet.title),
        ("displayed_link", &snippet.displayed_link),
        ("date", &snippet.date),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            fields.insert(name.to_string(), value.clone());
        }
    }

    if !snippet.raw_text.is_empty() {
        fields.insert("raw_text".to_string(), snippet.raw_text.clone());
    }
    fields
}
