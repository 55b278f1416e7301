// Search results page parsing

use crate::error::SourceError;
use crate::source::{RelatedQuestionMap, SearchPage, Snippet, SnippetKind};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const RELATED_PAIR: &str = "div.related-question-pair";
const RELATED_HEADING: &str = "[role=\"heading\"], span";
const SNIPPET_BLOCK: &str = "div.xpdopen, div.kp-blk";
const DEFINITION_TEXT: &str = "span.hgKElc, div.LGOjhe, div[data-attrid=\"wa:/description\"]";
const LIST_ITEM: &str = "ol li, ul li";
const TABLE_ROW: &str = "table tr";
const TABLE_CELL: &str = "th, td";
const BOT_CHECK: &str = "form#captcha-form, div#recaptcha";

/// Parses a search results page into its related questions and featured
/// snippet. `base` resolves relative links and builds fallback links.
pub fn parse_search_page(html: &str, base: &Url) -> Result<SearchPage, SourceError> {
    if html.trim().is_empty() {
        return Err(SourceError::Parse("empty document".to_string()));
    }

    let document = Html::parse_document(html);
    if document.select(&selector(BOT_CHECK)?).next().is_some() {
        return Err(SourceError::Parse(
            "search endpoint returned a bot check page".to_string(),
        ));
    }

    Ok(SearchPage {
        related: extract_related(&document, base)?,
        snippet: extract_snippet(&document)?,
    })
}

pub fn extract_related(document: &Html, base: &Url) -> Result<RelatedQuestionMap, SourceError> {
    let pair_selector = selector(RELATED_PAIR)?;
    let heading_selector = selector(RELATED_HEADING)?;
    let link_selector = selector("a[href]")?;

    let mut related = RelatedQuestionMap::new();
    for pair in document.select(&pair_selector) {
        let question = pair
            .value()
            .attr("data-q")
            .map(collapse_whitespace)
            .filter(|q| !q.is_empty())
            .or_else(|| {
                pair.select(&heading_selector)
                    .map(|heading| element_text(&heading))
                    .find(|q| !q.is_empty())
            });

        let Some(question) = question else {
            continue;
        };
        if related.contains_key(&question) {
            continue;
        }

        let link = pair
            .select(&link_selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .find_map(|href| resolve_link(base, href))
            .unwrap_or_else(|| search_link(base, &question));
        related.insert(question, link);
    }

    Ok(related)
}

pub fn extract_snippet(document: &Html) -> Result<Option<Snippet>, SourceError> {
    let block_selector = selector(SNIPPET_BLOCK)?;
    let Some(block) = document
        .select(&block_selector)
        .find(|block| !inside_related_pair(block))
    else {
        return Ok(None);
    };

    let definition = first_text(&block, DEFINITION_TEXT)?;
    let list_items = texts(&block, LIST_ITEM)?;
    let table_rows = table_rows(&block)?;

    let (kind, response) = if let Some(text) = definition {
        (SnippetKind::Definition, Some(text))
    } else if !list_items.is_empty() {
        (SnippetKind::List, Some(list_items.join("\n")))
    } else if !table_rows.is_empty() {
        (SnippetKind::Table, Some(table_rows.join("\n")))
    } else {
        (SnippetKind::Unknown, None)
    };

    let link_selector = selector("div.yuRUbf a[href], a[href]")?;
    let link = block
        .select(&link_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find(|href| href.starts_with("http://") || href.starts_with("https://"))
        .map(str::to_string);

    Ok(Some(Snippet {
        kind,
        heading: first_text(&block, "[role=\"heading\"]")?,
        response,
        title: first_text(&block, "h3")?,
        link,
        displayed_link: first_text(&block, "cite")?,
        date: first_text(&block, "span.kX21rb")?,
        raw_text: element_text(&block),
    }))
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css)
        .map_err(|e| SourceError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

fn inside_related_pair(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|c| c == "related-question-pair"))
}

fn first_text(scope: &ElementRef, css: &str) -> Result<Option<String>, SourceError> {
    Ok(scope
        .select(&selector(css)?)
        .map(|element| element_text(&element))
        .find(|text| !text.is_empty()))
}

fn texts(scope: &ElementRef, css: &str) -> Result<Vec<String>, SourceError> {
    Ok(scope
        .select(&selector(css)?)
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .collect())
}

fn table_rows(scope: &ElementRef) -> Result<Vec<String>, SourceError> {
    let row_selector = selector(TABLE_ROW)?;
    let cell_selector = selector(TABLE_CELL)?;
    Ok(scope
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| element_text(&cell))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .filter(|row| !row.is_empty())
        .collect())
}

fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

/// Link to the results page for `question` on the same endpoint.
pub fn search_link(base: &Url, question: &str) -> String {
    let mut url = base.clone();
    url.set_fragment(None);
    url.query_pairs_mut().clear().append_pair("q", question);
    url.to_string()
}
