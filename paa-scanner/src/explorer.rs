use crate::answer::Answer;
use crate::error::{Result, ScanError};
use crate::frontier::{Frontier, Selection};
use crate::source::{QuestionSource, RelatedQuestionMap, SearchPage};
use crate::throttle::Throttle;
use futures::Stream;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Expands seed questions into related questions through a [`QuestionSource`].
///
/// Every run (a bounded expansion, a lazy sequence, an answer walk) owns its
/// own frontier and visited set; the explorer itself only carries the source,
/// the request throttle and the cancellation token, so one explorer can drive
/// any number of runs.
pub struct Explorer<S> {
    source: S,
    throttle: Throttle,
    selection: Selection,
    cancel: CancellationToken,
}

impl<S: QuestionSource> Explorer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            throttle: Throttle::default(),
            selection: Selection::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.throttle = Throttle::new(delay);
        self
    }

    /// Frontier order for [`Explorer::expand_bounded`]. Lazy sequences always
    /// walk breadth-first.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn lookup(&self, question: &str) -> Result<SearchPage> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ScanError::Cancelled),
            _ = self.throttle.wait() => {}
        }

        debug!("Looking up '{}'", question);
        self.source
            .lookup(question)
            .await
            .map_err(|e| ScanError::source_unavailable(question, e))
    }

    /// Single hop: the related questions the source lists for `seed`.
    pub async fn discover_related(&self, seed: &str) -> Result<RelatedQuestionMap> {
        Ok(self.lookup(seed).await?.related)
    }

    /// Expands outward from `seed` until `target_count` related questions are
    /// known or nothing is left to expand.
    ///
    /// The seed is expanded first and never again. It only shows up in the
    /// result if some other question lists it.
    pub async fn expand_bounded(
        &self,
        seed: &str,
        target_count: usize,
    ) -> Result<RelatedQuestionMap> {
        let mut found = RelatedQuestionMap::new();
        if target_count == 0 {
            return Ok(found);
        }

        info!("Expanding '{}' up to {} related questions", seed, target_count);

        let mut frontier = Frontier::new(self.selection);
        frontier.mark_visited(seed);
        let mut current = seed.to_string();

        loop {
            let related = self.discover_related(&current).await?;
            let added = merge_related(&mut found, &mut frontier, &current, related, target_count);
            debug!(
                "Expanded '{}': {} new, {} found, {} queued",
                current,
                added,
                found.len(),
                frontier.len()
            );

            if found.len() >= target_count {
                break;
            }
            match frontier.next() {
                Some(next) => current = next,
                None => {
                    debug!("Frontier exhausted for '{}'", seed);
                    break;
                }
            }
        }

        info!(
            "Expansion of '{}' finished: {} related questions, {} lookups",
            seed,
            found.len(),
            frontier.visited_count()
        );
        Ok(found)
    }

    /// Unbounded breadth-first walk from `seed`, one lookup per pull. The
    /// explorer's [`Selection`] does not apply here.
    pub fn expand_lazy(&self, seed: &str) -> RelatedQuestions<'_, S> {
        RelatedQuestions::new(self, seed)
    }

    /// Looks up `question` once and builds its answer record.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let page = self.lookup(question).await?;
        Answer::from_page(question, page)
    }

    /// Walks outward from `seed`, yielding only questions that have an answer.
    pub fn collect_answers(&self, seed: &str) -> Answers<'_, S> {
        Answers::new(self, seed)
    }

    /// Short answer text for `question`.
    ///
    /// Without an answer and with `allow_fallback`, the first related question
    /// is tried once, with no further fallback. Returns an empty string when
    /// neither has an answer. Lookup failures are errors, not empty strings.
    pub async fn summarize(&self, question: &str, allow_fallback: bool) -> Result<String> {
        let answer = self.answer(question).await?;
        if let Some(response) = answer.response {
            return Ok(response);
        }
        if !allow_fallback {
            return Ok(String::new());
        }

        let Some(fallback) = answer
            .related_questions
            .keys()
            .find(|related| related.as_str() != question)
        else {
            return Ok(String::new());
        };

        debug!("No answer for '{}', falling back to '{}'", question, fallback);
        let fallback_answer = self.answer(fallback).await?;
        Ok(fallback_answer.response.unwrap_or_default())
    }
}

/// Adds the questions found while expanding `from` to the result and the
/// frontier. Stops filling once `limit` results are held.
fn merge_related(
    found: &mut RelatedQuestionMap,
    frontier: &mut Frontier,
    from: &str,
    related: RelatedQuestionMap,
    limit: usize,
) -> usize {
    let mut added = 0;
    for (question, link) in related {
        if question == from {
            continue;
        }
        if found.len() >= limit {
            break;
        }
        if !found.contains_key(&question) {
            frontier.offer(&question);
            found.insert(question, link);
            added += 1;
        }
    }
    added
}

/// Pull-driven sequence of newly discovered questions.
///
/// The first pull expands the seed; each later pull expands the question
/// yielded before it. After an error or once nothing is left the sequence
/// only returns `None`.
pub struct RelatedQuestions<'a, S> {
    explorer: &'a Explorer<S>,
    frontier: Frontier,
    pending: Option<String>,
    done: bool,
}

impl<'a, S: QuestionSource> RelatedQuestions<'a, S> {
    fn new(explorer: &'a Explorer<S>, seed: &str) -> Self {
        let mut frontier = Frontier::new(Selection::BreadthFirst);
        frontier.mark_visited(seed);
        Self {
            explorer,
            frontier,
            pending: Some(seed.to_string()),
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<String>> {
        if self.done {
            return None;
        }

        if let Some(question) = self.pending.take() {
            match self.explorer.discover_related(&question).await {
                Ok(related) => {
                    for related_question in related.keys() {
                        self.frontier.offer(related_question);
                    }
                }
                Err(ScanError::Cancelled) => {
                    debug!("Lazy expansion cancelled after '{}'", question);
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        match self.frontier.next() {
            Some(question) => {
                self.pending = Some(question.clone());
                Some(Ok(question))
            }
            None => {
                self.done = true;
                None
            }
        }
    }

    /// Questions expanded so far, or about to be on the next pull.
    pub fn visited_count(&self) -> usize {
        self.frontier.visited_count()
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<String>> + 'a {
        futures::stream::unfold(self, |mut questions| async move {
            questions.next().await.map(|item| (item, questions))
        })
    }
}

/// Pull-driven sequence of answered questions, seed first, in discovery order.
///
/// Cancellation is reported once as [`ScanError::Cancelled`]; after that, or
/// after any other error, the sequence only returns `None`.
pub struct Answers<'a, S> {
    explorer: &'a Explorer<S>,
    frontier: Frontier,
    seed: Option<String>,
    done: bool,
}

impl<'a, S: QuestionSource> Answers<'a, S> {
    fn new(explorer: &'a Explorer<S>, seed: &str) -> Self {
        let mut frontier = Frontier::new(Selection::BreadthFirst);
        frontier.mark_visited(seed);
        Self {
            explorer,
            frontier,
            seed: Some(seed.to_string()),
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<Answer>> {
        while !self.done {
            let question = match self.seed.take().or_else(|| self.frontier.next()) {
                Some(question) => question,
                None => break,
            };

            let answer = match self.explorer.answer(&question).await {
                Ok(answer) => answer,
                Err(ScanError::Cancelled) => {
                    debug!("Answer walk cancelled before '{}'", question);
                    self.done = true;
                    return Some(Err(ScanError::Cancelled));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            for related_question in answer.related_questions.keys() {
                self.frontier.offer(related_question);
            }

            if answer.has_answer {
                return Some(Ok(answer));
            }
            debug!("No featured snippet for '{}'", question);
        }

        self.done = true;
        None
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Answer>> + 'a {
        futures::stream::unfold(self, |mut answers| async move {
            answers.next().await.map(|item| (item, answers))
        })
    }
}
