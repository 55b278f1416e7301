use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};

/// How the next question to expand is picked from the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// First discovered, first expanded.
    #[default]
    BreadthFirst,
    /// Uniform pick driven by an RNG seeded with the given value.
    Seeded(u64),
}

/// Discovered-but-unexpanded questions paired with the run's visited set.
///
/// Questions enter through [`Frontier::offer`] and leave through
/// [`Frontier::next`], which marks them visited. A question is handed out at
/// most once and is never queued again after that.
#[derive(Debug)]
pub(crate) struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    rng: Option<StdRng>,
}

impl Frontier {
    pub(crate) fn new(selection: Selection) -> Self {
        let rng = match selection {
            Selection::BreadthFirst => None,
            Selection::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            rng,
        }
    }

    /// Records a question as expanded without it ever being queued.
    pub(crate) fn mark_visited(&mut self, question: &str) {
        if self.queued.remove(question) {
            self.queue.retain(|q| q != question);
        }
        self.visited.insert(question.to_string());
    }

    /// Queues `question` unless it is already queued or visited.
    /// Returns whether it was queued.
    pub(crate) fn offer(&mut self, question: &str) -> bool {
        if self.visited.contains(question) || self.queued.contains(question) {
            return false;
        }
        self.queued.insert(question.to_string());
        self.queue.push_back(question.to_string());
        true
    }

    /// Takes the next question to expand and marks it visited.
    pub(crate) fn next(&mut self) -> Option<String> {
        let question = match self.rng.as_mut() {
            None => self.queue.pop_front()?,
            Some(rng) => {
                if self.queue.is_empty() {
                    return None;
                }
                let index = rng.gen_range(0..self.queue.len());
                self.queue.remove(index)?
            }
        };
        self.queued.remove(&question);
        self.visited.insert(question.clone());
        Some(question)
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[cfg(test)]
    fn is_disjoint(&self) -> bool {
        self.queue.iter().all(|q| !self.visited.contains(q)) && self.queued.len() == self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadth_first_order() {
        let mut frontier = Frontier::new(Selection::BreadthFirst);
        frontier.offer("a");
        frontier.offer("b");
        frontier.offer("c");

        assert_eq!(frontier.next().as_deref(), Some("a"));
        assert_eq!(frontier.next().as_deref(), Some("b"));
        assert_eq!(frontier.next().as_deref(), Some("c"));
        assert_eq!(frontier.next(), None);
    }

    #[test]
    fn test_offer_rejects_queued_and_visited() {
        let mut frontier = Frontier::new(Selection::BreadthFirst);
        frontier.mark_visited("seed");

        assert!(!frontier.offer("seed"));
        assert!(frontier.offer("a"));
        assert!(!frontier.offer("a"));

        frontier.next();
        assert!(!frontier.offer("a"));
        assert_eq!(frontier.len(), 0);
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_mark_visited_drops_queued_entry() {
        let mut frontier = Frontier::new(Selection::BreadthFirst);
        frontier.offer("a");
        frontier.offer("b");
        frontier.mark_visited("a");

        assert!(frontier.is_disjoint());
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.next().as_deref(), Some("b"));
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let drain = |seed| {
            let mut frontier = Frontier::new(Selection::Seeded(seed));
            for q in ["a", "b", "c", "d", "e", "f"] {
                frontier.offer(q);
            }
            let mut order = Vec::new();
            while let Some(q) = frontier.next() {
                assert!(frontier.is_disjoint());
                order.push(q);
            }
            order
        };

        let first = drain(7);
        assert_eq!(first, drain(7));

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d", "e", "f"]);
    }
}
