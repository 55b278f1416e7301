// Seed question input

use crate::error::{CollectError, Result};
use indexmap::IndexSet;
use std::fs;
use std::path::Path;

/// Reads seed questions from a newline-delimited file.
///
/// Blank lines are skipped and repeated questions keep their first position.
/// A file that is missing, unreadable or holds no questions is rejected.
pub fn read_questions(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| CollectError::InvalidInput {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let questions = parse_questions(&content);
    if questions.is_empty() {
        return Err(CollectError::InvalidInput {
            path: path.to_path_buf(),
            reason: "no questions found".to_string(),
        });
    }

    Ok(questions)
}

pub fn parse_questions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
