// Artifact writing

use crate::error::{CollectError, Result};
use indexmap::IndexMap;
use paa_scanner::RelatedQuestionMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MAX_ARTIFACT_NAME: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JSON file mapping every seed to its related questions.
    Json,
    /// One `question,link` CSV file per seed inside a directory.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Writes `{ seed: { question: link } }` to `path`.
pub fn write_json_artifact(
    path: &Path,
    collected: &IndexMap<String, RelatedQuestionMap>,
) -> Result<()> {
    let json = serde_json::to_string_pretty(collected)?;
    fs::write(path, json).map_err(|source| CollectError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one seed's related questions as `question,link` rows.
pub fn write_csv_artifact(path: &Path, related: &RelatedQuestionMap) -> Result<()> {
    let file = File::create(path).map_err(|source| CollectError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["question", "link"])?;
    for (question, link) in related {
        writer.write_record([question, link])?;
    }
    writer.flush().map_err(|source| CollectError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| CollectError::OutputWrite {
        path: dir.to_path_buf(),
        source,
    })
}

/// Filesystem-safe file stem derived from the seed text.
pub fn artifact_name(seed: &str) -> String {
    let mut name = String::new();
    for c in seed.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
        } else if c.is_whitespace() && !name.ends_with('_') {
            name.push('_');
        }
    }

    let name: String = name.trim_matches('_').chars().take(MAX_ARTIFACT_NAME).collect();
    if name.is_empty() {
        "question".to_string()
    } else {
        name
    }
}

/// Hands out artifact paths in a directory, never the same one twice.
#[derive(Debug)]
pub struct ArtifactNamer {
    dir: PathBuf,
    extension: &'static str,
    used: HashSet<String>,
}

impl ArtifactNamer {
    pub fn new(dir: &Path, extension: &'static str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            extension,
            used: HashSet::new(),
        }
    }

    pub fn path_for(&mut self, seed: &str) -> PathBuf {
        let base = artifact_name(seed);
        let mut name = base.clone();
        let mut suffix = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        self.dir.join(format!("{}.{}", name, self.extension))
    }
}
