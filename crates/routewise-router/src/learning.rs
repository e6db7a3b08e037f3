// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-derived routing adjustments.
//!
//! Users keep Markdown notes about which of their tasks turned out harder
//! or easier than they looked. Sections under headings such as
//! "Gotchas" or "Tricky parts" yield *deep* keywords; sections under
//! "Simple" or "Routine" yield *fast* keywords. Keywords are backticked
//! spans and longer words on list items. When a query mentions enough of
//! them, the rule result is nudged:
//!
//! - promotion: not deep, below 0.8, two or more deep keywords. Confidence
//!   is raised by the boost, and the route becomes deep if that crosses 0.8.
//!   Results already at 0.8 or above keep their route.
//! - demotion: deep below 0.8, two or more fast keywords. Route becomes standard.
//!
//! Parsing is skipped when the corpus has not changed: the extracted
//! keywords are kept in memory and in a state file, keyed by the newest
//! modification time of the corpus files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use routewise_config::model::LearningConfig;
use routewise_core::{ClassificationResult, Route, RoutewiseError};
use routewise_storage::JsonDocument;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Minimum distinct keyword hits before an adjustment applies.
pub const MIN_KEYWORD_MATCHES: usize = 2;

/// Promotion only considers results below this confidence and moves them to
/// deep when the boost crosses it; deep results at or above it are never
/// demoted.
pub const DEEP_CONFIDENCE: f64 = 0.8;

const MIN_WORD_LEN: usize = 4;

const DEEP_HEADING_MARKERS: &[&str] = &["tricky", "complex", "gotcha", "pitfall", "hard"];
const FAST_HEADING_MARKERS: &[&str] = &["simple", "standard", "easy", "routine", "trivial"];

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "always", "because", "before", "being", "could",
    "does", "each", "every", "from", "have", "into", "just", "like", "make", "more", "most",
    "much", "must", "need", "needs", "never", "only", "other", "should", "some", "such",
    "than", "that", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "using", "very", "were", "what", "when", "where", "which", "while", "will",
    "with", "without", "would", "your",
];

/// Keywords extracted from the corpus plus the settings they were used with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    #[serde(default)]
    pub informed_routing: bool,
    #[serde(default)]
    pub informed_routing_boost: f64,
    #[serde(default)]
    pub deep_keywords: Vec<String>,
    #[serde(default)]
    pub fast_keywords: Vec<String>,
    /// Newest modification time among corpus files; `None` for an empty corpus.
    #[serde(default)]
    pub corpus_mtime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Deep,
    Fast,
}

/// Extract deep and fast keywords from one Markdown document.
pub fn extract_keywords(markdown: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut deep = BTreeSet::new();
    let mut fast = BTreeSet::new();
    let mut section = None;

    for line in markdown.lines() {
        let line = line.trim();
        if let Some(heading) = heading_text(line) {
            let heading = heading.to_lowercase();
            section = if DEEP_HEADING_MARKERS.iter().any(|m| heading.contains(m)) {
                Some(Section::Deep)
            } else if FAST_HEADING_MARKERS.iter().any(|m| heading.contains(m)) {
                Some(Section::Fast)
            } else {
                None
            };
            continue;
        }

        let (Some(current), Some(item)) = (section, list_item_text(line)) else {
            continue;
        };
        let target = match current {
            Section::Deep => &mut deep,
            Section::Fast => &mut fast,
        };
        collect_item_keywords(item, target);
    }

    (deep, fast)
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    (rest.is_empty() || rest.starts_with(' ')).then(|| rest.trim())
}

fn list_item_text(line: &str) -> Option<&str> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some(rest);
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        return line[digits..].strip_prefix(". ").or_else(|| line[digits..].strip_prefix(") "));
    }
    None
}

fn collect_item_keywords(item: &str, out: &mut BTreeSet<String>) {
    // Odd-indexed pieces sit between backticks.
    let mut plain = String::with_capacity(item.len());
    for (idx, piece) in item.split('`').enumerate() {
        if idx % 2 == 1 {
            let span = piece.trim().to_lowercase();
            if !span.is_empty() {
                out.insert(span);
            }
        } else {
            plain.push_str(piece);
            plain.push(' ');
        }
    }

    for word in plain.split(|c: char| !c.is_alphabetic()) {
        if word.chars().count() < MIN_WORD_LEN {
            continue;
        }
        let word = word.to_lowercase();
        if !STOP_WORDS.contains(&word.as_str()) {
            out.insert(word);
        }
    }
}

/// Case-insensitive whole-word (or whole-phrase) containment.
fn contains_whole(haystack_lower: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack_lower.match_indices(needle).any(|(start, m)| {
        let before = haystack_lower[..start].chars().next_back();
        let after = haystack_lower[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn matched<'a>(query_lower: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|k| contains_whole(query_lower, k))
        .map(String::as_str)
        .collect()
}

/// Newest modification time among `*.md` files directly under `dir`.
pub fn corpus_mtime(dir: &Path) -> Result<Option<DateTime<Utc>>, RoutewiseError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RoutewiseError::storage(err)),
    };

    let mut newest: Option<SystemTime> = None;
    for entry in entries {
        let entry = entry.map_err(RoutewiseError::storage)?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(RoutewiseError::storage)?;
        newest = Some(newest.map_or(modified, |n| n.max(modified)));
    }
    Ok(newest.map(DateTime::<Utc>::from))
}

fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>, RoutewiseError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(RoutewiseError::storage)? {
        let path = entry.map_err(RoutewiseError::storage)?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Applies corpus keywords to rule results.
#[derive(Debug)]
pub struct LearningEngine {
    enabled: bool,
    boost: f64,
    knowledge_dir: PathBuf,
    state: JsonDocument<LearningState>,
    cached: Option<LearningState>,
}

impl LearningEngine {
    pub fn new(
        enabled: bool,
        boost: f64,
        knowledge_dir: impl Into<PathBuf>,
        state_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            enabled,
            boost,
            knowledge_dir: knowledge_dir.into(),
            state: JsonDocument::new(state_path),
            cached: None,
        }
    }

    pub fn from_config(config: &LearningConfig) -> Self {
        Self::new(
            config.informed_routing,
            config.boost,
            &config.knowledge_dir,
            &config.state_path,
        )
    }

    /// Nudge `result` using corpus keywords. Returns it unchanged when
    /// disabled; a corpus that cannot be read is an error for the caller's
    /// recovery policy.
    pub fn adjust(
        &mut self,
        query: &str,
        result: &ClassificationResult,
    ) -> Result<ClassificationResult, RoutewiseError> {
        let mut result = result.clone();
        if !self.enabled {
            return Ok(result);
        }
        let boost = self.boost;
        let state = self.keywords()?;
        let lower = query.to_lowercase();

        if result.route != Route::Deep {
            if result.confidence >= DEEP_CONFIDENCE {
                return Ok(result);
            }
            let hits = matched(&lower, &state.deep_keywords);
            if hits.len() >= MIN_KEYWORD_MATCHES {
                let before = result.route;
                result.set_confidence((result.confidence + boost).min(1.0));
                if result.confidence >= DEEP_CONFIDENCE {
                    result.route = Route::Deep;
                }
                result.metadata.learned_boost = Some(format!("deep keywords: {}", hits.join(", ")));
                info!(from = %before, to = %result.route, confidence = result.confidence, "learned promotion");
            }
            return Ok(result);
        }

        if result.confidence < DEEP_CONFIDENCE {
            let hits = matched(&lower, &state.fast_keywords);
            if hits.len() >= MIN_KEYWORD_MATCHES {
                result.route = Route::Standard;
                result.metadata.learned_boost = Some(format!("fast keywords: {}", hits.join(", ")));
                info!(confidence = result.confidence, "learned demotion from deep to standard");
            }
        }
        Ok(result)
    }

    /// Current keywords, re-parsing the corpus only when it changed.
    pub fn keywords(&mut self) -> Result<&LearningState, RoutewiseError> {
        let mtime = corpus_mtime(&self.knowledge_dir)?;

        let fresh_in_memory = self.cached.as_ref().is_some_and(|c| c.corpus_mtime == mtime);
        if !fresh_in_memory {
            let state = self.load_or_rebuild(mtime)?;
            self.cached = Some(state);
        }
        self.cached
            .as_ref()
            .ok_or_else(|| RoutewiseError::Internal("learning state missing after refresh".into()))
    }

    fn load_or_rebuild(&self, mtime: Option<DateTime<Utc>>) -> Result<LearningState, RoutewiseError> {
        let persisted = self.state.load_or_default();
        if persisted.corpus_mtime.is_some() && persisted.corpus_mtime == mtime {
            debug!("reusing persisted learning state");
            return Ok(persisted);
        }

        let mut state = LearningState {
            informed_routing: self.enabled,
            informed_routing_boost: self.boost,
            corpus_mtime: mtime,
            ..LearningState::default()
        };
        if mtime.is_none() {
            return Ok(state);
        }

        let mut deep = BTreeSet::new();
        let mut fast = BTreeSet::new();
        for file in corpus_files(&self.knowledge_dir)? {
            let text = std::fs::read_to_string(&file).map_err(RoutewiseError::storage)?;
            let (d, f) = extract_keywords(&text);
            deep.extend(d);
            fast.extend(f);
        }
        state.deep_keywords = deep.into_iter().collect();
        state.fast_keywords = fast.into_iter().collect();
        debug!(
            deep = state.deep_keywords.len(),
            fast = state.fast_keywords.len(),
            "parsed knowledge corpus"
        );

        if let Err(err) = self.state.save(&state) {
            warn!(error = %err, "could not persist learning state");
        }
        Ok(state)
    }
}
