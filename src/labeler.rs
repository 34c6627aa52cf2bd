use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dictionary::{Dictionary, WordEntry};
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::timecode::round_half_even;
use crate::vocabulary::VocabLevelChecker;

// @module: Per-sentence word annotation against a dictionary and user level

// @const: Word token regex (letter and apostrophe runs)
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").unwrap());

// @const: Timestamp line regex accepted inside label blocks
static BLOCK_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

/// Extract word tokens from a sentence.
///
/// Punctuation, digits and non-Latin characters separate tokens;
/// contractions like "don't" stay whole.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Normalized lookup forms for a token, highest priority first.
///
/// Order: lowercase, apostrophes trimmed, possessive `'s` removed, plural
/// `s` removed (guarded to words longer than three characters), then all
/// non-letter characters removed. Deduplicated preserving first-seen order.
pub fn generate_candidates(word: &str) -> Vec<String> {
    let lower = word.to_lowercase();
    let mut raw = vec![lower.clone()];

    if lower.starts_with('\'') || lower.ends_with('\'') {
        raw.push(lower.trim_matches('\'').to_string());
    }
    if lower.ends_with("'s") {
        raw.push(lower[..lower.len() - 2].to_string());
    }
    if lower.ends_with('s') && lower.len() > 3 {
        raw.push(lower[..lower.len() - 1].to_string());
    }
    raw.push(lower.chars().filter(|c| c.is_ascii_lowercase()).collect());

    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect()
}

/// Annotation for one word occurrence inside a sentence
#[derive(Debug, Clone, Serialize)]
pub struct WordAnnotation {
    /// Token exactly as it appeared in the text
    pub original: String,
    /// Resolved dictionary entry, or a placeholder carrying only the word
    pub entry: WordEntry,
    /// Whether the word is beyond the user's level
    pub is_new: bool,
    /// Human-readable difficulty label
    pub difficulty: String,
}

/// Where a word occurred
#[derive(Debug, Clone, Serialize)]
pub struct Occurrence {
    pub sentence_index: usize,
    pub sentence_text: String,
}

/// Aggregate record for one distinct lowercase word.
///
/// Classification is captured at the first occurrence and not recomputed;
/// the occurrence list grows with every sighting.
#[derive(Debug, Serialize)]
pub struct WordMapEntry {
    pub entry: WordEntry,
    pub is_new: bool,
    pub difficulty: String,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Serialize)]
pub struct FirstOccurrence {
    pub sentence_index: usize,
    pub sentence_text: String,
    /// The block's raw "start --> end" string
    pub timestamp: String,
}

/// One beyond-level word, recorded at its first flagged occurrence
#[derive(Debug, Serialize)]
pub struct NewWordRecord {
    pub word: String,
    pub translation: String,
    pub difficulty: String,
    pub first_occurrence: FirstOccurrence,
}

/// One subtitle block with its annotated words
#[derive(Debug, Serialize)]
pub struct LabelBlock {
    /// The block's own index line value, as written in the file
    pub index: usize,
    pub start: String,
    pub end: String,
    pub text: String,
    pub words: Vec<WordAnnotation>,
}

#[derive(Debug, Serialize)]
pub struct LabelStatistics {
    pub total_words: usize,
    pub new_words_count: usize,
    /// 100 x (total - new) / total, two decimal places, 0 for an empty map
    pub coverage_rate: f64,
}

/// Top-level labeling output
#[derive(Debug, Serialize)]
pub struct LabelResult {
    pub source: String,
    pub path: String,
    pub blocks: Vec<LabelBlock>,
    pub word_map: BTreeMap<String, WordMapEntry>,
    pub new_words: Vec<NewWordRecord>,
    pub statistics: LabelStatistics,
}

/// Scanned cue before annotation
struct ScannedBlock {
    index: usize,
    start: String,
    end: String,
    text: String,
}

/// Annotates subtitle files word by word against a dictionary and level.
///
/// Both collaborators are injected at construction; a missing dictionary
/// fails at load time, long before the first lookup.
pub struct Labeler {
    dictionary: Arc<dyn Dictionary>,
    checker: VocabLevelChecker,
}

impl Labeler {
    pub fn new(dictionary: Arc<dyn Dictionary>, checker: VocabLevelChecker) -> Self {
        Labeler {
            dictionary,
            checker,
        }
    }

    /// Resolve a token through its candidate forms; first hit wins
    pub fn lookup(&self, word: &str) -> Option<WordEntry> {
        for candidate in generate_candidates(word) {
            if let Some(entry) = self.dictionary.query(&candidate) {
                return Some(entry);
            }
        }
        None
    }

    /// Annotate every word of an SRT-like subtitle file and write the result
    /// as JSON.
    ///
    /// `out_json` defaults to the input path with its extension replaced by
    /// `-labels.json`. The result is returned in memory as well.
    pub fn process_subtitle_file<P: AsRef<Path>>(
        &self,
        subtitle_path: P,
        out_json: Option<&Path>,
    ) -> Result<LabelResult, SubtitleError> {
        let subtitle_path = subtitle_path.as_ref();
        if !subtitle_path.exists() {
            return Err(SubtitleError::NotFound(subtitle_path.display().to_string()));
        }

        let content = fs::read_to_string(subtitle_path)
            .map_err(|e| SubtitleError::Read(format!("{}: {}", subtitle_path.display(), e)))?;
        let scanned = scan_blocks(&content);
        debug!(
            "Scanned {} blocks from {}",
            scanned.len(),
            subtitle_path.display()
        );

        let mut blocks = Vec::with_capacity(scanned.len());
        let mut word_map: BTreeMap<String, WordMapEntry> = BTreeMap::new();
        let mut new_words: Vec<NewWordRecord> = Vec::new();
        let mut new_word_keys: HashSet<String> = HashSet::new();

        for block in &scanned {
            let mut words = Vec::new();
            for token in tokenize(&block.text) {
                let entry = self.lookup(token);
                let is_new = self.checker.is_beyond_level(token, entry.as_ref());
                let difficulty = self.checker.difficulty_label(token, entry.as_ref());
                let entry = entry.unwrap_or_else(|| WordEntry::placeholder(token));

                let word_key = token.to_lowercase();
                word_map
                    .entry(word_key.clone())
                    .or_insert_with(|| WordMapEntry {
                        entry: entry.clone(),
                        is_new,
                        difficulty: difficulty.clone(),
                        occurrences: Vec::new(),
                    })
                    .occurrences
                    .push(Occurrence {
                        sentence_index: block.index,
                        sentence_text: block.text.clone(),
                    });

                if is_new && !new_word_keys.contains(&word_key) {
                    let headword = if entry.word.is_empty() {
                        token.to_string()
                    } else {
                        entry.word.clone()
                    };
                    new_word_keys.insert(headword.to_lowercase());
                    new_words.push(NewWordRecord {
                        word: headword,
                        translation: entry.translation.clone(),
                        difficulty: difficulty.clone(),
                        first_occurrence: FirstOccurrence {
                            sentence_index: block.index,
                            sentence_text: block.text.clone(),
                            timestamp: format!("{} --> {}", block.start, block.end),
                        },
                    });
                }

                words.push(WordAnnotation {
                    original: token.to_string(),
                    entry,
                    is_new,
                    difficulty,
                });
            }

            blocks.push(LabelBlock {
                index: block.index,
                start: block.start.clone(),
                end: block.end.clone(),
                text: block.text.clone(),
                words,
            });
        }

        let total_words = word_map.len();
        let new_words_count = new_words.len();
        let coverage_rate = if total_words > 0 {
            round_half_even(
                (total_words - new_words_count) as f64 / total_words as f64 * 100.0,
                2,
            )
        } else {
            0.0
        };

        let result = LabelResult {
            source: subtitle_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: std::path::absolute(subtitle_path)
                .unwrap_or_else(|_| subtitle_path.to_path_buf())
                .display()
                .to_string(),
            blocks,
            word_map,
            new_words,
            statistics: LabelStatistics {
                total_words,
                new_words_count,
                coverage_rate,
            },
        };

        let output_path = match out_json {
            Some(p) => p.to_path_buf(),
            None => default_labels_path(subtitle_path),
        };
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            FileManager::ensure_dir(parent)
                .map_err(|e| SubtitleError::Write(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| SubtitleError::Write(e.to_string()))?;
        fs::write(&output_path, json)
            .map_err(|e| SubtitleError::Write(format!("{}: {}", output_path.display(), e)))?;

        info!(
            "Labeled {} blocks, {} distinct words ({} new) -> {}",
            result.blocks.len(),
            total_words,
            new_words_count,
            output_path.display()
        );
        Ok(result)
    }
}

fn default_labels_path(subtitle_path: &Path) -> PathBuf {
    let stem = subtitle_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    subtitle_path.with_file_name(format!("{}-labels.json", stem))
}

/// Scan SRT-like blocks: a digit-only line, a time line, then text lines.
///
/// A time line that does not match the expected shape leaves start/end
/// empty; the block is still processed. Anything else is skipped.
fn scan_blocks(content: &str) -> Vec<ScannedBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || !line.chars().all(|c| c.is_ascii_digit()) {
            i += 1;
            continue;
        }
        let Ok(index) = line.parse::<usize>() else {
            i += 1;
            continue;
        };

        i += 1;
        if i >= lines.len() {
            break;
        }
        let times = lines[i].trim();
        let (start, end) = match BLOCK_TIME_REGEX.captures(times) {
            Some(caps) => (caps[1].to_string(), caps[2].to_string()),
            None => (String::new(), String::new()),
        };
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i].trim());
            i += 1;
        }
        while i < lines.len() && lines[i].trim().is_empty() {
            i += 1;
        }

        blocks.push(ScannedBlock {
            index,
            start,
            end,
            text: text_lines.join(" "),
        });
    }

    blocks
}
