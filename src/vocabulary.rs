use std::collections::HashSet;

use serde::Serialize;

use crate::dictionary::WordEntry;

// @module: Vocabulary difficulty classification against a proficiency level

/// Proficiency tiers, ordered from smallest to largest vocabulary.
///
/// Toefl and Ielts are siblings: both sit above Cet6 and neither covers the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabLevel {
    Basic,
    Cet4,
    Cet6,
    Toefl,
    Ielts,
    Gre,
    Advanced,
}

impl VocabLevel {
    /// Parse a user-supplied level token, defaulting to Cet4 when unrecognized
    pub fn parse(value: &str) -> VocabLevel {
        match value.trim().to_lowercase().as_str() {
            "basic" => VocabLevel::Basic,
            "cet4" => VocabLevel::Cet4,
            "cet6" => VocabLevel::Cet6,
            "toefl" => VocabLevel::Toefl,
            "ielts" => VocabLevel::Ielts,
            "gre" => VocabLevel::Gre,
            "advanced" => VocabLevel::Advanced,
            _ => VocabLevel::Cet4,
        }
    }

    /// Label used in difficulty output for words tagged with this level
    pub fn label(self) -> &'static str {
        match self {
            VocabLevel::Basic => "basic",
            VocabLevel::Cet4 => "cet4",
            VocabLevel::Cet6 => "cet6",
            VocabLevel::Toefl => "toefl",
            VocabLevel::Ielts => "ielts",
            VocabLevel::Gre => "gre",
            VocabLevel::Advanced => "advanced",
        }
    }

    /// Levels strictly below this one in the fixed hierarchy
    fn lower_levels(self) -> &'static [VocabLevel] {
        use VocabLevel::*;
        match self {
            Basic => &[],
            Cet4 => &[Basic],
            Cet6 => &[Basic, Cet4],
            Toefl => &[Basic, Cet4, Cet6],
            Ielts => &[Basic, Cet4, Cet6],
            Gre => &[Basic, Cet4, Cet6, Toefl, Ielts],
            Advanced => &[Basic, Cet4, Cet6, Toefl, Ielts, Gre],
        }
    }

    /// BNC-rank threshold for the frequency fallback at this user level
    fn frequency_threshold(self) -> i64 {
        match self {
            VocabLevel::Basic => 3_000,
            VocabLevel::Cet4 => 5_000,
            VocabLevel::Cet6 => 8_000,
            VocabLevel::Toefl | VocabLevel::Ielts => 12_000,
            VocabLevel::Gre => 20_000,
            VocabLevel::Advanced => 99_999,
        }
    }
}

/// Map one dictionary tag token to a level; unknown tags yield None
fn tag_to_level(tag: &str) -> Option<VocabLevel> {
    match tag {
        "zk" | "gk" => Some(VocabLevel::Basic),
        "cet4" => Some(VocabLevel::Cet4),
        "cet6" => Some(VocabLevel::Cet6),
        "toefl" => Some(VocabLevel::Toefl),
        "ielts" => Some(VocabLevel::Ielts),
        "gre" => Some(VocabLevel::Gre),
        _ => None,
    }
}

/// Split a dictionary tag string into the set of levels it names
pub fn parse_word_tags(tag_string: &str) -> HashSet<VocabLevel> {
    tag_string
        .to_lowercase()
        .split_whitespace()
        .filter_map(tag_to_level)
        .collect()
}

/// High-frequency words that are never flagged, regardless of dictionary data.
///
/// Deliberately small; callers with a fuller frequency list should inject
/// their own via `with_common_words`.
const DEFAULT_COMMON_WORDS: [&str; 40] = [
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what",
];

/// Decides whether words are beyond a user's configured proficiency level
pub struct VocabLevelChecker {
    user_level: VocabLevel,
    covered_levels: HashSet<VocabLevel>,
    common_words: HashSet<String>,
}

impl VocabLevelChecker {
    /// Checker with the built-in common-word allowlist
    pub fn new(user_level: VocabLevel) -> Self {
        let common_words = DEFAULT_COMMON_WORDS
            .iter()
            .map(|w| w.to_string())
            .collect();
        Self::build(user_level, common_words)
    }

    /// Checker with an injected common-word allowlist
    pub fn with_common_words<I, S>(user_level: VocabLevel, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let common_words = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        Self::build(user_level, common_words)
    }

    fn build(user_level: VocabLevel, common_words: HashSet<String>) -> Self {
        let mut covered_levels: HashSet<VocabLevel> =
            user_level.lower_levels().iter().copied().collect();
        covered_levels.insert(user_level);
        VocabLevelChecker {
            user_level,
            covered_levels,
            common_words,
        }
    }

    /// The level this checker was configured with
    #[allow(dead_code)]
    pub fn user_level(&self) -> VocabLevel {
        self.user_level
    }

    /// Whether a word exceeds the user's vocabulary.
    ///
    /// `entry` is the resolved dictionary record, or None when no candidate
    /// matched; unresolved words are conservatively treated as beyond level.
    /// A word tagged with even one level outside the covered set is flagged,
    /// and untagged words fall back to the BNC-rank threshold.
    pub fn is_beyond_level(&self, word: &str, entry: Option<&WordEntry>) -> bool {
        if self.common_words.contains(&word.to_lowercase()) {
            return false;
        }

        let Some(entry) = entry else {
            return true;
        };
        if entry.word.is_empty() {
            return true;
        }

        let word_levels = parse_word_tags(&entry.tag);
        if word_levels.is_empty() {
            return bnc_rank(entry).unwrap_or(99_999) > self.user_level.frequency_threshold();
        }

        word_levels
            .iter()
            .any(|level| !self.covered_levels.contains(level))
    }

    /// Human-readable difficulty label for display purposes.
    ///
    /// Tagged words take the label of the highest level present; untagged
    /// words are bucketed by BNC rank.
    pub fn difficulty_label(&self, word: &str, entry: Option<&WordEntry>) -> String {
        if self.common_words.contains(&word.to_lowercase()) {
            return "common".to_string();
        }

        let Some(entry) = entry else {
            return "uncatalogued".to_string();
        };
        if entry.word.is_empty() {
            return "uncatalogued".to_string();
        }

        let word_levels = parse_word_tags(&entry.tag);
        if word_levels.is_empty() {
            return match bnc_rank(entry) {
                None => "unrated".to_string(),
                Some(rank) if rank <= 3_000 => "high-frequency".to_string(),
                Some(rank) if rank <= 8_000 => "mid-frequency".to_string(),
                Some(_) => "low-frequency".to_string(),
            };
        }

        // Highest-priority level wins, even when several tags are present
        const LEVEL_PRIORITY: [VocabLevel; 6] = [
            VocabLevel::Gre,
            VocabLevel::Toefl,
            VocabLevel::Ielts,
            VocabLevel::Cet6,
            VocabLevel::Cet4,
            VocabLevel::Basic,
        ];
        for level in LEVEL_PRIORITY {
            if word_levels.contains(&level) {
                return level.label().to_string();
            }
        }
        "unrated".to_string()
    }
}

/// BNC rank of an entry; an absent field counts as 99999, an unparseable one
/// as missing data
fn bnc_rank(entry: &WordEntry) -> Option<i64> {
    let raw = entry.bnc.trim();
    if raw.is_empty() {
        return Some(99_999);
    }
    raw.parse().ok()
}
