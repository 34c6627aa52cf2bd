use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::errors::DictionaryError;

// @module: Headword dictionary loading and exact-match lookup

/// Column order of the tabular dictionary source (ECDICT layout)
const FIELD_COUNT: usize = 13;

/// One dictionary record; every field is a string and defaults to empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub phonetic: String,
    pub definition: String,
    pub translation: String,
    pub pos: String,
    pub collins: String,
    pub oxford: String,
    pub tag: String,
    pub bnc: String,
    pub frq: String,
    pub exchange: String,
    pub detail: String,
    pub audio: String,
}

impl WordEntry {
    /// Fallback entry for a word no lookup resolved, carrying only the word
    pub fn placeholder(word: &str) -> Self {
        WordEntry {
            word: word.to_string(),
            ..WordEntry::default()
        }
    }

    fn from_fields(fields: &[String]) -> Self {
        let get = |idx: usize| fields.get(idx).cloned().unwrap_or_default();
        WordEntry {
            word: get(0),
            phonetic: get(1),
            definition: get(2),
            translation: get(3),
            pos: get(4),
            collins: get(5),
            oxford: get(6),
            tag: get(7),
            bnc: get(8),
            frq: get(9),
            exchange: get(10),
            detail: get(11),
            audio: get(12),
        }
    }
}

/// Exact-match lookup against a pre-loaded dictionary.
///
/// Implementations are immutable after construction and never fail for a
/// single key; callers are responsible for lowercasing before querying.
pub trait Dictionary: Send + Sync {
    fn query(&self, word: &str) -> Option<WordEntry>;

    /// Number of distinct headwords loaded
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dictionary backed by an ECDICT-style CSV file, fully loaded into memory
pub struct CsvDictionary {
    entries: HashMap<String, WordEntry>,
}

impl CsvDictionary {
    /// Load the CSV file once, keyed by lowercase headword.
    ///
    /// The first row is treated as a header. Later rows for the same
    /// headword overwrite earlier ones.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DictionaryError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| DictionaryError::Load(format!("{}: {}", path.display(), e)))?;

        let mut entries = HashMap::new();
        for record in parse_csv_records(&content).into_iter().skip(1) {
            let mut entry = WordEntry::from_fields(&record);
            if entry.word.is_empty() {
                continue;
            }
            entry.definition = restore_newline_escapes(&entry.definition);
            entry.translation = restore_newline_escapes(&entry.translation);
            entries.insert(entry.word.to_lowercase(), entry);
        }

        info!("Loaded {} dictionary entries from {}", entries.len(), path.display());
        Ok(CsvDictionary { entries })
    }
}

impl Dictionary for CsvDictionary {
    fn query(&self, word: &str) -> Option<WordEntry> {
        self.entries.get(word).cloned()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Dictionary backed by an ECDICT sqlite release (`stardict` table).
///
/// All rows are read into memory at load time, so the query path is
/// identical to the CSV backend and the loaded table is safe to share.
pub struct SqliteDictionary {
    entries: HashMap<String, WordEntry>,
}

impl SqliteDictionary {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DictionaryError::NotFound(path.display().to_string()));
        }

        let conn = Connection::open(path)
            .map_err(|e| DictionaryError::Load(format!("{}: {}", path.display(), e)))?;

        let mut entries = HashMap::new();
        {
            let mut stmt = conn
                .prepare(
                    "SELECT word, phonetic, definition, translation, pos, collins, oxford, \
                     tag, bnc, frq, exchange, detail, audio FROM stardict",
                )
                .map_err(|e| DictionaryError::Load(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    let mut fields = Vec::with_capacity(FIELD_COUNT);
                    for idx in 0..FIELD_COUNT {
                        // Numeric columns (collins, oxford, bnc, frq) are
                        // nullable integers in the sqlite release
                        let value = match row.get::<_, Option<String>>(idx) {
                            Ok(v) => v.unwrap_or_default(),
                            Err(_) => row
                                .get::<_, Option<i64>>(idx)?
                                .map(|n| n.to_string())
                                .unwrap_or_default(),
                        };
                        fields.push(value);
                    }
                    Ok(WordEntry::from_fields(&fields))
                })
                .map_err(|e| DictionaryError::Load(e.to_string()))?;

            for row in rows {
                let entry = row.map_err(|e| DictionaryError::Load(e.to_string()))?;
                if entry.word.is_empty() {
                    continue;
                }
                entries.insert(entry.word.to_lowercase(), entry);
            }
        }

        info!("Loaded {} dictionary entries from {}", entries.len(), path.display());
        Ok(SqliteDictionary { entries })
    }
}

impl Dictionary for SqliteDictionary {
    fn query(&self, word: &str) -> Option<WordEntry> {
        self.entries.get(word).cloned()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The ECDICT CSV release stores line breaks inside the prose fields as
/// literal `\n` escape sequences; the sqlite release holds real newlines.
fn restore_newline_escapes(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// Minimal RFC-4180 record reader.
///
/// Handles quoted fields with embedded commas, doubled quotes and embedded
/// newlines; anything short of that degrades to the raw field text.
fn parse_csv_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    debug!("Parsed {} CSV records", records.len());
    records
}
