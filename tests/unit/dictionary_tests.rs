/*!
 * Tests for dictionary loading and lookup
 */

use anyhow::Result;
use rusqlite::Connection;
use sublex::dictionary::{CsvDictionary, Dictionary, SqliteDictionary, WordEntry};
use sublex::errors::DictionaryError;
use crate::common;

/// Test loading the CSV backend and querying an existing headword
#[test]
fn test_csv_dictionary_withValidFile_shouldResolveHeadwords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_dictionary_csv(&temp_dir.path().to_path_buf(), "dict.csv")?;

    let dict = CsvDictionary::load(&path)?;
    assert_eq!(dict.len(), 9);

    let entry = dict.query("hello").expect("hello should be present");
    assert_eq!(entry.word, "hello");
    assert_eq!(entry.tag, "zk gk");
    assert_eq!(entry.translation, "int. 你好");
    assert_eq!(entry.bnc, "1082");
    Ok(())
}

/// Test that lookup is exact: callers must lowercase first
#[test]
fn test_csv_dictionary_withUppercaseKey_shouldMiss() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_dictionary_csv(&temp_dir.path().to_path_buf(), "dict.csv")?;
    let dict = CsvDictionary::load(&path)?;

    assert!(dict.query("HELLO").is_none());
    assert!(dict.query("hello").is_some());
    assert!(dict.query("notaword").is_none());
    Ok(())
}

/// Test quoted CSV fields with embedded commas
#[test]
fn test_csv_dictionary_withQuotedField_shouldKeepEmbeddedCommas() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_dictionary_csv(&temp_dir.path().to_path_buf(), "dict.csv")?;
    let dict = CsvDictionary::load(&path)?;

    let entry = dict.query("word").expect("word should be present");
    assert_eq!(entry.definition, "n. unit of language, spoken or written");
    Ok(())
}

/// Test quoted fields containing doubled quotes and newlines
#[test]
fn test_csv_dictionary_withEscapedQuotes_shouldUnescape() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "\
word,phonetic,definition,translation,pos,collins,oxford,tag,bnc,frq,exchange,detail,audio\n\
ad,,\"n. short for \"\"advertisement\"\"\nline two\",n. 广告,,,,,4000,3500,,,\n";
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "quoted.csv", content)?;
    let dict = CsvDictionary::load(&path)?;

    let entry = dict.query("ad").expect("ad should be present");
    assert_eq!(entry.definition, "n. short for \"advertisement\"\nline two");
    assert_eq!(entry.bnc, "4000");
    Ok(())
}

/// Test that literal backslash-n escapes in the prose fields become newlines
#[test]
fn test_csv_dictionary_withNewlineEscapes_shouldRestoreNewlines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "\
word,phonetic,definition,translation,pos,collins,oxford,tag,bnc,frq,exchange,detail,audio\n\
turn,,\"v. move\\nn. a turn\",\"v. 转动\\nn. 转弯\",,,,,800,700,,,\n";
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "escapes.csv", content)?;
    let dict = CsvDictionary::load(&path)?;

    let entry = dict.query("turn").expect("turn should be present");
    assert_eq!(entry.definition, "v. move\nn. a turn");
    assert_eq!(entry.translation, "v. 转动\nn. 转弯");
    // The tabular fields are left untouched
    assert_eq!(entry.bnc, "800");
    Ok(())
}

/// Test the missing-file error for the CSV backend
#[test]
fn test_csv_dictionary_withMissingFile_shouldReturnNotFound() {
    let result = CsvDictionary::load("no-such-dictionary.csv");
    assert!(matches!(result, Err(DictionaryError::NotFound(_))));
}

/// Test loading the sqlite backend from an ECDICT-shaped database
#[test]
fn test_sqlite_dictionary_withStardictTable_shouldResolveHeadwords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("dict.db");

    let conn = Connection::open(&db_path)?;
    conn.execute_batch(
        "CREATE TABLE stardict (
            word TEXT, phonetic TEXT, definition TEXT, translation TEXT,
            pos TEXT, collins INTEGER, oxford INTEGER, tag TEXT,
            bnc INTEGER, frq INTEGER, exchange TEXT, detail TEXT, audio TEXT
        );
        INSERT INTO stardict VALUES
            ('Hello', 'h@''l@u', 'int. greeting', 'int. 你好', '', 3, 1, 'zk gk', 1082, 1226, '', NULL, ''),
            ('gre', '', '', '', '', NULL, NULL, 'gre', NULL, NULL, '', '', '');",
    )?;
    drop(conn);

    let dict = SqliteDictionary::load(&db_path)?;
    assert_eq!(dict.len(), 2);

    // Headwords are keyed lowercase at load time
    let entry = dict.query("hello").expect("hello should be present");
    assert_eq!(entry.word, "Hello");
    assert_eq!(entry.collins, "3");
    assert_eq!(entry.bnc, "1082");

    // NULL numeric columns become empty strings
    let entry = dict.query("gre").expect("gre should be present");
    assert_eq!(entry.bnc, "");
    assert_eq!(entry.collins, "");
    Ok(())
}

/// Test the missing-file error for the sqlite backend
#[test]
fn test_sqlite_dictionary_withMissingFile_shouldReturnNotFound() {
    let result = SqliteDictionary::load("no-such-dictionary.db");
    assert!(matches!(result, Err(DictionaryError::NotFound(_))));
}

/// Test the placeholder entry carries only the word
#[test]
fn test_word_entry_placeholder_shouldCarryOnlyTheWord() {
    let entry = WordEntry::placeholder("mystery");
    assert_eq!(entry.word, "mystery");
    assert!(entry.translation.is_empty());
    assert!(entry.tag.is_empty());
    assert!(entry.bnc.is_empty());
}
