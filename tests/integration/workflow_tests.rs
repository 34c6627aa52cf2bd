/*!
 * End-to-end workflows over real files: parse to JSON, label against a
 * CSV dictionary, and rebuild a bilingual subtitle from a split translation
 */

use std::sync::Arc;

use anyhow::Result;
use sublex::dictionary::CsvDictionary;
use sublex::labeler::Labeler;
use sublex::subtitle_processor;
use sublex::translation::{collect_subtitle_blocks, split_translation, write_split_srt};
use sublex::vocabulary::{VocabLevel, VocabLevelChecker};
use crate::common;

/// Test parse -> JSON file -> reload round trip
#[test]
fn test_parse_workflow_withSrtFile_shouldWriteLoadableJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let subtitle = common::create_test_subtitle(&dir, "episode.srt")?;

    let out = dir.join("parsed.json");
    let written = subtitle_processor::parse_and_save_json(&subtitle, Some(&out))?;
    assert_eq!(written, out);

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    assert_eq!(json["total_sentences"], 2);
    assert_eq!(json["sentences"][1]["text"], "A sophisticated obscure test");
    assert_eq!(json["duration"], 8.0);
    Ok(())
}

/// Test labeling against a CSV dictionary loaded from disk
#[test]
fn test_label_workflow_withCsvDictionary_shouldFlagBeyondLevelWords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let subtitle = common::create_test_subtitle(&dir, "lesson.srt")?;
    let dict_path = common::create_test_dictionary_csv(&dir, "ecdict.csv")?;

    let dictionary = Arc::new(CsvDictionary::load(&dict_path)?);
    let labeler = Labeler::new(dictionary, VocabLevelChecker::new(VocabLevel::Cet4));
    let out = dir.join("lesson-labels.json");
    let result = labeler.process_subtitle_file(&subtitle, Some(&out))?;

    // "sophisticated" (cet6 toefl) and "obscure" (untagged, bnc 15210) are
    // beyond a cet4 user; "a" is allowlisted and "test" is cet4
    assert_eq!(result.statistics.total_words, 7);
    assert_eq!(result.statistics.new_words_count, 2);
    assert_eq!(result.statistics.coverage_rate, 71.43);

    let flagged: Vec<&str> = result.new_words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(flagged, vec!["sophisticated", "obscure"]);
    assert_eq!(result.new_words[1].difficulty, "low-frequency");

    // The written JSON matches the in-memory result
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    assert_eq!(json["statistics"]["new_words_count"], 2);
    assert_eq!(json["word_map"]["sophisticated"]["is_new"], true);
    assert_eq!(json["source"], "lesson.srt");
    Ok(())
}

/// Test collect -> split -> write -> re-collect for a bilingual subtitle
#[test]
fn test_translate_workflow_withSplitSegments_shouldRebuildBilingualSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let subtitle = common::create_test_subtitle(&dir, "movie.srt")?;

    let (blocks, text_blocks) = collect_subtitle_blocks(&subtitle)?;
    let translation = "你好世界再来一次这是一个复杂晦涩的测试";
    let segments = split_translation(translation, &text_blocks);
    assert_eq!(segments.concat(), translation);

    let bilingual_path = dir.join("movie-bilingual.srt");
    write_split_srt(&blocks, &text_blocks, &segments, &bilingual_path, true)?;

    let written = std::fs::read_to_string(&bilingual_path)?;
    assert!(written.starts_with("1\n00:00:01,500 --> 00:00:04,200\nHello world again\n"));
    assert!(written.contains(&segments[0]));
    assert!(written.contains("A sophisticated obscure test"));

    // The bilingual file is itself a collectable SRT whose text blocks now
    // hold original and translation joined per cue
    let (reblocks, retext) = collect_subtitle_blocks(&bilingual_path)?;
    assert_eq!(reblocks.len(), 2);
    assert_eq!(
        retext[0].text,
        format!("Hello world again {}", segments[0])
    );
    Ok(())
}

/// Test translated-only output replaces the cue text entirely
#[test]
fn test_translate_workflow_withoutBilingualFlag_shouldWriteTranslationOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let subtitle = common::create_test_subtitle(&dir, "movie.srt")?;

    let (blocks, text_blocks) = collect_subtitle_blocks(&subtitle)?;
    let segments = split_translation("你好世界再来一次这是一个复杂晦涩的测试", &text_blocks);

    let out = dir.join("movie-translated.srt");
    write_split_srt(&blocks, &text_blocks, &segments, &out, false)?;

    let written = std::fs::read_to_string(&out)?;
    assert!(!written.contains("Hello world again"));
    let (_, retext) = collect_subtitle_blocks(&out)?;
    assert_eq!(retext[0].text, segments[0]);
    Ok(())
}
