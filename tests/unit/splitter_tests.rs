/*!
 * Tests for subtitle block collection and proportional translation splitting
 */

use anyhow::Result;
use sublex::errors::SubtitleError;
use sublex::translation::{collect_subtitle_blocks, split_translation, TextBlock};
use crate::common;

fn blocks_of(lengths: &[usize]) -> Vec<TextBlock> {
    lengths
        .iter()
        .map(|&n| TextBlock::new("x".repeat(n)))
        .collect()
}

/// Test block collection on a two-cue SRT keeps both vectors aligned
#[test]
fn test_collect_subtitle_blocks_withTwoCueSrt_shouldAlignVectors() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "aligned.srt")?;

    let (blocks, text_blocks) = collect_subtitle_blocks(&path)?;
    assert_eq!(blocks.len(), 2);
    assert_eq!(text_blocks.len(), 2);

    for block in &text_blocks {
        assert_eq!(block.length, block.text.chars().count());
    }
    assert_eq!(text_blocks[0].text, "Hello world again");
    assert_eq!(text_blocks[1].text, "A sophisticated obscure test");

    // Raw header lines are preserved verbatim, newline included
    assert_eq!(blocks[0].lines[0], "1\n");
    assert_eq!(blocks[0].lines[1], "00:00:01,500 --> 00:00:04,200\n");
    Ok(())
}

/// Test multi-line cue text joins with single spaces
#[test]
fn test_collect_subtitle_blocks_withMultiLineCue_shouldJoinText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:01,000 --> 00:00:02,000\nfirst line\nsecond line\n\n";
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "multi.srt", content)?;

    let (_, text_blocks) = collect_subtitle_blocks(&path)?;
    assert_eq!(text_blocks.len(), 1);
    assert_eq!(text_blocks[0].text, "first line second line");
    Ok(())
}

/// Test a malformed file yields two empty vectors, not an error
#[test]
fn test_collect_subtitle_blocks_withMalformedFile_shouldReturnEmptyVectors() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "malformed.srt",
        "no index lines here\njust prose\n",
    )?;

    let (blocks, text_blocks) = collect_subtitle_blocks(&path)?;
    assert!(blocks.is_empty());
    assert!(text_blocks.is_empty());
    Ok(())
}

/// Test the missing-file error
#[test]
fn test_collect_subtitle_blocks_withMissingFile_shouldReturnNotFound() {
    let result = collect_subtitle_blocks("nonexistent.srt");
    assert!(matches!(result, Err(SubtitleError::NotFound(_))));
}

/// Test every character of the translation is conserved, in order
#[test]
fn test_split_translation_withVariousShapes_shouldConserveAllCharacters() {
    let cases: [(&str, Vec<TextBlock>); 4] = [
        ("abcdefghij", blocks_of(&[5, 5])),
        ("一二三四五六七八九十", blocks_of(&[3, 9, 2])),
        ("short", blocks_of(&[40, 2, 2])),
        ("a longer translation string for uneven blocks", blocks_of(&[1, 17, 3, 8])),
    ];

    for (translation, text_blocks) in cases {
        let segments = split_translation(translation, &text_blocks);
        assert_eq!(segments.len(), text_blocks.len());
        assert_eq!(segments.concat(), translation);
    }
}

/// Test equal block lengths split the translation evenly
#[test]
fn test_split_translation_withEqualBlocks_shouldSplitEvenly() {
    let segments = split_translation("abcdefghij", &blocks_of(&[7, 7]));
    assert_eq!(segments, vec!["abcde", "fghij"]);
}

/// Test proportional allocation follows the length ratio
#[test]
fn test_split_translation_withUnevenBlocks_shouldFollowRatio() {
    // 8 chars against lengths 6 and 2: 6 and 2 characters
    let segments = split_translation("abcdefgh", &blocks_of(&[6, 2]));
    assert_eq!(segments, vec!["abcdef", "gh"]);
}

/// Test rounding shortfall lands on the last segment
#[test]
fn test_split_translation_withRoundingShortfall_shouldExtendLastSegment() {
    // 3 equal blocks over 10 chars round to 3+3+3, the spare char goes last
    let segments = split_translation("abcdefghij", &blocks_of(&[5, 5, 5]));
    assert_eq!(segments.len(), 3);
    assert_eq!(segments.concat(), "abcdefghij");
    assert_eq!(segments[0].len(), 3);
    assert_eq!(segments[1].len(), 3);
    assert_eq!(segments[2].len(), 4);
}

/// Test the empty-translation edge case
#[test]
fn test_split_translation_withEmptyTranslation_shouldReturnEmptySegments() {
    let text_blocks = blocks_of(&[4, 4, 4]);
    let segments = split_translation("", &text_blocks);
    assert_eq!(segments, vec!["", "", ""]);
}

/// Test empty block list yields an empty result
#[test]
fn test_split_translation_withNoBlocks_shouldReturnEmptyVec() {
    assert!(split_translation("anything", &[]).is_empty());
}

/// Test splitting is character-based, not byte-based
#[test]
fn test_split_translation_withCjkTranslation_shouldCountCharacters() {
    let translation = "这是第一句这是第二句";
    let segments = split_translation(translation, &blocks_of(&[10, 10]));
    assert_eq!(segments, vec!["这是第一句", "这是第二句"]);
}
