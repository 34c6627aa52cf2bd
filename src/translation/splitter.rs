use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};

use crate::errors::SubtitleError;

// @module: Proportional translation splitting across subtitle blocks

/// The literal header lines of one block (index line and time line),
/// newline-preserved exactly as read
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub lines: Vec<String>,
}

/// One block's joined original text and its character count
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub length: usize,
}

impl TextBlock {
    pub fn new(text: String) -> Self {
        let length = text.chars().count();
        TextBlock { text, length }
    }
}

/// Collect SRT-like blocks into two positionally-aligned vectors.
///
/// A digit-only line opens a block; the next line is taken verbatim as the
/// time line; following non-blank lines that are neither digit-only nor
/// contain `-->` are text lines, joined with single spaces. A file with no
/// recognizable blocks yields two empty vectors, not an error.
pub fn collect_subtitle_blocks<P: AsRef<Path>>(
    file_path: P,
) -> Result<(Vec<RawBlock>, Vec<TextBlock>), SubtitleError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(SubtitleError::NotFound(file_path.display().to_string()));
    }
    let content = fs::read_to_string(file_path)
        .map_err(|e| SubtitleError::Read(format!("{}: {}", file_path.display(), e)))?;

    let lines: Vec<&str> = content.lines().collect();
    let mut subtitle_blocks: Vec<RawBlock> = Vec::new();
    let mut text_blocks: Vec<TextBlock> = Vec::new();
    let mut current_block: Vec<String> = Vec::new();
    let mut current_text: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if is_index_line(line) {
            if !current_block.is_empty() && !current_text.is_empty() {
                subtitle_blocks.push(RawBlock {
                    lines: std::mem::take(&mut current_block),
                });
                text_blocks.push(TextBlock::new(current_text.join(" ")));
                current_text.clear();
            }
            current_block.push(format!("{}\n", line));
            i += 1;
            if i < lines.len() {
                current_block.push(format!("{}\n", lines[i]));
                i += 1;
                while i < lines.len() && is_text_line(lines[i]) {
                    current_text.push(lines[i].to_string());
                    i += 1;
                }
            }
        } else {
            i += 1;
        }
    }

    if !current_block.is_empty() && !current_text.is_empty() {
        subtitle_blocks.push(RawBlock {
            lines: current_block,
        });
        text_blocks.push(TextBlock::new(current_text.join(" ")));
    }

    debug!(
        "Collected {} subtitle blocks from {}",
        subtitle_blocks.len(),
        file_path.display()
    );
    Ok((subtitle_blocks, text_blocks))
}

/// Redistribute one block-translated string across the original blocks in
/// proportion to each block's character length.
///
/// Every character of the translation lands in exactly one segment and the
/// result is positionally aligned with `text_blocks`; rounding shortfall is
/// appended to the last segment. This is character-count alignment only:
/// language pairs with different character densities will drift at cue
/// boundaries in long cues.
pub fn split_translation(translation: &str, text_blocks: &[TextBlock]) -> Vec<String> {
    if text_blocks.is_empty() {
        return Vec::new();
    }
    if translation.is_empty() {
        return vec![String::new(); text_blocks.len()];
    }

    let total_length: usize = text_blocks.iter().map(|b| b.length).sum();
    let chars: Vec<char> = translation.chars().collect();
    let translation_length = chars.len();

    if total_length == 0 {
        // Degenerate input; keep the conservation guarantee by handing the
        // whole translation to the last segment
        warn!("All original blocks are empty, assigning translation to the last block");
        let mut result = vec![String::new(); text_blocks.len()];
        if let Some(last) = result.last_mut() {
            *last = translation.to_string();
        }
        return result;
    }

    let mut result = Vec::with_capacity(text_blocks.len());
    let mut current_pos = 0usize;

    for block in text_blocks {
        let ratio = block.length as f64 / total_length as f64;
        let mut chars_to_take = (translation_length as f64 * ratio).round_ties_even() as usize;

        if current_pos + chars_to_take > translation_length {
            chars_to_take = translation_length - current_pos;
        }

        let segment = if chars_to_take > 0 && current_pos < translation_length {
            let segment: String = chars[current_pos..current_pos + chars_to_take]
                .iter()
                .collect();
            current_pos += chars_to_take;
            segment
        } else {
            String::new()
        };
        result.push(segment);
    }

    if current_pos < translation_length {
        if let Some(last) = result.last_mut() {
            last.extend(&chars[current_pos..]);
        }
    }

    result
}

/// Write split segments back out as an SRT file.
///
/// Each block's literal index and time lines are replayed, followed by the
/// translated segment and, when `include_original` is set, the original
/// text above it.
pub fn write_split_srt<P: AsRef<Path>>(
    blocks: &[RawBlock],
    text_blocks: &[TextBlock],
    segments: &[String],
    path: P,
    include_original: bool,
) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    let mut file =
        File::create(path).map_err(|e| SubtitleError::Write(format!("{}: {}", path.display(), e)))?;

    for (i, block) in blocks.iter().enumerate() {
        for line in &block.lines {
            file.write_all(line.as_bytes())
                .map_err(|e| SubtitleError::Write(e.to_string()))?;
        }
        let segment = segments.get(i).map(String::as_str).unwrap_or("");
        let body = if include_original {
            let original = text_blocks.get(i).map(|b| b.text.as_str()).unwrap_or("");
            format!("{}\n{}\n\n", original, segment)
        } else {
            format!("{}\n\n", segment)
        };
        file.write_all(body.as_bytes())
            .map_err(|e| SubtitleError::Write(e.to_string()))?;
    }

    Ok(())
}

fn is_index_line(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// A subtitle text line: non-blank, not a bare index, no time arrow
fn is_text_line(line: &str) -> bool {
    let s = line.trim();
    !s.is_empty() && !s.contains("-->") && !is_index_line(s)
}
