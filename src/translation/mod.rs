/*!
 * Proportional redistribution of a block-translated string across subtitle
 * cues, plus assembly of the split segments back into SRT output.
 */

pub mod splitter;

pub use splitter::{
    collect_subtitle_blocks, split_translation, write_split_srt, RawBlock, TextBlock,
};
