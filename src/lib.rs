/*!
 * # sublex - subtitle vocabulary labeling and translation splitting
 *
 * A Rust library for turning timed subtitle files into study material:
 * sentence-aligned parse data, per-word dictionary annotations with
 * difficulty grading, and proportional redistribution of a whole-text
 * translation back onto the original cue timing.
 *
 * ## Features
 *
 * - Parse SRT/ASS/SSA/SUB/VTT subtitle files into normalized sentences
 * - Strip inline style tags and collapse whitespace
 * - Look up words against an ECDICT-style dictionary (CSV or sqlite)
 *   with plural/possessive/apostrophe candidate normalization
 * - Classify words against a proficiency-level hierarchy (CET4 through GRE)
 * - Split an externally-obtained whole-text translation across cues by
 *   character-length ratio and reassemble bilingual SRT output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: timestamp encoding/decoding for the display formats
 * - `subtitle_processor`: subtitle file parsing and text normalization
 * - `dictionary`: dictionary loading and exact-match lookup
 * - `vocabulary`: vocabulary level hierarchy and difficulty grading
 * - `labeler`: per-sentence word annotation orchestration
 * - `translation`: proportional translation splitting:
 *   - `translation::splitter`: block collection, splitting, SRT assembly
 * - `file_utils`: file system operations
 * - `errors`: custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod dictionary;
pub mod errors;
pub mod file_utils;
pub mod labeler;
pub mod subtitle_processor;
pub mod timecode;
pub mod translation;
pub mod vocabulary;

// Re-export main types for easier usage
pub use dictionary::{CsvDictionary, Dictionary, SqliteDictionary, WordEntry};
pub use errors::{AppError, DictionaryError, SubtitleError};
pub use labeler::{LabelResult, Labeler};
pub use subtitle_processor::{parse_subtitle_file, ParsedSubtitle, Sentence};
pub use translation::{collect_subtitle_blocks, split_translation, TextBlock};
pub use vocabulary::{VocabLevel, VocabLevelChecker};
