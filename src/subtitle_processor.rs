use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::timecode::{self, TimeFormat};

// @module: Subtitle file parsing into normalized sentence records

/// Subtitle file extensions this parser accepts (without dot)
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["srt", "ass", "ssa", "sub", "vtt"];

// @const: Inline style tag regex ({...}, non-greedy, no nesting)
static STYLE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

// @const: VTT time range regex (hours optional, dot milliseconds)
static VTT_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})\s*-->\s*(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})")
        .unwrap()
});

// @const: Single ASS timestamp (H:MM:SS.cc)
static ASS_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d{2}):(\d{2})\.(\d{2})").unwrap());

// @const: MicroDVD event line ({start}{stop}text)
static MICRODVD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{(\d+)\}\{(\d+)\}(.*)$").unwrap());

/// One timed subtitle sentence after cleanup and renumbering
#[derive(Debug, Clone, Serialize)]
pub struct Sentence {
    /// Position in the surviving sequence, 0-based and contiguous
    pub index: usize,

    /// Start offset in seconds (three decimal places)
    pub start: f64,

    /// End offset in seconds (three decimal places)
    pub end: f64,

    /// Display text with style tags stripped and whitespace collapsed
    pub text: String,

    /// Start/end rendered in the source format's display style
    pub video_timestamp: String,
}

/// Full result of parsing one subtitle file
#[derive(Debug, Serialize)]
pub struct ParsedSubtitle {
    pub sentences: Vec<Sentence>,
    pub total_sentences: usize,
    /// End of the last sentence in seconds, 0 for an empty file
    pub duration: f64,
    /// Basename of the parsed file
    pub source_file: String,
    /// File extension without the dot
    pub format: String,
}

/// Raw timed event as read from a subtitle file, before cleanup
#[derive(Debug)]
struct RawEvent {
    start_ms: u64,
    end_ms: u64,
    text: String,
    is_comment: bool,
}

/// Strip inline `{...}` style tags and collapse whitespace runs.
///
/// Idempotent; a literal `}` terminates the nearest open tag, nested braces
/// are not interpreted.
pub fn clean_text(text: &str) -> String {
    let stripped = STYLE_TAG_REGEX.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a subtitle file into an ordered sentence sequence.
///
/// Comment events and events with blank text are dropped and the remaining
/// sentences renumbered contiguously. Fails with `NotFound` for a missing
/// path and `UnsupportedFormat` for an extension outside the supported set.
pub fn parse_subtitle_file<P: AsRef<Path>>(path: P) -> Result<ParsedSubtitle, SubtitleError> {
    let path = path.as_ref();
    if !FileManager::file_exists(path) {
        return Err(SubtitleError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(SubtitleError::UnsupportedFormat(extension));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| SubtitleError::Read(format!("{}: {}", path.display(), e)))?;
    let events = load_events(&content, &extension);
    debug!("Loaded {} raw events from {}", events.len(), path.display());

    let display_format = TimeFormat::from_extension(&extension);
    let mut sentences = Vec::new();
    for event in events {
        if event.is_comment || event.text.trim().is_empty() {
            continue;
        }
        sentences.push(Sentence {
            index: sentences.len(),
            start: timecode::ms_to_seconds(event.start_ms),
            end: timecode::ms_to_seconds(event.end_ms),
            text: clean_text(&event.text),
            video_timestamp: timecode::encode_range(event.start_ms, event.end_ms, display_format),
        });
    }

    let duration = sentences.last().map(|s| s.end).unwrap_or(0.0);
    if sentences.is_empty() {
        warn!("No usable subtitle events in {}", path.display());
    }

    Ok(ParsedSubtitle {
        total_sentences: sentences.len(),
        duration,
        source_file: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        format: extension,
        sentences,
    })
}

/// Parse a subtitle file and write the result as pretty-printed JSON.
///
/// When `output` is omitted the input path with its extension replaced by
/// `.json` is used. Returns the path that was written.
pub fn parse_and_save_json<P: AsRef<Path>>(
    path: P,
    output: Option<&Path>,
) -> Result<PathBuf, SubtitleError> {
    let path = path.as_ref();
    let result = parse_subtitle_file(path)?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => path.with_extension("json"),
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        FileManager::ensure_dir(parent)
            .map_err(|e| SubtitleError::Write(format!("{}: {}", parent.display(), e)))?;
    }

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| SubtitleError::Write(e.to_string()))?;
    fs::write(&output_path, json)
        .map_err(|e| SubtitleError::Write(format!("{}: {}", output_path.display(), e)))?;

    debug!("Wrote parse result to {}", output_path.display());
    Ok(output_path)
}

/// Find the first sentence covering a point in time, boundaries inclusive
pub fn get_sentence_at_time(sentences: &[Sentence], time_seconds: f64) -> Option<&Sentence> {
    sentences
        .iter()
        .find(|s| s.start <= time_seconds && time_seconds <= s.end)
}

/// Dispatch to the format-specific event loader
fn load_events(content: &str, extension: &str) -> Vec<RawEvent> {
    match extension {
        "srt" => load_timed_blocks(content, TimedBlockStyle::Srt),
        "vtt" => load_timed_blocks(content, TimedBlockStyle::Vtt),
        "ass" | "ssa" => load_ass_events(content),
        "sub" => load_microdvd_events(content),
        other => {
            // Unreachable behind the extension check, but degrade rather than panic
            warn!("No loader for extension {}, producing no events", other);
            Vec::new()
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum TimedBlockStyle {
    Srt,
    Vtt,
}

/// Shared loader for the block-structured formats (SRT and WebVTT).
///
/// Scans for a line containing a parseable time range, then collects the
/// following non-blank lines as the event text. Index lines, cue identifiers
/// and the WEBVTT header never contain a valid range and are skipped; VTT
/// NOTE blocks become comment events.
fn load_timed_blocks(content: &str, style: TimedBlockStyle) -> Vec<RawEvent> {
    let lines: Vec<&str> = content.lines().collect();
    let mut events = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if style == TimedBlockStyle::Vtt && line.starts_with("NOTE") {
            let mut note = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() {
                note.push(lines[i].trim());
                i += 1;
            }
            events.push(RawEvent {
                start_ms: 0,
                end_ms: 0,
                text: note.join(" "),
                is_comment: true,
            });
            continue;
        }

        let range = match style {
            TimedBlockStyle::Srt => timecode::decode_range(line, TimeFormat::Srt),
            TimedBlockStyle::Vtt => decode_vtt_range(line),
        };

        if let Some((start_ms, end_ms)) = range {
            let mut text_lines = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().is_empty() {
                text_lines.push(lines[i].trim_end());
                i += 1;
            }
            events.push(RawEvent {
                start_ms,
                end_ms,
                text: text_lines.join("\n"),
                is_comment: false,
            });
        } else {
            i += 1;
        }
    }

    events
}

fn decode_vtt_range(line: &str) -> Option<(u64, u64)> {
    let caps = VTT_RANGE_REGEX.captures(line)?;
    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0)
    };
    let start = part(1) * 3_600_000 + part(2) * 60_000 + part(3) * 1_000 + part(4);
    let end = part(5) * 3_600_000 + part(6) * 60_000 + part(7) * 1_000 + part(8);
    Some((start, end))
}

/// Load Dialogue/Comment events from the [Events] section of an ASS/SSA file.
///
/// Fields follow the standard event order, so the start and end times are the
/// second and third fields and the text is everything after the ninth comma.
fn load_ass_events(content: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut in_events = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_events = trimmed.eq_ignore_ascii_case("[Events]");
            continue;
        }
        if !in_events {
            continue;
        }

        let (is_comment, rest) = if let Some(rest) = trimmed.strip_prefix("Dialogue:") {
            (false, rest)
        } else if let Some(rest) = trimmed.strip_prefix("Comment:") {
            (true, rest)
        } else {
            continue;
        };

        let fields: Vec<&str> = rest.splitn(10, ',').collect();
        if fields.len() < 10 {
            continue;
        }
        let (Some(start_ms), Some(end_ms)) = (
            decode_ass_time(fields[1].trim()),
            decode_ass_time(fields[2].trim()),
        ) else {
            continue;
        };

        // ASS line-break escapes become spaces before the normalizer runs
        let text = fields[9].replace("\\N", " ").replace("\\n", " ");
        events.push(RawEvent {
            start_ms,
            end_ms,
            text,
            is_comment,
        });
    }

    events
}

fn decode_ass_time(value: &str) -> Option<u64> {
    let caps = ASS_TIME_REGEX.captures(value)?;
    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;
    let centis: u64 = caps.get(4)?.as_str().parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + centis * 10)
}

/// Load frame-based MicroDVD events.
///
/// The frame rate comes from a `{1}{1}<fps>` header line when present and
/// defaults to 25.0 otherwise. Pipe characters separate display lines.
fn load_microdvd_events(content: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut fps = 25.0_f64;
    let mut saw_header = false;

    for (line_no, line) in content.lines().enumerate() {
        let Some(caps) = MICRODVD_REGEX.captures(line.trim()) else {
            continue;
        };
        let start_frame: u64 = caps[1].parse().unwrap_or(0);
        let end_frame: u64 = caps[2].parse().unwrap_or(0);
        let text = caps[3].replace('|', " ");

        if line_no == 0 && start_frame == 1 && end_frame == 1 {
            if let Ok(parsed) = text.trim().parse::<f64>() {
                if parsed > 0.0 {
                    fps = parsed;
                    saw_header = true;
                    continue;
                }
            }
        }

        events.push(RawEvent {
            start_ms: frames_to_ms(start_frame, fps),
            end_ms: frames_to_ms(end_frame, fps),
            text,
            is_comment: false,
        });
    }

    if !saw_header && !events.is_empty() {
        debug!("MicroDVD file without fps header, assuming {} fps", fps);
    }
    events
}

fn frames_to_ms(frames: u64, fps: f64) -> u64 {
    (frames as f64 / fps * 1000.0).round() as u64
}
