use once_cell::sync::Lazy;
use regex::Regex;

// @module: Timestamp encoding and decoding for subtitle display formats

// @const: SRT time range regex (HH:MM:SS,mmm --> HH:MM:SS,mmm)
static SRT_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: ASS time range regex (H:MM:SS.cc --> H:MM:SS.cc)
static ASS_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+):(\d{2}):(\d{2})\.(\d{2})\s*-->\s*(\d+):(\d{2}):(\d{2})\.(\d{2})").unwrap()
});

/// Display format for subtitle timestamps.
///
/// SRT renders `HH:MM:SS,mmm` with millisecond precision; ASS renders
/// `H:MM:SS.cc` with centisecond precision. The remaining supported
/// extensions (ssa, sub, vtt) are rendered in the ASS style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    Srt,
    Ass,
}

impl TimeFormat {
    /// Pick the display format for a file extension (without dot)
    pub fn from_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("srt") {
            TimeFormat::Srt
        } else {
            TimeFormat::Ass
        }
    }
}

/// Format a start/end pair of millisecond offsets as a display time range
pub fn encode_range(start_ms: u64, end_ms: u64, format: TimeFormat) -> String {
    match format {
        TimeFormat::Srt => format!(
            "{} --> {}",
            format_srt_time(start_ms),
            format_srt_time(end_ms)
        ),
        TimeFormat::Ass => format!(
            "{} --> {}",
            format_ass_time(start_ms),
            format_ass_time(end_ms)
        ),
    }
}

/// Parse a display time range back into millisecond offsets.
///
/// Returns `None` when the string does not match the expected shape; callers
/// treat the absence of a match as "no valid timestamp", not as an error.
pub fn decode_range(display: &str, format: TimeFormat) -> Option<(u64, u64)> {
    match format {
        TimeFormat::Srt => {
            let caps = SRT_RANGE_REGEX.captures(display)?;
            let start = srt_parts_to_ms(&caps, 1)?;
            let end = srt_parts_to_ms(&caps, 5)?;
            Some((start, end))
        }
        TimeFormat::Ass => {
            let caps = ASS_RANGE_REGEX.captures(display)?;
            let start = ass_parts_to_ms(&caps, 1)?;
            let end = ass_parts_to_ms(&caps, 5)?;
            Some((start, end))
        }
    }
}

/// Convert milliseconds to seconds rounded to three decimal places.
///
/// Halfway cases round to even, matching the reference data this library
/// is validated against.
pub fn ms_to_seconds(ms: u64) -> f64 {
    round_half_even(ms as f64 / 1000.0, 3)
}

/// Round to `places` decimal places with ties going to the even neighbor
pub fn round_half_even(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

fn format_srt_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

fn format_ass_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;
    format!("{:01}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

fn srt_parts_to_ms(caps: &regex::Captures, first_group: usize) -> Option<u64> {
    let hours: u64 = caps.get(first_group)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(first_group + 1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(first_group + 2)?.as_str().parse().ok()?;
    let millis: u64 = caps.get(first_group + 3)?.as_str().parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

fn ass_parts_to_ms(caps: &regex::Captures, first_group: usize) -> Option<u64> {
    let hours: u64 = caps.get(first_group)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(first_group + 1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(first_group + 2)?.as_str().parse().ok()?;
    let centis: u64 = caps.get(first_group + 3)?.as_str().parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + centis * 10)
}
