/*!
 * Error types for the sublex library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur during subtitle parsing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file does not exist
    #[error("Subtitle file not found: {0}")]
    NotFound(String),

    /// The subtitle file extension is not supported
    #[error("Unsupported subtitle format: .{0} (supported: srt, ass, ssa, sub, vtt)")]
    UnsupportedFormat(String),

    /// Reading the subtitle file failed
    #[error("Failed to read subtitle file: {0}")]
    Read(String),

    /// Writing a result file failed
    #[error("Failed to write output file: {0}")]
    Write(String),
}

/// Errors that can occur when loading a dictionary
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// The dictionary file does not exist
    #[error("Dictionary file not found: {0}")]
    NotFound(String),

    /// Loading or decoding the dictionary data failed
    #[error("Failed to load dictionary: {0}")]
    Load(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from subtitle parsing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from dictionary loading
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility conversions for error propagation at the orchestration layer
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
