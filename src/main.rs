// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::dictionary::{CsvDictionary, Dictionary, SqliteDictionary};
use crate::file_utils::FileManager;
use crate::labeler::Labeler;
use crate::translation::splitter;
use crate::vocabulary::{VocabLevel, VocabLevelChecker};

mod dictionary;
mod errors;
mod file_utils;
mod labeler;
mod subtitle_processor;
mod timecode;
mod translation;
mod vocabulary;

/// CLI wrapper for log levels to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a subtitle file into sentence-aligned JSON
    Parse {
        /// Subtitle file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Output JSON path (single-file input only; defaults to the input
        /// path with a .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Annotate every word of a subtitle file against a dictionary
    Label {
        /// Subtitle file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Dictionary file (.csv for ECDICT CSV, anything else is opened as
        /// an ECDICT sqlite database)
        #[arg(short, long)]
        dictionary: PathBuf,

        /// User vocabulary level
        #[arg(short, long, default_value = "cet4")]
        level: String,

        /// Output JSON path (single-file input only; defaults to the input
        /// path with a -labels.json suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a whole-text translation across a subtitle file's cues
    Translate {
        /// SRT-like subtitle file to split against
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Text file holding the whole-text translation of the subtitle
        #[arg(short, long)]
        translation: PathBuf,

        /// Also include the original text above each translated segment
        #[arg(short, long)]
        bilingual: bool,

        /// Output subtitle path (defaults next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// sublex - subtitle vocabulary labeling and translation splitting
#[derive(Parser, Debug)]
#[command(name = "sublex")]
#[command(version = "0.1.0")]
#[command(about = "Subtitle parsing, vocabulary labeling and translation splitting")]
#[command(long_about = "sublex parses subtitle files into sentence-aligned JSON, annotates their \
vocabulary against an ECDICT-style dictionary, and redistributes a whole-text translation back \
onto the original cue timing.

EXAMPLES:
    sublex parse movie.srt                                   # Sentence JSON next to the input
    sublex parse /media/subs/                                # Parse a whole directory
    sublex label movie.srt -d ecdict.csv -l cet6             # Word annotations for a CET6 user
    sublex translate movie.srt -t movie.zh.txt               # Translated SRT
    sublex translate movie.srt -t movie.zh.txt --bilingual   # Bilingual SRT

The translation file is plain text produced by any external translator from the
concatenation of the subtitle's cue texts.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Set logging level
    #[arg(short = 'L', long, value_enum, default_value = "info")]
    log_level: CliLogLevel,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[0m",
            Level::Debug => "\x1B[2m",
            Level::Trace => "\x1B[2m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    let options = CommandLineOptions::parse();
    if let Err(e) = CustomLogger::init(options.log_level.clone().into()) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let result = match options.command {
        Commands::Parse { input_path, output } => run_parse(&input_path, output.as_deref()),
        Commands::Label {
            input_path,
            dictionary,
            level,
            output,
        } => run_label(&input_path, &dictionary, &level, output.as_deref()),
        Commands::Translate {
            input_path,
            translation,
            bilingual,
            output,
        } => run_translate(&input_path, &translation, bilingual, output.as_deref()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Resolve a file-or-directory input into the list of subtitle files to work on
fn resolve_inputs(input_path: &Path) -> Result<Vec<PathBuf>> {
    if input_path.is_dir() {
        let files = FileManager::find_subtitle_files(input_path)?;
        if files.is_empty() {
            return Err(anyhow!(
                "No subtitle files found under {}",
                input_path.display()
            ));
        }
        Ok(files)
    } else {
        Ok(vec![input_path.to_path_buf()])
    }
}

fn run_parse(input_path: &Path, output: Option<&Path>) -> Result<()> {
    let inputs = resolve_inputs(input_path)?;
    if inputs.len() > 1 && output.is_some() {
        return Err(anyhow!("--output cannot be combined with a directory input"));
    }

    for input in &inputs {
        let written = subtitle_processor::parse_and_save_json(input, output)
            .with_context(|| format!("Parsing {}", input.display()))?;
        info!("{} -> {}", input.display(), written.display());
    }
    Ok(())
}

fn run_label(
    input_path: &Path,
    dictionary_path: &Path,
    level: &str,
    output: Option<&Path>,
) -> Result<()> {
    let inputs = resolve_inputs(input_path)?;
    if inputs.len() > 1 && output.is_some() {
        return Err(anyhow!("--output cannot be combined with a directory input"));
    }

    // Dictionary problems are fatal here, before any file is touched
    let dictionary = load_dictionary(dictionary_path)?;
    let user_level = VocabLevel::parse(level);
    let labeler = Labeler::new(dictionary, VocabLevelChecker::new(user_level));
    info!(
        "Labeling {} file(s) at level {}",
        inputs.len(),
        user_level.label()
    );

    for input in &inputs {
        let result = labeler
            .process_subtitle_file(input, output)
            .with_context(|| format!("Labeling {}", input.display()))?;

        info!("Statistics for {}:", result.source);
        info!("  total words:   {}", result.statistics.total_words);
        info!("  new words:     {}", result.statistics.new_words_count);
        info!("  coverage rate: {}%", result.statistics.coverage_rate);
        for (i, word) in result.new_words.iter().take(10).enumerate() {
            info!(
                "  {}. {} ({}) - {}",
                i + 1,
                word.word,
                word.difficulty,
                word.translation
            );
        }
    }
    Ok(())
}

fn run_translate(
    input_path: &Path,
    translation_path: &Path,
    bilingual: bool,
    output: Option<&Path>,
) -> Result<()> {
    let (blocks, text_blocks) = splitter::collect_subtitle_blocks(input_path)?;
    if blocks.is_empty() {
        return Err(anyhow!(
            "No subtitle blocks found in {}",
            input_path.display()
        ));
    }

    let translation = std::fs::read_to_string(translation_path)
        .with_context(|| format!("Reading translation {}", translation_path.display()))?;
    let segments = splitter::split_translation(translation.trim(), &text_blocks);

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => {
            let stem = input_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let suffix = if bilingual { "bilingual" } else { "translated" };
            input_path.with_file_name(format!("{}-{}.srt", stem, suffix))
        }
    };

    splitter::write_split_srt(&blocks, &text_blocks, &segments, &output_path, bilingual)?;
    info!(
        "Wrote {} segments to {}",
        segments.len(),
        output_path.display()
    );
    Ok(())
}

/// Open a dictionary by extension: .csv loads the CSV backend, anything else
/// is treated as an ECDICT sqlite database
fn load_dictionary(path: &Path) -> Result<Arc<dyn Dictionary>> {
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let dictionary: Arc<dyn Dictionary> = if is_csv {
        Arc::new(CsvDictionary::load(path)?)
    } else {
        Arc::new(SqliteDictionary::load(path)?)
    };

    if dictionary.is_empty() {
        return Err(anyhow!("Dictionary {} holds no entries", path.display()));
    }
    Ok(dictionary)
}
