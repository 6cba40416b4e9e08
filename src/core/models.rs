/*
 * Defines the plain data types that flow through a drop event: the option flags
 * snapshot, the `Action` chosen for a file, the per-file `ConversionOutcome` and the
 * per-file error taxonomy carried inside it. None of these types perform I/O.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/*
 * Snapshot of the two user-toggled options. Taken once at the start of a drop event
 * and copied into every worker, so toggling a checkbox mid-batch has no effect on the
 * batch already running.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionFlags {
    pub include_runtime_stats: bool,
    pub convert_texture_to_raster: bool,
}

impl Default for OptionFlags {
    fn default() -> Self {
        OptionFlags {
            include_runtime_stats: true,
            convert_texture_to_raster: false,
        }
    }
}

// The conversion selected for a single dropped file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    ConvertToTexture { add_stats: bool },
    ConvertTextureToRaster,
    InspectTexture,
}

/*
 * The texture and raster extensions in use, stored without the leading dot.
 * `is_texture` is a case-sensitive literal suffix match on `.<texture>`.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureFormats {
    pub texture_extension: String,
    pub raster_extension: String,
}

impl TextureFormats {
    pub fn new(texture_extension: &str, raster_extension: &str) -> Self {
        TextureFormats {
            texture_extension: texture_extension.trim_start_matches('.').to_string(),
            raster_extension: raster_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn is_texture(&self, path: &Path) -> bool {
        let suffix = format!(".{}", self.texture_extension);
        path.to_string_lossy().ends_with(&suffix)
    }
}

impl Default for TextureFormats {
    fn default() -> Self {
        TextureFormats::new("tx", "tif")
    }
}

/*
 * Errors that end the processing of a single file. These never abort a batch; the
 * orchestrator turns them into a `Failed` outcome and the aggregator reports their
 * `Display` text in the error list.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    NotFound(PathBuf),
    ToolLaunch { executable: PathBuf, message: String },
    Internal(String),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound(p) => write!(f, "File not found: {}", p.display()),
            FileError::ToolLaunch {
                executable,
                message,
            } => write!(f, "Failed to launch {}: {message}", executable.display()),
            FileError::Internal(s) => write!(f, "Unexpected failure: {s}"),
        }
    }
}

impl std::error::Error for FileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Completed,
    // The user declined to overwrite an existing destination.
    Skipped,
    Failed(FileError),
}

/*
 * The terminal result of one file's state machine. `destination_path` is `None` for
 * texture inspection and for files that failed before a destination was resolved.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub source_path: PathBuf,
    pub action: Option<Action>,
    pub destination_path: Option<PathBuf>,
    pub standard_output: String,
    pub standard_error: Option<String>,
    pub status: OutcomeStatus,
}

impl ConversionOutcome {
    pub fn failed(source_path: &Path, action: Option<Action>, error: FileError) -> Self {
        ConversionOutcome {
            source_path: source_path.to_path_buf(),
            action,
            destination_path: None,
            standard_output: String::new(),
            standard_error: None,
            status: OutcomeStatus::Failed(error),
        }
    }

    pub fn skipped(&self) -> bool {
        self.status == OutcomeStatus::Skipped
    }

    /*
     * The path reported as "processed" for a completed file: the produced destination,
     * or the source itself for an inspection that writes nothing.
     */
    pub fn processed_path(&self) -> Option<&Path> {
        match self.status {
            OutcomeStatus::Completed => Some(
                self.destination_path
                    .as_deref()
                    .unwrap_or(self.source_path.as_path()),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_match_initial_checkbox_state() {
        let flags = OptionFlags::default();
        assert!(flags.include_runtime_stats);
        assert!(!flags.convert_texture_to_raster);
    }

    #[test]
    fn test_texture_suffix_is_case_sensitive() {
        let formats = TextureFormats::default();
        assert!(formats.is_texture(Path::new("tile.tx")));
        assert!(formats.is_texture(Path::new("dir/sub/tile.tx")));
        assert!(!formats.is_texture(Path::new("tile.TX")));
        assert!(!formats.is_texture(Path::new("tile.txt")));
        assert!(!formats.is_texture(Path::new("tile")));
    }

    #[test]
    fn test_formats_strip_leading_dot() {
        let formats = TextureFormats::new(".tex", ".png");
        assert_eq!(formats.texture_extension, "tex");
        assert_eq!(formats.raster_extension, "png");
        assert!(formats.is_texture(Path::new("a.tex")));
    }

    #[test]
    fn test_file_not_found_message_is_literal() {
        let err = FileError::NotFound(PathBuf::from("missing.png"));
        assert_eq!(err.to_string(), "File not found: missing.png");
    }

    #[test]
    fn test_processed_path_prefers_destination() {
        let mut outcome = ConversionOutcome {
            source_path: PathBuf::from("a.png"),
            action: Some(Action::ConvertToTexture { add_stats: false }),
            destination_path: Some(PathBuf::from("a.tx")),
            standard_output: String::new(),
            standard_error: None,
            status: OutcomeStatus::Completed,
        };
        assert_eq!(outcome.processed_path(), Some(Path::new("a.tx")));

        outcome.destination_path = None;
        assert_eq!(outcome.processed_path(), Some(Path::new("a.png")));

        outcome.status = OutcomeStatus::Skipped;
        assert!(outcome.skipped());
        assert_eq!(outcome.processed_path(), None);
    }
}
