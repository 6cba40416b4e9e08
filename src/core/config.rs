/*
 * Manages application configuration: where the external tools live, what they are
 * called, the extensions treated as texture and raster, the scheduling model for drop
 * events and the initial state of the two option checkboxes. Nothing is persisted;
 * values come from built-in defaults overridden by `TEXDROP_*` environment variables.
 *
 * It uses a trait-based approach (`ConfigManagerOperations`) so the application logic
 * can be handed a fixed configuration in tests. The concrete `CoreConfigManager`
 * reads through an injectable lookup function rather than the process environment
 * directly.
 */
use super::batch_runner::SchedulingModel;
use super::models::{OptionFlags, TextureFormats};
use super::path_policy::OverwriteMode;
use log::LevelFilter;
use std::path::PathBuf;

pub const ENV_TOOLS_DIR: &str = "TEXDROP_TOOLS_DIR";
pub const ENV_ENCODER: &str = "TEXDROP_ENCODER";
pub const ENV_INSPECTOR: &str = "TEXDROP_INSPECTOR";
pub const ENV_TEXTURE_EXT: &str = "TEXDROP_TEXTURE_EXT";
pub const ENV_RASTER_EXT: &str = "TEXDROP_RASTER_EXT";
pub const ENV_SCHEDULING: &str = "TEXDROP_SCHEDULING";
pub const ENV_SHOW_STATS: &str = "TEXDROP_SHOW_STATS";
pub const ENV_TX_TO_TIF: &str = "TEXDROP_TX_TO_TIF";
pub const ENV_OVERWRITE: &str = "TEXDROP_OVERWRITE";
pub const ENV_SUMMARY_JSON: &str = "TEXDROP_SUMMARY_JSON";
pub const ENV_LOG_LEVEL: &str = "TEXDROP_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
    NoToolsDirectory,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{value}' for {key}")
            }
            ConfigError::NoToolsDirectory => write!(
                f,
                "Could not determine the tools directory; set {ENV_TOOLS_DIR}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub tools_dir: PathBuf,
    pub encoder_name: String,
    pub inspector_name: String,
    pub formats: TextureFormats,
    pub scheduling: SchedulingModel,
    pub initial_flags: OptionFlags,
    pub overwrite: OverwriteMode,
    pub summary_json: bool,
    pub log_level: LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tools_dir: PathBuf::from("."),
            encoder_name: format!("oiiotool{}", std::env::consts::EXE_SUFFIX),
            inspector_name: format!("iinfo{}", std::env::consts::EXE_SUFFIX),
            formats: TextureFormats::default(),
            scheduling: SchedulingModel::Serial,
            initial_flags: OptionFlags::default(),
            overwrite: OverwriteMode::Ask,
            summary_json: false,
            log_level: LevelFilter::Info,
        }
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self) -> Result<AppConfig>;
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct CoreConfigManager {
    lookup: Lookup,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        CoreConfigManager {
            lookup: Box::new(lookup),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        }
    }

    // The directory holding the running executable, as the tools ship next to it.
    fn default_tools_dir() -> Result<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .ok_or(ConfigError::NoToolsDirectory)
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self) -> Result<AppConfig> {
        log::trace!("CoreConfigManager: Loading configuration");
        let defaults = AppConfig::default();

        let tools_dir = match self.get(ENV_TOOLS_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => Self::default_tools_dir()?,
        };

        let scheduling = match self.get(ENV_SCHEDULING) {
            None => defaults.scheduling,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_SCHEDULING.to_string(),
                value,
            })?,
        };

        let overwrite = match self.get(ENV_OVERWRITE) {
            None => defaults.overwrite,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_OVERWRITE.to_string(),
                value,
            })?,
        };

        let log_level = match self.get(ENV_LOG_LEVEL) {
            None => defaults.log_level,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL.to_string(),
                value,
            })?,
        };

        let formats = TextureFormats::new(
            &self
                .get(ENV_TEXTURE_EXT)
                .unwrap_or(defaults.formats.texture_extension),
            &self
                .get(ENV_RASTER_EXT)
                .unwrap_or(defaults.formats.raster_extension),
        );

        let initial_flags = OptionFlags {
            include_runtime_stats: self
                .get_bool(ENV_SHOW_STATS, defaults.initial_flags.include_runtime_stats)?,
            convert_texture_to_raster: self.get_bool(
                ENV_TX_TO_TIF,
                defaults.initial_flags.convert_texture_to_raster,
            )?,
        };

        let config = AppConfig {
            tools_dir,
            encoder_name: self.get(ENV_ENCODER).unwrap_or(defaults.encoder_name),
            inspector_name: self.get(ENV_INSPECTOR).unwrap_or(defaults.inspector_name),
            formats,
            scheduling,
            initial_flags,
            overwrite,
            summary_json: self.get_bool(ENV_SUMMARY_JSON, defaults.summary_json)?,
            log_level,
        };
        log::debug!("CoreConfigManager: Loaded configuration {config:?}");
        Ok(config)
    }
}
