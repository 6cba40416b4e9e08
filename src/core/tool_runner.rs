/*
 * This module wraps the two external executables the application drives: the
 * texture encoder (which also converts textures back to raster images) and the
 * texture inspector. It defines the `ToolRunnerOperations` trait so the orchestrator
 * can be tested without spawning processes, a `CoreToolRunner` that spawns them with
 * `std::process::Command`, the startup check that both executables are present, and
 * the `--version` probe shown on startup.
 */
use super::config::AppConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug)]
pub enum ToolError {
    Launch {
        executable: PathBuf,
        source: io::Error,
    },
    MissingExecutables(Vec<PathBuf>),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Launch { executable, source } => {
                write!(f, "Failed to launch {}: {source}", executable.display())
            }
            ToolError::MissingExecutables(paths) => {
                write!(f, "Missing required files in the tools folder:")?;
                for path in paths {
                    write!(f, "\n{}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

/*
 * Fully buffered output of one tool run. The exit code is kept for logging only;
 * callers decide success by the presence of text on `stderr`.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

pub trait ToolRunnerOperations: Send + Sync {
    /*
     * Runs `executable` with `args`, waits for it to exit and returns both captured
     * streams. Fails only when the process cannot be started.
     */
    fn run(&self, executable: &Path, args: &[String]) -> Result<ToolOutput>;
}

pub struct CoreToolRunner {}

impl CoreToolRunner {
    pub fn new() -> Self {
        CoreToolRunner {}
    }
}

impl Default for CoreToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRunnerOperations for CoreToolRunner {
    fn run(&self, executable: &Path, args: &[String]) -> Result<ToolOutput> {
        log::debug!("CoreToolRunner: Running {executable:?} with args {args:?}");
        let output = Command::new(executable)
            .args(args)
            .output()
            .map_err(|source| {
                log::error!("CoreToolRunner: Could not start {executable:?}: {source}");
                ToolError::Launch {
                    executable: executable.to_path_buf(),
                    source,
                }
            })?;

        let tool_output = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        if !tool_output.stdout.is_empty() {
            log::info!("CoreToolRunner: Standard output: {}", tool_output.stdout);
        }
        if !tool_output.stderr.is_empty() {
            log::error!("CoreToolRunner: Standard error: {}", tool_output.stderr);
        }
        log::debug!(
            "CoreToolRunner: {executable:?} exited with {:?}",
            tool_output.exit_code
        );
        Ok(tool_output)
    }
}

/*
 * Absolute locations of the encoder and inspector executables. Built once at startup
 * by `locate`, which refuses to produce a `ToolSet` unless both files exist.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub encoder: PathBuf,
    pub inspector: PathBuf,
}

impl ToolSet {
    pub fn locate(config: &AppConfig) -> Result<ToolSet> {
        let tools = ToolSet {
            encoder: config.tools_dir.join(&config.encoder_name),
            inspector: config.tools_dir.join(&config.inspector_name),
        };
        let missing: Vec<PathBuf> = [&tools.encoder, &tools.inspector]
            .into_iter()
            .filter(|path| !path.is_file())
            .cloned()
            .collect();

        if !missing.is_empty() {
            let err = ToolError::MissingExecutables(missing);
            log::error!("ToolSet: {err}");
            return Err(err);
        }
        log::info!("ToolSet: All required files found in {:?}.", config.tools_dir);
        Ok(tools)
    }

    pub fn executables(&self) -> [&Path; 2] {
        [self.encoder.as_path(), self.inspector.as_path()]
    }
}

/*
 * Runs `<executable> --version` and returns the console line to show for it. The
 * version text is logged, never parsed. A failed probe yields an error line instead
 * of failing startup.
 */
pub fn probe_version(runner: &dyn ToolRunnerOperations, executable: &Path) -> String {
    match runner.run(executable, &["--version".to_string()]) {
        Ok(output) => {
            let version = output.stdout.trim();
            log::info!("ToolRunner: {executable:?} reports version '{version}'");
            format!("{}: {version}", executable.display())
        }
        Err(e) => {
            log::error!("ToolRunner: Version probe failed: {e}");
            format!("An error occurred while running {}: {e}", executable.display())
        }
    }
}

/*
 * Console lines shown once the tools have been located: the confirmation that both
 * were found, then one version line per executable.
 */
pub fn startup_console_lines(runner: &dyn ToolRunnerOperations, tools: &ToolSet) -> Vec<String> {
    let mut lines = vec!["All required files found.".to_string()];
    lines.extend(
        tools
            .executables()
            .into_iter()
            .map(|exe| probe_version(runner, exe)),
    );
    lines
}
