// src/main.rs

mod app_logic;
mod core;
mod platform_layer;

use crate::app_logic::DropAppLogic;
use crate::core::{
    AllowOverwrite, AppConfig, BatchRunner, ConfigManagerOperations, ConversionOrchestrator,
    CoreConfigManager, CoreToolRunner, DenyOverwrite, OverwriteConfirmer, OverwriteMode,
    ToolRunnerOperations, ToolSet, path_utils, tool_runner,
};
use crate::platform_layer::{ConsoleOverwritePrompt, ConsolePlatform};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const APP_NAME: &str = "TexDropper";

/*
 * Warnings and errors go to the terminal; everything at `file_level` and above goes
 * to the log file in the local data directory, when one can be created.
 */
fn initialize_logging(file_level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    match path_utils::get_log_file_path(APP_NAME).map(|path| (File::create(&path), path)) {
        Some((Ok(file), _)) => loggers.push(WriteLogger::new(file_level, config, file)),
        Some((Err(e), path)) => eprintln!("Could not create log file {path:?}: {e}"),
        None => eprintln!("Could not determine a log directory; logging to terminal only."),
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

fn build_overwrite_confirmer(config: &AppConfig) -> Arc<dyn OverwriteConfirmer> {
    match config.overwrite {
        OverwriteMode::Always => Arc::new(AllowOverwrite),
        OverwriteMode::Never => Arc::new(DenyOverwrite),
        OverwriteMode::Ask if io::stdin().is_terminal() => Arc::new(ConsoleOverwritePrompt::new(
            BufReader::new(io::stdin()),
            io::stderr(),
        )),
        OverwriteMode::Ask => {
            log::info!("{APP_NAME}: No terminal to ask on; existing files will be kept.");
            Arc::new(DenyOverwrite)
        }
    }
}

fn main() -> ExitCode {
    let config = match CoreConfigManager::new().load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    initialize_logging(config.log_level);
    log::info!("{APP_NAME} starting with tools directory {:?}", config.tools_dir);

    // Refuse to start unless both executables are present.
    let tools = match ToolSet::locate(&config) {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let tool_runner: Arc<dyn ToolRunnerOperations> = Arc::new(CoreToolRunner::new());
    let startup_lines = tool_runner::startup_console_lines(tool_runner.as_ref(), &tools);

    let confirmer = build_overwrite_confirmer(&config);
    let orchestrator =
        ConversionOrchestrator::new(tools, config.formats.clone(), tool_runner, confirmer);
    let runner = BatchRunner::new(Arc::new(orchestrator), config.scheduling);
    let mut logic = DropAppLogic::new(runner, config.initial_flags, startup_lines);

    // Every argument is a dropped file; together they form one drop event.
    let dropped: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let drops = if dropped.is_empty() {
        Vec::new()
    } else {
        vec![dropped]
    };

    let mut platform = ConsolePlatform::new(io::stdout(), config.summary_json);
    match platform.run(&mut logic, drops) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{APP_NAME}: {e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
