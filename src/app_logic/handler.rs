use crate::app_logic::ui_constants;
use crate::core::{BatchError, BatchRunner, BatchSummary, OptionFlags};
use crate::platform_layer::{
    AppEvent, DropOption, MessageSeverity, PlatformCommand, PlatformEventHandler,
};
use std::collections::VecDeque;
use std::path::PathBuf;

/*
 * The Presenter for the drop window. It owns the live checkbox state, turns each drop
 * into one batch run with a snapshot of that state, and translates progress and the
 * final `BatchSummary` into `PlatformCommand`s for the platform layer to execute.
 */
pub struct DropAppLogic {
    pub(crate) flags: OptionFlags,
    pub(crate) runner: BatchRunner,
    pub(crate) startup_lines: Vec<String>,
    pub(crate) command_queue: VecDeque<PlatformCommand>,
}

impl DropAppLogic {
    pub fn new(
        runner: BatchRunner,
        initial_flags: OptionFlags,
        startup_lines: Vec<String>,
    ) -> Self {
        DropAppLogic {
            flags: initial_flags,
            runner,
            startup_lines,
            command_queue: VecDeque::new(),
        }
    }

    pub fn current_flags(&self) -> OptionFlags {
        self.flags
    }

    fn enqueue_command(&mut self, command: PlatformCommand) {
        self.command_queue.push_back(command);
    }

    fn on_main_window_created(&mut self) {
        log::debug!("AppLogic: Main window created, sending initial UI state.");
        self.enqueue_command(PlatformCommand::SetWindowTitle {
            title: ui_constants::WINDOW_TITLE.to_string(),
        });
        self.enqueue_command(PlatformCommand::SetOptionChecked {
            option: DropOption::ShowStats,
            checked: self.flags.include_runtime_stats,
        });
        self.enqueue_command(PlatformCommand::SetOptionChecked {
            option: DropOption::ConvertTxToTif,
            checked: self.flags.convert_texture_to_raster,
        });
        self.enqueue_command(PlatformCommand::UpdateStatusText {
            text: ui_constants::DROP_PROMPT.to_string(),
            severity: MessageSeverity::Information,
        });
        if !self.startup_lines.is_empty() {
            let text = self.startup_lines.join("\n");
            self.enqueue_command(PlatformCommand::AppendConsoleText { text });
        }
        self.enqueue_command(PlatformCommand::ShowWindow);
    }

    fn on_option_toggled(&mut self, option: DropOption, checked: bool) {
        log::debug!("AppLogic: Option '{}' set to {checked}.", option.label());
        if self.runner.is_busy() {
            log::info!("AppLogic: A batch is in flight; the change applies to the next drop.");
        }
        match option {
            DropOption::ShowStats => self.flags.include_runtime_stats = checked,
            DropOption::ConvertTxToTif => self.flags.convert_texture_to_raster = checked,
        }
    }

    /*
     * Runs one drop event. The option state is copied before the batch starts, so the
     * whole batch sees the same flags. A drop arriving while a batch is in flight is
     * rejected with a warning and nothing else changes.
     */
    fn on_files_dropped(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            log::debug!("AppLogic: Drop without file paths ignored.");
            return;
        }
        let snapshot = self.current_flags();
        log::info!("AppLogic: {} file(s) dropped.", paths.len());

        // The platform drains the queue only after `handle_event` returns, so these
        // per-file updates reach it together once the batch is done, still in order.
        let mut progress_commands = Vec::new();
        let result = self.runner.run(&paths, snapshot, &mut |progress| {
            log::trace!(
                "AppLogic: {:?} finished with {:?} ({}/{}).",
                progress.outcome.source_path,
                progress.outcome.action,
                progress.completed,
                progress.total
            );
            progress_commands.push(PlatformCommand::SetProgress {
                fraction: progress.fraction,
            });
        });
        self.command_queue.extend(progress_commands);

        match result {
            Ok(summary) => self.publish_summary(summary),
            Err(e @ BatchError::BatchInFlight) => {
                log::warn!("AppLogic: {e}");
                self.enqueue_command(PlatformCommand::UpdateStatusText {
                    text: e.to_string(),
                    severity: MessageSeverity::Warning,
                });
            }
        }
    }

    fn publish_summary(&mut self, summary: BatchSummary) {
        let severity = if summary.error_messages.is_empty() {
            MessageSeverity::Information
        } else if summary.processed_paths.is_empty() {
            MessageSeverity::Error
        } else {
            MessageSeverity::Warning
        };
        self.enqueue_command(PlatformCommand::UpdateStatusText {
            text: summary.status_text(),
            severity,
        });
        if !summary.console_lines.is_empty() {
            self.enqueue_command(PlatformCommand::AppendConsoleText {
                text: summary.console_text(),
            });
        }
        self.enqueue_command(PlatformCommand::SetProgress {
            fraction: summary.progress_fraction,
        });
        self.enqueue_command(PlatformCommand::PublishSummary { summary });
    }
}

impl PlatformEventHandler for DropAppLogic {
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::MainWindowCreated => self.on_main_window_created(),
            AppEvent::OptionToggled { option, checked } => self.on_option_toggled(option, checked),
            AppEvent::FilesDropped { paths } => self.on_files_dropped(paths),
            AppEvent::WindowCloseRequestedByUser => {
                log::debug!("AppLogic: Close requested, quitting.");
                self.enqueue_command(PlatformCommand::QuitApplication);
            }
        }
    }

    fn on_quit(&mut self) {
        log::info!("AppLogic: Application quitting.");
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.command_queue.pop_front()
    }
}
