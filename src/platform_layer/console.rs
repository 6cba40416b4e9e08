/*
 * A headless rendition of the presentation layer. `ConsolePlatform` feeds events to a
 * `PlatformEventHandler`, drains the commands it enqueues and renders them as text:
 * the status panel, the console panel and a textual progress bar. The process
 * arguments form a single drop event, like files dropped on the executable.
 *
 * `ConsoleOverwritePrompt` is the interactive `OverwriteConfirmer` used with it. It
 * serializes prompts so concurrent workers never interleave questions.
 */
use super::error::Result;
use super::types::{AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler};
use crate::core::OverwriteConfirmer;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const PROGRESS_BAR_WIDTH: usize = 20;

pub struct ConsolePlatform<W: Write> {
    out: W,
    print_summary_json: bool,
    quit_requested: bool,
}

impl<W: Write> ConsolePlatform<W> {
    pub fn new(out: W, print_summary_json: bool) -> Self {
        ConsolePlatform {
            out,
            print_summary_json,
            quit_requested: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /*
     * Runs a complete session: window creation, one `FilesDropped` event per entry of
     * `drops`, then a close request. Stops early if the handler asks to quit.
     */
    pub fn run(
        &mut self,
        handler: &mut dyn PlatformEventHandler,
        drops: Vec<Vec<PathBuf>>,
    ) -> Result<()> {
        self.dispatch(handler, AppEvent::MainWindowCreated)?;
        for paths in drops {
            if self.quit_requested {
                break;
            }
            self.dispatch(handler, AppEvent::FilesDropped { paths })?;
        }
        if !self.quit_requested {
            self.dispatch(handler, AppEvent::WindowCloseRequestedByUser)?;
        }
        handler.on_quit();
        self.out.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, handler: &mut dyn PlatformEventHandler, event: AppEvent) -> Result<()> {
        log::trace!("ConsolePlatform: Dispatching {event:?}");
        handler.handle_event(event);
        while let Some(command) = handler.try_dequeue_command() {
            self.execute(command)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: PlatformCommand) -> Result<()> {
        match command {
            PlatformCommand::SetWindowTitle { title } => {
                writeln!(self.out, "== {title} ==")?;
            }
            PlatformCommand::SetOptionChecked { option, checked } => {
                let mark = if checked { 'x' } else { ' ' };
                writeln!(self.out, "[{mark}] {}", option.label())?;
            }
            PlatformCommand::ShowWindow => {
                log::debug!("ConsolePlatform: Window shown.");
            }
            PlatformCommand::UpdateStatusText { text, severity } => {
                let header = match severity {
                    MessageSeverity::Information => "Status:",
                    MessageSeverity::Warning => "Status (warnings):",
                    MessageSeverity::Error => "Status (errors):",
                };
                writeln!(self.out, "{header}\n{text}")?;
            }
            PlatformCommand::AppendConsoleText { text } => {
                writeln!(self.out, "{text}")?;
            }
            PlatformCommand::SetProgress { fraction } => {
                if fraction > 0.0 {
                    writeln!(self.out, "{}", render_progress(fraction))?;
                }
            }
            PlatformCommand::PublishSummary { summary } => {
                if self.print_summary_json {
                    let json = serde_json::to_string_pretty(&summary)?;
                    writeln!(self.out, "{json}")?;
                }
            }
            PlatformCommand::QuitApplication => {
                self.quit_requested = true;
            }
        }
        Ok(())
    }
}

fn render_progress(fraction: f64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled),
        (fraction * 100.0).round() as u32
    )
}

/*
 * Asks on the console whether an existing destination may be replaced. Only an
 * explicit yes proceeds; no, cancel, empty input and end of input all decline.
 */
pub struct ConsoleOverwritePrompt<R: BufRead + Send, W: Write + Send> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead + Send, W: Write + Send> ConsoleOverwritePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsoleOverwritePrompt {
            io: Mutex::new((input, output)),
        }
    }

    fn ask(&self, destination: &Path) -> std::io::Result<bool> {
        let mut guard = match self.io.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (input, output) = &mut *guard;
        write!(
            output,
            "File {} already exists. Do you want to overwrite it? [y/N/c] ",
            destination.display()
        )?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

impl<R: BufRead + Send, W: Write + Send> OverwriteConfirmer for ConsoleOverwritePrompt<R, W> {
    fn confirm_overwrite(&self, destination: &Path) -> bool {
        self.ask(destination).unwrap_or_else(|e| {
            log::error!("ConsoleOverwritePrompt: Could not ask about {destination:?}: {e}");
            false
        })
    }
}
