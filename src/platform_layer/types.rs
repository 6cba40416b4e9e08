/*
 * This module defines the data exchanged between the application logic and the
 * presentation layer: the two user options (`DropOption`), platform-agnostic events
 * (`AppEvent`), the commands the presentation executes (`PlatformCommand`), message
 * severities, and the `PlatformEventHandler` trait the application logic implements.
 */
use crate::core::BatchSummary;
use std::path::PathBuf;

// The two checkboxes shown above the drop area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropOption {
    ShowStats,
    ConvertTxToTif,
}

impl DropOption {
    pub fn label(self) -> &'static str {
        match self {
            DropOption::ShowStats => "show stats",
            DropOption::ConvertTxToTif => "convert tx to tif",
        }
    }
}

// --- Events from Platform to App Logic ---

#[derive(Debug)]
pub enum AppEvent {
    // The main window exists and is ready to receive its initial content.
    MainWindowCreated,
    OptionToggled {
        option: DropOption,
        checked: bool,
    },
    // One drop gesture; all paths form a single batch.
    FilesDropped {
        paths: Vec<PathBuf>,
    },
    WindowCloseRequestedByUser,
}

// Ordered from least to most severe for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

// --- Commands from App Logic to Platform ---

#[derive(Debug, Clone)]
pub enum PlatformCommand {
    SetWindowTitle {
        title: String,
    },
    SetOptionChecked {
        option: DropOption,
        checked: bool,
    },
    ShowWindow,
    // Replaces the whole status panel.
    UpdateStatusText {
        text: String,
        severity: MessageSeverity,
    },
    // Appends to the console panel.
    AppendConsoleText {
        text: String,
    },
    // Fraction in [0.0, 1.0]; 0.0 resets the bar.
    SetProgress {
        fraction: f64,
    },
    PublishSummary {
        summary: BatchSummary,
    },
    QuitApplication,
}

// --- Trait for App Logic to Handle Events ---

pub trait PlatformEventHandler: Send + Sync + 'static {
    // Handles one event and enqueues the resulting `PlatformCommand`s.
    fn handle_event(&mut self, event: AppEvent);

    fn on_quit(&mut self) {}

    // Dequeues a single command; the platform drains the queue after every event.
    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
