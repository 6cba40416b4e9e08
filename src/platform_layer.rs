/*
 * The presentation boundary. `types` defines the events and commands exchanged with
 * the application logic; `console` is the headless shell that renders them and asks
 * overwrite questions on the terminal.
 */
pub mod console;
pub mod error;
pub mod types;

pub use console::{ConsoleOverwritePrompt, ConsolePlatform};
pub use types::{AppEvent, DropOption, MessageSeverity, PlatformCommand, PlatformEventHandler};
