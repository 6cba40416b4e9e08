/*
 * Shared text constants used by the application logic when describing the main
 * window to the platform layer.
 */

pub const WINDOW_TITLE: &str = "Simple GUI for oiiotool";

// Shown in the status panel before anything has been dropped.
pub const DROP_PROMPT: &str = "Convert to TX file: drop images here.";
