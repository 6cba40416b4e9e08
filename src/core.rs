/*
 * This module consolidates the core, platform-agnostic logic of the application:
 * classifying dropped files, deciding destinations and overwrites, driving the
 * external texture tools, scheduling a drop event serially or concurrently and
 * aggregating its results. It re-exports the types the application logic and the
 * platform layer work with.
 */
pub mod aggregator;
pub mod batch_runner;
pub mod classifier;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod path_policy;
pub mod path_utils;
pub mod tool_runner;

pub use aggregator::BatchSummary;
pub use batch_runner::{BatchError, BatchRunner};
pub use config::{AppConfig, ConfigManagerOperations, CoreConfigManager};
pub use models::OptionFlags;
pub use orchestrator::ConversionOrchestrator;
pub use path_policy::{AllowOverwrite, DenyOverwrite, OverwriteConfirmer, OverwriteMode};
pub use tool_runner::{CoreToolRunner, ToolRunnerOperations, ToolSet};
