/*
 * This module provides the application logic layer, centered around `DropAppLogic`,
 * which acts as the Presenter between the platform layer and the core conversion
 * pipeline. Unit tests for `DropAppLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod ui_constants;


pub use handler::DropAppLogic;
