//! Logging and command execution helpers

pub mod command_helpers;
pub mod logging;
