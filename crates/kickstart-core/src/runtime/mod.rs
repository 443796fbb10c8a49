//! External process execution
//!
//! This module provides:
//! - A `CommandRunner` capability with a tokio-backed implementation
//! - Best-effort git initialization and dependency installation

pub mod command;

pub use command::{
    init_and_install, CommandOutput, CommandRunner, FinalizeOptions, FinalizeReport,
    PackageManager, StepStatus, SystemRunner,
};
