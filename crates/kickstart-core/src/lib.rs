//! Kickstart Core - Scaffolding and extending Express.js projects
//!
//! This library holds everything the `kickstart-express` binary does apart from
//! argument parsing: resolving options, locating templates, copying and merging
//! files, tracking features in `components.json`, and running git and the
//! package manager.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Option types, template lookup, file merging,
//!   the manifest, external commands
//! - **Layer 2: Workflow Orchestration** - `Scaffolder` and `Adder`, plus the
//!   `CleanupRegistry` shared with the interrupt handler
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use kickstart_core::config::{resolve_project, Defaults, ProjectFlags};
//! use kickstart_core::templates::TemplateSource;
//! use kickstart_core::workflow::{CleanupRegistry, Scaffolder};
//!
//! let config = resolve_project(&ProjectFlags::default(), &mut Defaults)?;
//! let (_, templates) = TemplateSource::resolve(None)?;
//! let mut scaffolder = Scaffolder::new(&templates, CleanupRegistry::new(), "0.1.0");
//! let generated = scaffolder.generate(&config, &std::env::current_dir()?).await?;
//! ```

pub mod config;
pub mod error;
pub mod runtime;
pub mod templates;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{AddFeatureRequest, Feature, ProjectConfig};
pub use error::{Error, ErrorKind, Result};
pub use templates::{ComponentsManifest, TemplateSet, TemplateSource};
pub use workflow::{Adder, CleanupRegistry, Scaffolder};

#[cfg(feature = "tui")]
pub use tui::{run_add, run_scaffold};
