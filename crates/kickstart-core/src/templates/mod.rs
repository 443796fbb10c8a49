//! Template location, copying and merging
//!
//! This module provides:
//! - Template root discovery (flag, env var, bundled, checkout)
//! - Mapping resolved options to template directories
//! - Copying with per-spec merge modes
//! - Field-level merges into package.json, .env and tsconfig.json
//! - The components.json manifest
//! - Version compatibility checking

pub mod copier;
pub mod locator;
pub mod manifest;
pub mod merge;
pub mod recipes;
pub mod source;
pub mod version;

pub use copier::{apply, MergeReport};
pub use locator::{CopySpec, Layout, MergeMode, TemplateSet};
pub use manifest::{ComponentsManifest, FeatureRecord, MANIFEST_FILE};
pub use recipes::{recipe, Recipe};
pub use source::{TemplateSource, TEMPLATE_DIR_ENV};
pub use version::check_compatibility;
