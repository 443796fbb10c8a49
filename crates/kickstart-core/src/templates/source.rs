//! Locating the template root on disk
//!
//! Lookup order:
//! - `--template-dir` flag
//! - `KICKSTART_EXPRESS_TEMPLATES` environment variable
//! - `templates/` next to the running executable
//! - `templates/` in the source checkout this crate was built from

use super::locator::TemplateSet;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the template root
pub const TEMPLATE_DIR_ENV: &str = "KICKSTART_EXPRESS_TEMPLATES";

/// Where a template root came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Passed on the command line
    Explicit(PathBuf),
    /// From `KICKSTART_EXPRESS_TEMPLATES`
    Env(PathBuf),
    /// Shipped alongside the binary
    Bundled(PathBuf),
    /// The workspace checkout (development builds)
    Checkout(PathBuf),
}

impl TemplateSource {
    pub fn path(&self) -> &Path {
        match self {
            TemplateSource::Explicit(p)
            | TemplateSource::Env(p)
            | TemplateSource::Bundled(p)
            | TemplateSource::Checkout(p) => p,
        }
    }

    /// User-supplied roots must exist; discovered ones are skipped when absent
    fn is_user_supplied(&self) -> bool {
        matches!(self, TemplateSource::Explicit(_) | TemplateSource::Env(_))
    }

    /// Candidate roots in precedence order
    pub fn candidates(explicit: Option<PathBuf>) -> Vec<TemplateSource> {
        let mut candidates = Vec::new();

        if let Some(path) = explicit {
            candidates.push(TemplateSource::Explicit(path));
        }
        if let Some(path) = std::env::var_os(TEMPLATE_DIR_ENV).filter(|v| !v.is_empty()) {
            candidates.push(TemplateSource::Env(PathBuf::from(path)));
        }
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(TemplateSource::Bundled(dir.join("templates")));
        }
        candidates.push(TemplateSource::Checkout(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates"),
        ));

        candidates
    }

    /// Resolve the first usable template root
    pub fn resolve(explicit: Option<PathBuf>) -> Result<(TemplateSource, TemplateSet)> {
        for candidate in Self::candidates(explicit) {
            let usable = candidate.path().join("base").is_dir();
            if usable {
                tracing::debug!(root = %candidate.path().display(), "using template root");
                let set = TemplateSet::new(candidate.path());
                return Ok((candidate, set));
            }
            if candidate.is_user_supplied() {
                return Err(Error::TemplateMissing(candidate.path().join("base")));
            }
        }
        Err(Error::TemplatesNotFound)
    }
}
