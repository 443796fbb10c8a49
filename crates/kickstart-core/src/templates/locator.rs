//! Mapping resolved options to template directories and copy destinations

use super::manifest::ComponentsManifest;
use crate::config::{AddFeatureRequest, Language, OptionTag, ProjectConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// How a copy treats files that already exist at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The destination directory must be absent or empty
    FailIfNonEmpty,
    /// Replace existing files
    Overwrite,
    /// Leave existing files alone
    SkipExisting,
}

/// One copy operation: a template file or directory and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub mode: MergeMode,
}

/// Source folder layout, keyed by `(src, structured)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    NoSrc,
    Src,
    Structured,
}

impl Layout {
    pub fn of(config: &ProjectConfig) -> Self {
        match (config.use_src_folder(), config.use_structured_layout()) {
            (false, _) => Layout::NoSrc,
            (true, false) => Layout::Src,
            (true, true) => Layout::Structured,
        }
    }

    /// Directory name under `modules/`
    pub fn module_dir(&self) -> &'static str {
        match self {
            Layout::NoSrc => "no-src",
            Layout::Src => "src",
            Layout::Structured => "src-structured",
        }
    }
}

/// Read-only view of a template root
#[derive(Debug, Clone)]
pub struct TemplateSet {
    root: PathBuf,
}

impl TemplateSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_dir(&self, language: Language) -> PathBuf {
        self.root.join("base").join(language.tag())
    }

    pub fn layout_dir(&self, layout: Layout, language: Language) -> PathBuf {
        self.root
            .join("modules")
            .join(layout.module_dir())
            .join(language.tag())
    }

    pub fn docker_dir(&self, language: Language) -> PathBuf {
        self.root.join("modules").join("docker").join(language.tag())
    }

    pub fn feature_dir(&self, request: &AddFeatureRequest, language: Language) -> PathBuf {
        let add = self.root.join("add");
        let dir = match request {
            AddFeatureRequest::Database(choice) => add
                .join("db")
                .join(choice.db_type().tag())
                .join(choice.orm().tag()),
            AddFeatureRequest::Authentication(auth) => add.join("auth").join(auth.tag()),
        };
        dir.join(language.tag())
    }

    /// Copy plan for a new project rooted at `dest`
    pub fn scaffold_plan(&self, config: &ProjectConfig, dest: &Path) -> Result<Vec<CopySpec>> {
        let language = config.language();
        let layout = Layout::of(config);
        let mut plan = vec![CopySpec {
            source: self.base_dir(language),
            dest: dest.to_path_buf(),
            mode: MergeMode::FailIfNonEmpty,
        }];

        let layout_dir = self.layout_dir(layout, language);
        plan.push(match layout {
            Layout::NoSrc => CopySpec {
                source: layout_dir,
                dest: dest.to_path_buf(),
                mode: MergeMode::Overwrite,
            },
            Layout::Src => {
                let entry = format!("index.{}", language.extension());
                CopySpec {
                    source: layout_dir.join(&entry),
                    dest: dest.join("src").join(entry),
                    mode: MergeMode::Overwrite,
                }
            }
            Layout::Structured => CopySpec {
                source: layout_dir,
                dest: dest.join("src"),
                mode: MergeMode::Overwrite,
            },
        });

        if config.include_docker() {
            plan.push(CopySpec {
                source: self.docker_dir(language),
                dest: dest.to_path_buf(),
                mode: MergeMode::Overwrite,
            });
        }

        for spec in &plan {
            ensure_exists(&spec.source)?;
        }
        Ok(plan)
    }

    /// Copy spec for an add-on feature; files go to `src/` when the project has one
    pub fn feature_plan(
        &self,
        request: &AddFeatureRequest,
        manifest: &ComponentsManifest,
        project_root: &Path,
    ) -> Result<CopySpec> {
        let source = self.feature_dir(request, manifest.language);
        ensure_exists(&source)?;

        let dest = if manifest.architecture.src {
            project_root.join("src")
        } else {
            project_root.to_path_buf()
        };

        Ok(CopySpec {
            source,
            dest,
            mode: MergeMode::SkipExisting,
        })
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::TemplateMissing(path.to_path_buf()))
    }
}
