//! Creating a new project: copy templates, patch shared files, write the manifest

use super::cleanup::CleanupRegistry;
use crate::config::{Language, ProjectConfig};
use crate::error::{Error, Result};
use crate::runtime::command::{init_and_install, CommandRunner, FinalizeOptions, FinalizeReport};
use crate::templates::copier::{self, FileError, MergeReport};
use crate::templates::locator::{CopySpec, Layout, TemplateSet};
use crate::templates::manifest::{self, ComponentsManifest};
use crate::templates::merge;
use std::path::{Path, PathBuf};

/// Scaffold lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingOptions,
    Generating,
    Initializing,
    Done,
}

/// A generated (not yet initialized) project
#[derive(Debug)]
pub struct Generated {
    pub project_dir: PathBuf,
    pub project_name: String,
    pub files: MergeReport,
    /// Shared files (package.json, tsconfig.json) that could not be patched
    pub merge_errors: Vec<FileError>,
    pub manifest: ComponentsManifest,
}

impl Generated {
    /// Every file copied and patched
    pub fn is_complete(&self) -> bool {
        self.files.is_clean() && self.merge_errors.is_empty()
    }
}

pub struct Scaffolder<'a> {
    templates: &'a TemplateSet,
    registry: CleanupRegistry,
    cli_version: String,
    phase: Phase,
}

impl<'a> Scaffolder<'a> {
    pub fn new(templates: &'a TemplateSet, registry: CleanupRegistry, cli_version: &str) -> Self {
        Self {
            templates,
            registry,
            cli_version: cli_version.to_string(),
            phase: Phase::CollectingOptions,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Project directory for `config`, relative to `cwd` (`"."` is `cwd` itself)
    pub fn destination(config: &ProjectConfig, cwd: &Path) -> PathBuf {
        if config.uses_current_dir() {
            cwd.to_path_buf()
        } else {
            cwd.join(config.project_name())
        }
    }

    /// Name written to package.json and components.json
    fn package_name(config: &ProjectConfig, dest: &Path) -> String {
        if config.uses_current_dir() {
            dest.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.project_name().to_string())
        } else {
            config.project_name().to_string()
        }
    }

    /// Write the project. Nothing is written when the destination is not empty
    /// or a template is missing. Per-file copy and patch failures are reported
    /// in [`Generated`] and the project is kept; a failure to write the
    /// manifest removes what this run created.
    pub async fn generate(&mut self, config: &ProjectConfig, cwd: &Path) -> Result<Generated> {
        let dest = Self::destination(config, cwd);
        let name = Self::package_name(config, &dest);

        if dest.is_file() || !copier::is_empty_dir(&dest).await? {
            return Err(Error::DestinationNotEmpty(dest));
        }
        let plan = self.templates.scaffold_plan(config, &dest)?;

        self.phase = Phase::Generating;
        self.registry.arm(&dest)?;
        tracing::info!(dest = %dest.display(), "generating project");

        match self.write_project(config, &plan, &dest, &name).await {
            Ok((files, merge_errors, manifest)) => {
                self.registry.disarm();
                Ok(Generated {
                    project_dir: dest,
                    project_name: name,
                    files,
                    merge_errors,
                    manifest,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed, cleaning up");
                if let Some(outcome) = self.registry.cleanup() {
                    tracing::debug!(removed = outcome.removed.len(), "cleanup finished");
                }
                Err(e)
            }
        }
    }

    async fn write_project(
        &self,
        config: &ProjectConfig,
        plan: &[CopySpec],
        dest: &Path,
        name: &str,
    ) -> Result<(MergeReport, Vec<FileError>, ComponentsManifest)> {
        let mut files = copier::apply(plan).await?;
        let mut merge_errors = Vec::new();

        let package_json = dest.join("package.json");
        if let Err(error) = merge::set_package_name(&package_json, name).await {
            tracing::warn!(%error, "package.json name not set");
            merge_errors.push(FileError {
                path: package_json,
                error,
            });
        }

        if Layout::of(config) == Layout::NoSrc && config.language() == Language::Ts {
            let tsconfig = dest.join("tsconfig.json");
            if let Err(error) = merge::patch_tsconfig(&tsconfig).await {
                tracing::warn!(%error, "tsconfig.json not patched");
                merge_errors.push(FileError {
                    path: tsconfig,
                    error,
                });
            }
        }

        let manifest = ComponentsManifest::new(name, config, &self.cli_version);
        manifest::write(dest, &manifest).await?;
        files.written.push(manifest::manifest_path(dest));

        Ok((files, merge_errors, manifest))
    }

    /// Initialize git and install dependencies. Best-effort; never fails.
    pub async fn finalize<R: CommandRunner>(
        &mut self,
        runner: &R,
        generated: &Generated,
        options: FinalizeOptions,
    ) -> FinalizeReport {
        self.phase = Phase::Initializing;
        let report = init_and_install(runner, &generated.project_dir, options).await;
        self.phase = Phase::Done;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_project, Defaults, ProjectFlags};
    use crate::error::ErrorKind;
    use crate::runtime::command::SystemRunner;
    use std::fs;

    fn config(name: &str, lang: &str, src: bool) -> ProjectConfig {
        let flags = ProjectFlags {
            name: Some(name.into()),
            language: Some(lang.into()),
            docker: Some(false),
            src: Some(src),
            structured: Some(false),
        };
        resolve_project(&flags, &mut Defaults).unwrap()
    }

    fn templates() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("base/ts")).unwrap();
        fs::write(root.join("base/ts/package.json"), r#"{"name":"template"}"#).unwrap();
        fs::write(
            root.join("base/ts/tsconfig.json"),
            r#"{"compilerOptions":{"rootDir":"./src"},"include":["src/**/*"]}"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("modules/src/ts")).unwrap();
        fs::write(root.join("modules/src/ts/index.ts"), "// src").unwrap();
        fs::create_dir_all(root.join("modules/no-src/ts")).unwrap();
        fs::write(root.join("modules/no-src/ts/index.ts"), "// root").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_generate_writes_manifest_and_name() {
        let tpl = templates();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        let mut scaffolder = Scaffolder::new(&set, CleanupRegistry::new(), "0.1.0");

        let generated = scaffolder
            .generate(&config("orders", "ts", true), cwd.path())
            .await
            .unwrap();

        let dir = cwd.path().join("orders");
        assert_eq!(generated.project_dir, dir);
        assert!(dir.join("src/index.ts").exists());
        assert!(dir.join("components.json").exists());
        let pkg = fs::read_to_string(dir.join("package.json")).unwrap();
        assert!(pkg.contains("\"name\": \"orders\""));
        assert!(generated.is_complete());
        assert_eq!(scaffolder.phase(), Phase::Generating);

        // Both steps skipped: nothing is spawned, the lifecycle still completes
        let report = scaffolder
            .finalize(
                &SystemRunner,
                &generated,
                FinalizeOptions {
                    git: false,
                    install: false,
                },
            )
            .await;
        assert!(report.steps.is_empty());
        assert_eq!(scaffolder.phase(), Phase::Done);
    }

    #[tokio::test]
    async fn test_no_src_typescript_patches_tsconfig() {
        let tpl = templates();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        let mut scaffolder = Scaffolder::new(&set, CleanupRegistry::new(), "0.1.0");

        scaffolder
            .generate(&config("flat", "ts", false), cwd.path())
            .await
            .unwrap();

        let ts: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(cwd.path().join("flat/tsconfig.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(ts["compilerOptions"]["rootDir"], "./");
        assert_eq!(ts["include"], serde_json::json!(["*.ts"]));
        assert!(cwd.path().join("flat/index.ts").exists());
    }

    #[tokio::test]
    async fn test_current_dir_uses_directory_name() {
        let tpl = templates();
        let set = TemplateSet::new(tpl.path());
        let parent = tempfile::tempdir().unwrap();
        let cwd = parent.path().join("billing");
        fs::create_dir(&cwd).unwrap();
        let mut scaffolder = Scaffolder::new(&set, CleanupRegistry::new(), "0.1.0");

        let generated = scaffolder.generate(&config(".", "ts", true), &cwd).await.unwrap();
        assert_eq!(generated.project_name, "billing");
        assert_eq!(generated.manifest.name, "billing");
    }

    #[tokio::test]
    async fn test_non_empty_destination_is_untouched() {
        let tpl = templates();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join("taken")).unwrap();
        fs::write(cwd.path().join("taken/keep.txt"), "keep").unwrap();
        let registry = CleanupRegistry::new();
        let mut scaffolder = Scaffolder::new(&set, registry.clone(), "0.1.0");

        let err = scaffolder
            .generate(&config("taken", "ts", true), cwd.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DestinationNotEmpty(_)));
        assert!(!registry.is_armed());
        assert_eq!(fs::read_dir(cwd.path().join("taken")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_broken_package_json_keeps_project() {
        let tpl = templates();
        fs::write(tpl.path().join("base/ts/package.json"), "{ nope").unwrap();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let mut scaffolder = Scaffolder::new(&set, registry.clone(), "0.1.0");

        let generated = scaffolder
            .generate(&config("broken", "ts", true), cwd.path())
            .await
            .unwrap();

        let dir = cwd.path().join("broken");
        assert!(!generated.is_complete());
        assert_eq!(generated.merge_errors.len(), 1);
        assert_eq!(generated.merge_errors[0].path, dir.join("package.json"));
        assert!(matches!(
            generated.merge_errors[0].error,
            Error::MalformedJson { .. }
        ));
        assert!(dir.join("src/index.ts").exists());
        assert!(dir.join("components.json").exists());
        assert!(!registry.is_armed());
    }

    #[tokio::test]
    async fn test_unpatchable_tsconfig_keeps_flat_project() {
        let tpl = templates();
        fs::write(tpl.path().join("base/ts/tsconfig.json"), "{ // comment\n}").unwrap();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        let mut scaffolder = Scaffolder::new(&set, CleanupRegistry::new(), "0.1.0");

        let generated = scaffolder
            .generate(&config("flat", "ts", false), cwd.path())
            .await
            .unwrap();

        let dir = cwd.path().join("flat");
        assert_eq!(generated.merge_errors.len(), 1);
        assert_eq!(generated.merge_errors[0].path, dir.join("tsconfig.json"));
        assert!(dir.join("index.ts").exists());
        assert!(dir.join("components.json").exists());
        let pkg = fs::read_to_string(dir.join("package.json")).unwrap();
        assert!(pkg.contains("\"name\": \"flat\""));
    }

    #[tokio::test]
    async fn test_manifest_write_failure_removes_created_directory() {
        let tpl = templates();
        // A directory where components.json goes makes the manifest write fail
        fs::create_dir_all(tpl.path().join("base/ts/components.json")).unwrap();
        let set = TemplateSet::new(tpl.path());
        let cwd = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let mut scaffolder = Scaffolder::new(&set, registry.clone(), "0.1.0");

        let err = scaffolder
            .generate(&config("broken", "ts", true), cwd.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!cwd.path().join("broken").exists());
        assert!(!registry.is_armed());
    }
}
