//! Extending an existing project with a database or authentication feature

use crate::config::AddFeatureRequest;
use crate::error::{Error, Result};
use crate::templates::copier::{self, FileError, MergeReport};
use crate::templates::locator::TemplateSet;
use crate::templates::manifest::{self, ComponentsManifest, FeatureRecord};
use crate::templates::merge;
use crate::templates::recipes::recipe;
use std::path::{Path, PathBuf};

/// Result of one `add`. Merge failures are listed, not raised.
#[derive(Debug)]
pub struct AddOutcome {
    pub request: AddFeatureRequest,
    pub files: MergeReport,
    pub dependencies_changed: Vec<String>,
    pub env_added: Vec<String>,
    pub merge_errors: Vec<FileError>,
    /// Present when components.json was amended
    pub manifest: Option<ComponentsManifest>,
}

impl AddOutcome {
    pub fn is_complete(&self) -> bool {
        self.files.is_clean() && self.merge_errors.is_empty() && self.manifest.is_some()
    }
}

fn feature_record(request: &AddFeatureRequest) -> FeatureRecord {
    match request {
        AddFeatureRequest::Database(choice) => {
            FeatureRecord::database(choice.db_type(), choice.orm())
        }
        AddFeatureRequest::Authentication(auth) => FeatureRecord::authentication(*auth),
    }
}

pub struct Adder<'a> {
    templates: &'a TemplateSet,
    project_root: PathBuf,
}

impl<'a> Adder<'a> {
    pub fn new(templates: &'a TemplateSet, project_root: impl Into<PathBuf>) -> Self {
        Self {
            templates,
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load components.json; its absence means this is not a kickstart-express project
    pub async fn load_manifest(&self) -> Result<ComponentsManifest> {
        manifest::read(&self.project_root)
            .await?
            .ok_or_else(|| Error::NotAProject(self.project_root.clone()))
    }

    /// Copy the feature template (never overwriting), merge dependencies and
    /// environment, then record the feature. A missing template aborts before
    /// anything is written.
    pub async fn add(
        &self,
        manifest: &ComponentsManifest,
        request: &AddFeatureRequest,
    ) -> Result<AddOutcome> {
        let spec = self
            .templates
            .feature_plan(request, manifest, &self.project_root)?;
        tracing::info!(
            feature = request.feature().display_name(),
            source = %spec.source.display(),
            "adding feature"
        );

        let files = copier::apply_spec(&spec).await?;
        let recipe = recipe(request, manifest.language);
        let mut merge_errors = Vec::new();

        let package_json = self.project_root.join("package.json");
        let dependencies_changed =
            match merge::merge_dependencies(&package_json, &recipe.dependencies).await {
                Ok(changed) => changed,
                Err(error) => {
                    tracing::warn!(%error, "package.json not updated");
                    merge_errors.push(FileError {
                        path: package_json,
                        error,
                    });
                    Vec::new()
                }
            };

        let env_file = self.project_root.join(".env");
        let env_added = match merge::merge_env(&env_file, recipe.env_section, &recipe.env).await {
            Ok(added) => added,
            Err(error) => {
                tracing::warn!(%error, ".env not updated");
                merge_errors.push(FileError {
                    path: env_file,
                    error,
                });
                Vec::new()
            }
        };

        let manifest = if files.is_clean() {
            match manifest::amend(&self.project_root, feature_record(request)).await {
                Ok(updated) => Some(updated),
                Err(error) => {
                    merge_errors.push(FileError {
                        path: manifest::manifest_path(&self.project_root),
                        error,
                    });
                    None
                }
            }
        } else {
            None
        };

        Ok(AddOutcome {
            request: *request,
            files,
            dependencies_changed,
            env_added,
            merge_errors,
            manifest,
        })
    }
}

/// Where feature files land, for "next steps" output
pub fn feature_location(manifest: &ComponentsManifest) -> &'static str {
    if manifest.architecture.src {
        "src/"
    } else {
        "the project root"
    }
}
