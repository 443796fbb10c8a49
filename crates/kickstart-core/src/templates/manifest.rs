//! The `components.json` manifest: a project's resolved configuration and installed features
//!
//! The manifest is written once at scaffold time and amended by every successful
//! `add`. Its presence is what marks a directory as a kickstart-express project.

use super::merge::{read_json, write_json};
use crate::config::{AuthType, DbType, Language, Orm, ProjectConfig};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name of the manifest at the project root
pub const MANIFEST_FILE: &str = "components.json";

/// Folder layout recorded at scaffold time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub src: bool,
    pub structured: bool,
    pub docker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    #[serde(rename = "type")]
    pub db_type: DbType,
    pub orm: Orm,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    pub added: DateTime<Utc>,
}

/// Installed features. Keys this version doesn't know about are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthRecord>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A single feature entry to record with [`amend`]
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureRecord {
    Database(DatabaseRecord),
    Authentication(AuthRecord),
}

impl FeatureRecord {
    pub fn database(db_type: DbType, orm: Orm) -> Self {
        FeatureRecord::Database(DatabaseRecord {
            db_type,
            orm,
            added: Utc::now(),
        })
    }

    pub fn authentication(auth_type: AuthType) -> Self {
        FeatureRecord::Authentication(AuthRecord {
            auth_type,
            added: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsManifest {
    pub name: String,
    pub language: Language,
    pub architecture: Architecture,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<DateTime<Utc>>,

    /// CLI version that generated the project (informational)
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub features: Features,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ComponentsManifest {
    /// Fresh manifest for a newly scaffolded project
    pub fn new(name: &str, config: &ProjectConfig, cli_version: &str) -> Self {
        Self {
            name: name.to_string(),
            language: config.language(),
            architecture: Architecture {
                src: config.use_src_folder(),
                structured: config.use_structured_layout(),
                docker: config.include_docker(),
            },
            generated: Some(Utc::now()),
            version: cli_version.to_string(),
            features: Features::default(),
            other: Map::new(),
        }
    }

    /// Apply a feature record in memory
    pub fn record(&mut self, record: FeatureRecord) {
        match record {
            FeatureRecord::Database(db) => self.features.database = Some(db),
            FeatureRecord::Authentication(auth) => self.features.authentication = Some(auth),
        }
    }
}

pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(MANIFEST_FILE)
}

/// Read the manifest. `Ok(None)` means the directory is not a kickstart-express project.
pub async fn read(project_root: &Path) -> Result<Option<ComponentsManifest>> {
    let path = manifest_path(project_root);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| Error::read(&path, e))?;
    if !exists {
        return Ok(None);
    }
    read_json(&path).await.map(Some)
}

pub async fn write(project_root: &Path, manifest: &ComponentsManifest) -> Result<()> {
    write_json(&manifest_path(project_root), manifest).await
}

/// Read-modify-write the manifest with one feature record
pub async fn amend(project_root: &Path, record: FeatureRecord) -> Result<ComponentsManifest> {
    let mut manifest = read(project_root)
        .await?
        .ok_or_else(|| Error::NotAProject(project_root.to_path_buf()))?;
    manifest.record(record);
    write(project_root, &manifest).await?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_project, Defaults, ProjectFlags};

    fn sample_config() -> ProjectConfig {
        let flags = ProjectFlags {
            name: Some("shop".into()),
            language: Some("ts".into()),
            docker: Some(true),
            src: Some(true),
            structured: Some(true),
        };
        resolve_project(&flags, &mut Defaults).unwrap()
    }

    #[tokio::test]
    async fn test_read_missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ComponentsManifest::new("shop", &sample_config(), "0.1.0");
        write(dir.path(), &manifest).await.unwrap();

        let loaded = read(dir.path()).await.unwrap().unwrap();
        assert_eq!(loaded, manifest);

        let raw = std::fs::read_to_string(manifest_path(dir.path())).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["language"], "ts");
        assert_eq!(json["architecture"]["structured"], true);
        assert_eq!(json["architecture"]["docker"], true);
        assert_eq!(json["features"], serde_json::json!({}));
        assert!(raw.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_amend_keeps_other_features_and_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            manifest_path(dir.path()),
            r#"{
  "name": "legacy",
  "language": "js",
  "architecture": { "src": false, "structured": false, "docker": false },
  "version": "1.2.0",
  "owner": "platform-team",
  "features": {
    "authentication": { "type": "jwt", "added": "2025-01-01T00:00:00.000Z" },
    "cache": { "type": "redis" }
  }
}"#,
        )
        .unwrap();

        let manifest = amend(dir.path(), FeatureRecord::database(DbType::Postgres, Orm::Drizzle))
            .await
            .unwrap();
        assert_eq!(manifest.features.database.as_ref().unwrap().orm, Orm::Drizzle);

        let raw = std::fs::read_to_string(manifest_path(dir.path())).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["owner"], "platform-team");
        assert_eq!(json["features"]["cache"]["type"], "redis");
        assert_eq!(json["features"]["authentication"]["type"], "jwt");
        assert_eq!(json["features"]["database"]["type"], "postgres");
        assert_eq!(json["features"]["database"]["orm"], "drizzle");
    }

    #[tokio::test]
    async fn test_amend_outside_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = amend(dir.path(), FeatureRecord::authentication(AuthType::Jwt))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAProject(_)));
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(manifest_path(dir.path()), "{ not json").unwrap();
        let err = read(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedJson { .. }));
    }
}
