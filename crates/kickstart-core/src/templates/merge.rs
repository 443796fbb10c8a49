//! Field-level merges into files shared between the project and its templates
//!
//! - `package.json`: dependency union, project name
//! - `.env`: append variables whose key is not yet assigned
//! - `tsconfig.json`: root-level layout fields for projects without `src/`
//!
//! JSON files are parsed and rewritten whole with 2-space indentation; key order
//! is preserved. A parse failure leaves the file untouched.

use super::recipes::{Dependency, EnvVar};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| Error::read(path, e))?;
    serde_json::from_str(&content).map_err(|source| Error::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).map_err(|source| {
        Error::MalformedJson {
            path: path.to_path_buf(),
            source,
        }
    })?;
    content.push('\n');
    fs::write(path, content)
        .await
        .map_err(|e| Error::write(path, e))
}

async fn read_object(path: &Path) -> Result<Map<String, Value>> {
    match read_json::<Value>(path).await? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::UnexpectedJson {
            path: path.to_path_buf(),
            reason: "top level is not an object".to_string(),
        }),
    }
}

fn object_field<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    path: &Path,
) -> Result<&'a mut Map<String, Value>> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    entry.as_object_mut().ok_or_else(|| Error::UnexpectedJson {
        path: path.to_path_buf(),
        reason: format!("\"{}\" is not an object", key),
    })
}

/// Union `deps` into `dependencies`. Existing entries for the same package are
/// replaced with the given version. Returns the names that changed; the file is
/// only rewritten when something changed.
pub async fn merge_dependencies(package_json: &Path, deps: &[Dependency]) -> Result<Vec<String>> {
    let mut pkg = read_object(package_json).await?;
    let dependencies = object_field(&mut pkg, "dependencies", package_json)?;

    let mut changed = Vec::new();
    for dep in deps {
        let wanted = Value::String(dep.version.to_string());
        if dependencies.get(dep.name) != Some(&wanted) {
            dependencies.insert(dep.name.to_string(), wanted);
            changed.push(dep.name.to_string());
        }
    }

    if !changed.is_empty() {
        write_json(package_json, &pkg).await?;
    }
    Ok(changed)
}

/// Set the `name` field of package.json
pub async fn set_package_name(package_json: &Path, name: &str) -> Result<()> {
    let mut pkg = read_object(package_json).await?;
    pkg.insert("name".to_string(), Value::String(name.to_string()));
    write_json(package_json, &pkg).await
}

/// Point the TypeScript compiler at the project root instead of `src/`
pub async fn patch_tsconfig(tsconfig: &Path) -> Result<()> {
    let mut config = read_object(tsconfig).await?;
    let compiler_options = object_field(&mut config, "compilerOptions", tsconfig)?;
    compiler_options.insert("rootDir".to_string(), Value::String("./".to_string()));
    config.insert(
        "include".to_string(),
        Value::Array(vec![Value::String("*.ts".to_string())]),
    );
    write_json(tsconfig, &config).await
}

/// Keys assigned in a dotenv file (`KEY=value`, `export KEY=value`)
pub fn env_keys(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, _) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| key.to_string())
        })
        .collect()
}

/// Append the variables whose key is not assigned yet, under a `# <section>`
/// comment. Returns the appended keys; an empty result means the file was not touched.
pub async fn merge_env(env_file: &Path, section: &str, vars: &[EnvVar]) -> Result<Vec<String>> {
    let mut content = match fs::read_to_string(env_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::read(env_file, e)),
    };

    let present = env_keys(&content);
    let missing: Vec<&EnvVar> = vars.iter().filter(|v| !present.contains(v.key)).collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    if !content.is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
    }
    content.push_str(&format!("# {}\n", section));
    for var in &missing {
        content.push_str(&format!("{}={}\n", var.key, var.value));
    }

    fs::write(env_file, content)
        .await
        .map_err(|e| Error::write(env_file, e))?;
    Ok(missing.iter().map(|v| v.key.to_string()).collect())
}
