//! Comparing the running CLI against the version recorded in components.json

use semver::Version;

/// Command users run to update the CLI
pub const UPGRADE_COMMAND: &str = "cargo install kickstart-express --force";

/// Warn when the project was generated by a newer CLI than the one running.
/// Unparseable versions never warn.
pub fn check_compatibility(cli_version: &str, project_version: &str) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    let project_ver = parse_version(project_version)?;

    if cli_ver < project_ver {
        Some(format!(
            "This project was generated by kickstart-express {}, but you are running {}. \
             Consider updating: {}",
            project_ver, cli_ver, UPGRADE_COMMAND
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading `v`
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_project() {
        let warning = check_compatibility("0.1.0", "0.2.0");
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_or_newer() {
        assert!(check_compatibility("0.1.0", "0.1.0").is_none());
        assert!(check_compatibility("0.2.0", "v0.1.0").is_none());
    }

    #[test]
    fn test_invalid_versions() {
        assert!(check_compatibility("invalid", "0.1.0").is_none());
        assert!(check_compatibility("0.1.0", "").is_none());
    }
}
