//! Version comparison between this CLI and templates or setup files

use anyhow::Result;
use semver::Version;

/// Compare the CLI version against the version a template or setup expects.
/// Returns a warning message if the CLI is older.
pub fn check_compatibility(cli_version: &str, required_version: &str) -> Option<String> {
    let cli_ver = parse_version(cli_version).ok()?;
    let required_ver = parse_version(required_version).ok()?;

    if cli_ver < required_ver {
        Some(format!(
            "This project expects turbobuilder {} or newer, you are running {}. \
             Consider updating: cargo install turbobuilder --force",
            required_version, cli_version
        ))
    } else {
        None
    }
}

/// Parse version string, accepting a leading `v`
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}
