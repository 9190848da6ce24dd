//! File content rules: tabs, copyright headers and stylesheet hygiene

use super::ValidationReport;
use crate::fsutil::{display_relative, file_name, files_with_extensions, list_files, matches_any};
use crate::setup::model::{CopyrightHeader, TabsForbidden};
use crate::setup::BuilderSetup;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub fn check(root: &Path, setup: &BuilderSetup, report: &mut ValidationReport) -> Result<()> {
    let rules = &setup.validate;

    if rules.files_content.tabs_forbidden.enabled {
        check_tabs(root, &rules.files_content.tabs_forbidden, report)?;
    }

    for header in &rules.files_content.copyright_headers {
        check_copyright_header(root, header, report)?;
    }

    let src = root.join(&setup.build.src_path);

    if rules.style_sheets.only_scss {
        for css in files_with_extensions(&src, &["css"])? {
            report.error(format!(
                "Only scss files are allowed: {}",
                display_relative(&css, root)
            ));
        }
    }

    if rules.style_sheets.no_css_hardcoded_colors {
        for sheet in files_with_extensions(&src, &["css", "scss"])? {
            check_hardcoded_colors(root, &sheet, report)?;
        }
    }

    Ok(())
}

/// Files under the affected paths, minus excluded names
fn affected_files(root: &Path, affected_paths: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for affected in affected_paths {
        let base = root.join(affected);
        let candidates = if base.is_file() {
            vec![base]
        } else {
            list_files(&base)?
        };
        files.extend(
            candidates
                .into_iter()
                .filter(|path| !matches_any(file_name(path), excludes)),
        );
    }
    Ok(files)
}

/// Read a file as text; binary files yield `None`
fn read_text(path: &Path) -> Result<Option<String>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8(bytes).ok())
}

fn check_tabs(root: &Path, rule: &TabsForbidden, report: &mut ValidationReport) -> Result<()> {
    for path in affected_files(root, &rule.affected_paths, &rule.excludes)? {
        let Some(text) = read_text(&path)? else {
            continue;
        };
        if let Some(line) = text.lines().position(|l| l.contains('\t')) {
            report.error(format!(
                "File contains tabs: {} (line {})",
                display_relative(&path, root),
                line + 1
            ));
        }
    }
    Ok(())
}

fn check_copyright_header(
    root: &Path,
    header: &CopyrightHeader,
    report: &mut ValidationReport,
) -> Result<()> {
    let header_path = root.join(&header.path);
    // A missing header file is reported by the setup checks
    let Ok(expected) = std::fs::read_to_string(&header_path) else {
        return Ok(());
    };
    let expected = normalize_newlines(&expected);
    let expected = expected.trim_end();

    for path in affected_files(root, &header.affected_paths, &header.excludes)? {
        if !matches_any(file_name(&path), &header.includes) {
            continue;
        }
        let Some(text) = read_text(&path)? else {
            continue;
        };
        if !normalize_newlines(&text).starts_with(expected) {
            report.error(format!(
                "Bad copyright header: {} (expected the contents of {})",
                display_relative(&path, root),
                header.path
            ));
        }
    }
    Ok(())
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(#[0-9a-f]{3,8}\b|\b(rgb|rgba|hsl|hsla)\s*\()")
            .unwrap_or_else(|e| panic!("invalid color pattern: {}", e))
    })
}

fn property_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z-][a-zA-Z0-9-]*$")
            .unwrap_or_else(|e| panic!("invalid property pattern: {}", e))
    })
}

/// Values of the `property: value` declarations on a line.
/// Pieces closed by `{` are selectors, custom properties (`--x`) are skipped.
fn declaration_values(line: &str) -> impl Iterator<Item = &str> {
    line.split_inclusive(['{', ';', '}'])
        .filter(|piece| !piece.ends_with('{'))
        .filter_map(|piece| piece.trim_end_matches([';', '}']).split_once(':'))
        .filter(|(property, value)| {
            let property = property.trim();
            property_pattern().is_match(property)
                && !property.starts_with("--")
                && !value.trim_end().ends_with(',')
        })
        .map(|(_, value)| value)
}

/// Colors must come from variables; variable definitions are exempt
fn check_hardcoded_colors(root: &Path, sheet: &Path, report: &mut ValidationReport) -> Result<()> {
    let Some(text) = read_text(sheet)? else {
        return Ok(());
    };

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('$') || trimmed.starts_with("//") {
            continue;
        }
        if declaration_values(trimmed).any(|value| color_pattern().is_match(value)) {
            report.error(format!(
                "Hardcoded css color: {} (line {})",
                display_relative(sheet, root),
                i + 1
            ));
        }
    }
    Ok(())
}
