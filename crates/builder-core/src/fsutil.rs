//! File tree helpers shared by the steps

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Check if a file name matches any pattern in a list.
///
/// `*.ext` matches by suffix, `prefix*` by prefix, anything else exactly.
pub fn matches_any(filename: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            filename.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            filename.starts_with(prefix)
        } else {
            filename == pattern
        }
    })
}

/// File name component of a path as UTF-8 (empty when not representable)
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// All regular files under `dir`, sorted
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Files under `dir` whose name ends with one of `extensions` (without dot)
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
        .collect())
}

/// Recursively copy `src` into `dst`, skipping file names matching `excludes`
/// and the `skip` folders (relative to `src`).
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path, excludes: &[String], skip: &[PathBuf]) -> Result<usize> {
    if !src.is_dir() {
        anyhow::bail!("Source folder not found: {}", src.display());
    }

    let walker = WalkDir::new(src).into_iter().filter_entry(|entry| {
        entry
            .path()
            .strip_prefix(src)
            .map(|relative| !skip.iter().any(|s| relative == s.as_path()))
            .unwrap_or(true)
    });

    let mut copied = 0;
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?;

        if relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|name| matches_any(name, excludes))
                .unwrap_or(false)
        }) {
            continue;
        }

        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove a folder and everything inside it, if it exists
pub fn remove_dir(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(dir).with_context(|| format!("Failed to delete {}", dir.display()))?;
    Ok(true)
}

/// Delete `dir` if present and create it again, empty
pub fn recreate_dir(dir: &Path) -> Result<()> {
    remove_dir(dir)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Resolve `.` and `..` components without touching the file system
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, normalized form of `path`. Existing ancestors are canonicalized
/// so symlinked roots compare equal.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let absolute = normalize(&absolute);

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        let Some(parent) = existing.parent() else {
            return Ok(absolute);
        };
        rest.push(existing.file_name().map(PathBuf::from).unwrap_or_default());
        existing = parent;
    }

    let mut resolved = std::fs::canonicalize(existing)
        .with_context(|| format!("Failed to resolve {}", existing.display()))?;
    for part in rest.iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}

/// Path relative to `base` with forward slashes, for messages
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_any_pattern_kinds() {
        let p = patterns(&["*.svg", "vendor*", "Makefile"]);
        assert!(matches_any("logo.svg", &p));
        assert!(matches_any("vendor", &p));
        assert!(matches_any("vendor-lib", &p));
        assert!(matches_any("Makefile", &p));
        assert!(!matches_any("Makefile.am", &p));
        assert!(!matches_any("main.ts", &p));
    }

    #[test]
    fn test_copy_dir_skips_excluded_components() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("a/node_modules/x")).unwrap();
        std::fs::write(src.path().join("a/index.js"), "1").unwrap();
        std::fs::write(src.path().join("a/node_modules/x/lib.js"), "2").unwrap();
        std::fs::write(src.path().join("readme.bak"), "3").unwrap();

        let copied = copy_dir(
            src.path(),
            &dst.path().join("out"),
            &patterns(&["node_modules", "*.bak"]),
            &[],
        )
        .unwrap();

        assert_eq!(copied, 1);
        assert!(dst.path().join("out/a/index.js").is_file());
        assert!(!dst.path().join("out/a/node_modules").exists());
        assert!(!dst.path().join("out/readme.bak").exists());
    }

    #[test]
    fn test_copy_dir_skips_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("target/app/dist")).unwrap();
        std::fs::write(dir.path().join("target/app/dist/old.js"), "").unwrap();
        std::fs::write(dir.path().join("index.js"), "").unwrap();

        let dist = dir.path().join("target/app/dist");
        let copied = copy_dir(dir.path(), &dist, &[], &[PathBuf::from("target")]).unwrap();

        assert_eq!(copied, 1);
        assert!(dist.join("index.js").is_file());
        assert!(!dist.join("target").exists());
    }

    #[test]
    fn test_copy_dir_requires_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(copy_dir(&dir.path().join("nope"), dir.path(), &[], &[]).is_err());
    }

    #[test]
    fn test_files_with_extensions_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.PNG"), "").unwrap();
        std::fs::write(dir.path().join("b.jpg"), "").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();

        let found = files_with_extensions(dir.path(), &["png", "jpg"]).unwrap();
        let names: Vec<_> = found.iter().map(|p| file_name(p).to_string()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg"]);
    }

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("/work/./site/../www")), Path::new("/work/www"));
        assert_eq!(normalize(Path::new("/work/..")), Path::new("/"));
        assert_eq!(normalize(Path::new("/..")), Path::new("/"));
        assert_eq!(normalize(Path::new("a/../../b")), Path::new("../b"));
        assert_eq!(normalize(Path::new("./")), Path::new(""));
    }

    #[test]
    fn test_resolve_keeps_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let base = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(resolve(&dir.path().join("new/../x/y")).unwrap(), base.join("x/y"));
        assert_eq!(resolve(dir.path()).unwrap(), base);
    }

    #[test]
    fn test_recreate_dir_empties_folder() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("old.js"), "").unwrap();

        recreate_dir(&out).unwrap();
        assert!(out.is_dir());
        assert!(list_files(&out).unwrap().is_empty());
        assert!(remove_dir(&out).unwrap());
        assert!(!remove_dir(&out).unwrap());
    }
}
