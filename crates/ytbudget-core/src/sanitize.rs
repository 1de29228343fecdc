//! Filename sanitization

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Longest sanitized name, in characters, extension included
pub const MAX_FILENAME_LEN: usize = 200;

/// Name used when nothing survives sanitization
pub const FALLBACK_NAME: &str = "unnamed_audio";

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\-.]").expect("valid regex"))
}

fn underscore_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("valid regex"))
}

/// Restrict a file name to word characters, `-`, `.` and single underscores.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = disallowed().replace_all(&name.replace(' ', "_"), "_").into_owned();
    let collapsed = underscore_runs().replace_all(&replaced, "_");
    let mut sanitized = collapsed.trim_matches('_').to_string();

    if sanitized.chars().count() > MAX_FILENAME_LEN {
        sanitized = truncate_keeping_extension(&sanitized, MAX_FILENAME_LEN);
    }

    if sanitized.is_empty() || sanitized == "." {
        return FALLBACK_NAME.to_string();
    }

    sanitized
}

fn truncate_keeping_extension(name: &str, max_len: usize) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };
    let ext_len = ext.chars().count();

    if ext_len >= max_len {
        return name.chars().take(max_len).collect();
    }

    let stem: String = stem.chars().take(max_len - ext_len).collect();
    format!("{}{}", stem, ext)
}

/// Sanitized file name for a title with the given extension
pub fn output_filename(title: &str, extension: &str) -> String {
    let stem_budget = MAX_FILENAME_LEN.saturating_sub(extension.chars().count() + 1);
    let stem = sanitize_filename(title);
    let stem: String = stem.chars().take(stem_budget).collect();
    let stem = stem.trim_end_matches('_');
    let stem = if stem.is_empty() { FALLBACK_NAME } else { stem };
    format!("{}.{}", stem, extension)
}

/// A rename performed by [`sanitize_directory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Rename every `*.{extension}` file in `dir` to its sanitized name.
///
/// Files whose sanitized name is already taken are left alone.
pub fn sanitize_directory(dir: &Path, extension: &str) -> std::io::Result<Vec<Rename>> {
    let mut renames = Vec::new();

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        let target = dir.join(output_filename(&stem, extension));

        if target == path {
            continue;
        }
        if target.exists() {
            warn!(
                "Not renaming {}: {} already exists",
                path.display(),
                target.display()
            );
            continue;
        }

        std::fs::rename(&path, &target)?;
        debug!("Renamed {} -> {}", path.display(), target.display());
        renames.push(Rename {
            from: path,
            to: target,
        });
    }

    Ok(renames)
}

/// First free path for `name` in `dir`, appending `_2`, `_3`, ... to the stem
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };

    (2..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
