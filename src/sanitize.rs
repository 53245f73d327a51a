//! Input path sanitizing
//!
//! Turns a raw, possibly overlapping list of candidate paths into an ordered
//! list of existing regular files with unique base names, unique canonical
//! paths and the expected extension. Dropped paths are logged, never fatal.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Why a candidate path was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing exists at the path
    Missing,
    /// The path exists but is not a regular file
    NotAFile,
    /// An earlier path already claimed the same base filename
    DuplicateName { kept: PathBuf },
    /// An earlier path resolves to the same file
    SameFile { kept: PathBuf },
    /// The filename does not carry the expected extension
    WrongExtension,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub path: PathBuf,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.reason {
            RejectReason::Missing => {
                write!(f, "The path '{}' does not exist, it has been removed from the list", path)
            }
            RejectReason::NotAFile => {
                write!(f, "The path '{}' does not point to a file, it has been removed from the list", path)
            }
            RejectReason::DuplicateName { kept } => write!(
                f,
                "The files '{}' and '{}' have the same basename, only the first will be kept",
                kept.display(),
                path
            ),
            RejectReason::SameFile { kept } => write!(
                f,
                "The files '{}' and '{}' are the same, only the first will be kept",
                kept.display(),
                path
            ),
            RejectReason::WrongExtension => {
                write!(f, "The file '{}' does not have the expected extension and will be ignored", path)
            }
        }
    }
}

/// Result of one sanitizing pass
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<Rejection>,
}

/// Sanitizer for input files
#[derive(Debug, Clone)]
pub struct InputSanitizer {
    extension: String,
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new(".mp4")
    }
}

impl InputSanitizer {
    /// `extension` is matched as a case-insensitive filename suffix, dot included
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    /// Run every stage in order, each stage feeding the next
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> SanitizeReport {
        let mut rejected = Vec::new();

        let existing = self.keep_existing(paths, &mut rejected);
        let files = self.keep_files(existing, &mut rejected);
        let deduped = self.dedupe(files, &mut rejected);
        let accepted = self.keep_extension(deduped, &mut rejected);

        SanitizeReport { accepted, rejected }
    }

    fn keep_existing<P: AsRef<Path>>(&self, paths: &[P], rejected: &mut Vec<Rejection>) -> Vec<PathBuf> {
        let mut kept = Vec::with_capacity(paths.len());
        for path in paths.iter().map(|p| p.as_ref().to_path_buf()) {
            if path.exists() {
                kept.push(path);
            } else {
                reject(rejected, path, RejectReason::Missing);
            }
        }
        kept
    }

    fn keep_files(&self, paths: Vec<PathBuf>, rejected: &mut Vec<Rejection>) -> Vec<PathBuf> {
        let mut kept = Vec::with_capacity(paths.len());
        for path in paths {
            if path.is_file() {
                kept.push(path);
            } else {
                reject(rejected, path, RejectReason::NotAFile);
            }
        }
        kept
    }

    /// First-seen wins. The base name is checked before the canonical path.
    fn dedupe(&self, paths: Vec<PathBuf>, rejected: &mut Vec<Rejection>) -> Vec<PathBuf> {
        let mut by_name: HashMap<OsString, PathBuf> = HashMap::new();
        let mut by_target: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut kept = Vec::with_capacity(paths.len());

        for path in paths {
            let name = path.file_name().map(OsString::from).unwrap_or_default();
            let target = canonical(&path);

            if let Some(kept_path) = by_name.get(&name) {
                let reason = RejectReason::DuplicateName { kept: kept_path.clone() };
                reject(rejected, path, reason);
            } else if let Some(kept_path) = by_target.get(&target) {
                let reason = RejectReason::SameFile { kept: kept_path.clone() };
                reject(rejected, path, reason);
            } else {
                by_name.insert(name, path.clone());
                by_target.insert(target, path.clone());
                kept.push(path);
            }
        }
        kept
    }

    fn keep_extension(&self, paths: Vec<PathBuf>, rejected: &mut Vec<Rejection>) -> Vec<PathBuf> {
        let mut kept = Vec::with_capacity(paths.len());
        for path in paths {
            if self.has_extension(&path) {
                kept.push(path);
            } else {
                reject(rejected, path, RejectReason::WrongExtension);
            }
        }
        kept
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(&self.extension))
            .unwrap_or(false)
    }
}

/// Sanitize `paths` for `.mp4` input
pub fn sanitize<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    InputSanitizer::default().run(paths).accepted
}

fn reject(rejected: &mut Vec<Rejection>, path: PathBuf, reason: RejectReason) {
    let rejection = Rejection { path, reason };
    warn!("{}", rejection);
    rejected.push(rejection);
}

/// Resolved path, falling back to the absolute lexical path when resolution fails
fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"mock video").unwrap();
        path
    }

    #[test]
    fn test_missing_and_directories_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let video = touch(temp_dir.path(), "video.mp4");
        let folder = temp_dir.path().join("folder.mp4");
        fs::create_dir(&folder).unwrap();
        let missing = temp_dir.path().join("missing.mp4");

        let report = InputSanitizer::default().run(&[missing.clone(), folder.clone(), video.clone()]);

        assert_eq!(report.accepted, vec![video]);
        assert_eq!(
            report.rejected,
            vec![
                Rejection { path: missing, reason: RejectReason::Missing },
                Rejection { path: folder, reason: RejectReason::NotAFile },
            ]
        );
    }

    #[test]
    fn test_same_basename_keeps_first() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch(temp_dir.path(), "a/clip.mp4");
        let b = touch(temp_dir.path(), "b/clip.mp4");

        let report = InputSanitizer::default().run(&[a.clone(), b.clone()]);

        assert_eq!(report.accepted, vec![a.clone()]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].path, b);
        assert_eq!(report.rejected[0].reason, RejectReason::DuplicateName { kept: a });
    }

    #[test]
    fn test_repeated_path_is_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let video = touch(temp_dir.path(), "video.mp4");

        let accepted = sanitize(&[video.clone(), video.clone(), video.clone()]);
        assert_eq!(accepted, vec![video]);
    }

    #[test]
    fn test_relative_alias_is_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let video = touch(temp_dir.path(), "sub/video.mp4");
        let alias = temp_dir.path().join("sub").join("..").join("sub").join("video.mp4");

        let report = InputSanitizer::default().run(&[video.clone(), alias]);
        assert_eq!(report.accepted, vec![video]);
        assert!(matches!(report.rejected[0].reason, RejectReason::DuplicateName { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_same_file_keeps_first() {
        let temp_dir = TempDir::new().unwrap();
        let x = touch(temp_dir.path(), "x.mp4");
        let y = temp_dir.path().join("y.mp4");
        std::os::unix::fs::symlink(&x, &y).unwrap();

        let report = InputSanitizer::default().run(&[x.clone(), y.clone()]);
        assert_eq!(report.accepted, vec![x.clone()]);
        assert_eq!(report.rejected[0].reason, RejectReason::SameFile { kept: x.clone() });

        let reversed = InputSanitizer::default().run(&[y.clone(), x]);
        assert_eq!(reversed.accepted, vec![y]);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let upper = touch(temp_dir.path(), "UPPER.MP4");
        let mixed = touch(temp_dir.path(), "mixed.Mp4");
        let text = touch(temp_dir.path(), "notes.txt");
        let bare = touch(temp_dir.path(), "mp4");

        let report = InputSanitizer::default().run(&[upper.clone(), text.clone(), mixed.clone(), bare.clone()]);
        assert_eq!(report.accepted, vec![upper, mixed]);
        let dropped: Vec<_> = report.rejected.iter().map(|r| r.path.clone()).collect();
        assert_eq!(dropped, vec![text, bare]);
    }

    #[test]
    fn test_duplicate_is_checked_before_extension() {
        let temp_dir = TempDir::new().unwrap();
        let wrong = touch(temp_dir.path(), "a/clip.MOV");
        let right = touch(temp_dir.path(), "b/clip.MOV");

        // The first claimant is dropped later for its extension; it still blocks the second.
        let report = InputSanitizer::default().run(&[wrong, right]);
        assert!(report.accepted.is_empty());
        assert!(matches!(report.rejected[0].reason, RejectReason::DuplicateName { .. }));
        assert_eq!(report.rejected[1].reason, RejectReason::WrongExtension);
    }

    #[test]
    fn test_output_is_ordered_unique_subsequence() {
        let temp_dir = TempDir::new().unwrap();
        let one = touch(temp_dir.path(), "one.mp4");
        let two = touch(temp_dir.path(), "two.mp4");
        let three = touch(temp_dir.path(), "nested/three.mp4");
        let other_two = touch(temp_dir.path(), "nested/two.mp4");
        let input = vec![
            three.clone(),
            temp_dir.path().join("ghost.mp4"),
            one.clone(),
            other_two.clone(),
            two,
            one.clone(),
        ];

        let first = sanitize(&input);
        let second = sanitize(&input);

        assert_eq!(first, vec![three, one, other_two]);
        assert_eq!(first, second);

        let mut names: Vec<_> = first.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), first.len());
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let empty: Vec<PathBuf> = Vec::new();
        let report = InputSanitizer::default().run(&empty);
        assert!(report.accepted.is_empty());
        assert!(report.rejected.is_empty());
    }
}
