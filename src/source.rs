//! Locating and loading the hacker text payload.
//!
//! Structure:
//! - Constants: system-wide directories
//! - Types: located file, source errors
//! - Effect functions: directory listing, random pick, loading

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use walkdir::WalkDir;

use crate::pattern::{DEFAULT_TEXT_NAME, is_numbered_text};
use crate::types::Payload;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Directory name used under per-user and system data directories.
pub const APP_DIR_NAME: &str = "hackertyper";

/// System-wide payload directories, searched after the local ones.
#[cfg(unix)]
pub const SYSTEM_DIRS: &[&str] = &["/usr/local/share/hackertyper", "/usr/share/hackertyper"];

/// Environment variable holding the machine-wide data root on Windows.
#[cfg(not(unix))]
pub const PROGRAM_DATA_ENV: &str = "ProgramData";

// ============================================================================
// TYPES
// ============================================================================

/// A payload file chosen for this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedText {
    /// Full path to the chosen file.
    pub path: PathBuf,
    /// Directory that won the search.
    pub dir: PathBuf,
    /// How many candidates that directory offered.
    pub candidates: usize,
}

/// Error while locating or loading the payload.
#[derive(Debug)]
pub enum SourceError {
    /// No numbered file and no fallback file in any search directory.
    NoMatchingFiles { searched: Vec<PathBuf> },

    /// The chosen file could not be read.
    Unreadable { path: PathBuf, source: io::Error },

    /// The chosen file exists but holds no characters.
    EmptySourceText { path: PathBuf },
}

/// Text loaded from disk, ready to feed the reveal engine.
#[derive(Debug, Clone)]
pub struct LoadedText {
    pub text: String,
    pub payload: Payload,
}

// ============================================================================
// SEARCH PATHS
// ============================================================================

/// Ordered candidate directories for this process.
///
/// Current directory first, then the executable's directory, then the
/// per-user data directory, then system-wide directories. Duplicates are
/// dropped, keeping the first occurrence.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".")];

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir);
    }

    if let Some(data) = dirs::data_dir() {
        candidates.push(data.join(APP_DIR_NAME));
    }

    candidates.extend(system_dirs());
    dedup_dirs(candidates)
}

/// Machine-wide payload directories for this platform.
#[cfg(unix)]
pub fn system_dirs() -> Vec<PathBuf> {
    SYSTEM_DIRS.iter().map(PathBuf::from).collect()
}

/// Machine-wide payload directories for this platform (`%ProgramData%\hackertyper`).
#[cfg(not(unix))]
pub fn system_dirs() -> Vec<PathBuf> {
    std::env::var_os(PROGRAM_DATA_ENV)
        .filter(|root| !root.is_empty())
        .map(|root| PathBuf::from(root).join(APP_DIR_NAME))
        .into_iter()
        .collect()
}

fn dedup_dirs(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let canonical = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        let seen = unique
            .iter()
            .any(|u| fs::canonicalize(u).unwrap_or_else(|_| u.clone()) == canonical);
        if !seen {
            unique.push(dir);
        }
    }
    unique
}

// ============================================================================
// LOCATING
// ============================================================================

/// Pick a payload file from the first directory that offers any.
///
/// Numbered files (`hackertext<N>.txt`) take priority across all
/// directories; only when none exist anywhere is the fallback name tried,
/// again in directory order. Among the winning directory's numbered files
/// one is chosen uniformly at random.
///
/// # Errors
/// Returns `NoMatchingFiles` when nothing was found in any directory.
pub fn locate<R: Rng>(dirs: &[PathBuf], rng: &mut R) -> Result<LocatedText, SourceError> {
    for dir in dirs {
        let matches = numbered_files(dir);
        if let Some(path) = matches.choose(rng) {
            tracing::debug!(dir = %dir.display(), candidates = matches.len(), "numbered payloads found");
            return Ok(LocatedText {
                path: path.clone(),
                dir: dir.clone(),
                candidates: matches.len(),
            });
        }
    }

    for dir in dirs {
        let fallback = dir.join(DEFAULT_TEXT_NAME);
        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "using fallback payload");
            return Ok(LocatedText {
                path: fallback,
                dir: dir.clone(),
                candidates: 1,
            });
        }
    }

    Err(SourceError::NoMatchingFiles {
        searched: dirs.to_vec(),
    })
}

/// List numbered payloads directly inside `dir`, sorted by path.
///
/// Missing or unreadable directories simply yield nothing.
pub fn numbered_files(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_numbered_text))
        .map(|entry| entry.into_path())
        .collect();

    found.sort();
    found
}

// ============================================================================
// LOADING
// ============================================================================

/// Read the chosen file in full.
///
/// Invalid UTF-8 is replaced rather than rejected; the payload is decor.
///
/// # Errors
/// `Unreadable` if the file cannot be read, `EmptySourceText` if it holds
/// no characters.
pub fn load(path: &Path) -> Result<LoadedText, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(SourceError::EmptySourceText {
            path: path.to_path_buf(),
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let payload = Payload::new(name, bytes.len() as u64);
    let text = String::from_utf8_lossy(&bytes).into_owned();

    Ok(LoadedText { text, payload })
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NoMatchingFiles { searched } => {
                write!(f, "No hacker text found (looked for hackertext<N>.txt or {DEFAULT_TEXT_NAME} in:")?;
                for dir in searched {
                    write!(f, " {}", dir.display())?;
                }
                write!(f, ")")
            }
            SourceError::Unreadable { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            SourceError::EmptySourceText { path } => {
                write!(f, "Text file is empty: {}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
