//! Durable image archive.
//!
//! Camera captures and picker selections hand over paths the OS may reclaim
//! at any time. `persist` copies them into an app-owned directory so a scan
//! record can keep pointing at its image indefinitely.
//!
//! The archive only ever deletes files under its own root. Paths arriving
//! through records are checked component-wise after lexical normalization,
//! so `images/../x.jpg` and `images-old/x.jpg` are both refused.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use rand::Rng;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::history::ScanRecord;

const DEFAULT_EXTENSION: &str = "jpg";
const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Outcome of `ImageArchive::persist`.
///
/// A `Transient` path still points at the caller's original file, which the
/// OS may delete later. Callers decide whether that is good enough.
#[derive(Debug)]
pub enum Persisted {
    Durable(PathBuf),
    Transient { path: PathBuf, error: Error },
}

impl Persisted {
    pub fn path(&self) -> &Path {
        match self {
            Persisted::Durable(path) => path,
            Persisted::Transient { path, .. } => path,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Persisted::Durable(_))
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Persisted::Durable(path) => path,
            Persisted::Transient { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneMode {
    DryRun,
    Execute,
}

#[derive(Debug, Default)]
pub struct PruneResult {
    pub removed: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub bytes_freed: u64,
}

#[derive(Debug, Clone)]
pub struct ImageArchive {
    root: PathBuf,
}

impl ImageArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ImageArchive { root: resolve(&root.into()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory if it is missing. Safe to call repeatedly
    /// and from several processes at once.
    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Copies `transient` into the archive under a fresh name.
    ///
    /// Never fails: if the copy cannot be made the original path comes back
    /// tagged as `Transient` along with the reason.
    pub fn persist(&self, transient: impl AsRef<Path>) -> Persisted {
        let original = transient.as_ref();
        let source = local_path(original);

        match self.copy_in(&source) {
            Ok(dest) => {
                tracing::debug!(from = %source.display(), to = %dest.display(), "archived image");
                Persisted::Durable(dest)
            }
            Err(error) => {
                tracing::warn!(from = %source.display(), %error, "image not archived, keeping transient path");
                Persisted::Transient { path: original.to_path_buf(), error }
            }
        }
    }

    fn copy_in(&self, source: &Path) -> Result<PathBuf> {
        let copy_failed = |source_err: io::Error| Error::ImageCopyFailed {
            from: source.to_path_buf(),
            source: source_err,
        };

        fs::create_dir_all(&self.root).map_err(copy_failed)?;

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EXTENSION);

        let mut rng = rand::thread_rng();
        let millis = chrono::Utc::now().timestamp_millis();
        let mut dest = self.root.join(archive_name(millis, &mut rng, ext));

        // millis + 36^6 suffix, a clash needs two captures in the same ms
        while dest.exists() {
            dest = self.root.join(archive_name(millis, &mut rng, ext));
        }

        fs::copy(source, &dest).map_err(copy_failed)?;
        Ok(dest)
    }

    /// True when `path` names something strictly below the archive root.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let candidate = resolve(&local_path(path.as_ref()));
        candidate != self.root && candidate.starts_with(&self.root)
    }

    /// Deletes an archived image.
    ///
    /// Returns `Ok(true)` when a file was removed, `Ok(false)` when the path
    /// was already gone or lies outside the archive.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = resolve(&local_path(path.as_ref()));

        if !self.contains(&path) {
            tracing::warn!(path = %path.display(), root = %self.root.display(), "refusing to delete outside image archive");
            return Ok(false);
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted archived image");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every file directly inside the archive, sorted by name.
    pub fn list_images(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| io::Error::other("walkdir loop"))
            })?;
            if entry.file_type().is_file() {
                images.push(entry.into_path());
            }
        }

        images.sort();
        Ok(images)
    }

    /// Archived images no record refers to.
    ///
    /// Matched on file name: archive names are unique, and records written
    /// with a relative or differently spelled root still keep their image.
    pub fn orphans(&self, records: &[ScanRecord]) -> Result<Vec<PathBuf>> {
        let referenced: HashSet<OsString> = records
            .iter()
            .filter_map(|r| {
                local_path(Path::new(&r.image_uri))
                    .file_name()
                    .map(|n| n.to_os_string())
            })
            .collect();

        Ok(self
            .list_images()?
            .into_iter()
            .filter(|image| image.file_name().is_some_and(|n| !referenced.contains(n)))
            .collect())
    }

    pub fn prune(&self, records: &[ScanRecord], mode: PruneMode) -> Result<PruneResult> {
        let mut result = PruneResult::default();

        for orphan in self.orphans(records)? {
            let size = fs::metadata(&orphan).map(|m| m.len()).unwrap_or(0);

            match mode {
                PruneMode::DryRun => {
                    result.removed.push(orphan);
                    result.bytes_freed += size;
                }
                PruneMode::Execute => match self.delete(&orphan) {
                    Ok(true) => {
                        result.removed.push(orphan);
                        result.bytes_freed += size;
                    }
                    Ok(false) => {}
                    Err(e) => result.errors.push(format!("failed to delete {}: {e}", orphan.display())),
                },
            }
        }

        Ok(result)
    }
}

/// `<epoch-millis>-<6 base36 chars>.<ext>`
fn archive_name(millis: i64, rng: &mut impl Rng, ext: &str) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{millis}-{suffix}.{ext}")
}

/// Records written by the mobile app carry `file://` URIs.
pub fn local_path(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix("file://")) {
        Some(stripped) => PathBuf::from(stripped),
        None => path.to_path_buf(),
    }
}

/// Absolute against the current directory, then normalized.
fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }

    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
