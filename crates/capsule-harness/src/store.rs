//! # Capsule Store
//!
//! Persistence interface for capsule documents and the filesystem
//! implementation used by the runner.
//!
//! The harness itself only ever calls [`CapsuleStore::get`]. `save` and
//! `save_blob` exist for tooling that writes capsules and side artifacts
//! (e.g. vault blobs referenced from memory capsules).
//!
//! ## Document Formats
//!
//! Documents are JSON. Files ending in `.yaml` or `.yml` are parsed as
//! YAML into the same JSON value model, so flows may be written in either.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;

/// Subdirectory of the store root holding binary blobs.
pub const VAULT_DIR: &str = "vault";

/// Source of capsule and flow documents.
pub trait CapsuleStore: Send + Sync {
    /// The location `get` reads for `path`. Trace entries record this.
    fn resolve(&self, path: &Path) -> PathBuf;

    /// Read and parse the document at `path`.
    fn get(&self, path: &Path) -> Result<Value, StoreError>;

    /// Write `doc` at `path`, creating parent directories.
    fn save(&self, path: &Path, doc: &Value) -> Result<(), StoreError>;

    /// Write raw bytes under `name` and return a locator for them.
    fn save_blob(&self, name: &str, data: &[u8]) -> Result<String, StoreError>;
}

/// A [`CapsuleStore`] backed by the local filesystem.
///
/// Relative paths resolve against `root`, and a relative root against the
/// working directory, so resolved paths are absolute. Absolute paths pass
/// through unchanged. The root does not need to exist until the first
/// write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for LocalStore {
    /// Rooted at the current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse document text according to the file extension of `path`.
pub fn parse_document(path: &Path, text: &str) -> Result<Value, StoreError> {
    if is_yaml(path) {
        serde_yaml::from_str(text).map_err(|e| StoreError::Parse {
            format: "YAML",
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(text).map_err(|e| StoreError::Parse {
            format: "JSON",
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn validate_blob_name(name: &str) -> Result<&str, StoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(StoreError::InvalidBlobName(name.to_string())),
    }
}

/// Drop `.` components, which `Path::join` keeps verbatim.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl CapsuleStore for LocalStore {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let joined = self.root.join(path);
        if joined.is_absolute() {
            return without_cur_dir(&joined);
        }
        match std::env::current_dir() {
            Ok(cwd) => without_cur_dir(&cwd.join(joined)),
            Err(_) => joined,
        }
    }

    fn get(&self, path: &Path) -> Result<Value, StoreError> {
        let full = self.resolve(path);
        let text = match fs::read_to_string(&full) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(full));
            }
            Err(e) => return Err(e.into()),
        };
        parse_document(&full, &text)
    }

    fn save(&self, path: &Path, doc: &Value) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if let Some(dir) = full.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut out = serde_json::to_string_pretty(doc)?;
        out.push('\n');
        fs::write(&full, out)?;
        tracing::debug!(path = %full.display(), "capsule saved");
        Ok(())
    }

    fn save_blob(&self, name: &str, data: &[u8]) -> Result<String, StoreError> {
        let name = validate_blob_name(name)?;
        let dir = self.root.join(VAULT_DIR);
        fs::create_dir_all(&dir)?;
        let full = dir.join(name);
        fs::write(&full, data)?;
        let full = fs::canonicalize(&full)?;
        Ok(format!("file://{}", full.display()))
    }
}
