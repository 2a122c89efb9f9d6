//! Maps request targets onto files under the root directory.

use std::fs::{File, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::config::{DotfilesPolicy, StaticFilesConfig};
use crate::error::ServeError;
use crate::files::path::{self, NormalizedPath};
use crate::http::mime;

/// Longest path component most filesystems accept.
const MAX_SEGMENT_LEN: usize = 255;

/// An open regular file ready to be streamed.
#[derive(Debug)]
pub struct ResolvedFile {
    pub file: File,
    pub path: PathBuf,
    pub len: u64,
    pub content_type: String,
}

#[derive(Debug)]
pub enum Resolution {
    File(ResolvedFile),
    /// Directory requested without its trailing slash; carries the Location.
    Redirect(String),
}

/// Resolves request paths against one immutable root directory.
///
/// All methods do blocking filesystem I/O.
#[derive(Debug)]
pub struct Resolver {
    root: PathBuf,
    index: Option<String>,
    redirect_directories: bool,
    dotfiles: DotfilesPolicy,
}

impl Resolver {
    /// Builds a resolver, fixing the root as an absolute path.
    ///
    /// The root is canonicalized when it exists. A missing root is not an
    /// error; every request simply resolves to not-found.
    pub fn new(cfg: &StaticFilesConfig) -> anyhow::Result<Self> {
        let root = match cfg.root.canonicalize() {
            Ok(root) => root,
            Err(e) if e.kind() == ErrorKind::NotFound => std::path::absolute(&cfg.root)
                .with_context(|| format!("invalid root {}", cfg.root.display()))?,
            Err(e) => {
                return Err(e).with_context(|| format!("cannot access root {}", cfg.root.display()));
            }
        };

        if let Some(index) = &cfg.index {
            if index.is_empty() || index.contains(['/', '\\']) || index == "." || index == ".." {
                anyhow::bail!("index must be a plain file name, got {index:?}");
            }
        }

        Ok(Self {
            root,
            index: cfg.index.clone(),
            redirect_directories: cfg.redirect_directories,
            dotfiles: cfg.dotfiles,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a request target (path plus optional query) to an open file.
    pub fn resolve(&self, uri: &str) -> Result<Resolution, ServeError> {
        let (raw_path, query) = path::split_target(uri).ok_or(ServeError::NotFound)?;

        let normalized = path::normalize(raw_path).ok_or_else(|| {
            debug!(uri, "rejected path outside root");
            ServeError::NotFound
        })?;

        if normalized.segments.iter().any(|s| s.len() > MAX_SEGMENT_LEN) {
            return Err(ServeError::NotFound);
        }

        if self.dotfiles == DotfilesPolicy::Ignore && normalized.has_dot_segment() {
            debug!(uri, "ignored dotfile");
            return Err(ServeError::NotFound);
        }

        let full = normalized.join_onto(&self.root);
        if !full.starts_with(&self.root) {
            debug!(uri, "rejected path outside root");
            return Err(ServeError::NotFound);
        }

        let meta = stat(&full)?;

        if meta.is_dir() {
            return self.resolve_directory(&full, &normalized, query);
        }

        if normalized.trailing_slash || !meta.is_file() {
            return Err(ServeError::NotFound);
        }

        open(full).map(Resolution::File)
    }

    fn resolve_directory(
        &self,
        dir: &Path,
        normalized: &NormalizedPath,
        query: &str,
    ) -> Result<Resolution, ServeError> {
        if self.redirect_directories && !normalized.trailing_slash && !normalized.segments.is_empty() {
            // Location is always a single-slash absolute path.
            let encoded: Vec<_> = normalized
                .segments
                .iter()
                .map(|s| urlencoding::encode(s))
                .collect();
            return Ok(Resolution::Redirect(format!("/{}/{query}", encoded.join("/"))));
        }

        let Some(index) = &self.index else {
            return Err(ServeError::NotFound);
        };

        let candidate = dir.join(index);
        if !stat(&candidate)?.is_file() {
            return Err(ServeError::NotFound);
        }

        open(candidate).map(Resolution::File)
    }
}

fn stat(path: &Path) -> Result<Metadata, ServeError> {
    std::fs::metadata(path).map_err(classify)
}

fn open(path: PathBuf) -> Result<ResolvedFile, ServeError> {
    let file = File::open(&path).map_err(classify)?;
    let len = file.metadata()?.len();
    let content_type = mime::content_type_for(&path);

    Ok(ResolvedFile {
        file,
        path,
        len,
        content_type,
    })
}

fn classify(e: std::io::Error) -> ServeError {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => ServeError::NotFound,
        _ => ServeError::Internal(e),
    }
}
