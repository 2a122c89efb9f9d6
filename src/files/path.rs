//! Request-target to filesystem path normalization.
//!
//! Everything here is lexical; nothing touches the disk.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A request path reduced to its segments below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    /// Decoded segments with `.` and `..` already applied.
    pub segments: Vec<String>,
    /// Whether the request path ended in `/`.
    pub trailing_slash: bool,
}

impl NormalizedPath {
    /// Joins the segments onto `root`.
    pub fn join_onto(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }

    /// True if any segment names a hidden file or directory.
    pub fn has_dot_segment(&self) -> bool {
        self.segments.iter().any(|s| s.starts_with('.'))
    }
}

/// Splits a request target into its raw path and the `?query` suffix.
///
/// Absolute-form targets (`http://host/path`) yield their path. Returns
/// `None` for targets that do not name a path at all, such as `*`.
pub fn split_target(target: &str) -> Option<(&str, &str)> {
    let target = target.split('#').next().unwrap_or("");

    let target = match target.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
            match rest.find(['/', '?']) {
                Some(i) if rest[i..].starts_with('/') => &rest[i..],
                Some(i) => return Some(("/", &rest[i..])),
                None => "/",
            }
        }
        _ => target,
    };

    if !target.starts_with('/') {
        return None;
    }

    Some(match target.find('?') {
        Some(i) => (&target[..i], &target[i..]),
        None => (target, ""),
    })
}

/// Percent-decodes `raw` and collapses `.`, `..` and repeated separators.
///
/// Returns `None` when the path cannot name a file under the root: invalid
/// UTF-8 after decoding, a decoded NUL or backslash, or a `..` that would
/// climb above the root.
pub fn normalize(raw: &str) -> Option<NormalizedPath> {
    let decoded: Cow<'_, str> = urlencoding::decode(raw).ok()?;

    if decoded.contains(['\0', '\\']) {
        return None;
    }

    let mut segments: Vec<String> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other.to_string()),
        }
    }

    let trailing_slash = decoded.len() > 1 && decoded.ends_with('/');

    Some(NormalizedPath {
        segments,
        trailing_slash,
    })
}
