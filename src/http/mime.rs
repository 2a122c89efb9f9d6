//! Content-Type detection from file extensions.

use std::path::Path;

/// Guesses the Content-Type for `path`.
///
/// Unknown extensions map to `application/octet-stream`. Text types are
/// labelled UTF-8.
pub fn content_type_for(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    }
}
