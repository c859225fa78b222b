//! Content path naming under the generated-content root.
//!
//! Every artifact lives at `{root}/{user_id}/{images|videos}/{micros}_{index}.{ext}`.
//! Paths handed to the store and to clients are relative to the root, so
//! they can be served verbatim under `/generated_content/`.

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Subdirectory under the user's directory.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Video => "mp4",
        }
    }
}

/// Longest directory name most filesystems accept, in bytes.
pub const MAX_SEGMENT_BYTES: usize = 255;

/// Ensure `user_id` is usable as a single directory name.
pub fn validate_user_segment(user_id: &str) -> Result<(), CoreError> {
    if user_id.len() > MAX_SEGMENT_BYTES {
        return Err(CoreError::Validation(format!(
            "user_id: must be at most {MAX_SEGMENT_BYTES} bytes, got {}",
            user_id.len()
        )));
    }
    let invalid = user_id.is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CoreError::Validation(format!(
            "user_id: '{user_id}' is not a valid path segment"
        )));
    }
    Ok(())
}

/// Relative path of the `index`-th artifact of a batch.
///
/// Uniqueness rests on `timestamp_micros` plus `index`; two batches for the
/// same user started within the same microsecond produce the same names.
///
/// ```
/// use genstudio_core::naming::{media_path, MediaKind};
///
/// assert_eq!(media_path("u1", MediaKind::Image, 1700000000123456, 0), "u1/images/1700000000123456_0.png");
/// assert_eq!(media_path("u1", MediaKind::Video, 42, 4), "u1/videos/42_4.mp4");
/// ```
pub fn media_path(user_id: &str, kind: MediaKind, timestamp_micros: i64, index: usize) -> String {
    format!(
        "{user_id}/{}/{timestamp_micros}_{index}.{}",
        kind.dir(),
        kind.extension()
    )
}

/// Directory holding one user's artifacts of the given kind.
pub fn media_dir(root: &Path, user_id: &str, kind: MediaKind) -> PathBuf {
    root.join(user_id).join(kind.dir())
}

/// Resolve a client-supplied relative path against the content root.
///
/// Only plain (`Normal`) components are accepted: absolute paths, `..`,
/// `.` and drive prefixes are rejected so the result cannot leave `root`.
pub fn resolve_content_path(root: &Path, requested: &str) -> Result<PathBuf, CoreError> {
    let relative = Path::new(requested);
    if requested.is_empty() || requested.contains('\0') {
        return Err(CoreError::Validation("file path must not be empty".into()));
    }

    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            _ => {
                return Err(CoreError::Validation(format!(
                    "file path '{requested}' must be relative and stay inside the content root"
                )))
            }
        }
    }
    Ok(resolved)
}

/// Content type for a served artifact, keyed by extension.
pub fn content_type_for_extension(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_and_video_paths_share_the_user_namespace() {
        let img = media_path("alice", MediaKind::Image, 10, 1);
        let vid = media_path("alice", MediaKind::Video, 10, 1);
        assert_eq!(img, "alice/images/10_1.png");
        assert_eq!(vid, "alice/videos/10_1.mp4");
    }

    #[test]
    fn media_dir_nests_under_user() {
        let dir = media_dir(Path::new("/srv/content"), "bob", MediaKind::Image);
        assert_eq!(dir, PathBuf::from("/srv/content/bob/images"));
    }

    #[test]
    fn user_segment_rules() {
        assert!(validate_user_segment("u1").is_ok());
        assert!(validate_user_segment("user@example.com").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert!(validate_user_segment(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn user_segment_length_is_counted_in_bytes() {
        // 200 characters but 400 bytes.
        let wide = "é".repeat(200);
        assert!(validate_user_segment(&wide).is_err());
        assert!(validate_user_segment(&"é".repeat(127)).is_ok());
        assert!(validate_user_segment(&"a".repeat(MAX_SEGMENT_BYTES)).is_ok());
    }

    #[test]
    fn resolve_accepts_nested_relative_paths() {
        let root = Path::new("/srv/content");
        let path = resolve_content_path(root, "u1/images/1_0.png").unwrap();
        assert_eq!(path, PathBuf::from("/srv/content/u1/images/1_0.png"));
    }

    #[test]
    fn resolve_rejects_traversal_and_absolute_paths() {
        let root = Path::new("/srv/content");
        for bad in ["../etc/passwd", "u1/../../x", "/etc/passwd", "./u1/a.png", ""] {
            assert!(
                resolve_content_path(root, bad).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for_extension("a/b.PNG"), "image/png");
        assert_eq!(content_type_for_extension("a/b.mp4"), "video/mp4");
        assert_eq!(content_type_for_extension("noext"), "application/octet-stream");
    }
}
