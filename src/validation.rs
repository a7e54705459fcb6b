//! Input validation.
//!
//! Only video files are accepted. Callers that know the declared media type
//! check it with [`ensure_video_media_type`]; callers that only have a path
//! can derive one with [`guess_media_type`].
//!
//! # Example
//!
//! ```
//! use audiolift::validation::{ensure_video_media_type, guess_media_type};
//!
//! let media_type = guess_media_type("holiday.mkv").unwrap();
//! assert_eq!(media_type, "video/x-matroska");
//! assert!(ensure_video_media_type(media_type).is_ok());
//! assert!(ensure_video_media_type("audio/mpeg").is_err());
//! ```

use std::path::Path;

use crate::error::AudioLiftError;

const VIDEO_MEDIA_TYPE_PREFIX: &str = "video/";

const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("ts", "video/mp2t"),
    ("3gp", "video/3gpp"),
    ("ogv", "video/ogg"),
];

/// Returns `true` if `media_type` names a video type.
pub fn is_video_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..VIDEO_MEDIA_TYPE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(VIDEO_MEDIA_TYPE_PREFIX))
}

/// Reject any declared media type that is not a video type.
///
/// # Errors
///
/// [`AudioLiftError::InvalidInput`] if `media_type` does not start with
/// `video/`.
pub fn ensure_video_media_type(media_type: &str) -> Result<(), AudioLiftError> {
    if is_video_media_type(media_type) {
        Ok(())
    } else {
        Err(AudioLiftError::InvalidInput(format!(
            "expected a video file, got media type {media_type:?}"
        )))
    }
}

/// Derive a video media type from a file extension.
///
/// Returns `None` for unknown or missing extensions.
pub fn guess_media_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, media_type)| *media_type)
}
