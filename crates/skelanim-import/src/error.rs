use std::io;

use skelanim_core::AnimationError;
use thiserror::Error;

/// Error types for scene loading and import
#[derive(Error, Debug)]
pub enum ImportError {
    /// I/O error while reading a scene file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The scene file is not valid JSON or does not match the scene layout
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scene data rejected while building the hierarchy, bone index or clips
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Result type using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_error_is_transparent() {
        let err = ImportError::from(AnimationError::MalformedAnimationSource(
            "scene has no root node".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Malformed animation source: scene has no root node"
        );
    }

    #[test]
    fn test_json_error_wrapped() {
        let err = ImportError::from(serde_json::from_str::<u32>("x").unwrap_err());
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
