use thiserror::Error;

/// Error types for animation construction and playback
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Hierarchy or clip data handed over by the importer is structurally invalid
    #[error("Malformed animation source: {0}")]
    MalformedAnimationSource(String),

    /// `play_animation` was called without an animation
    #[error("Invalid animation: no animation was provided")]
    InvalidAnimation,

    /// `update` was called while no animation is assigned
    #[error("No active animation")]
    NoActiveAnimation,

    /// The skeleton has more bones than the final matrix array can hold
    #[error("Bone capacity exceeded: {count} bones, capacity is {capacity}")]
    BoneCapacityExceeded { count: usize, capacity: usize },
}

impl AnimationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedAnimationSource(reason.into())
    }

    /// Whether this error is an advisory that the caller may ignore
    pub fn is_advisory(&self) -> bool {
        matches!(self, Self::NoActiveAnimation)
    }
}

/// Result type using AnimationError
pub type Result<T> = std::result::Result<T, AnimationError>;
