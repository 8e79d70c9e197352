/// Convenience result type used across audioviz.
pub type VizResult<T> = Result<T, VizError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// Invalid user-provided settings or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The audio asset could not be recognised or decoded.
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// The image asset could not be recognised or decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Rasterization failed for a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The encoder rejected the job or failed while producing the video.
    #[error("encode error: {0}")]
    Encode(String),

    /// The run was torn down by the user or by a newer run.
    #[error("export cancelled")]
    Cancelled,

    /// Memory or frame-buffer pressure while producing frames.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The live preview loop failed; never affects export state.
    #[error("preview error: {0}")]
    Preview(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which input failed to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeTarget {
    /// The audio asset.
    Audio,
    /// The background image asset.
    Image,
}

/// Terminal reason recorded on a failed export run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Unreadable or corrupt input.
    DecodeError {
        /// Input that failed.
        target: DecodeTarget,
    },
    /// Encoder rejected the configuration or ran out of resources.
    EncodeError,
    /// User- or system-initiated teardown.
    Cancelled,
    /// Memory pressure while producing frames.
    ResourceExhausted,
    /// Validation or rasterization fault outside the user-facing reasons.
    Internal,
}

impl VizError {
    /// Build a [`VizError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VizError::AudioDecode`] value.
    pub fn audio_decode(msg: impl Into<String>) -> Self {
        Self::AudioDecode(msg.into())
    }

    /// Build a [`VizError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`VizError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`VizError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`VizError::ResourceExhausted`] value.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Build a [`VizError::Preview`] value.
    pub fn preview(msg: impl Into<String>) -> Self {
        Self::Preview(msg.into())
    }

    /// Map this error onto the terminal reason of an export run.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            Self::AudioDecode(_) => FailureReason::DecodeError {
                target: DecodeTarget::Audio,
            },
            Self::ImageDecode(_) => FailureReason::DecodeError {
                target: DecodeTarget::Image,
            },
            Self::Encode(_) => FailureReason::EncodeError,
            Self::Cancelled => FailureReason::Cancelled,
            Self::ResourceExhausted(_) => FailureReason::ResourceExhausted,
            Self::Validation(_) | Self::Render(_) | Self::Preview(_) | Self::Other(_) => {
                FailureReason::Internal
            }
        }
    }

    /// Cancellation is a silent abort and is not surfaced to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message suitable for showing to the user, or `None` for silent errors.
    pub fn user_message(&self) -> Option<String> {
        let msg = match self {
            Self::Cancelled => return None,
            Self::AudioDecode(_) => {
                "The audio file could not be read. Please choose a valid MP3 or WAV file.".to_string()
            }
            Self::ImageDecode(_) => {
                "The image file could not be read. Please choose a valid JPG or PNG file.".to_string()
            }
            Self::Encode(detail) => format!("Video encoding failed: {detail}"),
            Self::ResourceExhausted(_) => {
                "Ran out of memory while rendering frames. Try a lower resolution or frame rate."
                    .to_string()
            }
            Self::Preview(detail) => format!("Preview stopped: {detail}"),
            Self::Validation(detail) => format!("Invalid settings: {detail}"),
            Self::Render(_) | Self::Other(_) => format!("Export failed: {self}"),
        };
        Some(msg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
