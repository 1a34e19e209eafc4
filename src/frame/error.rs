use thiserror::Error;

/// Errors raised while turning camera planes into a composed image.
///
/// None of these are fatal: the coordinator drops the frame and the decoder
/// and compositor stay usable for the next one.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed plane: {len} bytes, need {required}")]
    MalformedPlane { len: usize, required: usize },

    #[error("malformed plane: row stride {row_stride} shorter than {row_len}-byte row")]
    StrideTooShort { row_stride: u32, row_len: usize },

    #[error("unsupported pixel stride: {0}")]
    UnsupportedPixelStride(u32),

    #[error("channel {0} missing or empty")]
    MissingChannel(usize),

    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),
}

impl FrameError {
    /// Whether the error comes from the camera data rather than the renderer.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::RendererUnavailable(_))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, FrameError>;
