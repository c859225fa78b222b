use genstudio_comfyui::api::ComfyUIApiError;

/// Failure of one generator within a request.
///
/// Either variant aborts its whole batch; the orchestrator maps both to the
/// record's `Error` status.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Image generation failed: {0}")]
    ImageGenerationFailed(String),

    #[error("Video generation failed: {0}")]
    VideoGenerationFailed(String),
}

/// Failure of a single oracle call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    ComfyUI(#[from] ComfyUIApiError),

    #[error("Oracle returned a payload that is not an image")]
    NotAnImage,

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}
