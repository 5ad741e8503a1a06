use thiserror::Error;

/// Failure while migrating a single recipe, tagged by the pipeline stage
/// that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Upscale service error: {0}")]
    UpscaleService(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Record update failed: {0}")]
    Update(String),
}

impl MigrationError {
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        Self::Fetch(format!("{err:#}"))
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("{err:#}"))
    }

    pub fn upscale(err: impl std::fmt::Display) -> Self {
        Self::UpscaleService(format!("{err:#}"))
    }

    pub fn upload(err: impl std::fmt::Display) -> Self {
        Self::Upload(format!("{err:#}"))
    }

    pub fn update(err: impl std::fmt::Display) -> Self {
        Self::Update(format!("{err:#}"))
    }

    /// Short stage name used in structured log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            MigrationError::Fetch(_) => "fetch",
            MigrationError::Decode(_) => "decode",
            MigrationError::UpscaleService(_) => "upscale",
            MigrationError::Upload(_) => "upload",
            MigrationError::Update(_) => "update",
        }
    }
}
