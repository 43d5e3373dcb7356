use thiserror::Error;

/// Top-level error type for the knotview rendering core.
#[derive(Debug, Error)]
pub enum KnotviewError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors produced while turning curve source text into sampled points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("could not construct curve function: {reason}")]
    ConstructionFailed { reason: String },

    #[error("curve produced {valid} usable samples, at least {required} are required")]
    InsufficientPoints { valid: usize, required: usize },
}

/// Errors related to curve geometry and meshing.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry parameters: {0}")]
    InvalidParameters(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the scene lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene has not been mounted")]
    NotMounted,

    #[error("scene is already mounted")]
    AlreadyMounted,

    #[error("scene has been destroyed")]
    Destroyed,
}

/// Errors reported by a render backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),
}

/// Errors related to view configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for results using [`KnotviewError`].
pub type Result<T> = std::result::Result<T, KnotviewError>;
