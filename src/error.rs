use thiserror::Error;

use crate::numeric::Vector3;

/// Everything that can go wrong while turning a scene file into boxes and rays.
/// The geometry itself never fails.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transformation '{0}' is not declared in the scene")]
    UnknownTransform(String),

    #[error("malformed transformation: {0}")]
    MalformedTransform(String),

    #[error("transformation is not invertible: {0}")]
    SingularTransform(String),

    #[error("box {id} has min {min} exceeding max {max}")]
    InvalidBox {
        id: usize,
        min: Vector3,
        max: Vector3,
    },
}
