use shared::GeometryError;
use thiserror::Error;

use crate::physics::BodyId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid scene config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid scene config: {0}")]
    InvalidConfig(String),

    #[error("unknown building profile `{0}`")]
    UnknownProfile(String),

    #[error("asset `{key}` has no usable geometry")]
    EmptyAsset { key: String },

    #[error("no body with id {0}")]
    UnknownBody(BodyId),
}
