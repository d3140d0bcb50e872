use thiserror::Error;

use crate::scene::{NodeId, TextureId};

/// Camera navigation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("unknown viewpoint '{0}'")]
    UnknownViewpoint(String),
}

/// Scene graph handle failures
///
/// Stale handles are what a double release produces, so callers tearing
/// down treat them as already-released rather than fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("node {0:?} is no longer live")]
    StaleNode(NodeId),
    #[error("texture {0:?} is no longer live")]
    StaleTexture(TextureId),
    #[error("the scene root cannot be released")]
    RootNode,
}

/// Per-entity lifecycle failures
#[derive(Debug, Error)]
pub enum EntityError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("entity used before build()")]
    NotBuilt,
    #[error("build() called twice")]
    AlreadyBuilt,
    #[error("{0}")]
    Fault(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target has zero area")]
    ZeroSize,
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Top-level error for library entry points
#[derive(Debug, Error)]
pub enum OfficeError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, OfficeError>;
