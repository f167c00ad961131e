use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("invalid tool name '{0}'")]
    InvalidToolName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
