use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum C12nError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("serde yaml error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    #[error("failed to read definition {path:?}: {source}")]
    DefinitionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown display format: {0}")]
    UnknownFormat(String),
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
}

pub type Result<T> = std::result::Result<T, C12nError>;
