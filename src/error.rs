use thiserror::Error as ThisError;

use crate::matter::clusters::ClusterError;
use crate::matter::registry::RegistryError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
