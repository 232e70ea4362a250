pub mod clusters;
pub mod registry;

pub use clusters::{AttributeReport, AttributeValue, ClusterError};
pub use registry::{ClusterRegistry, DEFAULT_ENERGY_ENDPOINT_ID, RegistryError, on_cluster_init};
