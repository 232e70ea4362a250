//! Endpoint-keyed registry of ElectricalPowerMeasurement instances.
//!
//! Holds at most one cluster instance per endpoint. Wrong endpoints and
//! repeated initialization are reported as typed errors instead of aborting.

use super::clusters::electrical_power_measurement::features;
use super::clusters::{ClusterError, ElectricalPowerMeasurementInstance};
use crate::measurement::StubMeasurementProvider;
use log::{info, warn};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use thiserror::Error;

/// Endpoint the energy measurement cluster is enabled on by default.
pub const DEFAULT_ENERGY_ENDPOINT_ID: u16 = 1;

/// Error types for registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The cluster is not enabled on this endpoint.
    #[error("cluster is only enabled on endpoint {expected}, not {actual}")]
    UnexpectedEndpoint { expected: u16, actual: u16 },

    /// An instance already exists for the endpoint.
    #[error("endpoint {0} already has a measurement instance")]
    AlreadyInitialized(u16),

    /// The instance rejected its configuration during `init()`.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Owner of all measurement cluster instances.
pub struct ClusterRegistry {
    energy_endpoint_id: u16,
    instances: BTreeMap<u16, ElectricalPowerMeasurementInstance>,
}

impl ClusterRegistry {
    /// Create an empty registry accepting the measurement cluster on `energy_endpoint_id`.
    pub fn new(energy_endpoint_id: u16) -> Self {
        Self {
            energy_endpoint_id,
            instances: BTreeMap::new(),
        }
    }

    pub fn energy_endpoint_id(&self) -> u16 {
        self.energy_endpoint_id
    }

    /// Initialize and store an instance under its endpoint.
    ///
    /// Nothing is stored if the endpoint is taken or `init()` fails.
    pub fn register(
        &mut self,
        mut instance: ElectricalPowerMeasurementInstance,
    ) -> Result<&ElectricalPowerMeasurementInstance, RegistryError> {
        let endpoint_id = instance.endpoint_id();
        match self.instances.entry(endpoint_id) {
            Entry::Occupied(_) => {
                warn!("Measurement instance for endpoint {} already exists", endpoint_id);
                Err(RegistryError::AlreadyInitialized(endpoint_id))
            }
            Entry::Vacant(slot) => {
                instance.init()?;
                Ok(slot.insert(instance))
            }
        }
    }

    pub fn get(&self, endpoint_id: u16) -> Option<&ElectricalPowerMeasurementInstance> {
        self.instances.get(&endpoint_id)
    }

    /// Release the instance on an endpoint, allowing it to be registered again.
    pub fn remove(&mut self, endpoint_id: u16) -> Option<ElectricalPowerMeasurementInstance> {
        self.instances.remove(&endpoint_id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ENERGY_ENDPOINT_ID)
    }
}

/// Cluster init hook for the energy measurement endpoint.
///
/// Builds the stub provider with AC support and no optional attributes,
/// registers it and runs its `init()`.
pub fn on_cluster_init(
    registry: &mut ClusterRegistry,
    endpoint_id: u16,
) -> Result<&ElectricalPowerMeasurementInstance, RegistryError> {
    let expected = registry.energy_endpoint_id();
    if endpoint_id != expected {
        return Err(RegistryError::UnexpectedEndpoint {
            expected,
            actual: endpoint_id,
        });
    }

    let instance = ElectricalPowerMeasurementInstance::new(
        endpoint_id,
        Box::new(StubMeasurementProvider::new()),
        features::ALTERNATING_CURRENT,
        0,
    );
    let instance = registry.register(instance)?;
    info!("Energy measurement cluster ready on endpoint {}", endpoint_id);
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::{AttributeValue, ElectricalPowerMeasurementAttribute};

    #[test]
    fn test_init_hook_creates_instance() {
        let mut registry = ClusterRegistry::default();
        let instance = on_cluster_init(&mut registry, 1).unwrap();
        assert!(instance.is_initialized());
        assert_eq!(instance.feature_map(), features::ALTERNATING_CURRENT);
        assert_eq!(instance.optional_attributes(), 0);
        assert_eq!(
            instance.read(ElectricalPowerMeasurementAttribute::ActivePower),
            Ok(AttributeValue::Signed(10_000))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_init_hook_wrong_endpoint() {
        let mut registry = ClusterRegistry::default();
        assert_eq!(
            on_cluster_init(&mut registry, 2).err(),
            Some(RegistryError::UnexpectedEndpoint {
                expected: 1,
                actual: 2,
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_init_hook_twice() {
        let mut registry = ClusterRegistry::default();
        on_cluster_init(&mut registry, 1).unwrap();
        assert_eq!(
            on_cluster_init(&mut registry, 1).err(),
            Some(RegistryError::AlreadyInitialized(1))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_allows_reinit() {
        let mut registry = ClusterRegistry::new(3);
        on_cluster_init(&mut registry, 3).unwrap();
        assert!(registry.remove(3).is_some());
        assert!(registry.get(3).is_none());
        assert!(on_cluster_init(&mut registry, 3).is_ok());
    }

    #[test]
    fn test_failed_init_not_stored() {
        let mut registry = ClusterRegistry::default();
        let instance = ElectricalPowerMeasurementInstance::new(
            1,
            Box::new(StubMeasurementProvider::new()),
            0,
            0,
        );
        assert_eq!(
            registry.register(instance).err(),
            Some(RegistryError::Cluster(ClusterError::NoPowerKind))
        );
        assert!(registry.get(1).is_none());
    }
}
