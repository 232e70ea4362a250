//! Matter cluster read paths for the bridge.
//!
//! Each cluster module resolves attribute ids against its backing state and
//! returns a typed [`AttributeValue`]. Encoding the value onto the wire is
//! left to the surrounding stack.

use crate::measurement::{
    AccuracyError, HarmonicMeasurement, MeasurementAccuracy, MeasurementRange, PowerMode,
};
use serde::Serialize;
use thiserror::Error;

pub mod bridged_device_basic_info;
pub mod electrical_power_measurement;

// Re-export for convenience
pub use bridged_device_basic_info::{BridgedDeviceBasicInfoAttribute, BridgedHandler};
pub use electrical_power_measurement::{
    ElectricalPowerMeasurementAttribute, ElectricalPowerMeasurementInstance,
};

/// Value of a single attribute read.
///
/// `Null` is how an absent measurement is reported; it is not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Text(String),
    PowerMode(PowerMode),
    Accuracy(Vec<MeasurementAccuracy>),
    Ranges(Vec<MeasurementRange>),
    Harmonics(Vec<HarmonicMeasurement>),
}

impl From<Option<i64>> for AttributeValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(AttributeValue::Null, AttributeValue::Signed)
    }
}

impl From<Option<Vec<HarmonicMeasurement>>> for AttributeValue {
    fn from(value: Option<Vec<HarmonicMeasurement>>) -> Self {
        value.map_or(AttributeValue::Null, AttributeValue::Harmonics)
    }
}

/// One attribute in a cluster snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeReport {
    pub id: u32,
    pub name: String,
    pub value: AttributeValue,
}

/// Errors raised by cluster setup and attribute reads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("cluster on endpoint {0} read before init()")]
    NotInitialized(u16),

    #[error("cluster on endpoint {0} already initialized")]
    AlreadyInitialized(u16),

    #[error("attribute 0x{attribute_id:04X} not supported by cluster 0x{cluster_id:04X}")]
    UnsupportedAttribute { cluster_id: u32, attribute_id: u32 },

    #[error("feature map must include DirectCurrent or AlternatingCurrent")]
    NoPowerKind,

    #[error("{0} requires the AlternatingCurrent feature")]
    FeatureRequiresAlternatingCurrent(&'static str),

    #[error("optional attribute {attribute} requires the {feature} feature")]
    OptionalAttributeRequiresFeature {
        attribute: &'static str,
        feature: &'static str,
    },

    #[error("provider declares {declared} measurement types but describes {described}")]
    MeasurementTypeMismatch { declared: u8, described: usize },

    #[error("invalid accuracy record: {0}")]
    InvalidAccuracy(#[from] AccuracyError),
}
