//! ElectricalPowerMeasurement cluster instance (0x0090).
//!
//! Wraps one [`MeasurementProvider`] for one endpoint. The feature map and
//! the optional attribute set decide which attributes the endpoint exposes;
//! every exposed attribute is answered straight from the provider.
//!
//! ## Attribute conformance
//! - Mandatory: PowerMode, NumberOfMeasurementTypes, Accuracy, ActivePower
//! - Optional: Ranges, Voltage, ActiveCurrent
//! - AC + optional: ReactiveCurrent, ApparentCurrent, ReactivePower,
//!   ApparentPower, RMSVoltage, RMSCurrent, RMSPower, Frequency, PowerFactor
//! - POLY + optional: NeutralCurrent
//! - HARM: HarmonicCurrents
//! - PWRQ: HarmonicPhases

use super::{AttributeReport, AttributeValue, ClusterError};
use crate::measurement::{MeasurementProvider, distinct_measurement_types};
use log::{debug, info};
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

/// Matter Cluster ID for ElectricalPowerMeasurement
pub const CLUSTER_ID: u32 = 0x0090;

/// Cluster revision
pub const CLUSTER_REVISION: u16 = 1;

/// Feature flags for ElectricalPowerMeasurement
pub mod features {
    /// Direct Current feature (DIRC)
    pub const DIRECT_CURRENT: u32 = 0x01;
    /// Alternating Current feature (ALTC)
    pub const ALTERNATING_CURRENT: u32 = 0x02;
    /// Polyphase Power feature (POLY)
    pub const POLYPHASE_POWER: u32 = 0x04;
    /// Harmonics feature (HARM)
    pub const HARMONICS: u32 = 0x08;
    /// Power Quality feature (PWRQ)
    pub const POWER_QUALITY: u32 = 0x10;
}

/// Optional attribute flags
pub mod optional_attributes {
    pub const RANGES: u32 = 0x0001;
    pub const VOLTAGE: u32 = 0x0002;
    pub const ACTIVE_CURRENT: u32 = 0x0004;
    pub const REACTIVE_CURRENT: u32 = 0x0008;
    pub const APPARENT_CURRENT: u32 = 0x0010;
    pub const REACTIVE_POWER: u32 = 0x0020;
    pub const APPARENT_POWER: u32 = 0x0040;
    pub const RMS_VOLTAGE: u32 = 0x0080;
    pub const RMS_CURRENT: u32 = 0x0100;
    pub const RMS_POWER: u32 = 0x0200;
    pub const FREQUENCY: u32 = 0x0400;
    pub const POWER_FACTOR: u32 = 0x0800;
    pub const NEUTRAL_CURRENT: u32 = 0x1000;
}

/// Attribute IDs for the ElectricalPowerMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr, Display, EnumIter)]
#[repr(u32)]
pub enum ElectricalPowerMeasurementAttribute {
    PowerMode = 0x0000,
    NumberOfMeasurementTypes = 0x0001,
    Accuracy = 0x0002,
    Ranges = 0x0003,
    Voltage = 0x0004,
    ActiveCurrent = 0x0005,
    ReactiveCurrent = 0x0006,
    ApparentCurrent = 0x0007,
    ActivePower = 0x0008,
    ReactivePower = 0x0009,
    ApparentPower = 0x000A,
    #[strum(serialize = "RMSVoltage")]
    RmsVoltage = 0x000B,
    #[strum(serialize = "RMSCurrent")]
    RmsCurrent = 0x000C,
    #[strum(serialize = "RMSPower")]
    RmsPower = 0x000D,
    Frequency = 0x000E,
    HarmonicCurrents = 0x000F,
    HarmonicPhases = 0x0010,
    PowerFactor = 0x0011,
    NeutralCurrent = 0x0012,
}

/// What an attribute needs to be present on an endpoint.
enum Conformance {
    Mandatory,
    Optional(u32),
    AcOptional(u32),
    PolyOptional(u32),
    Feature(u32),
}

impl ElectricalPowerMeasurementAttribute {
    fn conformance(self) -> Conformance {
        use optional_attributes as opt;
        use ElectricalPowerMeasurementAttribute::*;

        match self {
            PowerMode | NumberOfMeasurementTypes | Accuracy | ActivePower => Conformance::Mandatory,
            Ranges => Conformance::Optional(opt::RANGES),
            Voltage => Conformance::Optional(opt::VOLTAGE),
            ActiveCurrent => Conformance::Optional(opt::ACTIVE_CURRENT),
            ReactiveCurrent => Conformance::AcOptional(opt::REACTIVE_CURRENT),
            ApparentCurrent => Conformance::AcOptional(opt::APPARENT_CURRENT),
            ReactivePower => Conformance::AcOptional(opt::REACTIVE_POWER),
            ApparentPower => Conformance::AcOptional(opt::APPARENT_POWER),
            RmsVoltage => Conformance::AcOptional(opt::RMS_VOLTAGE),
            RmsCurrent => Conformance::AcOptional(opt::RMS_CURRENT),
            RmsPower => Conformance::AcOptional(opt::RMS_POWER),
            Frequency => Conformance::AcOptional(opt::FREQUENCY),
            PowerFactor => Conformance::AcOptional(opt::POWER_FACTOR),
            NeutralCurrent => Conformance::PolyOptional(opt::NEUTRAL_CURRENT),
            HarmonicCurrents => Conformance::Feature(features::HARMONICS),
            HarmonicPhases => Conformance::Feature(features::POWER_QUALITY),
        }
    }
}

/// Optional attributes that are only valid with the AlternatingCurrent feature.
const AC_ONLY_ATTRIBUTES: &[(u32, &str)] = &[
    (optional_attributes::REACTIVE_CURRENT, "ReactiveCurrent"),
    (optional_attributes::APPARENT_CURRENT, "ApparentCurrent"),
    (optional_attributes::REACTIVE_POWER, "ReactivePower"),
    (optional_attributes::APPARENT_POWER, "ApparentPower"),
    (optional_attributes::RMS_VOLTAGE, "RMSVoltage"),
    (optional_attributes::RMS_CURRENT, "RMSCurrent"),
    (optional_attributes::RMS_POWER, "RMSPower"),
    (optional_attributes::FREQUENCY, "Frequency"),
    (optional_attributes::POWER_FACTOR, "PowerFactor"),
];

/// Features that only make sense on an AC supply.
const AC_ONLY_FEATURES: &[(u32, &str)] = &[
    (features::POLYPHASE_POWER, "PolyphasePower"),
    (features::HARMONICS, "Harmonics"),
    (features::POWER_QUALITY, "PowerQuality"),
];

/// ElectricalPowerMeasurement cluster bound to one endpoint.
pub struct ElectricalPowerMeasurementInstance {
    endpoint_id: u16,
    provider: Box<dyn MeasurementProvider>,
    feature_map: u32,
    optional_attributes: u32,
    initialized: bool,
}

impl ElectricalPowerMeasurementInstance {
    /// Create an instance. Call [`init`](Self::init) before reading.
    pub fn new(
        endpoint_id: u16,
        provider: Box<dyn MeasurementProvider>,
        feature_map: u32,
        optional_attributes: u32,
    ) -> Self {
        Self {
            endpoint_id,
            provider,
            feature_map,
            optional_attributes,
            initialized: false,
        }
    }

    pub fn endpoint_id(&self) -> u16 {
        self.endpoint_id
    }

    pub fn feature_map(&self) -> u32 {
        self.feature_map
    }

    pub fn optional_attributes(&self) -> u32 {
        self.optional_attributes
    }

    pub fn has_feature(&self, feature: u32) -> bool {
        self.feature_map & feature == feature
    }

    fn has_optional_attribute(&self, attribute: u32) -> bool {
        self.optional_attributes & attribute == attribute
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The provider answering this endpoint's reads.
    pub fn provider(&self) -> &dyn MeasurementProvider {
        self.provider.as_ref()
    }

    /// Validate the feature set and the provider's metadata, then start serving reads.
    pub fn init(&mut self) -> Result<(), ClusterError> {
        if self.initialized {
            return Err(ClusterError::AlreadyInitialized(self.endpoint_id));
        }

        self.check_features()?;
        self.check_provider()?;

        self.initialized = true;
        info!(
            "ElectricalPowerMeasurement initialized on endpoint {} (features=0x{:02X}, optional=0x{:04X}, mode={})",
            self.endpoint_id,
            self.feature_map,
            self.optional_attributes,
            self.provider.power_mode()
        );
        Ok(())
    }

    fn check_features(&self) -> Result<(), ClusterError> {
        if !self.has_feature(features::DIRECT_CURRENT)
            && !self.has_feature(features::ALTERNATING_CURRENT)
        {
            return Err(ClusterError::NoPowerKind);
        }

        if !self.has_feature(features::ALTERNATING_CURRENT) {
            if let Some(&(_, name)) = AC_ONLY_FEATURES
                .iter()
                .find(|(feature, _)| self.has_feature(*feature))
            {
                return Err(ClusterError::FeatureRequiresAlternatingCurrent(name));
            }
            if let Some(&(_, name)) = AC_ONLY_ATTRIBUTES
                .iter()
                .find(|(attribute, _)| self.has_optional_attribute(*attribute))
            {
                return Err(ClusterError::OptionalAttributeRequiresFeature {
                    attribute: name,
                    feature: "AlternatingCurrent",
                });
            }
        }

        if self.has_optional_attribute(optional_attributes::NEUTRAL_CURRENT)
            && !self.has_feature(features::POLYPHASE_POWER)
        {
            return Err(ClusterError::OptionalAttributeRequiresFeature {
                attribute: "NeutralCurrent",
                feature: "PolyphasePower",
            });
        }

        Ok(())
    }

    fn check_provider(&self) -> Result<(), ClusterError> {
        for accuracy in self.provider.accuracy() {
            accuracy.validate()?;
        }

        let declared = self.provider.number_of_measurement_types();
        let described = distinct_measurement_types(self.provider.as_ref());
        if declared as usize != described {
            return Err(ClusterError::MeasurementTypeMismatch {
                declared,
                described,
            });
        }
        Ok(())
    }

    /// Whether the attribute is present on this endpoint.
    pub fn is_supported(&self, attribute: ElectricalPowerMeasurementAttribute) -> bool {
        match attribute.conformance() {
            Conformance::Mandatory => true,
            Conformance::Optional(bit) => self.has_optional_attribute(bit),
            Conformance::AcOptional(bit) => {
                self.has_feature(features::ALTERNATING_CURRENT) && self.has_optional_attribute(bit)
            }
            Conformance::PolyOptional(bit) => {
                self.has_feature(features::POLYPHASE_POWER) && self.has_optional_attribute(bit)
            }
            Conformance::Feature(feature) => self.has_feature(feature),
        }
    }

    /// Read an attribute by raw id.
    pub fn read_id(&self, attribute_id: u32) -> Result<AttributeValue, ClusterError> {
        let attribute = ElectricalPowerMeasurementAttribute::from_repr(attribute_id)
            .ok_or(ClusterError::UnsupportedAttribute {
                cluster_id: CLUSTER_ID,
                attribute_id,
            })?;
        self.read(attribute)
    }

    /// Read an attribute, answered from the provider.
    pub fn read(
        &self,
        attribute: ElectricalPowerMeasurementAttribute,
    ) -> Result<AttributeValue, ClusterError> {
        use ElectricalPowerMeasurementAttribute as Attr;

        if !self.initialized {
            return Err(ClusterError::NotInitialized(self.endpoint_id));
        }
        if !self.is_supported(attribute) {
            return Err(ClusterError::UnsupportedAttribute {
                cluster_id: CLUSTER_ID,
                attribute_id: attribute as u32,
            });
        }

        debug!("EPM[{}] read {}", self.endpoint_id, attribute);

        let p = self.provider.as_ref();
        let value = match attribute {
            Attr::PowerMode => AttributeValue::PowerMode(p.power_mode()),
            Attr::NumberOfMeasurementTypes => {
                AttributeValue::Unsigned(p.number_of_measurement_types() as u64)
            }
            Attr::Accuracy => AttributeValue::Accuracy(p.accuracy()),
            Attr::Ranges => AttributeValue::Ranges(p.ranges()),
            Attr::Voltage => p.voltage().into(),
            Attr::ActiveCurrent => p.active_current().into(),
            Attr::ReactiveCurrent => p.reactive_current().into(),
            Attr::ApparentCurrent => p.apparent_current().into(),
            Attr::ActivePower => p.active_power().into(),
            Attr::ReactivePower => p.reactive_power().into(),
            Attr::ApparentPower => p.apparent_power().into(),
            Attr::RmsVoltage => p.rms_voltage().into(),
            Attr::RmsCurrent => p.rms_current().into(),
            Attr::RmsPower => p.rms_power().into(),
            Attr::Frequency => p.frequency().into(),
            Attr::HarmonicCurrents => p.harmonic_currents().into(),
            Attr::HarmonicPhases => p.harmonic_phases().into(),
            Attr::PowerFactor => p.power_factor().into(),
            Attr::NeutralCurrent => p.neutral_current().into(),
        };
        Ok(value)
    }

    /// Read every attribute present on this endpoint, in id order.
    pub fn snapshot(&self) -> Result<Vec<AttributeReport>, ClusterError> {
        ElectricalPowerMeasurementAttribute::iter()
            .filter(|attribute| self.is_supported(*attribute))
            .map(|attribute| {
                Ok(AttributeReport {
                    id: attribute as u32,
                    name: attribute.to_string(),
                    value: self.read(attribute)?,
                })
            })
            .collect()
    }
}
