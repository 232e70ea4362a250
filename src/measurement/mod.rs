//! Measurement providers for the ElectricalPowerMeasurement cluster.
//!
//! A [`MeasurementProvider`] answers the cluster's attribute queries. The
//! cluster instance only ever holds a `Box<dyn MeasurementProvider>`, so a
//! real meter, a simulation and the stub all plug in the same way.

pub mod stub;
pub mod types;

pub use stub::StubMeasurementProvider;
pub use types::{
    AccuracyError, HarmonicMeasurement, MeasurementAccuracy, MeasurementAccuracyRange,
    MeasurementRange, MeasurementType, PowerMode,
};

/// Source of electrical measurements for one endpoint.
///
/// All methods are pure reads. A channel that is not wired, not sampled yet
/// or not supported returns `None`; that is a valid answer, not a failure.
/// The channel getters default to `None` so an implementation only overrides
/// what it actually measures.
///
/// # Example
/// ```ignore
/// struct PlugMeter { milliwatts: i64 }
///
/// impl MeasurementProvider for PlugMeter {
///     fn power_mode(&self) -> PowerMode { PowerMode::Ac }
///     fn number_of_measurement_types(&self) -> u8 { 1 }
///     fn accuracy(&self) -> Vec<MeasurementAccuracy> { /* ActivePower only */ }
///     fn ranges(&self) -> Vec<MeasurementRange> { Vec::new() }
///     fn active_power(&self) -> Option<i64> { Some(self.milliwatts) }
/// }
/// ```
pub trait MeasurementProvider: Send + Sync {
    /// Electrical supply type.
    fn power_mode(&self) -> PowerMode;

    /// Number of distinct channels this provider supports.
    ///
    /// Must match the distinct `measurement_type`s returned by [`accuracy`](Self::accuracy).
    fn number_of_measurement_types(&self) -> u8;

    /// Accuracy records, one per supported channel.
    fn accuracy(&self) -> Vec<MeasurementAccuracy>;

    /// Observed operating ranges. Empty is legal.
    fn ranges(&self) -> Vec<MeasurementRange>;

    /// Voltage in mV.
    fn voltage(&self) -> Option<i64> {
        None
    }

    /// Active current in mA.
    fn active_current(&self) -> Option<i64> {
        None
    }

    /// Reactive current in mA.
    fn reactive_current(&self) -> Option<i64> {
        None
    }

    /// Apparent current in mA.
    fn apparent_current(&self) -> Option<i64> {
        None
    }

    /// Active power in mW.
    fn active_power(&self) -> Option<i64> {
        None
    }

    /// Reactive power in mVAR.
    fn reactive_power(&self) -> Option<i64> {
        None
    }

    /// Apparent power in mVA.
    fn apparent_power(&self) -> Option<i64> {
        None
    }

    fn rms_voltage(&self) -> Option<i64> {
        None
    }

    fn rms_current(&self) -> Option<i64> {
        None
    }

    fn rms_power(&self) -> Option<i64> {
        None
    }

    /// Frequency in mHz.
    fn frequency(&self) -> Option<i64> {
        None
    }

    fn harmonic_currents(&self) -> Option<Vec<HarmonicMeasurement>> {
        None
    }

    fn harmonic_phases(&self) -> Option<Vec<HarmonicMeasurement>> {
        None
    }

    /// Power factor scaled by 10000.
    fn power_factor(&self) -> Option<i64> {
        None
    }

    /// Neutral current in mA.
    fn neutral_current(&self) -> Option<i64> {
        None
    }
}

/// Count the distinct channels listed in a provider's accuracy records.
pub fn distinct_measurement_types(provider: &dyn MeasurementProvider) -> usize {
    let mut kinds: Vec<MeasurementType> = provider
        .accuracy()
        .iter()
        .map(|a| a.measurement_type)
        .collect();
    kinds.sort();
    kinds.dedup();
    kinds.len()
}
