//! Stub measurement provider.
//!
//! Models a mostly unimplemented AC sensor: only active power carries a
//! value and only active current is described in the accuracy list.
//! Channels that are not supported are left out of `accuracy()` entirely.

use super::{
    MeasurementAccuracy, MeasurementAccuracyRange, MeasurementProvider, MeasurementRange,
    MeasurementType, PowerMode,
};

/// Fixed active power reading in mW.
pub const STUB_ACTIVE_POWER: i64 = 10_000;

/// Measurable active current domain in mA.
const ACTIVE_CURRENT_MIN: i64 = -10_000_000;
const ACTIVE_CURRENT_MAX: i64 = 10_000_000;

/// Measurement provider with hard-wired sample values.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubMeasurementProvider;

impl StubMeasurementProvider {
    pub const fn new() -> Self {
        Self
    }
}

impl MeasurementProvider for StubMeasurementProvider {
    fn power_mode(&self) -> PowerMode {
        PowerMode::Ac
    }

    fn number_of_measurement_types(&self) -> u8 {
        1
    }

    fn accuracy(&self) -> Vec<MeasurementAccuracy> {
        vec![MeasurementAccuracy {
            measurement_type: MeasurementType::ActiveCurrent,
            measured: true,
            min_measured_value: ACTIVE_CURRENT_MIN,
            max_measured_value: ACTIVE_CURRENT_MAX,
            accuracy_ranges: vec![MeasurementAccuracyRange::new(500, 1_000)],
        }]
    }

    fn ranges(&self) -> Vec<MeasurementRange> {
        Vec::new()
    }

    fn active_power(&self) -> Option<i64> {
        Some(STUB_ACTIVE_POWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::distinct_measurement_types;

    #[test]
    fn test_power_mode_is_ac() {
        assert_eq!(StubMeasurementProvider::new().power_mode(), PowerMode::Ac);
    }

    #[test]
    fn test_measurement_type_count_matches_accuracy() {
        let provider = StubMeasurementProvider::new();
        assert_eq!(provider.number_of_measurement_types(), 1);
        assert_eq!(
            distinct_measurement_types(&provider),
            provider.number_of_measurement_types() as usize
        );
    }

    #[test]
    fn test_active_current_accuracy() {
        let accuracy = StubMeasurementProvider::new().accuracy();
        assert_eq!(accuracy.len(), 1);

        let record = &accuracy[0];
        assert_eq!(record.measurement_type, MeasurementType::ActiveCurrent);
        assert!(record.measured);
        assert_eq!(record.min_measured_value, -10_000_000);
        assert_eq!(record.max_measured_value, 10_000_000);
        assert_eq!(record.accuracy_ranges, vec![MeasurementAccuracyRange::new(500, 1_000)]);
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn test_ranges_empty() {
        assert!(StubMeasurementProvider::new().ranges().is_empty());
    }

    #[test]
    fn test_only_active_power_present() {
        let p = StubMeasurementProvider::new();
        assert_eq!(p.active_power(), Some(10_000));

        let absent = [
            p.voltage(),
            p.active_current(),
            p.reactive_current(),
            p.apparent_current(),
            p.reactive_power(),
            p.apparent_power(),
            p.rms_voltage(),
            p.rms_current(),
            p.rms_power(),
            p.frequency(),
            p.power_factor(),
            p.neutral_current(),
        ];
        assert!(absent.iter().all(Option::is_none));
        assert_eq!(p.harmonic_currents(), None);
        assert_eq!(p.harmonic_phases(), None);
    }

    #[test]
    fn test_queries_are_repeatable() {
        let p = StubMeasurementProvider::new();
        assert_eq!(p.power_mode(), p.power_mode());
        assert_eq!(p.number_of_measurement_types(), p.number_of_measurement_types());
        assert_eq!(p.accuracy(), p.accuracy());
        assert_eq!(p.ranges(), p.ranges());

        let channels: [fn(&StubMeasurementProvider) -> Option<i64>; 13] = [
            |p| p.voltage(),
            |p| p.active_current(),
            |p| p.reactive_current(),
            |p| p.apparent_current(),
            |p| p.active_power(),
            |p| p.reactive_power(),
            |p| p.apparent_power(),
            |p| p.rms_voltage(),
            |p| p.rms_current(),
            |p| p.rms_power(),
            |p| p.frequency(),
            |p| p.power_factor(),
            |p| p.neutral_current(),
        ];
        for read in channels {
            assert_eq!(read(&p), read(&p));
        }

        assert_eq!(p.harmonic_currents(), p.harmonic_currents());
        assert_eq!(p.harmonic_phases(), p.harmonic_phases());
    }
}
