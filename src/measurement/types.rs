//! Measurement data model for the ElectricalPowerMeasurement cluster.
//!
//! Values use the cluster's native units: millivolts, milliamps, milliwatts,
//! millihertz. Absent readings are `None`, never a sentinel number.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, FromRepr};

/// Seconds between the Unix epoch and the Matter epoch (2000-01-01 00:00:00 UTC).
pub const MATTER_EPOCH_OFFSET_SECS: i64 = 946_684_800;

/// Electrical supply type reported by the PowerMode attribute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, FromRepr, Display, Serialize)]
#[repr(u8)]
pub enum PowerMode {
    #[default]
    Unknown = 0,
    /// Direct current
    Dc = 1,
    /// Alternating current
    Ac = 2,
}

/// Measurement channel identifiers (MeasurementTypeEnum).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, FromRepr, Display, Serialize)]
#[repr(u16)]
pub enum MeasurementType {
    Unspecified = 0,
    Voltage = 1,
    ActiveCurrent = 2,
    ReactiveCurrent = 3,
    ApparentCurrent = 4,
    ActivePower = 5,
    ReactivePower = 6,
    ApparentPower = 7,
    #[strum(serialize = "RMSVoltage")]
    RmsVoltage = 8,
    #[strum(serialize = "RMSCurrent")]
    RmsCurrent = 9,
    #[strum(serialize = "RMSPower")]
    RmsPower = 10,
    Frequency = 11,
    PowerFactor = 12,
    NeutralCurrent = 13,
    ElectricalEnergy = 14,
    ReactiveEnergy = 15,
    ApparentEnergy = 16,
}

/// A band of measured values over which a tolerance applies.
///
/// Percent tolerances are in hundredths of a percent, fixed tolerances in the
/// channel's unit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MeasurementAccuracyRange {
    pub range_min: i64,
    pub range_max: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_max: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_min: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_typical: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_typical: Option<u64>,
}

impl MeasurementAccuracyRange {
    /// Range with no tolerance figures attached.
    pub const fn new(range_min: i64, range_max: i64) -> Self {
        Self {
            range_min,
            range_max,
            percent_max: None,
            percent_min: None,
            percent_typical: None,
            fixed_max: None,
            fixed_min: None,
            fixed_typical: None,
        }
    }

    /// Attach a percentage tolerance (hundredths of a percent).
    pub fn with_percent(mut self, min: u16, typical: u16, max: u16) -> Self {
        self.percent_min = Some(min);
        self.percent_typical = Some(typical);
        self.percent_max = Some(max);
        self
    }

    /// Attach a fixed tolerance in the channel's unit.
    pub fn with_fixed(mut self, min: u64, typical: u64, max: u64) -> Self {
        self.fixed_min = Some(min);
        self.fixed_typical = Some(typical);
        self.fixed_max = Some(max);
        self
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.range_min <= other.range_max && other.range_min <= self.range_max
    }
}

/// Accuracy description of one measurement channel.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MeasurementAccuracy {
    pub measurement_type: MeasurementType,
    /// `false` if the value is estimated rather than measured.
    pub measured: bool,
    pub min_measured_value: i64,
    pub max_measured_value: i64,
    pub accuracy_ranges: Vec<MeasurementAccuracyRange>,
}

/// Reasons an accuracy record is rejected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AccuracyError {
    #[error("{0}: min measured value exceeds max measured value")]
    InvertedDomain(MeasurementType),

    #[error("{0}: no accuracy ranges")]
    NoRanges(MeasurementType),

    #[error("{0}: accuracy range {1} has min above max")]
    InvertedRange(MeasurementType, usize),

    #[error("{0}: accuracy ranges {1} and {2} overlap")]
    OverlappingRanges(MeasurementType, usize, usize),
}

impl MeasurementAccuracy {
    /// Check the domain and range invariants the type does not enforce.
    pub fn validate(&self) -> Result<(), AccuracyError> {
        let kind = self.measurement_type;
        if self.min_measured_value > self.max_measured_value {
            return Err(AccuracyError::InvertedDomain(kind));
        }
        if self.accuracy_ranges.is_empty() {
            return Err(AccuracyError::NoRanges(kind));
        }
        for (i, range) in self.accuracy_ranges.iter().enumerate() {
            if range.range_min > range.range_max {
                return Err(AccuracyError::InvertedRange(kind, i));
            }
            for (j, other) in self.accuracy_ranges.iter().enumerate().skip(i + 1) {
                if range.overlaps(other) {
                    return Err(AccuracyError::OverlappingRanges(kind, i, j));
                }
            }
        }
        Ok(())
    }
}

/// Observed min/max of a channel over a period.
///
/// Timestamps are Matter epoch seconds, systimes are microseconds since boot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MeasurementRange {
    pub measurement_type: MeasurementType,
    pub min: i64,
    pub max: i64,
    pub start_timestamp: Option<u32>,
    pub end_timestamp: Option<u32>,
    pub min_timestamp: Option<u32>,
    pub max_timestamp: Option<u32>,
    pub start_systime: Option<u64>,
    pub end_systime: Option<u64>,
    pub min_systime: Option<u64>,
    pub max_systime: Option<u64>,
}

impl MeasurementRange {
    pub fn new(measurement_type: MeasurementType, min: i64, max: i64) -> Self {
        Self {
            measurement_type,
            min,
            max,
            start_timestamp: None,
            end_timestamp: None,
            min_timestamp: None,
            max_timestamp: None,
            start_systime: None,
            end_systime: None,
            min_systime: None,
            max_systime: None,
        }
    }

    /// Set the measurement period from wall-clock times.
    ///
    /// Times before the Matter epoch, or beyond the u32 range, are left unset.
    pub fn with_timestamps(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_timestamp = to_matter_epoch_secs(start);
        self.end_timestamp = to_matter_epoch_secs(end);
        self
    }
}

/// Convert a UTC time into Matter epoch seconds.
pub fn to_matter_epoch_secs(time: DateTime<Utc>) -> Option<u32> {
    u32::try_from(time.timestamp() - MATTER_EPOCH_OFFSET_SECS).ok()
}

/// One harmonic of a current or phase measurement.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct HarmonicMeasurement {
    /// Harmonic order, 1 being the fundamental.
    pub order: u8,
    pub measurement: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn accuracy(ranges: Vec<MeasurementAccuracyRange>) -> MeasurementAccuracy {
        MeasurementAccuracy {
            measurement_type: MeasurementType::Voltage,
            measured: true,
            min_measured_value: 0,
            max_measured_value: 1_000,
            accuracy_ranges: ranges,
        }
    }

    #[test]
    fn test_valid_accuracy() {
        let acc = accuracy(vec![
            MeasurementAccuracyRange::new(0, 499).with_percent(50, 100, 150),
            MeasurementAccuracyRange::new(500, 1_000).with_fixed(1, 2, 3),
        ]);
        assert_eq!(acc.validate(), Ok(()));
    }

    #[test]
    fn test_inverted_domain_rejected() {
        let mut acc = accuracy(vec![MeasurementAccuracyRange::new(0, 10)]);
        acc.min_measured_value = 5_000;
        assert_eq!(
            acc.validate(),
            Err(AccuracyError::InvertedDomain(MeasurementType::Voltage))
        );
    }

    #[test]
    fn test_empty_ranges_rejected() {
        assert_eq!(
            accuracy(vec![]).validate(),
            Err(AccuracyError::NoRanges(MeasurementType::Voltage))
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let acc = accuracy(vec![MeasurementAccuracyRange::new(10, 0)]);
        assert_eq!(
            acc.validate(),
            Err(AccuracyError::InvertedRange(MeasurementType::Voltage, 0))
        );
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let acc = accuracy(vec![
            MeasurementAccuracyRange::new(0, 500),
            MeasurementAccuracyRange::new(500, 1_000),
        ]);
        assert_eq!(
            acc.validate(),
            Err(AccuracyError::OverlappingRanges(MeasurementType::Voltage, 0, 1))
        );
    }

    #[test]
    fn test_matter_epoch_conversion() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_matter_epoch_secs(epoch), Some(0));

        let later = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(to_matter_epoch_secs(later), Some(86_400));

        let before = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(to_matter_epoch_secs(before), None);
    }

    #[test]
    fn test_range_with_timestamps() {
        let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 1, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2000, 1, 1, 0, 2, 0).unwrap();
        let range = MeasurementRange::new(MeasurementType::ActivePower, -5, 5)
            .with_timestamps(start, end);
        assert_eq!(range.start_timestamp, Some(60));
        assert_eq!(range.end_timestamp, Some(120));
        assert_eq!(range.min_systime, None);
    }

    #[test]
    fn test_measurement_type_from_repr() {
        assert_eq!(MeasurementType::from_repr(2), Some(MeasurementType::ActiveCurrent));
        assert_eq!(MeasurementType::from_repr(17), None);
        assert_eq!(MeasurementType::RmsVoltage.to_string(), "RMSVoltage");
        assert_eq!(PowerMode::from_repr(2), Some(PowerMode::Ac));
    }
}
