//! BridgedDeviceBasicInformation Cluster (0x0039) handler.
//!
//! Exposes a [`BridgedDevice`]'s reachability, display name and descriptive
//! attributes. Controllers like Home Assistant read NodeLabel to display
//! bridged device names.

use super::{AttributeReport, AttributeValue, ClusterError};
use crate::device::BridgedDevice;
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

/// Matter Cluster ID for BridgedDeviceBasicInformation
pub const CLUSTER_ID: u32 = 0x0039;

/// Attribute IDs served for bridged devices
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr, Display, EnumIter)]
#[repr(u32)]
pub enum BridgedDeviceBasicInfoAttribute {
    VendorName = 0x0001,
    #[strum(serialize = "VendorID")]
    VendorId = 0x0002,
    ProductName = 0x0003,
    #[strum(serialize = "ProductID")]
    ProductId = 0x0004,
    NodeLabel = 0x0005,
    HardwareVersion = 0x0007,
    SoftwareVersion = 0x0009,
    Reachable = 0x0011,
    #[strum(serialize = "UniqueID")]
    UniqueId = 0x0012,
}

/// Handler for BridgedDeviceBasicInformation cluster.
///
/// Borrows the device so every read reflects its current state.
#[derive(Clone, Copy, Debug)]
pub struct BridgedHandler<'a> {
    device: &'a BridgedDevice,
}

impl<'a> BridgedHandler<'a> {
    pub const fn new(device: &'a BridgedDevice) -> Self {
        Self { device }
    }

    /// Read an attribute by raw id.
    pub fn read_id(&self, attribute_id: u32) -> Result<AttributeValue, ClusterError> {
        let attribute = BridgedDeviceBasicInfoAttribute::from_repr(attribute_id)
            .ok_or(ClusterError::UnsupportedAttribute {
                cluster_id: CLUSTER_ID,
                attribute_id,
            })?;
        self.read(attribute)
    }

    /// Read an attribute. Descriptive attributes that were never set are unsupported.
    pub fn read(
        &self,
        attribute: BridgedDeviceBasicInfoAttribute,
    ) -> Result<AttributeValue, ClusterError> {
        use BridgedDeviceBasicInfoAttribute as Attr;

        let attrs = self.device.attributes();
        let value = match attribute {
            Attr::Reachable => Some(AttributeValue::Bool(self.device.is_reachable())),
            Attr::NodeLabel => Some(AttributeValue::Text(self.device.name().to_owned())),
            // Fall back to the node id so every bridged device has a stable identifier
            Attr::UniqueId => Some(AttributeValue::Text(
                attrs
                    .unique_id
                    .clone()
                    .unwrap_or_else(|| format!("{:016X}", self.device.node_id())),
            )),
            Attr::VendorName => attrs.vendor_name.clone().map(AttributeValue::Text),
            Attr::VendorId => attrs.vendor_id.map(|v| AttributeValue::Unsigned(v.into())),
            Attr::ProductName => attrs.product_name.clone().map(AttributeValue::Text),
            Attr::ProductId => attrs.product_id.map(|v| AttributeValue::Unsigned(v.into())),
            Attr::HardwareVersion => attrs
                .hardware_version
                .map(|v| AttributeValue::Unsigned(v.into())),
            Attr::SoftwareVersion => attrs
                .software_version
                .map(|v| AttributeValue::Unsigned(v.into())),
        };

        value.ok_or(ClusterError::UnsupportedAttribute {
            cluster_id: CLUSTER_ID,
            attribute_id: attribute as u32,
        })
    }

    /// Read every attribute the device currently provides, in id order.
    pub fn snapshot(&self) -> Vec<AttributeReport> {
        BridgedDeviceBasicInfoAttribute::iter()
            .filter_map(|attribute| {
                self.read(attribute).ok().map(|value| AttributeReport {
                    id: attribute as u32,
                    name: attribute.to_string(),
                    value,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::BridgedAttributes;

    #[test]
    fn test_reachable_tracks_device() {
        let mut device = BridgedDevice::new(42);
        assert_eq!(
            BridgedHandler::new(&device).read(BridgedDeviceBasicInfoAttribute::Reachable),
            Ok(AttributeValue::Bool(false))
        );

        device.set_reachable(true);
        assert_eq!(
            BridgedHandler::new(&device).read(BridgedDeviceBasicInfoAttribute::Reachable),
            Ok(AttributeValue::Bool(true))
        );
    }

    #[test]
    fn test_node_label_is_device_name() {
        let mut device = BridgedDevice::new(42);
        device.set_name("Heat Pump");
        assert_eq!(
            BridgedHandler::new(&device).read_id(0x0005),
            Ok(AttributeValue::Text("Heat Pump".into()))
        );
    }

    #[test]
    fn test_unique_id_falls_back_to_node_id() {
        let mut device = BridgedDevice::new(0xABCD);
        assert_eq!(
            BridgedHandler::new(&device).read(BridgedDeviceBasicInfoAttribute::UniqueId),
            Ok(AttributeValue::Text("000000000000ABCD".into()))
        );

        device.set_attributes(BridgedAttributes {
            unique_id: Some("meter-7".into()),
            ..Default::default()
        });
        assert_eq!(
            BridgedHandler::new(&device).read(BridgedDeviceBasicInfoAttribute::UniqueId),
            Ok(AttributeValue::Text("meter-7".into()))
        );
    }

    #[test]
    fn test_unset_attributes_unsupported() {
        let device = BridgedDevice::new(1);
        let handler = BridgedHandler::new(&device);
        assert_eq!(
            handler.read(BridgedDeviceBasicInfoAttribute::VendorName),
            Err(ClusterError::UnsupportedAttribute {
                cluster_id: CLUSTER_ID,
                attribute_id: 0x0001,
            })
        );
        assert!(handler.read_id(0x0006).is_err());

        let names: Vec<String> = handler.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["NodeLabel", "Reachable", "UniqueID"]);
    }

    #[test]
    fn test_descriptive_attributes() {
        let mut device = BridgedDevice::new(1);
        device.set_attributes(BridgedAttributes {
            vendor_name: Some("Shelly".into()),
            vendor_id: Some(0xFFF1),
            product_name: Some("Plus Plug S".into()),
            product_id: Some(0x8002),
            hardware_version: Some(2),
            software_version: Some(10_200),
            ..Default::default()
        });
        let handler = BridgedHandler::new(&device);
        assert_eq!(
            handler.read(BridgedDeviceBasicInfoAttribute::VendorId),
            Ok(AttributeValue::Unsigned(0xFFF1))
        );
        assert_eq!(
            handler.read(BridgedDeviceBasicInfoAttribute::ProductName),
            Ok(AttributeValue::Text("Plus Plug S".into()))
        );
        assert_eq!(handler.snapshot().len(), 9);
    }
}
