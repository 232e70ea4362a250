//! Bridged device proxy state.
//!
//! A `BridgedDevice` stands in for a node that does not speak Matter itself.
//! It tracks identity, reachability and a bounded display name, and emits an
//! operator-facing status notice on every reachability or name update.

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Endpoint id meaning "not assigned yet".
pub const INVALID_ENDPOINT_ID: u16 = 0xFFFF;

/// Maximum display name length in bytes.
pub const DEVICE_NAME_CAPACITY: usize = 31;

/// Bounded display name storage.
pub type DeviceName = heapless::String<DEVICE_NAME_CAPACITY>;

/// Callback receiving every status notice a device emits.
pub type NoticeSink = Arc<dyn Fn(&StatusNotice) + Send + Sync>;

/// Status line emitted by a bridged device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StatusNotice {
    Online { name: String },
    Offline { name: String },
    Renamed { old: String, new: String },
}

impl fmt::Display for StatusNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusNotice::Online { name } => write!(f, "BridgedDevice[{name}]: ONLINE"),
            StatusNotice::Offline { name } => write!(f, "BridgedDevice[{name}]: OFFLINE"),
            StatusNotice::Renamed { old, new } => {
                write!(f, "BridgedDevice[{old}]: New Name=\"{new}\"")
            }
        }
    }
}

/// Descriptive attributes of the bridged node.
///
/// Exposed through the BridgedDeviceBasicInformation cluster. Every field is
/// optional; unset fields are reported as unsupported.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BridgedAttributes {
    pub unique_id: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_name: Option<String>,
    pub product_id: Option<u16>,
    pub hardware_version: Option<u16>,
    pub software_version: Option<u32>,
}

/// Local proxy for one bridged device.
pub struct BridgedDevice {
    node_id: u64,
    reachable: bool,
    endpoint_id: u16,
    parent_endpoint_id: u16,
    name: DeviceName,
    attributes: BridgedAttributes,
    notice_sink: Option<NoticeSink>,
}

impl BridgedDevice {
    /// Create an unreachable, unnamed device for the given node.
    pub fn new(node_id: u64) -> Self {
        Self {
            node_id,
            reachable: false,
            endpoint_id: INVALID_ENDPOINT_ID,
            parent_endpoint_id: INVALID_ENDPOINT_ID,
            name: DeviceName::new(),
            attributes: BridgedAttributes::default(),
            notice_sink: None,
        }
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Update reachability.
    ///
    /// Always emits a notice, including when the value does not change.
    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;

        let name = self.name.as_str().to_owned();
        let notice = if reachable {
            StatusNotice::Online { name }
        } else {
            StatusNotice::Offline { name }
        };
        self.emit(notice);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name, truncating it to [`DEVICE_NAME_CAPACITY`] bytes.
    ///
    /// Truncation never splits a UTF-8 character. The rename notice carries the
    /// name as supplied. Returns the number of bytes stored.
    pub fn set_name(&mut self, name: &str) -> usize {
        let old = self.name.as_str().to_owned();
        let stored = truncate_to_char_boundary(name, DEVICE_NAME_CAPACITY);

        self.name.clear();
        // Cannot fail: `stored` fits the capacity.
        let _ = self.name.push_str(stored);

        self.emit(StatusNotice::Renamed {
            old,
            new: name.to_owned(),
        });
        stored.len()
    }

    pub fn endpoint_id(&self) -> u16 {
        self.endpoint_id
    }

    pub fn set_endpoint_id(&mut self, endpoint_id: u16) {
        self.endpoint_id = endpoint_id;
    }

    /// Whether the device has been given an endpoint.
    pub fn has_endpoint(&self) -> bool {
        self.endpoint_id != INVALID_ENDPOINT_ID
    }

    pub fn parent_endpoint_id(&self) -> u16 {
        self.parent_endpoint_id
    }

    pub fn set_parent_endpoint_id(&mut self, endpoint_id: u16) {
        self.parent_endpoint_id = endpoint_id;
    }

    pub fn attributes(&self) -> &BridgedAttributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: BridgedAttributes) {
        self.attributes = attributes;
    }

    /// Register a callback that receives every status notice.
    pub fn set_notice_sink(&mut self, sink: NoticeSink) {
        self.notice_sink = Some(sink);
    }

    fn emit(&self, notice: StatusNotice) {
        info!("{}", notice);
        if let Some(sink) = &self.notice_sink {
            sink(&notice);
        }
    }
}

impl fmt::Debug for BridgedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgedDevice")
            .field("node_id", &self.node_id)
            .field("reachable", &self.reachable)
            .field("endpoint_id", &self.endpoint_id)
            .field("parent_endpoint_id", &self.parent_endpoint_id)
            .field("name", &self.name.as_str())
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Longest prefix of `s` that fits in `max` bytes and ends on a char boundary.
fn truncate_to_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
