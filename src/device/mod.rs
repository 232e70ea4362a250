//! Bridged device state.

pub mod bridged_device;

pub use bridged_device::{
    BridgedAttributes, BridgedDevice, DEVICE_NAME_CAPACITY, INVALID_ENDPOINT_ID, NoticeSink,
    StatusNotice,
};
