//! Virtual Energy Bridge library.
//!
//! Exposes electrical power measurements and bridged device state through a
//! Matter-style attribute model. Wire encoding and transport are left to the
//! surrounding Matter stack.

pub mod config;
pub mod device;
pub mod error;
pub mod matter;
pub mod measurement;
