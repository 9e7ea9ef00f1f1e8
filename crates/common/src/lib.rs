//! Common utilities for usbredir-hook
//!
//! This crate provides the leaf types shared by the hook and its tests:
//! USB identifier parsing, the host device value type, error handling,
//! logging setup, and test fixtures.

pub mod error;
pub mod logging;
pub mod test_utils;
pub mod usb_types;

pub use error::{Error, Result};
pub use logging::{LogFormat, setup_logging};
pub use usb_types::{HostUsbDevice, ParseIdError, VendorProduct};
