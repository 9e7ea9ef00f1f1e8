//! Host USB device matching
//!
//! Enumeration is stateless: every lookup builds its own libusb context,
//! opens only the devices it matches, and drops all of it before returning.
//! Nothing is cached between callbacks.

pub mod device;
pub mod matcher;

pub use device::{describe_device, list_host_devices};
pub use matcher::{DeviceMatcher, MatchError, RusbMatcher};
