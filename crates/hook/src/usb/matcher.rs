//! Vendor/product matching against attached USB hardware

use super::device::describe_device;
use common::{HostUsbDevice, VendorProduct};
use rusb::{Context, UsbContext};
use thiserror::Error;
use tracing::{debug, info};

/// Reasons enumeration could not produce an answer
///
/// None of these are fatal to the caller; "no device matched" is not an
/// error at all and is reported as an empty list.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("failed to initialise libusb context: {0}")]
    Context(#[source] rusb::Error),

    #[error("failed to enumerate USB devices: {0}")]
    Enumerate(#[source] rusb::Error),

    #[error("failed to open device at bus {bus} address {address}: {source}")]
    Open {
        bus: u8,
        address: u8,
        #[source]
        source: rusb::Error,
    },

    #[error("device enumeration task failed: {0}")]
    Task(String),
}

/// Finds host USB devices of a given model
pub trait DeviceMatcher: Send + Sync {
    /// All attached devices whose vendor and product ids equal `id`, in
    /// enumeration order. Every resource acquired for the lookup is released
    /// before this returns.
    fn find_devices(&self, id: VendorProduct) -> Result<Vec<HostUsbDevice>, MatchError>;
}

/// libusb-backed matcher
#[derive(Debug, Default, Clone, Copy)]
pub struct RusbMatcher;

impl DeviceMatcher for RusbMatcher {
    fn find_devices(&self, id: VendorProduct) -> Result<Vec<HostUsbDevice>, MatchError> {
        let context = Context::new().map_err(MatchError::Context)?;
        let devices = context.devices().map_err(MatchError::Enumerate)?;

        // Handles stay open until the end of the lookup and are closed on
        // drop, on the error path as well.
        let mut handles = Vec::new();
        let mut matched = Vec::new();

        for device in devices.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    debug!(
                        "Skipping device at bus {} address {}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    continue;
                }
            };

            if !id.matches(descriptor.vendor_id(), descriptor.product_id()) {
                continue;
            }

            let handle = device.open().map_err(|source| MatchError::Open {
                bus: device.bus_number(),
                address: device.address(),
                source,
            })?;

            let host_device = describe_device(&device, &descriptor, Some(&handle));
            info!("Found {}", host_device);

            matched.push(host_device);
            handles.push(handle);
        }

        debug!(
            "Matched {} device(s) for {}, closing {} handle(s)",
            matched.len(),
            id,
            handles.len()
        );
        drop(handles);

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_display() {
        let err = MatchError::Open {
            bus: 2,
            address: 5,
            source: rusb::Error::Access,
        };
        let msg = err.to_string();
        assert!(msg.contains("bus 2 address 5"));
    }

    #[test]
    fn test_errors_expose_source() {
        use std::error::Error as _;

        let err = MatchError::Enumerate(rusb::Error::NoDevice);
        assert!(err.source().is_some());
        assert!(MatchError::Task("cancelled".to_string()).source().is_none());
    }
}
