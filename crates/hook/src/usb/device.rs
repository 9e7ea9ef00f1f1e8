//! Reading host device details from libusb
//!
//! Converts rusb devices and descriptors into [`HostUsbDevice`] values,
//! reading manufacturer/product strings when a handle is available.

use super::matcher::MatchError;
use common::HostUsbDevice;
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, UsbContext};
use tracing::debug;

/// Build a [`HostUsbDevice`] from a device and its cached descriptor
///
/// String descriptors are only read when `handle` is provided; a device that
/// refuses them still yields a value with `None` strings.
pub fn describe_device<T: UsbContext>(
    device: &Device<T>,
    descriptor: &DeviceDescriptor,
    handle: Option<&DeviceHandle<T>>,
) -> HostUsbDevice {
    let (manufacturer, product) = handle
        .map(|handle| read_string_descriptors(descriptor, handle))
        .unwrap_or((None, None));

    HostUsbDevice {
        bus_number: device.bus_number(),
        device_address: device.address(),
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        manufacturer,
        product,
    }
}

/// Enumerate every device currently attached to the host
///
/// Used by the `--list-devices` mode. Devices are opened only long enough to
/// read their strings; devices that cannot be opened are still listed.
pub fn list_host_devices() -> Result<Vec<HostUsbDevice>, MatchError> {
    let context = Context::new().map_err(MatchError::Context)?;
    let devices = context.devices().map_err(MatchError::Enumerate)?;

    let mut found = Vec::with_capacity(devices.len());
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

        let handle = device.open().ok();
        found.push(describe_device(&device, &descriptor, handle.as_ref()));
    }

    Ok(found)
}

fn read_string_descriptors<T: UsbContext>(
    descriptor: &DeviceDescriptor,
    handle: &DeviceHandle<T>,
) -> (Option<String>, Option<String>) {
    let manufacturer = descriptor
        .manufacturer_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    let product = descriptor
        .product_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    (manufacturer, product)
}
