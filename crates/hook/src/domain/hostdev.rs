//! USB host-device passthrough entries
//!
//! ```xml
//! <hostdev mode="subsystem" type="usb">
//!   <source>
//!     <address bus="2" device="5"/>
//!   </source>
//! </hostdev>
//! ```

use super::xml::Element;
use common::HostUsbDevice;

pub const HOSTDEV_ELEMENT: &str = "hostdev";

/// A `<hostdev>` entry passing a host USB device through by bus/address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbHostDevice {
    pub bus: u32,
    pub device: u32,
}

impl UsbHostDevice {
    pub fn new(bus: u32, device: u32) -> Self {
        Self { bus, device }
    }

    pub fn to_element(&self) -> Element {
        Element::new(HOSTDEV_ELEMENT)
            .with_attribute("mode", "subsystem")
            .with_attribute("type", "usb")
            .with_child(
                Element::new("source").with_child(
                    Element::new("address")
                        .with_attribute("bus", self.bus.to_string())
                        .with_attribute("device", self.device.to_string()),
                ),
            )
    }

    /// Read an address-based USB entry back; other hostdev kinds yield `None`
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.name != HOSTDEV_ELEMENT
            || element.attribute("mode") != Some("subsystem")
            || element.attribute("type") != Some("usb")
        {
            return None;
        }

        let address = element.child("source")?.child("address")?;
        Some(Self {
            bus: address.attribute("bus")?.trim().parse().ok()?,
            device: address.attribute("device")?.trim().parse().ok()?,
        })
    }
}

impl From<&HostUsbDevice> for UsbHostDevice {
    fn from(device: &HostUsbDevice) -> Self {
        Self::new(device.bus_number.into(), device.device_address.into())
    }
}
