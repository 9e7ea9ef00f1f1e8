//! Libvirt domain descriptor
//!
//! The descriptor is kept as a generic XML tree so that every element the
//! supervisor generated survives a decode/encode cycle, including ones this
//! crate knows nothing about. Only the parts the hook touches are given
//! typed accessors.

pub mod hostdev;
pub mod xml;

pub use hostdev::UsbHostDevice;
pub use xml::{Document, Element, Node, XmlError};

use thiserror::Error;

const DOMAIN_ELEMENT: &str = "domain";
const DEVICES_ELEMENT: &str = "devices";

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain XML is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed domain XML: {0}")]
    Xml(#[from] XmlError),

    #[error("expected <domain> root element, found <{0}>")]
    UnexpectedRoot(String),
}

/// A decoded `<domain>` definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDescriptor {
    document: Document,
}

impl DomainDescriptor {
    pub fn decode(bytes: &[u8]) -> Result<Self, DomainError> {
        let document = Document::parse(std::str::from_utf8(bytes)?)?;

        let root = &document.root().name;
        if root != DOMAIN_ELEMENT {
            return Err(DomainError::UnexpectedRoot(root.clone()));
        }

        Ok(Self { document })
    }

    pub fn encode(&self) -> Result<Vec<u8>, DomainError> {
        Ok(self.document.to_bytes()?)
    }

    pub fn name(&self) -> Option<String> {
        self.document.root().child("name").map(Element::text)
    }

    pub fn devices(&self) -> Option<&Element> {
        self.document.root().child(DEVICES_ELEMENT)
    }

    /// Existing USB passthrough entries addressed by bus/device
    pub fn usb_host_devices(&self) -> Vec<UsbHostDevice> {
        self.devices()
            .map(|devices| {
                devices
                    .children_named(hostdev::HOSTDEV_ELEMENT)
                    .filter_map(UsbHostDevice::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a passthrough entry as the last device, creating `<devices>`
    /// if the definition has none.
    pub fn append_host_device(&mut self, hostdev: UsbHostDevice) {
        let root = self.document.root_mut();
        match root.child_mut(DEVICES_ELEMENT) {
            Some(devices) => devices.push_child(hostdev.to_element()),
            None => root.push_child(Element::new(DEVICES_ELEMENT).with_child(hostdev.to_element())),
        }
    }
}
