//! Shared fixtures for the hook integration tests

#![allow(dead_code)]

use common::{HostUsbDevice, VendorProduct};
use hook::usb::{DeviceMatcher, MatchError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory stand-in for the host USB bus
///
/// Filters a fixed device list by id, or fails every lookup when
/// constructed with [`FakeMatcher::failing`]. Counts lookups so tests can
/// assert that enumeration did or did not happen.
pub struct FakeMatcher {
    devices: Vec<HostUsbDevice>,
    fail: bool,
    calls: AtomicUsize,
    requested: Mutex<Vec<VendorProduct>>,
}

impl FakeMatcher {
    pub fn with_devices(devices: Vec<HostUsbDevice>) -> Self {
        Self {
            devices,
            fail: false,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_devices(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<VendorProduct> {
        self.requested.lock().unwrap().clone()
    }
}

impl DeviceMatcher for FakeMatcher {
    fn find_devices(&self, id: VendorProduct) -> Result<Vec<HostUsbDevice>, MatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(id);

        if self.fail {
            return Err(MatchError::Enumerate(rusb::Error::Access));
        }

        Ok(self
            .devices
            .iter()
            .filter(|d| id.matches(d.vendor_id, d.product_id))
            .cloned()
            .collect())
    }
}

/// Every element name in document order, for superset checks
pub fn element_names(xml: &[u8]) -> Vec<String> {
    let doc = hook::domain::Document::parse(std::str::from_utf8(xml).unwrap()).unwrap();
    let mut names = Vec::new();
    collect_names(doc.root(), &mut names);
    names
}

fn collect_names(element: &hook::domain::Element, names: &mut Vec<String>) {
    names.push(element.name.clone());
    for child in &element.children {
        if let hook::domain::Node::Element(child) = child {
            collect_names(child, names);
        }
    }
}
