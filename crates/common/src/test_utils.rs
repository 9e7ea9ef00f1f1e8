//! Test utilities for usbredir-hook
//!
//! Provides fixtures and helper functions for testing across crates.
//!
//! # Example
//!
//! ```
//! use common::test_utils::{create_mock_host_device, vmi_json};
//!
//! let device = create_mock_host_device(2, 5, 0x1234, 0xbeef);
//! assert_eq!(device.bus_number, 2);
//!
//! let vmi = vmi_json(&[("usbredir.vm.kubevirt.io/vendorProduct", "1234:beef")]);
//! assert!(!vmi.is_empty());
//! ```

use crate::HostUsbDevice;
use std::future::Future;
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Annotation key used by the fixtures
pub const VENDOR_PRODUCT_ANNOTATION: &str = "usbredir.vm.kubevirt.io/vendorProduct";

/// A domain definition shaped like the ones virt-launcher generates
pub const SAMPLE_DOMAIN_XML: &str = r#"<domain type="kvm" xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0">
  <name>default_testvmi</name>
  <uuid>5f4a2c1e-7d3b-4b8e-9a61-2f0c8e6d1b7a</uuid>
  <memory unit="b">134217728</memory>
  <os>
    <type arch="x86_64" machine="q35">hvm</type>
  </os>
  <devices>
    <interface type="ethernet">
      <source></source>
      <model type="virtio-non-transitional"></model>
    </interface>
    <controller type="usb" index="0" model="qemu-xhci"></controller>
    <disk device="disk" type="file">
      <source file="/var/run/kubevirt-ephemeral-disks/disk-data/containerdisk/disk.qcow2"></source>
      <target bus="virtio" dev="vda"></target>
      <driver cache="none" error_policy="stop" name="qemu" type="qcow2"></driver>
      <alias name="ua-containerdisk"></alias>
    </disk>
    <serial type="unix">
      <target port="0"></target>
      <source mode="bind" path="/var/run/kubevirt-private/serial0"></source>
    </serial>
  </devices>
  <metadata>
    <kubevirt xmlns="http://kubevirt.io">
      <uid>5f4a2c1e-7d3b-4b8e-9a61-2f0c8e6d1b7a</uid>
      <note>quotes &quot;escaped&quot; &amp; kept</note>
    </kubevirt>
  </metadata>
  <qemu:commandline>
    <qemu:arg value="-chardev"></qemu:arg>
  </qemu:commandline>
</domain>"#;

/// Build a JSON-encoded VirtualMachineInstance carrying `annotations`
pub fn vmi_json(annotations: &[(&str, &str)]) -> Vec<u8> {
    let annotations: serde_json::Map<String, serde_json::Value> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();

    serde_json::json!({
        "apiVersion": "kubevirt.io/v1",
        "kind": "VirtualMachineInstance",
        "metadata": {
            "name": "testvmi",
            "namespace": "default",
            "annotations": annotations,
        },
        "spec": {
            "domain": {
                "devices": {},
                "resources": { "requests": { "memory": "128Mi" } }
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// JSON-encoded VirtualMachineInstance requesting `vendor_product`
pub fn vmi_json_requesting(vendor_product: &str) -> Vec<u8> {
    vmi_json(&[(VENDOR_PRODUCT_ANNOTATION, vendor_product)])
}

/// Create a mock HostUsbDevice for testing
///
/// # Example
/// ```
/// use common::test_utils::create_mock_host_device;
///
/// let device = create_mock_host_device(1, 3, 0x046d, 0xc52b);
/// assert_eq!(device.vendor_id, 0x046d);
/// assert_eq!(device.device_address, 3);
/// ```
pub fn create_mock_host_device(
    bus_number: u8,
    device_address: u8,
    vendor_id: u16,
    product_id: u16,
) -> HostUsbDevice {
    HostUsbDevice {
        bus_number,
        device_address,
        vendor_id,
        product_id,
        manufacturer: Some(format!("Test Manufacturer {:04x}", vendor_id)),
        product: Some(format!("Test Product {:04x}", product_id)),
    }
}

/// Run a future with a timeout, failing with a message if it elapses
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| format!("operation timed out after {:?}", duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vmi_json_contains_annotation() {
        let vmi = vmi_json_requesting("1234:beef");
        let value: serde_json::Value = serde_json::from_slice(&vmi).unwrap();
        assert_eq!(
            value["metadata"]["annotations"][VENDOR_PRODUCT_ANNOTATION],
            "1234:beef"
        );
    }

    #[test]
    fn test_vmi_json_without_annotations() {
        let value: serde_json::Value = serde_json::from_slice(&vmi_json(&[])).unwrap();
        assert!(
            value["metadata"]["annotations"]
                .as_object()
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_with_timeout_elapses() {
        let result = with_timeout(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(1)),
        )
        .await;
        assert!(result.is_err());
    }
}
