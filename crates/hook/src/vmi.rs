//! The slice of a VirtualMachineInstance the hook reads
//!
//! Only object metadata is modelled; the rest of the object is ignored on
//! decode.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VirtualMachineInstance {
    #[serde(default)]
    pub metadata: Option<ObjectMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl VirtualMachineInstance {
    /// A JSON `null` document or `null` metadata decodes as an object
    /// without metadata
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Option<Self>>(bytes).map(Option::unwrap_or_default)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.annotations.as_ref())
            .and_then(|annotations| annotations.get(key))
            .map(String::as_str)
    }

    /// `namespace/name`, for log context
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.metadata
                .as_ref()
                .and_then(|m| m.namespace.as_deref())
                .unwrap_or("-"),
            self.metadata
                .as_ref()
                .and_then(|m| m.name.as_deref())
                .unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::{VENDOR_PRODUCT_ANNOTATION, vmi_json, vmi_json_requesting};

    #[test]
    fn test_reads_annotation() {
        let vmi = VirtualMachineInstance::from_json(&vmi_json_requesting("1234:beef")).unwrap();
        assert_eq!(vmi.annotation(VENDOR_PRODUCT_ANNOTATION), Some("1234:beef"));
        assert_eq!(vmi.display_name(), "default/testvmi");
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let vmi = VirtualMachineInstance::from_json(br#"{"spec":{}}"#).unwrap();
        assert_eq!(vmi.annotation(VENDOR_PRODUCT_ANNOTATION), None);
        assert_eq!(vmi.display_name(), "-/-");
    }

    #[test]
    fn test_null_metadata_and_null_document() {
        for json in [&br#"{"metadata":null}"#[..], b"null", br#"{"metadata":{"annotations":null}}"#] {
            let vmi = VirtualMachineInstance::from_json(json).unwrap();
            assert_eq!(vmi.annotation(VENDOR_PRODUCT_ANNOTATION), None);
            assert_eq!(vmi.display_name(), "-/-");
        }
    }

    #[test]
    fn test_absent_annotation() {
        let vmi = VirtualMachineInstance::from_json(&vmi_json(&[("other", "x")])).unwrap();
        assert_eq!(vmi.annotation(VENDOR_PRODUCT_ANNOTATION), None);
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(VirtualMachineInstance::from_json(b"not json").is_err());
        assert!(VirtualMachineInstance::from_json(br#"{"metadata":{"annotations":{"k":1}}}"#).is_err());
    }
}
