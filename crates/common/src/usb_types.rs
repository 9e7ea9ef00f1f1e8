//! USB identifier and device value types
//!
//! [`VendorProduct`] is the device-selection intent carried by the VMI
//! annotation, and [`HostUsbDevice`] is what enumeration reports back about a
//! physically attached device.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a `<vendor>:<product>` string cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("expected '<vendor>:<product>', got '{0}'")]
    MissingSeparator(String),

    #[error("invalid {field} id '{value}': {source}")]
    InvalidHex {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// USB vendor/product identifier pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorProduct {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl VendorProduct {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Whether a device descriptor with these ids is the requested model
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl fmt::Display for VendorProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

impl FromStr for VendorProduct {
    type Err = ParseIdError;

    /// Parse `"<vendor-hex>:<product-hex>"`, e.g. `"1234:beef"` or
    /// `"0x1234:0xBEEF"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vendor, product) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ParseIdError::MissingSeparator(s.to_string()))?;

        Ok(Self {
            vendor_id: parse_hex_id(vendor, "vendor")?,
            product_id: parse_hex_id(product, "product")?,
        })
    }
}

fn parse_hex_id(raw: &str, field: &'static str) -> Result<u16, ParseIdError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    // from_str_radix accepts a leading '+', which is not a hex id
    let digits = if digits.starts_with('+') { "" } else { digits };

    u16::from_str_radix(digits, 16).map_err(|source| ParseIdError::InvalidHex {
        field,
        value: raw.to_string(),
        source,
    })
}

/// A USB device attached to the host, as seen during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUsbDevice {
    pub bus_number: u8,
    pub device_address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl HostUsbDevice {
    pub fn identifier(&self) -> VendorProduct {
        VendorProduct::new(self.vendor_id, self.product_id)
    }

    /// Human-readable name, falling back to the numeric ids
    pub fn describe(&self) -> String {
        match (&self.manufacturer, &self.product) {
            (Some(m), Some(p)) => format!("{} {}", m, p),
            (None, Some(p)) => p.clone(),
            (Some(m), None) => m.clone(),
            (None, None) => format!("Unknown device {}", self.identifier()),
        }
    }
}

impl fmt::Display for HostUsbDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bus {:03} Device {:03}: ID {} {}",
            self.bus_number,
            self.device_address,
            self.identifier(),
            self.describe()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_plain_hex() {
        let id: VendorProduct = "1234:beef".parse().unwrap();
        assert_eq!(id, VendorProduct::new(0x1234, 0xbeef));
    }

    #[test]
    fn test_parse_prefixed_and_padded() {
        let id: VendorProduct = " 0x046D:0Xc52b ".parse().unwrap();
        assert_eq!(id, VendorProduct::new(0x046d, 0xc52b));

        let id: VendorProduct = "1:2".parse().unwrap();
        assert_eq!(id, VendorProduct::new(1, 2));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert_eq!(
            "1234beef".parse::<VendorProduct>(),
            Err(ParseIdError::MissingSeparator("1234beef".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        for input in ["zzzz:beef", "1234:", ":beef", "12345:beef", "1234:beef:00", "+12:34"] {
            let err = input.parse::<VendorProduct>().unwrap_err();
            assert!(
                matches!(err, ParseIdError::InvalidHex { .. }),
                "{} should be invalid hex, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_invalid_hex_names_field() {
        let err = "1234:xyz".parse::<VendorProduct>().unwrap_err();
        assert!(err.to_string().contains("product"));
        assert!(err.to_string().contains("xyz"));
    }

    #[test]
    fn test_zero_is_literal_not_wildcard() {
        let id: VendorProduct = "0000:0000".parse().unwrap();
        assert!(id.matches(0, 0));
        assert!(!id.matches(0x1234, 0xbeef));
    }

    #[test]
    fn test_device_display() {
        let device = HostUsbDevice {
            bus_number: 2,
            device_address: 5,
            vendor_id: 0x1234,
            product_id: 0xbeef,
            manufacturer: Some("Acme".to_string()),
            product: Some("Widget".to_string()),
        };
        assert_eq!(
            device.to_string(),
            "Bus 002 Device 005: ID 1234:beef Acme Widget"
        );
    }

    #[test]
    fn test_describe_without_strings() {
        let device = HostUsbDevice {
            bus_number: 1,
            device_address: 1,
            vendor_id: 0x0bda,
            product_id: 0x8153,
            manufacturer: None,
            product: None,
        };
        assert_eq!(device.describe(), "Unknown device 0bda:8153");
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(vendor in any::<u16>(), product in any::<u16>()) {
            let id = VendorProduct::new(vendor, product);
            prop_assert_eq!(id.to_string().parse::<VendorProduct>().unwrap(), id);
        }
    }
}
