//! Domain mutation for the define-domain callback
//!
//! Reads the vendor/product selection from the VMI annotations, looks the
//! device up on the host, and appends a USB passthrough entry to the domain.
//! Every failure past VMI decoding falls back to the original domain bytes:
//! the supervisor must always get a domain back.

use crate::domain::{DomainDescriptor, DomainError, UsbHostDevice};
use crate::usb::{DeviceMatcher, MatchError};
use crate::vmi::VirtualMachineInstance;
use common::{HostUsbDevice, ParseIdError, VendorProduct};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Span, debug, error, info, warn};

/// Annotation carrying `"<vendor-hex>:<product-hex>"`
pub const VENDOR_PRODUCT_ANNOTATION: &str = "usbredir.vm.kubevirt.io/vendorProduct";

/// Conditions under which the hook cannot serve any request correctly
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("failed to decode VMI spec: {0}")]
    InvalidVmi(#[source] serde_json::Error),
}

/// Reasons a requested device was not attached; the domain is returned
/// unchanged in every case
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("malformed '{annotation}' annotation: {source}")]
    MalformedAnnotation {
        annotation: String,
        #[source]
        source: ParseIdError,
    },

    #[error("no attached USB device matches {0}")]
    NoMatchingDevice(VendorProduct),

    #[error(transparent)]
    Enumeration(#[from] MatchError),

    #[error("failed to decode domain XML: {0}")]
    DecodeDomain(#[source] DomainError),

    #[error("failed to encode updated domain XML: {0}")]
    EncodeDomain(#[source] DomainError),
}

pub struct DomainMutator {
    matcher: Arc<dyn DeviceMatcher>,
    annotation: String,
}

impl DomainMutator {
    pub fn new(matcher: Arc<dyn DeviceMatcher>) -> Self {
        Self {
            matcher,
            annotation: VENDOR_PRODUCT_ANNOTATION.to_string(),
        }
    }

    /// Read the selection from a different annotation key
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Produce the domain XML to hand back to the supervisor
    ///
    /// Only an undecodable VMI is an error; everything else resolves to
    /// either the updated or the original domain.
    pub async fn on_define_domain(
        &self,
        vmi_json: &[u8],
        domain_xml: &[u8],
    ) -> Result<Vec<u8>, FatalError> {
        let vmi = VirtualMachineInstance::from_json(vmi_json).map_err(|e| {
            error!(
                "Failed to unmarshal given VMI spec: {}",
                String::from_utf8_lossy(vmi_json)
            );
            FatalError::InvalidVmi(e)
        })?;

        Span::current().record("vmi", vmi.display_name().as_str());

        let Some(selection) = vmi.annotation(&self.annotation) else {
            info!(
                "No '{}' annotation provided, returning original domain spec",
                self.annotation
            );
            return Ok(domain_xml.to_vec());
        };

        info!("Got annotation {}: {}", self.annotation, selection);

        match self.attach(selection, domain_xml).await {
            Ok(updated) => {
                info!("Successfully updated original domain spec with requested device");
                Ok(updated)
            }
            Err(e) => {
                warn!("{}, returning original domain spec", e);
                Ok(domain_xml.to_vec())
            }
        }
    }

    async fn attach(&self, selection: &str, domain_xml: &[u8]) -> Result<Vec<u8>, MutationError> {
        let id: VendorProduct =
            selection
                .parse()
                .map_err(|source| MutationError::MalformedAnnotation {
                    annotation: self.annotation.clone(),
                    source,
                })?;

        let device = self.find_first(id).await?;
        info!(
            "Attaching {} at bus {} device {}",
            device.describe(),
            device.bus_number,
            device.device_address
        );

        let mut domain = DomainDescriptor::decode(domain_xml).map_err(MutationError::DecodeDomain)?;
        domain.append_host_device(UsbHostDevice::from(&device));
        domain.encode().map_err(MutationError::EncodeDomain)
    }

    /// First matching device in enumeration order
    async fn find_first(&self, id: VendorProduct) -> Result<HostUsbDevice, MutationError> {
        let matcher = Arc::clone(&self.matcher);
        let span = Span::current();

        let devices = tokio::task::spawn_blocking(move || span.in_scope(|| matcher.find_devices(id)))
            .await
            .map_err(|e| MatchError::Task(e.to_string()))??;

        if devices.len() > 1 {
            debug!("{} devices match {}, using the first", devices.len(), id);
        }

        devices
            .into_iter()
            .next()
            .ok_or(MutationError::NoMatchingDevice(id))
    }
}
