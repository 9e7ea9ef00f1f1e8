//! usbredir-hook
//!
//! A KubeVirt hook sidecar that passes a host USB device through to a VM.
//! When the supervisor defines the domain, the hook reads a
//! `<vendor>:<product>` annotation from the VMI, finds the matching device on
//! the host, and adds a USB `<hostdev>` entry to the libvirt domain XML.
//!
//! Components, leaf first:
//! - [`usb`]: finds attached devices by vendor/product id
//! - [`domain`]: decodes, extends and re-encodes the domain XML
//! - [`mutator`]: the define-domain decision logic
//! - [`callbacks`]: per-version gRPC adapters over the mutator
//! - [`info`]: capability negotiation

pub mod callbacks;
pub mod config;
pub mod domain;
pub mod info;
pub mod listener;
pub mod mutator;
pub mod server;
pub mod shutdown;
pub mod usb;
pub mod vmi;

pub use callbacks::CallbackDispatcher;
pub use config::HookConfig;
pub use info::InfoService;
pub use mutator::{DomainMutator, VENDOR_PRODUCT_ANNOTATION};
pub use server::HookServer;
