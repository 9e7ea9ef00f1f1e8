//! Wire contract for the KubeVirt hook sidecar API
//!
//! This crate defines the protobuf messages exchanged between the VM
//! supervisor (virt-launcher) and a hook sidecar, together with the tonic
//! service stubs for each API package:
//!
//! - [`info`]: capability negotiation (`kubevirt.hooks.info`)
//! - [`v1alpha1`]: domain-definition callback
//! - [`v1alpha2`]: domain-definition and pre-cloud-init callbacks
//!
//! # Example
//!
//! ```
//! use protocol::{HookVersion, info::HookPoint, ON_DEFINE_DOMAIN_HOOK_POINT};
//!
//! let version: HookVersion = "v1alpha2".parse().unwrap();
//! assert_eq!(version.as_str(), "v1alpha2");
//!
//! let point = HookPoint {
//!     name: ON_DEFINE_DOMAIN_HOOK_POINT.to_string(),
//!     priority: 0,
//! };
//! assert_eq!(point.name, "OnDefineDomain");
//! ```

pub mod error;
pub mod info;
pub mod v1alpha1;
pub mod v1alpha2;
pub mod version;

pub use error::{ProtocolError, Result};
pub use version::{
    HookVersion, ON_DEFINE_DOMAIN_HOOK_POINT, PRE_CLOUD_INIT_ISO_HOOK_POINT, SUPPORTED_VERSIONS,
};
