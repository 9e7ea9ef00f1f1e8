//! Hook API version management

use crate::error::{ProtocolError, Result};
use std::fmt;
use std::str::FromStr;

/// Hook point name for the domain-definition callback
pub const ON_DEFINE_DOMAIN_HOOK_POINT: &str = "OnDefineDomain";

/// Hook point name for the pre-cloud-init ISO callback (v1alpha2 only)
pub const PRE_CLOUD_INIT_ISO_HOOK_POINT: &str = "PreCloudInitIso";

/// Hook API versions implemented by this sidecar
pub const SUPPORTED_VERSIONS: [HookVersion; 2] = [HookVersion::V1Alpha1, HookVersion::V1Alpha2];

/// Hook API version selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookVersion {
    V1Alpha1,
    V1Alpha2,
}

impl HookVersion {
    /// Wire name of the version, as advertised by the Info service
    pub fn as_str(&self) -> &'static str {
        match self {
            HookVersion::V1Alpha1 => "v1alpha1",
            HookVersion::V1Alpha2 => "v1alpha2",
        }
    }
}

impl fmt::Display for HookVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookVersion {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        SUPPORTED_VERSIONS
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ProtocolError::UnsupportedVersion {
                requested: s.to_string(),
                supported: SUPPORTED_VERSIONS
                    .iter()
                    .map(HookVersion::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
