//! `kubevirt.hooks.v1alpha2` callback messages
//!
//! Same domain-definition shapes as v1alpha1, plus the pre-cloud-init ISO
//! callback.

/// Domain-definition callback request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OnDefineDomainParams {
    /// Libvirt domain XML generated by the supervisor
    #[prost(bytes = "vec", tag = "1")]
    pub domain_xml: Vec<u8>,
    /// JSON-encoded VirtualMachineInstance
    #[prost(bytes = "vec", tag = "2")]
    pub vmi: Vec<u8>,
}

/// Domain-definition callback response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OnDefineDomainResult {
    #[prost(bytes = "vec", tag = "1")]
    pub domain_xml: Vec<u8>,
}

/// Pre-cloud-init ISO callback request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreCloudInitIsoParams {
    /// JSON-encoded cloud-init data
    #[prost(bytes = "vec", tag = "1")]
    pub cloud_init_data: Vec<u8>,
    /// JSON-encoded VirtualMachineInstance
    #[prost(bytes = "vec", tag = "2")]
    pub vmi: Vec<u8>,
    /// JSON-encoded NoCloud source
    #[prost(bytes = "vec", tag = "3")]
    pub cloud_init_no_cloud_source: Vec<u8>,
}

/// Pre-cloud-init ISO callback response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreCloudInitIsoResult {
    #[prost(bytes = "vec", tag = "1")]
    pub cloud_init_data: Vec<u8>,
}

include!(concat!(env!("OUT_DIR"), "/kubevirt.hooks.v1alpha2.Callbacks.rs"));
