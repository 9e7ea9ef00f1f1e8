//! `kubevirt.hooks.v1alpha1` callback messages

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

include!(concat!(env!("OUT_DIR"), "/kubevirt.hooks.v1alpha1.Callbacks.rs"));
