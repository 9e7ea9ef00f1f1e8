//! Capability negotiation messages (`kubevirt.hooks.info`)

/// Versions the supervisor is able to speak
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InfoParams {
    #[prost(string, repeated, tag = "1")]
    pub supported_versions: Vec<String>,
}

/// Sidecar self-description returned to the supervisor
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InfoResult {
    /// Sidecar name
    #[prost(string, tag = "1")]
    pub name: String,
    /// Hook API versions this sidecar serves
    #[prost(string, repeated, tag = "2")]
    pub versions: Vec<String>,
    /// Callback points this sidecar implements
    #[prost(message, repeated, tag = "3")]
    pub hook_points: Vec<HookPoint>,
}

/// A callback point and its ordering among peer sidecars (lower runs first)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HookPoint {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub priority: i32,
}

include!(concat!(env!("OUT_DIR"), "/kubevirt.hooks.info.Info.rs"));
