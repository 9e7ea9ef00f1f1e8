//! Generates the tonic service stubs for the KubeVirt hook API.
//!
//! Message types are declared by hand in `src/`, so the services are built
//! with the manual builder and no `protoc` is needed at build time.

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path(CODEC)
        .build()
}

fn on_define_domain(package: &str) -> Method {
    method(
        "on_define_domain",
        "OnDefineDomain",
        &format!("crate::{package}::OnDefineDomainParams"),
        &format!("crate::{package}::OnDefineDomainResult"),
    )
}

fn main() {
    let info = Service::builder()
        .name("Info")
        .package("kubevirt.hooks.info")
        .method(method(
            "info",
            "Info",
            "crate::info::InfoParams",
            "crate::info::InfoResult",
        ))
        .build();

    let v1alpha1 = Service::builder()
        .name("Callbacks")
        .package("kubevirt.hooks.v1alpha1")
        .method(on_define_domain("v1alpha1"))
        .build();

    let v1alpha2 = Service::builder()
        .name("Callbacks")
        .package("kubevirt.hooks.v1alpha2")
        .method(on_define_domain("v1alpha2"))
        .method(method(
            "pre_cloud_init_iso",
            "PreCloudInitIso",
            "crate::v1alpha2::PreCloudInitIsoParams",
            "crate::v1alpha2::PreCloudInitIsoResult",
        ))
        .build();

    Builder::new().compile(&[info, v1alpha1, v1alpha2]);

    println!("cargo:rerun-if-changed=build.rs");
}
