//! Integration tests for the hook wire contract
//!
//! Verifies that hand-declared messages use the field numbers the supervisor
//! expects, and that the generated services are routed under the right
//! package names.

use prost::Message;
use protocol::info::{HookPoint, InfoParams, InfoResult};
use protocol::{HookVersion, ON_DEFINE_DOMAIN_HOOK_POINT, v1alpha1, v1alpha2};

mod wire_layout {
    use super::*;

    #[test]
    fn test_on_define_domain_params_field_numbers() {
        let params = v1alpha1::OnDefineDomainParams {
            domain_xml: b"<domain/>".to_vec(),
            vmi: b"{}".to_vec(),
        };

        let bytes = params.encode_to_vec();

        // field 1 (domainXML), wire type 2
        assert_eq!(bytes[0], 0x0a);
        assert_eq!(bytes[1], 9);
        assert_eq!(&bytes[2..11], b"<domain/>");
        // field 2 (vmi), wire type 2
        assert_eq!(bytes[11], 0x12);
        assert_eq!(bytes[12], 2);
        assert_eq!(&bytes[13..], b"{}");
    }

    #[test]
    fn test_v1alpha1_and_v1alpha2_share_domain_shapes() {
        let v2 = v1alpha2::OnDefineDomainParams {
            domain_xml: b"<domain type='kvm'/>".to_vec(),
            vmi: br#"{"metadata":{}}"#.to_vec(),
        };

        let v1 = v1alpha1::OnDefineDomainParams::decode(v2.encode_to_vec().as_slice())
            .expect("v1alpha2 params should decode as v1alpha1");

        assert_eq!(v1.domain_xml, v2.domain_xml);
        assert_eq!(v1.vmi, v2.vmi);
    }

    #[test]
    fn test_pre_cloud_init_iso_params_field_numbers() {
        let params = v1alpha2::PreCloudInitIsoParams {
            cloud_init_data: vec![0xaa],
            vmi: vec![0xbb],
            cloud_init_no_cloud_source: vec![0xcc],
        };

        let bytes = params.encode_to_vec();

        assert_eq!(bytes, vec![0x0a, 1, 0xaa, 0x12, 1, 0xbb, 0x1a, 1, 0xcc]);
    }

    #[test]
    fn test_info_result_decodes_hook_points() {
        let result = InfoResult {
            name: "usbredir".to_string(),
            versions: vec!["v1alpha2".to_string()],
            hook_points: vec![HookPoint {
                name: ON_DEFINE_DOMAIN_HOOK_POINT.to_string(),
                priority: 0,
            }],
        };

        let decoded = InfoResult::decode(result.encode_to_vec().as_slice()).unwrap();

        assert_eq!(decoded, result);
        assert_eq!(decoded.hook_points[0].name, "OnDefineDomain");
    }

    #[test]
    fn test_empty_info_params_decode() {
        let params = InfoParams::decode(&b""[..]).unwrap();
        assert!(params.supported_versions.is_empty());
    }
}

mod services {
    use super::*;
    use tonic::server::NamedService;
    use tonic::{Request, Response, Status};

    struct Fixed;

    #[tonic::async_trait]
    impl protocol::info::info_server::Info for Fixed {
        async fn info(&self, _request: Request<InfoParams>) -> Result<Response<InfoResult>, Status> {
            Ok(Response::new(InfoResult {
                name: "fixed".to_string(),
                versions: vec![HookVersion::V1Alpha1.to_string()],
                hook_points: Vec::new(),
            }))
        }
    }

    #[tonic::async_trait]
    impl v1alpha1::callbacks_server::Callbacks for Fixed {
        async fn on_define_domain(
            &self,
            request: Request<v1alpha1::OnDefineDomainParams>,
        ) -> Result<Response<v1alpha1::OnDefineDomainResult>, Status> {
            Ok(Response::new(v1alpha1::OnDefineDomainResult {
                domain_xml: request.into_inner().domain_xml,
            }))
        }
    }

    #[test]
    fn test_service_names() {
        assert_eq!(
            <protocol::info::info_server::InfoServer<Fixed> as NamedService>::NAME,
            "kubevirt.hooks.info.Info"
        );
        assert_eq!(
            <v1alpha1::callbacks_server::CallbacksServer<Fixed> as NamedService>::NAME,
            "kubevirt.hooks.v1alpha1.Callbacks"
        );
    }

    #[tokio::test]
    async fn test_info_trait_is_callable() {
        use protocol::info::info_server::Info;

        let result = Fixed
            .info(Request::new(InfoParams::default()))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(result.versions, vec!["v1alpha1".to_string()]);
    }
}
