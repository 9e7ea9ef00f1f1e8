//! Callback services for each hook API version
//!
//! v1alpha1 and v1alpha2 carry the same define-domain semantics in different
//! message types. Each version gets a thin adapter that unpacks its request,
//! calls the shared [`CallbackDispatcher`], and packs the response.

use crate::mutator::DomainMutator;
use crate::shutdown::FatalSignal;
use protocol::{
    HookVersion, ON_DEFINE_DOMAIN_HOOK_POINT, PRE_CLOUD_INIT_ISO_HOOK_POINT, v1alpha1, v1alpha2,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{Instrument, error, field, info, info_span};

/// Version-independent define-domain handling
#[derive(Clone)]
pub struct CallbackDispatcher {
    mutator: Arc<DomainMutator>,
    fatal: FatalSignal,
}

impl CallbackDispatcher {
    pub fn new(mutator: Arc<DomainMutator>, fatal: FatalSignal) -> Self {
        Self { mutator, fatal }
    }

    pub fn v1alpha1(&self) -> V1Alpha1Callbacks {
        V1Alpha1Callbacks {
            dispatcher: self.clone(),
        }
    }

    pub fn v1alpha2(&self) -> V1Alpha2Callbacks {
        V1Alpha2Callbacks {
            dispatcher: self.clone(),
        }
    }

    /// Run the mutator, turning a fatal condition into a process shutdown
    /// request and an error for this call only
    pub async fn define_domain(
        &self,
        version: HookVersion,
        vmi: &[u8],
        domain_xml: &[u8],
    ) -> Result<Vec<u8>, Status> {
        let span = info_span!("on_define_domain", %version, vmi = field::Empty);

        async {
            info!(
                "Hook's {} callback method has been called",
                ON_DEFINE_DOMAIN_HOOK_POINT
            );

            self.mutator
                .on_define_domain(vmi, domain_xml)
                .await
                .map_err(|fatal| {
                    error!("{}, shutting down", fatal);
                    self.fatal.trigger(fatal.to_string());
                    Status::internal(fatal.to_string())
                })
        }
        .instrument(span)
        .await
    }
}

#[derive(Clone)]
pub struct V1Alpha1Callbacks {
    dispatcher: CallbackDispatcher,
}

#[tonic::async_trait]
impl v1alpha1::callbacks_server::Callbacks for V1Alpha1Callbacks {
    async fn on_define_domain(
        &self,
        request: Request<v1alpha1::OnDefineDomainParams>,
    ) -> Result<Response<v1alpha1::OnDefineDomainResult>, Status> {
        let params = request.into_inner();
        let domain_xml = self
            .dispatcher
            .define_domain(HookVersion::V1Alpha1, &params.vmi, &params.domain_xml)
            .await?;

        Ok(Response::new(v1alpha1::OnDefineDomainResult { domain_xml }))
    }
}

#[derive(Clone)]
pub struct V1Alpha2Callbacks {
    dispatcher: CallbackDispatcher,
}

#[tonic::async_trait]
impl v1alpha2::callbacks_server::Callbacks for V1Alpha2Callbacks {
    async fn on_define_domain(
        &self,
        request: Request<v1alpha2::OnDefineDomainParams>,
    ) -> Result<Response<v1alpha2::OnDefineDomainResult>, Status> {
        let params = request.into_inner();
        let domain_xml = self
            .dispatcher
            .define_domain(HookVersion::V1Alpha2, &params.vmi, &params.domain_xml)
            .await?;

        Ok(Response::new(v1alpha2::OnDefineDomainResult { domain_xml }))
    }

    /// Not used by this hook; hands the cloud-init data back untouched
    async fn pre_cloud_init_iso(
        &self,
        request: Request<v1alpha2::PreCloudInitIsoParams>,
    ) -> Result<Response<v1alpha2::PreCloudInitIsoResult>, Status> {
        info!(
            "Hook's {} callback method has been called, returning cloud-init data unchanged",
            PRE_CLOUD_INIT_ISO_HOOK_POINT
        );
        Ok(Response::new(v1alpha2::PreCloudInitIsoResult {
            cloud_init_data: request.into_inner().cloud_init_data,
        }))
    }
}
