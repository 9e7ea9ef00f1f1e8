//! Capability negotiation (`kubevirt.hooks.info.Info`)

use protocol::info::{HookPoint, InfoParams, InfoResult, info_server::Info};
use protocol::{HookVersion, ON_DEFINE_DOMAIN_HOOK_POINT};
use tonic::{Request, Response, Status};
use tracing::{info, warn};

/// Answers the supervisor's capability query
#[derive(Debug, Clone)]
pub struct InfoService {
    name: String,
    version: HookVersion,
    priority: i32,
}

impl InfoService {
    pub fn new(name: impl Into<String>, version: HookVersion, priority: i32) -> Self {
        Self {
            name: name.into(),
            version,
            priority,
        }
    }

    /// The negotiation answer: our name, the startup version, and the single
    /// domain-definition hook point
    pub fn describe(&self) -> InfoResult {
        InfoResult {
            name: self.name.clone(),
            versions: vec![self.version.to_string()],
            hook_points: vec![HookPoint {
                name: ON_DEFINE_DOMAIN_HOOK_POINT.to_string(),
                priority: self.priority,
            }],
        }
    }
}

#[tonic::async_trait]
impl Info for InfoService {
    async fn info(&self, request: Request<InfoParams>) -> Result<Response<InfoResult>, Status> {
        info!("Hook's Info method has been called");

        let offered = &request.get_ref().supported_versions;
        if !offered.is_empty() && !offered.iter().any(|v| v == self.version.as_str()) {
            warn!(
                "Supervisor supports {:?}, which does not include {}",
                offered, self.version
            );
        }

        Ok(Response::new(self.describe()))
    }
}
