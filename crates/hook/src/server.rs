//! gRPC server wiring
//!
//! Registers the Info service and both callback versions side by side on a
//! single Unix socket listener.

use crate::callbacks::CallbackDispatcher;
use crate::info::InfoService;
use protocol::info::info_server::InfoServer;
use protocol::{v1alpha1, v1alpha2};
use std::future::Future;
use tokio::net::UnixListener;
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;
use tracing::info;

pub struct HookServer {
    info: InfoService,
    dispatcher: CallbackDispatcher,
}

impl HookServer {
    pub fn new(info: InfoService, dispatcher: CallbackDispatcher) -> Self {
        Self { info, dispatcher }
    }

    /// Serve until `shutdown` resolves, then drain in-flight calls
    pub async fn serve<F>(self, listener: UnixListener, shutdown: F) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        info!("Starting hook server exposing 'info', 'v1alpha1' and 'v1alpha2' services");

        Server::builder()
            .add_service(InfoServer::new(self.info))
            .add_service(v1alpha1::callbacks_server::CallbacksServer::new(
                self.dispatcher.v1alpha1(),
            ))
            .add_service(v1alpha2::callbacks_server::CallbacksServer::new(
                self.dispatcher.v1alpha2(),
            ))
            .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
            .await
    }
}
