//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP/TCP. Binds to localhost by default.

use crate::handler::RpcHandler;
use crate::types::{
    CancelTicketRequest, CompleteTicketRequest, EnqueueTicketRequest, ForcedDistributionRequest,
    RegisterServerRequest, ServerRequest, SetActiveRequest, TicketRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register method: {0}")]
    Register(String),
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: RpcHandler,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self { config, handler }
    }

    /// Start serving; returns the bound address and a handle to stop the server
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), RpcServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| RpcServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| RpcServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let module = build_module(self.handler)?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started");
        Ok((local_addr, handle))
    }
}

/// Register every counter method on a module whose context is the handler
pub fn build_module(handler: RpcHandler) -> Result<RpcModule<RpcHandler>, RpcServerError> {
    let mut module = RpcModule::new(handler);

    // Tickets
    module
        .register_async_method("ticket.enqueue.v1", |params, handler, _| async move {
            let req: EnqueueTicketRequest = params.parse()?;
            handler.enqueue(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("ticket.get.v1", |params, handler, _| async move {
            let req: TicketRequest = params.parse()?;
            handler.get_ticket(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("ticket.list_waiting.v1", |_, handler, _| async move {
            handler.list_waiting().await
        })
        .map_err(register_error)?;

    module
        .register_async_method("ticket.complete.v1", |params, handler, _| async move {
            let req: CompleteTicketRequest = params.parse()?;
            handler.complete(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("ticket.cancel.v1", |params, handler, _| async move {
            let req: CancelTicketRequest = params.parse()?;
            handler.cancel(req).await
        })
        .map_err(register_error)?;

    // Distribution
    module
        .register_async_method("distribute.auto.v1", |_, handler, _| async move {
            handler.distribute_auto().await
        })
        .map_err(register_error)?;

    module
        .register_async_method("distribute.forced.v1", |params, handler, _| async move {
            let req: ForcedDistributionRequest = params.parse()?;
            handler.distribute_forced(req).await
        })
        .map_err(register_error)?;

    // Roster
    module
        .register_async_method("server.register.v1", |params, handler, _| async move {
            let req: RegisterServerRequest = params.parse()?;
            handler.register_server(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("server.set_active.v1", |params, handler, _| async move {
            let req: SetActiveRequest = params.parse()?;
            handler.set_active(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("server.check_in.v1", |params, handler, _| async move {
            let req: ServerRequest = params.parse()?;
            handler.check_in(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("server.check_out.v1", |params, handler, _| async move {
            let req: ServerRequest = params.parse()?;
            handler.check_out(req).await
        })
        .map_err(register_error)?;

    module
        .register_async_method("server.list.v1", |_, handler, _| async move {
            handler.list_servers().await
        })
        .map_err(register_error)?;

    // Admin
    module
        .register_async_method("admin.reset_daily.v1", |_, handler, _| async move {
            handler.reset_daily().await
        })
        .map_err(register_error)?;

    module
        .register_async_method("admin.stats.v1", |_, handler, _| async move {
            handler.stats().await
        })
        .map_err(register_error)?;

    module
        .register_async_method("admin.audit.v1", |_, handler, _| async move {
            handler.audit().await
        })
        .map_err(register_error)?;

    Ok(module)
}

fn register_error(err: impl std::fmt::Display) -> RpcServerError {
    RpcServerError::Register(err.to_string())
}
