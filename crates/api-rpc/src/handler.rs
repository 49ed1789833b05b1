//! RPC Method Handlers
//!
//! Thin translation between wire types and the application services.

use crate::error::to_rpc_error;
use crate::types::{
    AuditResponse, CancelTicketRequest, CheckInResponse, CompleteTicketRequest,
    EnqueueTicketRequest, EnqueueTicketResponse, ForcedDistributionRequest,
    RegisterServerRequest, ResetDailyResponse, ServerListResponse, ServerRequest,
    SetActiveRequest, StatsResponse, TicketRequest, WaitingListResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use walkin_core::application::{
    ConsistencyAudit, CounterStats, DistributionCoordinator, EnqueueRequest, IntakeService,
    RosterService,
};
use walkin_core::domain::{Assignment, DistributionOutcome, Server, Ticket, TicketStatus};
use walkin_core::port::{ServerRoster, TicketLedger};

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected application services
pub struct RpcHandler {
    intake: Arc<IntakeService>,
    coordinator: Arc<DistributionCoordinator>,
    roster_service: Arc<RosterService>,
    audit: Arc<ConsistencyAudit>,
    ledger: Arc<dyn TicketLedger>,
    roster: Arc<dyn ServerRoster>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        intake: Arc<IntakeService>,
        coordinator: Arc<DistributionCoordinator>,
        roster_service: Arc<RosterService>,
        audit: Arc<ConsistencyAudit>,
        ledger: Arc<dyn TicketLedger>,
        roster: Arc<dyn ServerRoster>,
    ) -> Self {
        Self {
            intake,
            coordinator,
            roster_service,
            audit,
            ledger,
            roster,
            start_time: std::time::Instant::now(),
        }
    }

    /// ticket.enqueue.v1
    pub async fn enqueue(&self, params: EnqueueTicketRequest) -> RpcResult<EnqueueTicketResponse> {
        let req = EnqueueRequest {
            requester_id: params.requester_id,
            requester_name: params.requester_name,
            service_id: params.service_id,
            service_name: params.service_name,
            note: params.note,
        };

        let ticket_id = self.intake.enqueue(req).await.map_err(to_rpc_error)?;

        Ok(EnqueueTicketResponse {
            ticket_id,
            status: TicketStatus::Waiting.to_string(),
        })
    }

    /// ticket.get.v1
    pub async fn get_ticket(&self, params: TicketRequest) -> RpcResult<Ticket> {
        self.intake
            .find_ticket(&params.ticket_id)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.list_waiting.v1
    pub async fn list_waiting(&self) -> RpcResult<WaitingListResponse> {
        let tickets = self.intake.list_waiting().await.map_err(to_rpc_error)?;
        Ok(WaitingListResponse {
            count: tickets.len(),
            tickets,
        })
    }

    /// ticket.complete.v1
    pub async fn complete(&self, params: CompleteTicketRequest) -> RpcResult<Ticket> {
        self.coordinator
            .complete_ticket(&params.ticket_id, params.charge, params.note)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.cancel.v1
    pub async fn cancel(&self, params: CancelTicketRequest) -> RpcResult<Ticket> {
        self.coordinator
            .cancel_ticket(&params.ticket_id, params.reason)
            .await
            .map_err(to_rpc_error)
    }

    /// distribute.auto.v1
    pub async fn distribute_auto(&self) -> RpcResult<DistributionOutcome> {
        self.coordinator
            .distribute_automatic()
            .await
            .map_err(to_rpc_error)
    }

    /// distribute.forced.v1
    pub async fn distribute_forced(&self, params: ForcedDistributionRequest) -> RpcResult<Assignment> {
        self.coordinator
            .distribute_forced(&params.ticket_id, &params.server_id)
            .await
            .map_err(to_rpc_error)
    }

    /// server.register.v1
    pub async fn register_server(&self, params: RegisterServerRequest) -> RpcResult<Server> {
        self.roster_service
            .register_server(&params.name)
            .await
            .map_err(to_rpc_error)
    }

    /// server.set_active.v1
    pub async fn set_active(&self, params: SetActiveRequest) -> RpcResult<Server> {
        self.roster_service
            .set_active(&params.server_id, params.active)
            .await
            .map_err(to_rpc_error)
    }

    /// server.check_in.v1
    pub async fn check_in(&self, params: ServerRequest) -> RpcResult<CheckInResponse> {
        let arrival_rank = self
            .roster_service
            .check_in(&params.server_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(CheckInResponse {
            server_id: params.server_id,
            arrival_rank,
        })
    }

    /// server.check_out.v1
    pub async fn check_out(&self, params: ServerRequest) -> RpcResult<Server> {
        self.roster_service
            .check_out(&params.server_id)
            .await
            .map_err(to_rpc_error)
    }

    /// server.list.v1
    pub async fn list_servers(&self) -> RpcResult<ServerListResponse> {
        let board = self
            .roster_service
            .list_servers()
            .await
            .map_err(to_rpc_error)?;
        let next_available = self
            .roster_service
            .next_available()
            .await
            .map_err(to_rpc_error)?;

        Ok(ServerListResponse {
            board,
            next_available,
        })
    }

    /// admin.reset_daily.v1
    pub async fn reset_daily(&self) -> RpcResult<ResetDailyResponse> {
        let servers_reset = self
            .roster_service
            .reset_daily()
            .await
            .map_err(to_rpc_error)?;
        Ok(ResetDailyResponse { servers_reset })
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> RpcResult<StatsResponse> {
        let counts = CounterStats::collect(self.ledger.as_ref(), self.roster.as_ref())
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            counts,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    /// admin.audit.v1
    pub async fn audit(&self) -> RpcResult<AuditResponse> {
        let report = self.audit.run().await.map_err(to_rpc_error)?;
        Ok(AuditResponse {
            consistent: report.is_consistent(),
            report,
        })
    }
}
