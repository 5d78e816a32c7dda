//! The GigID node orchestrator.
//!
//! Opens the storage-backed ledger service, serves the HTTP API, and runs
//! the command loop. Commands from the API are applied to the service one
//! at a time, so every state-changing operation is atomic and totally
//! ordered relative to all others.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

use gigid_core::Address;

use crate::commands::{
    CommandError, CountsResponse, CredentialListResponse, CredentialResponse, EventsResponse,
    IncomeResponse, IncomesResponse, NodeCommand, VerifierResponse,
};
use crate::config::GigidConfig;
use crate::service::{LedgerService, ServiceError};
use crate::state::NodeState;

/// The GigID full node.
pub struct GigidNode {
    /// Node configuration.
    config: GigidConfig,
    /// The administrator identity.
    admin: Address,
    /// The authoritative stores (None until start).
    service: Option<Arc<LedgerService>>,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
}

impl GigidNode {
    /// Create a node from configuration. The administrator address must be
    /// configured and must not be the null identity.
    pub fn new(config: GigidConfig) -> Result<Self> {
        if config.admin.address.is_empty() {
            anyhow::bail!("no administrator configured; set [admin] address or pass --admin");
        }
        let admin: Address = config
            .admin
            .address
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid administrator address: {}", e))?;
        if admin.is_zero() {
            anyhow::bail!("the null identity cannot administer the node");
        }

        tracing::info!(%admin, "GigID node created");

        Ok(Self {
            config,
            admin,
            service: None,
            node_state: None,
            command_rx: None,
        })
    }

    /// Initialize and start the node: storage-backed service and HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting GigID node");

        let service = Arc::new(LedgerService::open(
            self.admin,
            &self.config.storage.data_dir,
        )?);
        tracing::info!(
            path = %self.config.storage.data_dir.display(),
            "storage initialized"
        );

        // Create the NodeCommand channel (HTTP API → command loop)
        let (command_tx, command_rx) = mpsc::channel::<NodeCommand>(256);
        let node_state = Arc::new(NodeState::new(self.admin, command_tx));

        // Spawn the HTTP API server
        let api_addr: SocketAddr =
            format!("{}:{}", self.config.api.listen_addr, self.config.api.port).parse()?;
        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.service = Some(service);
        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);

        Ok(())
    }

    /// Run the node's command loop: applies API commands to the service,
    /// one at a time.
    pub async fn run(&mut self) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let service = self
            .service
            .clone()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering command loop");

        while let Some(cmd) = command_rx.recv().await {
            Self::handle_api_command(cmd, &service);
        }

        tracing::info!("API command channel closed");
        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down GigID node");

        self.node_state = None;
        if let Some(service) = self.service.take() {
            drop(service);
            tracing::info!("service closed");
        }

        tracing::info!("GigID node shut down");
        Ok(())
    }

    /// The administrator identity.
    pub fn admin(&self) -> Address {
        self.admin
    }

    fn reply_error(e: ServiceError) -> CommandError {
        if e.is_rejection() {
            CommandError::Rejected(e.to_string())
        } else {
            CommandError::Internal(e.to_string())
        }
    }

    /// Handle a command from the HTTP API.
    fn handle_api_command(cmd: NodeCommand, service: &LedgerService) {
        match cmd {
            NodeCommand::SetVerifierStatus {
                caller,
                identity,
                enabled,
                reply,
            } => {
                let result = service
                    .set_verifier_status(caller, identity, enabled)
                    .map(|_| VerifierResponse {
                        identity,
                        authorized: enabled,
                    })
                    .map_err(Self::reply_error);
                let _ = reply.send(result);
            }
            NodeCommand::GetVerifier { identity, reply } => {
                let _ = reply.send(Ok(VerifierResponse {
                    identity,
                    authorized: service.is_authorized(identity),
                }));
            }
            NodeCommand::RecordIncome {
                caller,
                worker,
                amount,
                source,
                attestation_ref,
                reply,
            } => {
                let result = service
                    .record_income(caller, worker, amount, &source, attestation_ref)
                    .map(|record| IncomeResponse { worker, record })
                    .map_err(Self::reply_error);
                let _ = reply.send(result);
            }
            NodeCommand::GetIncomes { worker, reply } => {
                let records = service.worker_incomes(worker);
                let _ = reply.send(Ok(IncomesResponse {
                    worker,
                    count: records.len(),
                    records,
                }));
            }
            NodeCommand::MintCredential {
                caller,
                recipient,
                total_income,
                period_start,
                period_end,
                category,
                reply,
            } => {
                let result = service
                    .mint_credential(
                        caller,
                        recipient,
                        total_income,
                        period_start,
                        period_end,
                        &category,
                    )
                    .map(|credential| CredentialResponse {
                        credential,
                        owner: recipient,
                    })
                    .map_err(Self::reply_error);
                let _ = reply.send(result);
            }
            NodeCommand::GetCredential { token_id, reply } => {
                let result = service
                    .credential(token_id)
                    .map(|(credential, owner)| CredentialResponse { credential, owner })
                    .map_err(Self::reply_error);
                let _ = reply.send(result);
            }
            NodeCommand::ListCredentials { owner, reply } => {
                let credentials: Vec<CredentialResponse> = service
                    .credentials()
                    .into_iter()
                    .filter(|(_, row_owner)| owner.map_or(true, |o| o == *row_owner))
                    .map(|(credential, owner)| CredentialResponse { credential, owner })
                    .collect();
                let _ = reply.send(Ok(CredentialListResponse {
                    count: credentials.len(),
                    credentials,
                }));
            }
            NodeCommand::Transfer {
                caller,
                from,
                to,
                token_id,
                reply,
            } => {
                // Transfers never succeed; only the error arm is ever sent.
                let result = service
                    .transfer(caller, from, to, token_id)
                    .map(|_| unreachable!("credential transfers never succeed"))
                    .map_err(Self::reply_error);
                let _ = reply.send(result);
            }
            NodeCommand::GetEvents { since, reply } => {
                let events = service.events_since(since);
                let _ = reply.send(Ok(EventsResponse {
                    count: events.len(),
                    events,
                }));
            }
            NodeCommand::GetCounts { reply } => {
                let _ = reply.send(Ok(CountsResponse {
                    verifiers: service.verifier_count(),
                    income_records: service.income_record_count(),
                    credentials: service.total_supply(),
                    events: service.event_count(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gigid_core::AttestationRef;
    use tokio::sync::oneshot;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::new(bytes)
    }

    fn node_config(admin: &str) -> GigidConfig {
        let mut config = GigidConfig::default();
        config.admin.address = admin.into();
        config
    }

    #[test]
    fn test_node_requires_admin() {
        let result = GigidNode::new(GigidConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_node_rejects_zero_admin() {
        let config = node_config("0x0000000000000000000000000000000000000000");
        assert!(GigidNode::new(config).is_err());
    }

    #[test]
    fn test_node_rejects_malformed_admin() {
        let config = node_config("not-an-address");
        assert!(GigidNode::new(config).is_err());
    }

    #[test]
    fn test_node_creation() {
        let config = node_config("0x0000000000000000000000000000000000000001");
        let node = GigidNode::new(config).unwrap();
        assert_eq!(node.admin(), addr(1));
    }

    #[tokio::test]
    async fn test_node_start_and_shutdown() {
        let dir = std::env::temp_dir().join(format!("gigid-node-test-{}", rand::random::<u64>()));
        let mut config = node_config("0x0000000000000000000000000000000000000001");
        config.storage.data_dir = dir.clone();
        config.api.port = 0; // ephemeral port
        let mut node = GigidNode::new(config).unwrap();
        node.start().await.expect("start failed");
        node.shutdown().await.expect("shutdown failed");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_command_flow_through_service() {
        let service = LedgerService::in_memory(addr(1));

        // Authorize a verifier.
        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::SetVerifierStatus {
                caller: addr(1),
                identity: addr(2),
                enabled: true,
                reply: tx,
            },
            &service,
        );
        assert!(rx.try_recv().unwrap().is_ok());

        // Record income as the new verifier.
        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::RecordIncome {
                caller: addr(2),
                worker: addr(3),
                amount: 1000,
                source: "Uber".into(),
                attestation_ref: AttestationRef::from_label("r1"),
                reply: tx,
            },
            &service,
        );
        let response = rx.try_recv().unwrap().unwrap();
        assert_eq!(response.record.amount, 1000);
        assert!(response.record.verified);

        // Mint and read back.
        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::MintCredential {
                caller: addr(1),
                recipient: addr(3),
                total_income: 1000,
                period_start: Utc::now(),
                period_end: Utc::now(),
                category: "Annual Income 2025".into(),
                reply: tx,
            },
            &service,
        );
        let minted = rx.try_recv().unwrap().unwrap();
        assert_eq!(minted.credential.id, 0);
        assert_eq!(minted.owner, addr(3));
    }

    #[test]
    fn test_command_rejections_map_to_rejected() {
        let service = LedgerService::in_memory(addr(1));

        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::SetVerifierStatus {
                caller: addr(9),
                identity: addr(2),
                enabled: true,
                reply: tx,
            },
            &service,
        );
        let result = rx.try_recv().unwrap();
        assert!(matches!(result, Err(CommandError::Rejected(_))));
    }

    #[test]
    fn test_transfer_command_is_rejected() {
        let service = LedgerService::in_memory(addr(1));
        service
            .mint_credential(addr(1), addr(3), 1000, Utc::now(), Utc::now(), "Annual")
            .unwrap();

        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::Transfer {
                caller: addr(3),
                from: addr(3),
                to: addr(4),
                token_id: 0,
                reply: tx,
            },
            &service,
        );
        let result = rx.try_recv().unwrap();
        assert!(matches!(result, Err(CommandError::Rejected(ref e)) if e.contains("non-transferable")));

        // Ownership is unchanged afterwards.
        let (tx, mut rx) = oneshot::channel();
        GigidNode::handle_api_command(
            NodeCommand::GetCredential {
                token_id: 0,
                reply: tx,
            },
            &service,
        );
        assert_eq!(rx.try_recv().unwrap().unwrap().owner, addr(3));
    }
}
