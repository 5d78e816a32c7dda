//! Shared state accessible from HTTP handlers.

use std::time::Instant;
use tokio::sync::mpsc;

use gigid_core::Address;

use crate::commands::NodeCommand;

/// State shared between the HTTP API and the node command loop.
pub struct NodeState {
    /// The administrator identity.
    pub admin: Address,
    /// When the node started.
    pub start_time: Instant,
    /// Sends commands to the node's command loop.
    pub command_tx: mpsc::Sender<NodeCommand>,
}

impl NodeState {
    /// Create shared state for a freshly started node.
    pub fn new(admin: Address, command_tx: mpsc::Sender<NodeCommand>) -> Self {
        Self {
            admin,
            start_time: Instant::now(),
            command_tx,
        }
    }
}
