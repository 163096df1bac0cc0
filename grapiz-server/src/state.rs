//! Server state
//!
//! Handlers share the hub handle; all relay state lives inside the hub task.

use crate::hub::HubHandle;
use crate::ServerConfig;

/// Server-wide shared state
pub struct ServerState {
    pub hub: HubHandle,
    pub config: ServerConfig,
}

impl ServerState {
    /// Spawns the hub, so it must be called from within a tokio runtime
    pub fn new(config: ServerConfig) -> Self {
        Self {
            hub: HubHandle::spawn(config.relay_config()),
            config,
        }
    }
}
