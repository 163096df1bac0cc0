//! Single task that owns the relay
//!
//! Socket handlers talk to the hub over one unbounded command channel, and the
//! hub answers through one outbox channel per connection. Commands are handled
//! strictly in arrival order, so events from one sender reach the peer in the
//! order they were sent.

use crate::protocol::{ClientEvent, ConnectionId, ServerEvent};
use crate::relay::{Outbound, Relay, RelayConfig, RelayStats};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub enum HubCommand {
    Connect {
        id: ConnectionId,
        outbox: mpsc::UnboundedSender<ServerEvent>,
    },
    Event {
        id: ConnectionId,
        event: ClientEvent,
    },
    Disconnect {
        id: ConnectionId,
    },
    Stats {
        reply: oneshot::Sender<RelayStats>,
    },
}

/// Cloneable handle to the hub task
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    /// Spawn the hub on the current tokio runtime
    pub fn spawn(config: RelayConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let hub = Hub {
            relay: Relay::new(config),
            outboxes: FxHashMap::default(),
        };
        tokio::spawn(hub.run(rx));
        Self {
            commands,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocate an id for a new connection and open its outbox
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.command(HubCommand::Connect { id, outbox });
        (id, inbox)
    }

    pub fn send(&self, id: ConnectionId, event: ClientEvent) {
        self.command(HubCommand::Event { id, event });
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.command(HubCommand::Disconnect { id });
    }

    pub async fn stats(&self) -> anyhow::Result<RelayStats> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(HubCommand::Stats { reply })
            .map_err(|_| anyhow::anyhow!("relay hub has stopped"))?;
        Ok(rx.await?)
    }

    fn command(&self, command: HubCommand) {
        if self.commands.send(command).is_err() {
            tracing::error!("relay hub has stopped; command dropped");
        }
    }
}

struct Hub {
    relay: Relay,
    outboxes: FxHashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl Hub {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<HubCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        tracing::debug!("relay hub shutting down");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { id, outbox } => {
                self.outboxes.insert(id, outbox);
                match self.relay.connect(id) {
                    Ok(out) => {
                        tracing::info!(%id, "connected");
                        self.deliver(out);
                    }
                    Err(err) => tracing::warn!(%id, "{}", err),
                }
            }
            HubCommand::Event { id, event } => match self.relay.handle(id, event) {
                Ok(out) => self.deliver(out),
                Err(err) => tracing::warn!(%id, "dropping event: {}", err),
            },
            HubCommand::Disconnect { id } => {
                let out = self.relay.disconnect(id);
                self.outboxes.remove(&id);
                tracing::info!(%id, "disconnected");
                self.deliver(out);
            }
            HubCommand::Stats { reply } => {
                let _ = reply.send(self.relay.stats());
            }
        }
    }

    fn deliver(&self, out: Vec<Outbound>) {
        for Outbound { to, event } in out {
            match self.outboxes.get(&to) {
                Some(outbox) => {
                    if outbox.send(event).is_err() {
                        tracing::debug!(%to, "outbox closed");
                    }
                }
                None => tracing::debug!(%to, "no outbox"),
            }
        }
    }
}
