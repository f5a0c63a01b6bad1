//! Hub control loop and the registry it owns.
//!
//! The registry is only ever touched from [`run`]; every change arrives as a
//! [`HubCommand`] and is applied to completion before the next one is read.
//! Delivery to a client never awaits: a full queue drops that client instead.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc::{self, error::TrySendError};

use hiroba_shared::time::Clock;

use crate::{
    domain::{ChannelId, ChatEvent, ConnectionId},
    infrastructure::dto::conversion::encode_event,
};

use super::{ClientHandle, Frame, HubCommand};

/// Lifecycle stage of the hub. Registrations are only accepted while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HubState {
    Created,
    Running,
    ShuttingDown,
    Terminated,
}

pub(super) struct Registry {
    clients: HashMap<ConnectionId, ClientHandle>,
    state: HubState,
    clock: Arc<dyn Clock>,
}

impl Registry {
    pub(super) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: HashMap::new(),
            state: HubState::Created,
            clock,
        }
    }

    #[cfg(test)]
    pub(super) fn state(&self) -> HubState {
        self.state
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.clients.len()
    }

    /// Apply one command. `Shutdown` is handled by [`run`], not here.
    pub(super) fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client) => self.register(client),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast { channel_id, frame } => {
                self.deliver(channel_id, frame);
            }
            HubCommand::Notify { text, channel_id } => self.notify(text, channel_id),
            HubCommand::CountClients(reply) => {
                let _ = reply.send(self.clients.len());
            }
            HubCommand::Shutdown(reply) => {
                // A second shutdown request racing the first one. Dropping the
                // reply tells the caller the hub was already shut down.
                drop(reply);
            }
        }
    }

    fn register(&mut self, client: ClientHandle) {
        if self.state != HubState::Running {
            // Dropping the handle closes the queue, so the write pump ends at once.
            tracing::debug!(
                user = %client.user.display_name,
                state = ?self.state,
                "Registration refused, hub is not running"
            );
            return;
        }
        let joined = ChatEvent::joined(&client.user, client.channel_id, self.clock.now());
        tracing::debug!(
            user = %client.user.display_name,
            user_id = %client.user.id,
            channel_id = %client.channel_id,
            connection_id = %client.id,
            total_clients = self.clients.len() + 1,
            "Client registered"
        );
        self.clients.insert(client.id, client);
        self.notify(joined.content, joined.channel_id);
    }

    fn unregister(&mut self, id: ConnectionId) {
        // Dropping the handle closes the outbound queue, which ends the write pump.
        let Some(client) = self.clients.remove(&id) else {
            tracing::trace!(connection_id = %id, "Unregister for unknown client ignored");
            return;
        };
        tracing::debug!(
            user = %client.user.display_name,
            user_id = %client.user.id,
            channel_id = %client.channel_id,
            connection_id = %client.id,
            total_clients = self.clients.len(),
            "Client unregistered"
        );
        let left = ChatEvent::left(&client.user, client.channel_id, self.clock.now());
        drop(client);
        self.notify(left.content, left.channel_id);
    }

    /// System notification to every client of `channel_id`. Join and leave
    /// announcements go through here as well.
    fn notify(&mut self, text: String, channel_id: ChannelId) {
        let event = ChatEvent::notification(text, channel_id, self.clock.now());
        match encode_event(&event) {
            Ok(text) => {
                self.deliver(event.channel_id, Frame::from(text));
            }
            Err(e) => {
                tracing::error!("Failed to serialize notification: {}", e);
            }
        }
    }

    /// Fan `frame` out to every client of `channel_id`.
    ///
    /// Returns the number of clients the frame was queued for.
    fn deliver(&mut self, channel_id: ChannelId, frame: Frame) -> usize {
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (id, client) in &self.clients {
            if client.channel_id != channel_id {
                continue;
            }
            match client.sender.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        user = %client.user.display_name,
                        channel_id = %client.channel_id,
                        "Outbound queue full, dropping slow client"
                    );
                    dropped.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        user = %client.user.display_name,
                        channel_id = %client.channel_id,
                        "Outbound queue already closed, dropping client"
                    );
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            self.clients.remove(&id);
        }

        delivered
    }

    /// Ordered teardown.
    ///
    /// 1. close the inbox so no new command can be queued
    /// 2. apply what is already queued, refusing registrations
    /// 3. close every client's queue
    pub(super) fn shutdown(&mut self, inbox: &mut mpsc::Receiver<HubCommand>) {
        self.state = HubState::ShuttingDown;
        inbox.close();

        // Registrations still queued are refused by `register`.
        while let Ok(command) = inbox.try_recv() {
            self.handle(command);
        }

        let closed = self.clients.len();
        self.clients.clear();
        self.state = HubState::Terminated;
        tracing::info!(closed_clients = closed, "Hub shut down");
    }
}

/// The hub's control loop. Runs until a shutdown request or until every
/// [`super::Hub`] handle has been dropped.
pub(super) async fn run(mut registry: Registry, mut inbox: mpsc::Receiver<HubCommand>) {
    registry.state = HubState::Running;
    tracing::debug!("Hub control loop started");

    while let Some(command) = inbox.recv().await {
        if let HubCommand::Shutdown(reply) = command {
            registry.shutdown(&mut inbox);
            let _ = reply.send(());
            return;
        }
        registry.handle(command);
    }

    // Every handle is gone; nobody can reach the clients anymore.
    registry.shutdown(&mut inbox);
}
