use futures::channel::mpsc;
use futures::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::command::{command_handler, Command};
use crate::committee::Committee;

/// Manages the event loop delivering shares to committee members.
///
/// # Fields
///
/// * `committee` - The committee whose members receive the commands.
/// * `command_receiver` - Receiver for incoming commands.
pub struct EventLoop {
    pub committee: Arc<Committee>,
    pub command_receiver: mpsc::Receiver<Command>,
}

impl EventLoop {
    pub fn new(committee: Arc<Committee>, command_receiver: mpsc::Receiver<Command>) -> Self {
        Self {
            committee,
            command_receiver,
        }
    }

    /// Runs the event loop until every `Client` has been dropped.
    ///
    /// Each command is handled on its own blocking task, so deliveries to different
    /// members proceed in parallel while each member's store lock serializes the
    /// deliveries aimed at that member.
    pub async fn run(mut self) {
        while let Some(command) = self.command_receiver.next().await {
            let committee = Arc::clone(&self.committee);
            tokio::task::spawn_blocking(move || command_handler(committee, command));
        }
        debug!("Command channel closed, shutting down the committee event loop.");
    }
}
