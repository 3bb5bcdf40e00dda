use futures::channel::mpsc;
use std::sync::Arc;

use crate::client::Client;
use crate::committee::Committee;
use crate::constants::COMMAND_CHANNEL_SIZE;
use crate::event::EventLoop;

/// Wires a `Client` to an `EventLoop` serving `committee`.
///
/// Delivery is local: commands travel over an in-process channel instead of a
/// network. Spawn `EventLoop::run` on the runtime before using the client.
///
/// # Examples
///
/// ```ignore
/// let (client, event_loop) = transport::new(Arc::new(committee));
/// tokio::spawn(event_loop.run());
/// let report = client.distribute("0xdeadbeef", &shares, 3).await;
/// ```
pub fn new(committee: Arc<Committee>) -> (Client, EventLoop) {
    let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    (
        Client {
            sender: command_sender,
        },
        EventLoop::new(committee, command_receiver),
    )
}
