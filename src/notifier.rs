use rocket::tokio::sync::broadcast::{self, Receiver, Sender};

use crate::model::api::event::LiveEvent;

/// How many events a slow subscriber may fall behind before it starts
/// skipping them.
const CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`LiveEvent`]s to every connected live client.
///
/// Publishing never blocks and never fails: with nobody listening the
/// event is simply dropped, and there is no replay for late subscribers.
#[derive(Clone)]
pub struct Notifier {
    sender: Sender<LiveEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Send an event to all current subscribers.
    pub fn publish(&self, event: LiveEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!("Published {name} to {receivers} live client(s)"),
            Err(_) => debug!("No live clients for {name}"),
        }
    }

    /// Start receiving events published from now on.
    pub fn subscribe(&self) -> Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    /// Number of connected live clients.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
