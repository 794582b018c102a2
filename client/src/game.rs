use crate::network::Client;
use log::{debug, info, warn};
use shared::{Command, Message, World};

/// Client-side replica of the world, built only from received commands
pub struct ClientGame {
    world: World,
}

impl ClientGame {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Folds one message from the server into the replica
    pub fn apply(&mut self, message: Message) {
        match message {
            Message::Command(command) => {
                match &command {
                    Command::SetId(id) => info!("Connected! Player ID: {}", id),
                    Command::RemovePlayer(id) if Some(*id) == self.world.own_id => {
                        info!("Our player was removed from the arena")
                    }
                    _ => {}
                }
                command.apply(&mut self.world);
            }
            other => warn!("Unexpected message from server: {:?}", other),
        }
    }

    /// Applies every message currently queued on the socket and returns how
    /// many there were
    pub fn poll(&mut self, client: &Client) -> usize {
        let mut count = 0;
        while let Some(message) = client.receive() {
            self.apply(message);
            count += 1;
        }
        if count > 0 {
            debug!("Applied {} messages", count);
        }
        count
    }
}

impl Default for ClientGame {
    fn default() -> Self {
        Self::new()
    }
}
