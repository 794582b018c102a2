//! Datagram payload vocabulary shared by clients and servers

use crate::commands::Command;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned player identifier; never reused within a server session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(1);

    pub fn next(self) -> PlayerId {
        PlayerId(self.0 + 1)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyboard keys as seen by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Any other key code; tracked but ignored by movement
    Other(u32),
}

/// Client to server input events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    KeyDown(Key),
    KeyUp(Key),
    /// Keep-alive that only resets the server's idle timer
    Ping,
}

/// Exactly one of these travels in every datagram after the protocol header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Command(Command),
    Input(Input),
    /// Confirms receipt of an acknowledgment-worthy message, echoing it back
    Acknowledge(Box<Message>),
}

impl Message {
    /// Whether this payload requires at-least-once delivery
    pub fn needs_ack(&self) -> bool {
        match self {
            Message::Command(command) => command.needs_ack(),
            Message::Input(_) | Message::Acknowledge(_) => false,
        }
    }

    pub fn acknowledge(&self) -> Message {
        Message::Acknowledge(Box::new(self.clone()))
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::Command(command)
    }
}

impl From<Input> for Message {
    fn from(input: Input) -> Self {
        Message::Input(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids_are_ordered() {
        assert!(PlayerId(2) > PlayerId(1));
        assert_eq!(PlayerId::FIRST.next(), PlayerId(2));
    }

    #[test]
    fn test_needs_ack() {
        assert!(Message::from(Command::SetId(PlayerId(1))).needs_ack());
        assert!(Message::from(Command::RemovePlayer(PlayerId(1))).needs_ack());
        assert!(!Message::from(Command::set_radius(3.0)).needs_ack());
        assert!(!Message::from(Input::Ping).needs_ack());

        let ack = Message::from(Command::SetId(PlayerId(1))).acknowledge();
        assert!(!ack.needs_ack());
    }

    #[test]
    fn test_acknowledge_wraps_original() {
        let original = Message::from(Command::RemovePlayer(PlayerId(4)));
        match original.acknowledge() {
            Message::Acknowledge(inner) => assert_eq!(*inner, original),
            other => panic!("Unexpected message: {:?}", other),
        }
    }
}
