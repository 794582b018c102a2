//! Authoritative arena simulation
//!
//! `GameServer` is the only writer of the canonical [`World`]. Every change it
//! makes is broadcast as a [`Command`] so clients can mirror it.

use crate::error::ServerError;
use crate::network::{Handler, Network};
use log::{debug, info};
use shared::{
    Command, Input, Key, Message, Player, PlayerId, Vector2, World, ARENA_MIN_RADIUS,
    ARENA_SHRINK_RATE, SPAWN_DISTANCE,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::time::Instant;

/// Longest step the integrator is allowed to take after a stall
const MAX_TICK_DELTA: f32 = 1.0 / 20.0;

const GOLDEN_ANGLE: f32 = 2.399_963;

/// Where a newly connected player appears, spread around the arena center
pub fn spawn_point(id: PlayerId) -> Vector2 {
    let angle = id.0 as f32 * GOLDEN_ANGLE;
    Vector2::new(angle.cos(), angle.sin()) * SPAWN_DISTANCE
}

pub struct GameServer {
    world: World,
    next_id: PlayerId,
    /// Network identity and game identity are kept apart; an address that
    /// reconnects gets a new id
    address_to_id: HashMap<SocketAddr, PlayerId>,
    pressed_keys: HashMap<PlayerId, HashSet<Key>>,
    last_tick: Option<Instant>,
}

impl GameServer {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            next_id: PlayerId::FIRST,
            address_to_id: HashMap::new(),
            pressed_keys: HashMap::new(),
            last_tick: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player_id(&self, peer: SocketAddr) -> Option<PlayerId> {
        self.address_to_id.get(&peer).copied()
    }

    pub fn pressed_keys(&self, id: PlayerId) -> Option<&HashSet<Key>> {
        self.pressed_keys.get(&id)
    }

    fn id_of(&self, peer: SocketAddr) -> Result<PlayerId, ServerError> {
        self.player_id(peer).ok_or(ServerError::UnknownPeer(peer))
    }

    /// Advances the simulation by `dt` seconds and broadcasts every change
    pub fn tick(&mut self, net: &mut Network, dt: f32) {
        self.shrink_arena(net, dt);
        self.simulate_players(net, dt);
        self.eliminate_players(net);
    }

    /// Advances by `elapsed` seconds of wall time in ticks of at most
    /// `MAX_TICK_DELTA`, so a slow caller still sees the arena shrink at its
    /// nominal rate while the integrator stays stable
    pub fn advance(&mut self, net: &mut Network, elapsed: f32) {
        let mut remaining = elapsed.max(0.0);
        loop {
            let dt = remaining.min(MAX_TICK_DELTA);
            self.tick(net, dt);
            remaining -= dt;
            if remaining <= f32::EPSILON {
                break;
            }
        }
    }

    fn shrink_arena(&mut self, net: &mut Network, dt: f32) {
        if self.world.arena_radius <= ARENA_MIN_RADIUS {
            return;
        }

        self.world.arena_radius =
            (self.world.arena_radius - ARENA_SHRINK_RATE * dt).max(ARENA_MIN_RADIUS);
        net.send_to_all(&Command::set_radius(self.world.arena_radius).into());
    }

    fn simulate_players(&mut self, net: &mut Network, dt: f32) {
        let no_keys = HashSet::new();

        for id in self.world.player_ids() {
            // Take the player out so it can collide with the rest mutably
            let Some(mut player) = self.world.players.remove(&id) else {
                continue;
            };

            let keys = self.pressed_keys.get(&id).unwrap_or(&no_keys);
            player.update(keys, dt);

            for other in self.world.players.values_mut() {
                if player.collide(other) {
                    debug!("Player {} collided with player {}", player.id, other.id);
                }
            }

            let update = Command::set_player_position(&player);
            self.world.players.insert(id, player);
            net.send_to_all(&update.into());
        }
    }

    fn eliminate_players(&mut self, net: &mut Network) {
        for id in self.world.outside_arena() {
            self.world.players.remove(&id);
            info!(
                "Player {} left the arena (radius {:.2})",
                id, self.world.arena_radius
            );
            net.send_to_all(&Command::RemovePlayer(id).into());
        }
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for GameServer {
    fn handle_connect(&mut self, net: &mut Network, peer: SocketAddr) -> Result<(), ServerError> {
        let id = self.next_id;
        self.next_id = id.next();

        self.address_to_id.insert(peer, id);
        self.world.players.insert(id, Player::at(id, spawn_point(id)));
        self.pressed_keys.insert(id, HashSet::new());
        info!("Added player {} for {}", id, peer);

        // Other players learn about the newcomer from its first position
        // update, and the newcomer learns about them the same way
        net.send_to(peer, &Command::SetId(id).into(), true);
        Ok(())
    }

    fn handle_disconnect(&mut self, net: &mut Network, peer: SocketAddr) -> Result<(), ServerError> {
        let Some(id) = self.address_to_id.remove(&peer) else {
            return Ok(());
        };

        self.pressed_keys.remove(&id);
        if self.world.players.remove(&id).is_some() {
            info!("Removed player {}", id);
            net.send_to_all(&Command::RemovePlayer(id).into());
        }
        Ok(())
    }

    fn handle(
        &mut self,
        _net: &mut Network,
        peer: SocketAddr,
        message: Message,
    ) -> Result<(), ServerError> {
        let id = self.id_of(peer)?;

        match message {
            Message::Input(Input::KeyDown(key)) => {
                self.pressed_keys.entry(id).or_default().insert(key);
            }
            Message::Input(Input::KeyUp(key)) => {
                if let Some(keys) = self.pressed_keys.get_mut(&id) {
                    keys.remove(&key);
                }
            }
            Message::Input(Input::Ping) => {}
            message => return Err(ServerError::UnexpectedPayload { peer, message }),
        }
        Ok(())
    }

    fn update(&mut self, net: &mut Network) -> Result<(), ServerError> {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        self.advance(net, elapsed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::codec::decode;
    use shared::{ARENA_START_RADIUS, MAX_DATAGRAM_SIZE};
    use std::net::UdpSocket;
    use std::thread;
    use std::time::Duration;

    fn test_network() -> Network {
        Network::bind("127.0.0.1:0").unwrap()
    }

    /// A peer socket registered with the network
    fn connect_peer(game: &mut GameServer, net: &mut Network) -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        let addr = socket.local_addr().unwrap();
        net.peers.connect(addr);
        game.handle_connect(net, addr).unwrap();
        socket
    }

    fn drain(socket: &UdpSocket) -> Vec<Message> {
        thread::sleep(Duration::from_millis(20));
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];
        let mut messages = Vec::new();
        while let Ok(len) = socket.recv(&mut buffer) {
            messages.push(decode(&buffer[..len]).unwrap());
        }
        messages
    }

    fn removals(messages: &[Message]) -> Vec<PlayerId> {
        messages
            .iter()
            .filter_map(|message| match message {
                Message::Command(Command::RemovePlayer(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_connect_assigns_increasing_ids() {
        let mut game = GameServer::new();
        let mut net = test_network();

        let first = connect_peer(&mut game, &mut net);
        let second = connect_peer(&mut game, &mut net);

        let first_id = game.player_id(first.local_addr().unwrap()).unwrap();
        let second_id = game.player_id(second.local_addr().unwrap()).unwrap();
        assert_eq!(first_id, PlayerId(1));
        assert_eq!(second_id, PlayerId(2));
        assert_eq!(game.world().players.len(), 2);
        assert!(game.pressed_keys(first_id).unwrap().is_empty());

        assert_eq!(drain(&first), vec![Message::from(Command::SetId(PlayerId(1)))]);
        assert_eq!(net.pending().len(), 2);
    }

    #[test]
    fn test_key_input_updates_pressed_set() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        let addr = peer.local_addr().unwrap();

        game.handle(&mut net, addr, Input::KeyDown(Key::Left).into()).unwrap();
        game.handle(&mut net, addr, Input::KeyDown(Key::Up).into()).unwrap();
        game.handle(&mut net, addr, Input::KeyUp(Key::Left).into()).unwrap();
        game.handle(&mut net, addr, Input::Ping.into()).unwrap();

        let keys = game.pressed_keys(PlayerId(1)).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&Key::Up));
    }

    #[test]
    fn test_command_from_client_is_rejected() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        let addr = peer.local_addr().unwrap();

        let result = game.handle(&mut net, addr, Command::SetId(PlayerId(5)).into());
        assert!(matches!(result, Err(ServerError::UnexpectedPayload { .. })));
    }

    #[test]
    fn test_input_from_unknown_peer_is_an_error() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();

        let result = game.handle(&mut net, addr, Input::Ping.into());
        assert!(matches!(result, Err(ServerError::UnknownPeer(_))));
    }

    #[test]
    fn test_arena_shrinks_to_floor() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        game.world_mut().players.clear();
        drain(&peer);

        for _ in 0..10 {
            game.tick(&mut net, 1.0);
        }
        assert_approx_eq!(game.world().arena_radius, ARENA_START_RADIUS - 4.0, 1e-4);

        let last_radius = drain(&peer)
            .into_iter()
            .filter_map(|message| match message {
                Message::Command(Command::SetRadius { radius, .. }) => Some(radius),
                _ => None,
            })
            .last()
            .unwrap();
        assert_approx_eq!(last_radius, 16.0, 1e-4);

        for _ in 0..100 {
            game.tick(&mut net, 1.0);
        }
        assert_eq!(game.world().arena_radius, ARENA_MIN_RADIUS);
        drain(&peer);

        game.tick(&mut net, 1.0);
        assert!(drain(&peer).is_empty());
    }

    #[test]
    fn test_long_gap_is_split_into_short_ticks() {
        let mut game = GameServer::new();
        let mut net = test_network();
        game.world_mut().players.insert(PlayerId(1), Player::new(PlayerId(1)));
        game.pressed_keys.insert(PlayerId(1), [Key::Right].into_iter().collect());

        game.advance(&mut net, 1.0);
        assert_approx_eq!(
            game.world().arena_radius,
            ARENA_START_RADIUS - ARENA_SHRINK_RATE,
            1e-4
        );

        // One big step would give x = 4 * 1 * 1 = 4; small steps lag slightly
        let player = &game.world().players[&PlayerId(1)];
        assert!(player.position.x > 1.5 && player.position.x < 4.0);
    }

    #[test]
    fn test_slow_updates_keep_wall_clock_shrink_rate() {
        let mut game = GameServer::new();
        let mut net = test_network();

        let before = Instant::now();
        game.update(&mut net).unwrap();
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(150));
            game.update(&mut net).unwrap();
        }
        let elapsed = before.elapsed().as_secs_f32();

        let shrink = ARENA_START_RADIUS - game.world().arena_radius;
        assert!(shrink <= ARENA_SHRINK_RATE * elapsed + 1e-4);
        assert!(shrink >= ARENA_SHRINK_RATE * 0.6 - 1e-4);
    }

    #[test]
    fn test_player_outside_arena_is_eliminated_once() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        let id = PlayerId(1);

        game.world_mut().arena_radius = 3.0;
        game.world_mut().players.get_mut(&id).unwrap().position = Vector2::new(4.0, 0.0);

        game.tick(&mut net, 0.0);
        assert!(!game.world().players.contains_key(&id));

        game.tick(&mut net, 0.0);
        assert_eq!(removals(&drain(&peer)), vec![id]);
    }

    #[test]
    fn test_disconnect_removes_player() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let leaving = connect_peer(&mut game, &mut net);
        let staying = connect_peer(&mut game, &mut net);
        let leaving_addr = leaving.local_addr().unwrap();
        drain(&staying);

        net.peers.remove(leaving_addr);
        game.handle_disconnect(&mut net, leaving_addr).unwrap();

        assert!(!game.world().players.contains_key(&PlayerId(1)));
        assert!(game.pressed_keys(PlayerId(1)).is_none());
        assert_eq!(game.player_id(leaving_addr), None);
        assert_eq!(removals(&drain(&staying)), vec![PlayerId(1)]);
    }

    #[test]
    fn test_disconnect_after_elimination_is_silent() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        let addr = peer.local_addr().unwrap();

        game.world_mut().players.clear();
        game.handle_disconnect(&mut net, addr).unwrap();

        assert!(removals(&drain(&peer)).is_empty());
    }

    #[test]
    fn test_held_key_moves_player() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let peer = connect_peer(&mut game, &mut net);
        let addr = peer.local_addr().unwrap();
        let start = game.world().players[&PlayerId(1)].position;

        game.handle(&mut net, addr, Input::KeyDown(Key::Right).into()).unwrap();
        game.tick(&mut net, 0.1);

        let player = &game.world().players[&PlayerId(1)];
        assert!(player.position.x > start.x);
        assert_approx_eq!(player.last_acceleration.x, 4.0, 1e-5);
    }

    #[test]
    fn test_colliding_players_exchange_velocities() {
        let mut game = GameServer::new();
        let mut net = test_network();
        let _first = connect_peer(&mut game, &mut net);
        let _second = connect_peer(&mut game, &mut net);

        {
            let players = &mut game.world_mut().players;
            let first = players.get_mut(&PlayerId(1)).unwrap();
            first.position = Vector2::new(0.0, 0.0);
            first.velocity = Vector2::new(2.0, 0.0);
            let second = players.get_mut(&PlayerId(2)).unwrap();
            second.position = Vector2::new(0.4, 0.0);
            second.velocity = Vector2::new(-2.0, 0.0);
        }

        game.tick(&mut net, 0.0);

        assert_approx_eq!(game.world().players[&PlayerId(1)].velocity.x, -2.0, 1e-5);
        assert_approx_eq!(game.world().players[&PlayerId(2)].velocity.x, 2.0, 1e-5);
    }

    #[test]
    fn test_spawn_points_are_inside_arena_and_distinct() {
        let first = spawn_point(PlayerId(1));
        let second = spawn_point(PlayerId(2));

        assert_approx_eq!(first.magnitude(), SPAWN_DISTANCE, 1e-4);
        assert!(first.distance(&second) > 2.0 * shared::physics::PLAYER_RADIUS);
        assert!(SPAWN_DISTANCE < ARENA_START_RADIUS);
    }
}
