//! Player physics: input mapping, force integration and elastic collisions

use crate::protocol::{Key, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

pub const PLAYER_MASS: f32 = 50.0;
pub const PLAYER_RADIUS: f32 = 0.25;
pub const PLAYER_DRAG: f32 = 0.08;
pub const PLAYER_INPUT_FORCE: f32 = 200.0;

///Represents a vector in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    ///Value along the x-axis.
    /// Positive direction is to the right.
    pub x: f32,
    ///Value along the y-axis.
    /// Positive direction is down, matching screen coordinates.
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the normalized vector, or zero for a zero-length vector.
    pub fn normalize(&self) -> Vector2 {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vector2::ZERO
        } else {
            Vector2 {
                x: self.x / mag,
                y: self.y / mag,
            }
        }
    }

    pub fn distance(&self, other: &Vector2) -> f32 {
        (*self - *other).magnitude()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, scalar: f32) -> Vector2 {
        Vector2::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f32> for Vector2 {
    type Output = Vector2;

    fn div(self, scalar: f32) -> Vector2 {
        Vector2::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// Maps a pressed-key set to a unit (or zero) movement direction
pub fn input_direction(pressed_keys: &HashSet<Key>) -> Vector2 {
    let mut direction = Vector2::ZERO;
    if pressed_keys.contains(&Key::Up) {
        direction.y -= 1.0;
    }
    if pressed_keys.contains(&Key::Left) {
        direction.x -= 1.0;
    }
    if pressed_keys.contains(&Key::Down) {
        direction.y += 1.0;
    }
    if pressed_keys.contains(&Key::Right) {
        direction.x += 1.0;
    }
    direction.normalize()
}

/// A circular body simulated by the server and replicated to clients
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub position: Vector2,
    pub velocity: Vector2,
    /// Acceleration of the most recent integration step, kept for display
    pub last_acceleration: Vector2,
    /// Force accumulated since the last integration step
    pub force: Vector2,
    pub mass: f32,
    pub radius: f32,
    pub drag: f32,
    pub input_force: f32,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            last_acceleration: Vector2::ZERO,
            force: Vector2::ZERO,
            mass: PLAYER_MASS,
            radius: PLAYER_RADIUS,
            drag: PLAYER_DRAG,
            input_force: PLAYER_INPUT_FORCE,
        }
    }

    pub fn at(id: PlayerId, position: Vector2) -> Self {
        Self {
            position,
            ..Self::new(id)
        }
    }

    /// Applies this tick's input and advances the integrator by `dt` seconds
    pub fn update(&mut self, pressed_keys: &HashSet<Key>, dt: f32) {
        self.apply_input(pressed_keys);
        self.integrate(dt);
    }

    pub fn apply_input(&mut self, pressed_keys: &HashSet<Key>) {
        self.force += input_direction(pressed_keys) * self.input_force;
    }

    /// Semi-implicit Euler step. Drag opposes velocity with magnitude
    /// `|v|^2 * drag`; the force accumulator is cleared afterwards.
    pub fn integrate(&mut self, dt: f32) {
        let speed = self.velocity.magnitude();
        if speed != 0.0 {
            self.force -= self.velocity.normalize() * (speed * speed * self.drag);
        }

        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        self.last_acceleration = acceleration;
        self.force = Vector2::ZERO;
    }

    pub fn overlaps(&self, other: &Player) -> bool {
        self.position.distance(&other.position) < self.radius + other.radius
    }

    /// Mass-weighted velocity exchange with `other`.
    ///
    /// Only the player with the larger id resolves a pair, so calling this on
    /// every ordered pair handles each contact exactly once. The exchange is
    /// applied to the whole velocity vectors rather than along the contact
    /// normal. Returns whether a collision was resolved.
    pub fn collide(&mut self, other: &mut Player) -> bool {
        if self.id <= other.id || !self.overlaps(other) {
            return false;
        }

        let m = self.mass;
        let big_m = other.mass;
        let u = self.velocity;
        let big_u = other.velocity;
        let total = m + big_m;

        self.velocity = (big_u * (2.0 * big_m) - u * big_m + u * m) / total;
        other.velocity = (big_u * big_m - big_u * m + u * (2.0 * m)) / total;
        true
    }
}
