use macroquad::prelude::*;
use shared::{Player, PlayerId, Vector2, World};

/// Visible width of the world in world units
pub const CAMERA_WIDTH: f32 = 10.0;

/// Maps world coordinates to screen pixels
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// World position shown at the center of the screen
    pub position: Vector2,
    pub screen_width: f32,
    pub screen_height: f32,
    pub width: f32,
}

impl Camera {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        Self {
            position: Vector2::ZERO,
            screen_width,
            screen_height,
            width: CAMERA_WIDTH,
        }
    }

    pub fn height(&self) -> f32 {
        self.width * self.screen_height / self.screen_width
    }

    pub fn world_to_pixel_ratio(&self) -> f32 {
        self.screen_width / self.width
    }

    pub fn world_to_pixel(&self, v: Vector2) -> (f32, f32) {
        let height = self.height();
        let x = (v.x - self.position.x + self.width / 2.0) * self.screen_width / self.width;
        let y = (v.y - self.position.y + height / 2.0) * self.screen_height / height;
        (x, y)
    }

    pub fn pixel_to_world(&self, x: f32, y: f32) -> Vector2 {
        let height = self.height();
        Vector2::new(
            x / self.screen_width * self.width - self.width / 2.0 + self.position.x,
            y / self.screen_height * height - height / 2.0 + self.position.y,
        )
    }
}

pub struct Renderer {
    camera: Camera,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            camera: Camera::new(screen_width(), screen_height()),
        }
    }

    /// Draws one frame of the replica
    pub fn render(&mut self, world: &World) {
        self.camera.screen_width = screen_width();
        self.camera.screen_height = screen_height();

        clear_background(WHITE);

        self.draw_arena(world.arena_radius);

        for player in world.players.values() {
            let is_local_player = Some(player.id) == world.own_id;
            let color = if is_local_player {
                Color::from_rgba(0, 170, 255, 255)
            } else {
                RED
            };

            self.draw_player(player, color);
            if is_local_player {
                self.draw_velocity_vector(player);
            }
            self.draw_player_id(player);
        }

        self.draw_ui(world);
    }

    fn draw_arena(&self, radius: f32) {
        let (x, y) = self.camera.world_to_pixel(Vector2::ZERO);
        let ratio = self.camera.world_to_pixel_ratio();
        draw_circle(x, y, radius * ratio, Color::from_rgba(235, 235, 235, 255));
        draw_circle_lines(x, y, radius * ratio, 3.0, DARKGRAY);
    }

    fn draw_player(&self, player: &Player, color: Color) {
        let (x, y) = self.camera.world_to_pixel(player.position);
        let radius = player.radius * self.camera.world_to_pixel_ratio();

        draw_circle(x, y, radius, color);
        draw_circle_lines(x, y, radius, 1.0, BLACK);
    }

    fn draw_velocity_vector(&self, player: &Player) {
        let (x0, y0) = self.camera.world_to_pixel(player.position);
        let (x1, y1) = self
            .camera
            .world_to_pixel(player.position + player.velocity * 0.25);

        if player.velocity.magnitude() > 0.1 {
            draw_line(x0, y0, x1, y1, 2.0, ORANGE);
            self.draw_arrow_head(x0, y0, x1, y1);
        }
    }

    fn draw_arrow_head(&self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let length = (dx * dx + dy * dy).sqrt();

        if length < 5.0 {
            return;
        }

        let arrow_size = 6.0;
        let nx = dx / length;
        let ny = dy / length;

        let px = -ny;
        let py = nx;

        let base_x = x1 - nx * arrow_size;
        let base_y = y1 - ny * arrow_size;

        draw_line(
            x1,
            y1,
            base_x + px * (arrow_size / 2.0),
            base_y + py * (arrow_size / 2.0),
            1.0,
            ORANGE,
        );
        draw_line(
            x1,
            y1,
            base_x - px * (arrow_size / 2.0),
            base_y - py * (arrow_size / 2.0),
            1.0,
            ORANGE,
        );
    }

    fn draw_player_id(&self, player: &Player) {
        let (x, y) = self.camera.world_to_pixel(player.position);
        let offset = player.radius * self.camera.world_to_pixel_ratio() + 4.0;
        draw_text(&player.id.to_string(), x - 4.0, y - offset, 16.0, BLACK);
    }

    fn draw_ui(&self, world: &World) {
        let connection_color = if world.own_id.is_some() { GREEN } else { RED };
        draw_rectangle(10.0, 10.0, 8.0, 8.0, connection_color);
        draw_text(&status_line(world), 24.0, 18.0, 16.0, BLACK);

        if let Some(own) = world.own_player() {
            let lines = [
                format!("Position: ({:.2}, {:.2})", own.position.x, own.position.y),
                format!("Velocity: ({:.2}, {:.2})", own.velocity.x, own.velocity.y),
                format!(
                    "Acceleration: ({:.2}, {:.2})",
                    own.last_acceleration.x, own.last_acceleration.y
                ),
            ];
            for (i, line) in lines.iter().enumerate() {
                draw_text(line, 10.0, 40.0 + i as f32 * 20.0, 20.0, BLACK);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn status_line(world: &World) -> String {
    let id = world
        .own_id
        .map(|PlayerId(id)| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let state = match (world.own_id, world.own_player()) {
        (None, _) => "connecting",
        (Some(_), Some(_)) => "alive",
        (Some(_), None) => "eliminated",
    };
    format!(
        "player {} ({}), {} players, arena radius {:.2}",
        id,
        state,
        world.players.len(),
        world.arena_radius
    )
}
