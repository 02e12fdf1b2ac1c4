//! The player's glider: fixed-tick physics in screen space (+Y down).

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use deltawing_engine::time::lerp;

/// Downward acceleration cap, pixels per tick; also the terminal fall speed.
pub const GRAVITY: f32 = 9.81;
/// Velocity gained per tick while below terminal speed.
pub const GRAVITY_STEP: f32 = GRAVITY / 30.0;
/// Upward velocity set by a flap.
pub const FLAP_VELOCITY: f32 = -6.0;
/// Degrees of nose tilt per unit of vertical velocity.
const TILT_PER_VELOCITY: f32 = 5.0;
const MAX_TILT_DEGREES: f32 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub velocity: Vec2,
    prev_velocity_y: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self { pos: spawn, prev_pos: spawn, velocity: Vec2::ZERO, prev_velocity_y: 0.0 }
    }

    /// Returns to `spawn` at rest.
    pub fn reset(&mut self, spawn: Vec2) {
        *self = Self::new(spawn);
    }

    pub fn flap(&mut self) {
        self.velocity.y = FLAP_VELOCITY;
    }

    pub fn tick(&mut self) {
        self.prev_velocity_y = self.velocity.y;
        if self.velocity.y < GRAVITY {
            self.velocity.y = (self.velocity.y + GRAVITY_STEP).min(GRAVITY);
        }
        self.prev_pos = self.pos;
        self.pos += self.velocity;
    }

    /// Position interpolated between the last two ticks.
    pub fn render_pos(&self, partial_ticks: f32) -> Vec2 {
        self.prev_pos.lerp(self.pos, partial_ticks)
    }

    /// Rotation about Z for the model, which points its nose along +Y.
    ///
    /// Level flight faces right; the nose follows the vertical velocity,
    /// clamped to straight up or down.
    pub fn render_angle(&self, partial_ticks: f32) -> f32 {
        let vy = lerp(self.prev_velocity_y, self.velocity.y, partial_ticks);
        let tilt = (vy * TILT_PER_VELOCITY).clamp(-MAX_TILT_DEGREES, MAX_TILT_DEGREES);
        -FRAC_PI_2 + tilt.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_accelerates_up_to_terminal_speed() {
        let mut p = Player::new(Vec2::new(100.0, 100.0));
        p.tick();
        assert!((p.velocity.y - GRAVITY_STEP).abs() < 1e-6);
        assert!((p.pos.y - (100.0 + GRAVITY_STEP)).abs() < 1e-4);
        assert_eq!(p.prev_pos, Vec2::new(100.0, 100.0));

        for _ in 0..1000 {
            p.tick();
        }
        assert_eq!(p.velocity.y, GRAVITY);
    }

    #[test]
    fn flap_sends_the_player_up() {
        let mut p = Player::new(Vec2::new(0.0, 300.0));
        p.flap();
        p.tick();
        assert!(p.pos.y < 300.0);
    }

    #[test]
    fn render_pos_interpolates_between_ticks() {
        let mut p = Player::new(Vec2::ZERO);
        p.velocity = Vec2::new(4.0, 0.0);
        p.tick();
        assert_eq!(p.render_pos(0.0), Vec2::ZERO);
        assert_eq!(p.render_pos(0.5), Vec2::new(2.0, p.pos.y / 2.0));
        assert_eq!(p.render_pos(1.0), p.pos);
    }

    #[test]
    fn tilt_is_clamped_to_vertical() {
        let mut p = Player::new(Vec2::ZERO);
        assert!((p.render_angle(0.0) + FRAC_PI_2).abs() < 1e-6);

        p.velocity.y = 100.0;
        p.prev_velocity_y = 100.0;
        assert!(p.render_angle(0.3).abs() < 1e-6);

        p.velocity.y = -100.0;
        p.prev_velocity_y = -100.0;
        assert!((p.render_angle(0.3) + std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn reset_returns_to_spawn_at_rest() {
        let mut p = Player::new(Vec2::new(5.0, 5.0));
        p.flap();
        p.tick();
        p.reset(Vec2::new(1.0, 2.0));
        assert_eq!(p, Player::new(Vec2::new(1.0, 2.0)));
    }
}
