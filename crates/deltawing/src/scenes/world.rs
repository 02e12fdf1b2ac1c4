use glam::{Vec2, Vec3};

use deltawing_engine::core::{Frame, Graphics};
use deltawing_engine::input::{Key, KeyAction};
use deltawing_engine::render::backend::wgpu_device::WgpuDevice;
use deltawing_engine::render::{
    BufferPair, IndexBuffer, Renderer, VertexBuffer, VertexFormat, VertexPc,
};

use super::{MainMenu, Scene, SceneControl};
use crate::game::Text;
use crate::player::Player;

const SHIP_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Distance below the bottom edge at which the player respawns.
const FALL_MARGIN: f32 = 50.0;

/// The flying scene: a single glider under gravity.
pub struct World {
    player: Player,
    view: Vec2,
    ship: Option<Renderer<WgpuDevice>>,
}

impl World {
    pub fn new() -> Self {
        Self { player: Player::new(Vec2::ZERO), view: Vec2::ZERO, ship: None }
    }

    fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.view.x / 4.0, self.view.y / 2.0)
    }

    fn set_view(&mut self, width: u32, height: u32) {
        self.view = Vec2::new(width as f32, height as f32);
        self.player.reset(self.spawn_point());
    }

    /// Advances the simulation one tick.
    fn step(&mut self) {
        self.player.tick();
        if self.player.pos.y > self.view.y + FALL_MARGIN {
            log::debug!("player fell out of view, respawning");
            self.player.reset(self.spawn_point());
        }
    }

    fn draw_ship(&mut self, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let Some(ship) = self.ship.as_mut() else {
            return Ok(());
        };
        let partial = frame.partial_ticks();
        let pos = self.player.render_pos(partial);
        let angle = self.player.render_angle(partial);

        let stack = frame.context.matrix_stack_mut();
        stack.push_copy()?;
        let placed = stack
            .translate(pos.extend(0.0))
            .and_then(|()| stack.rotate(angle, Vec3::Z));

        let drawn = match placed {
            Ok(()) => {
                ship.bind(frame.context);
                ship.draw_all(frame).map_err(anyhow::Error::from)
            }
            Err(e) => Err(e.into()),
        };
        frame.context.matrix_stack_mut().pop()?;
        drawn
    }
}

impl Scene for World {
    fn name(&self) -> &'static str {
        "world"
    }

    fn init(&mut self, gfx: &mut Graphics<'_>, _text: &Text) -> anyhow::Result<()> {
        let vertices = [
            VertexPc::new([-20.0, -20.0, 0.0], SHIP_COLOR),
            VertexPc::new([0.0, 25.0, 0.0], SHIP_COLOR),
            VertexPc::new([20.0, -20.0, 0.0], SHIP_COLOR),
        ];
        let buffers = BufferPair::new(
            VertexBuffer::from_vertices(gfx.device, &vertices)?,
            IndexBuffer::new(gfx.device, &[0, 1, 2])?,
        );
        self.ship = Some(Renderer::new(
            gfx.device,
            gfx.shaders,
            gfx.context,
            VertexFormat::PositionColor,
            buffers,
        )?);

        let (width, height) = gfx.context.size();
        self.set_view(width, height);
        Ok(())
    }

    fn tick(&mut self, _gfx: &mut Graphics<'_>) -> SceneControl {
        self.step();
        SceneControl::Continue
    }

    fn render(&mut self, frame: &mut Frame<'_>, _text: &mut Text) {
        if let Err(e) = self.draw_ship(frame) {
            log::debug!("ship not drawn: {e}");
        }
    }

    fn exit(&mut self) {
        self.ship = None;
    }

    fn on_key(&mut self, key: Key, action: KeyAction) -> SceneControl {
        if action != KeyAction::Press {
            return SceneControl::Continue;
        }
        match key {
            Key::Space => self.player.flap(),
            Key::Escape => return SceneControl::Switch(Box::new(MainMenu::new())),
            _ => {}
        }
        SceneControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut world = World::new();
        world.set_view(1280, 720);
        world
    }

    #[test]
    fn player_spawns_left_of_centre() {
        let world = world();
        assert_eq!(world.player.pos, Vec2::new(320.0, 360.0));
    }

    #[test]
    fn space_flaps_and_escape_leaves() {
        let mut world = world();
        assert!(matches!(world.on_key(Key::Space, KeyAction::Press), SceneControl::Continue));
        world.step();
        assert!(world.player.pos.y < 360.0);

        assert!(matches!(world.on_key(Key::Escape, KeyAction::Release), SceneControl::Continue));
        assert!(matches!(world.on_key(Key::Escape, KeyAction::Press), SceneControl::Switch(_)));
    }

    #[test]
    fn falling_out_of_view_respawns() {
        let mut world = world();
        for _ in 0..600 {
            world.step();
            assert!(world.player.pos.y <= 720.0 + FALL_MARGIN + crate::player::GRAVITY);
        }
    }
}
